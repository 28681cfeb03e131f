pub mod property_api;

pub use property_api::HttpPropertyApi;
