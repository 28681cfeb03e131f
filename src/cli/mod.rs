pub mod add;
pub mod dashboard;
pub mod delete;
pub mod setup;
pub mod show;
pub mod ui;
