//! Core intake and dashboard logic, independent of the terminal

pub mod api;
pub mod config;
pub mod dashboard;
pub mod log;
pub mod property;
pub mod summary;
pub mod validation;
pub mod wizard;

// Re-export main types for cleaner imports
pub use api::{PropertyApi, SubmissionError};
pub use dashboard::{DashboardMetrics, PropertyFilter};
pub use property::{NewProperty, OwnerRow, Property, PropertyDraft, PropertyType};
pub use wizard::{Phase, Step, StepInput, WizardController, WizardError};
