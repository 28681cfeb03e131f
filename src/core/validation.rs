//! Per-step validation of the intake wizard.
//!
//! Each step owns a working copy of the fields it edits. A working copy is
//! loaded from the shared draft, validated on its own, and merged back into the
//! draft only when it reports no errors.

use crate::core::property::{Owner, OwnerRow, PropertyDraft, PropertyType, whole_years};
use crate::core::summary::format_percent;
use crate::core::wizard::Step;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field}: This field is required")]
    RequiredField { field: String },
    #[error("{field}: {} (got {value})", describe_bounds(.min, .max))]
    Range {
        field: String,
        value: f64,
        min: f64,
        max: Option<f64>,
    },
    #[error("{field}: must be a whole number (got {value})")]
    WholeNumber { field: String, value: f64 },
    #[error("Total ownership must be exactly 100%. Currently: {}%", percent(.sum))]
    OwnershipMismatch { sum: f64 },
    #[error("Please add at least one valid owner.")]
    NoOwners,
}

impl ValidationError {
    /// Name of the offending field, if the error is about a single field.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::RequiredField { field }
            | ValidationError::Range { field, .. }
            | ValidationError::WholeNumber { field, .. } => Some(field.as_str()),
            ValidationError::OwnershipMismatch { .. } | ValidationError::NoOwners => None,
        }
    }
}

fn percent(sum: &f64) -> String {
    format_percent(*sum)
}

fn describe_bounds(min: &f64, max: &Option<f64>) -> String {
    match max {
        Some(max) => format!("must be between {min} and {max}"),
        None => format!("must be at least {min}"),
    }
}

fn require_text(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::RequiredField {
            field: field.to_string(),
        });
    }
}

/// Checks a required number against an inclusive range. NaN never passes.
fn require_number(
    errors: &mut Vec<ValidationError>,
    field: &str,
    value: Option<f64>,
    min: f64,
    max: Option<f64>,
) {
    let Some(value) = value else {
        errors.push(ValidationError::RequiredField {
            field: field.to_string(),
        });
        return;
    };
    let in_range = value.is_finite() && value >= min && max.is_none_or(|max| value <= max);
    if !in_range {
        errors.push(ValidationError::Range {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
}

/// A wizard step's private working copy.
pub trait StepForm: Sized {
    const STEP: Step;

    fn from_draft(draft: &PropertyDraft) -> Self;

    /// Returns every problem with the working copy. Empty means the step may advance.
    fn validate(&self) -> Vec<ValidationError>;

    fn merge_into(self, draft: &mut PropertyDraft);

    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasicInfo {
    pub title: String,
    pub location: String,
    pub property_type: Option<PropertyType>,
}

impl StepForm for BasicInfo {
    const STEP: Step = Step::BasicInfo;

    fn from_draft(draft: &PropertyDraft) -> Self {
        Self {
            title: draft.title.clone(),
            location: draft.location.clone(),
            property_type: draft.property_type,
        }
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        require_text(&mut errors, "title", &self.title);
        require_text(&mut errors, "location", &self.location);
        if self.property_type.is_none() {
            errors.push(ValidationError::RequiredField {
                field: "type".to_string(),
            });
        }
        errors
    }

    fn merge_into(self, draft: &mut PropertyDraft) {
        draft.title = self.title;
        draft.location = self.location;
        draft.property_type = self.property_type;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurchaseDetails {
    pub purchase_price: Option<f64>,
    pub deposit: Option<f64>,
    pub loan_amount: Option<f64>,
    pub interest_rate: Option<f64>,
    /// Years as entered; merged into the draft as a whole number.
    pub loan_term: Option<f64>,
}

impl StepForm for PurchaseDetails {
    const STEP: Step = Step::Purchase;

    fn from_draft(draft: &PropertyDraft) -> Self {
        Self {
            purchase_price: draft.purchase_price,
            deposit: draft.deposit,
            loan_amount: draft.loan_amount,
            interest_rate: draft.interest_rate,
            loan_term: draft.loan_term.map(f64::from),
        }
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        require_number(&mut errors, "purchase_price", self.purchase_price, 1.0, None);
        require_number(&mut errors, "deposit", self.deposit, 0.0, None);
        require_number(&mut errors, "loan_amount", self.loan_amount, 0.0, None);
        require_number(&mut errors, "interest_rate", self.interest_rate, 0.0, None);
        require_number(&mut errors, "loan_term", self.loan_term, 1.0, None);
        let fractional = self
            .loan_term
            .filter(|value| *value >= 1.0 && whole_years(*value).is_none());
        if let Some(value) = fractional {
            errors.push(ValidationError::WholeNumber {
                field: "loan_term".to_string(),
                value,
            });
        }
        errors
    }

    fn merge_into(self, draft: &mut PropertyDraft) {
        draft.purchase_price = self.purchase_price;
        draft.deposit = self.deposit;
        draft.loan_amount = self.loan_amount;
        draft.interest_rate = self.interest_rate;
        draft.loan_term = self.loan_term.and_then(whole_years);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RentalInfo {
    pub rent: Option<f64>,
    pub vacancy_rate: Option<f64>,
}

impl StepForm for RentalInfo {
    const STEP: Step = Step::Rental;

    fn from_draft(draft: &PropertyDraft) -> Self {
        Self {
            rent: draft.rent,
            vacancy_rate: draft.vacancy_rate,
        }
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        require_number(&mut errors, "rent", self.rent, 1.0, None);
        require_number(
            &mut errors,
            "vacancy_rate",
            self.vacancy_rate,
            0.0,
            Some(100.0),
        );
        errors
    }

    fn merge_into(self, draft: &mut PropertyDraft) {
        draft.rent = self.rent;
        draft.vacancy_rate = self.vacancy_rate;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expenses {
    pub council_rates: Option<f64>,
    pub insurance: Option<f64>,
    pub maintenance: Option<f64>,
    pub property_manager: Option<f64>,
}

impl StepForm for Expenses {
    const STEP: Step = Step::Expenses;

    fn from_draft(draft: &PropertyDraft) -> Self {
        Self {
            council_rates: draft.council_rates,
            insurance: draft.insurance,
            maintenance: draft.maintenance,
            property_manager: draft.property_manager,
        }
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        require_number(&mut errors, "council_rates", self.council_rates, 0.0, None);
        require_number(&mut errors, "insurance", self.insurance, 0.0, None);
        require_number(&mut errors, "maintenance", self.maintenance, 0.0, None);
        require_number(
            &mut errors,
            "property_manager",
            self.property_manager,
            0.0,
            None,
        );
        errors
    }

    fn merge_into(self, draft: &mut PropertyDraft) {
        draft.council_rates = self.council_rates;
        draft.insurance = self.insurance;
        draft.maintenance = self.maintenance;
        draft.property_manager = self.property_manager;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnershipIncome {
    pub owners: Vec<OwnerRow>,
    pub wage_growth: Option<f64>,
}

impl OwnershipIncome {
    /// Appends an empty owner row and returns its index.
    pub fn add_owner(&mut self) -> usize {
        self.owners.push(OwnerRow::default());
        self.owners.len() - 1
    }

    pub fn remove_owner(&mut self, index: usize) -> Option<OwnerRow> {
        (index < self.owners.len()).then(|| self.owners.remove(index))
    }

    pub fn owner_mut(&mut self, index: usize) -> Option<&mut OwnerRow> {
        self.owners.get_mut(index)
    }

    /// Ownership sum shown while editing: rows with a name and both numbers filled in.
    pub fn live_ownership_sum(&self) -> f64 {
        self.owners
            .iter()
            .filter(|row| !row.name.trim().is_empty() && row.income.is_some())
            .filter_map(|row| row.ownership)
            .sum()
    }

    /// Rows that count toward the 100% rule at submission time.
    pub fn valid_owners(&self) -> impl Iterator<Item = Owner> + '_ {
        self.owners.iter().filter_map(|row| {
            let name = row.name.trim();
            match (row.ownership, row.income) {
                (Some(ownership), Some(income))
                    if !name.is_empty() && ownership > 0.0 && income > 0.0 =>
                {
                    Some(Owner {
                        name: name.to_string(),
                        ownership,
                        income,
                    })
                }
                _ => None,
            }
        })
    }

    pub fn submitted_ownership_sum(&self) -> f64 {
        self.valid_owners().map(|owner| owner.ownership).sum()
    }

    /// Field-level problems only, without the cross-row ownership rule.
    pub fn field_errors(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (index, row) in self.owners.iter().enumerate() {
            require_text(&mut errors, &format!("owners[{index}].name"), &row.name);
            require_number(
                &mut errors,
                &format!("owners[{index}].ownership"),
                row.ownership,
                0.0,
                Some(100.0),
            );
            require_number(
                &mut errors,
                &format!("owners[{index}].income"),
                row.income,
                0.0,
                None,
            );
        }
        require_number(&mut errors, "wage_growth", self.wage_growth, 0.0, None);
        errors
    }

    /// The cross-row ownership rule applied at submission.
    pub fn ownership_errors(&self) -> Option<ValidationError> {
        if self.valid_owners().next().is_none() {
            return Some(ValidationError::NoOwners);
        }
        let sum = self.submitted_ownership_sum();
        // Strict equality, matching what the backend expects.
        (sum != 100.0).then_some(ValidationError::OwnershipMismatch { sum })
    }
}

impl StepForm for OwnershipIncome {
    const STEP: Step = Step::Ownership;

    fn from_draft(draft: &PropertyDraft) -> Self {
        Self {
            owners: draft.owners.clone(),
            wage_growth: draft.wage_growth,
        }
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = self.field_errors();
        errors.extend(self.ownership_errors());
        errors
    }

    fn merge_into(self, draft: &mut PropertyDraft) {
        draft.owners = self.owners;
        draft.wage_growth = self.wage_growth;
    }
}
