//! The five-step intake wizard.
//!
//! `WizardController` owns the shared draft and the active step's working
//! copy. Steps move strictly one at a time; a step's edits reach the draft only
//! when its validator passes.

use crate::core::api::{PropertyApi, SubmissionError};
use crate::core::property::{NewProperty, Owner, Property, PropertyDraft};
use crate::core::summary::Confirmation;
use crate::core::validation::{
    BasicInfo, Expenses, OwnershipIncome, PurchaseDetails, RentalInfo, StepForm, ValidationError,
};
use std::fmt::Display;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    BasicInfo,
    Purchase,
    Rental,
    Expenses,
    Ownership,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::BasicInfo,
        Step::Purchase,
        Step::Rental,
        Step::Expenses,
        Step::Ownership,
    ];

    /// 1-based position in the wizard.
    pub fn number(&self) -> usize {
        match self {
            Step::BasicInfo => 1,
            Step::Purchase => 2,
            Step::Rental => 3,
            Step::Expenses => 4,
            Step::Ownership => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Step::BasicInfo => "Basic Info",
            Step::Purchase => "Purchase",
            Step::Rental => "Rental Info",
            Step::Expenses => "Expenses",
            Step::Ownership => "Ownership & Income",
        }
    }

    pub fn next(&self) -> Option<Step> {
        Step::ALL.get(self.number()).copied()
    }

    pub fn previous(&self) -> Option<Step> {
        self.number()
            .checked_sub(2)
            .and_then(|i| Step::ALL.get(i).copied())
    }

    pub fn progress_percent(&self) -> f64 {
        self.number() as f64 / Step::ALL.len() as f64 * 100.0
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Step {}: {}", self.number(), self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing(Step),
    Submitted,
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Editing(step) => write!(f, "{step}"),
            Phase::Submitted => write!(f, "Submitted"),
        }
    }
}

/// Working copy of whichever step is on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum StepInput {
    BasicInfo(BasicInfo),
    Purchase(PurchaseDetails),
    Rental(RentalInfo),
    Expenses(Expenses),
    Ownership(OwnershipIncome),
}

impl StepInput {
    fn load(step: Step, draft: &PropertyDraft) -> Self {
        match step {
            Step::BasicInfo => StepInput::BasicInfo(BasicInfo::from_draft(draft)),
            Step::Purchase => StepInput::Purchase(PurchaseDetails::from_draft(draft)),
            Step::Rental => StepInput::Rental(RentalInfo::from_draft(draft)),
            Step::Expenses => StepInput::Expenses(Expenses::from_draft(draft)),
            Step::Ownership => StepInput::Ownership(OwnershipIncome::from_draft(draft)),
        }
    }

    pub fn step(&self) -> Step {
        match self {
            StepInput::BasicInfo(_) => BasicInfo::STEP,
            StepInput::Purchase(_) => PurchaseDetails::STEP,
            StepInput::Rental(_) => RentalInfo::STEP,
            StepInput::Expenses(_) => Expenses::STEP,
            StepInput::Ownership(_) => OwnershipIncome::STEP,
        }
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        match self {
            StepInput::BasicInfo(form) => form.validate(),
            StepInput::Purchase(form) => form.validate(),
            StepInput::Rental(form) => form.validate(),
            StepInput::Expenses(form) => form.validate(),
            StepInput::Ownership(form) => form.validate(),
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            StepInput::BasicInfo(form) => form.is_valid(),
            StepInput::Purchase(form) => form.is_valid(),
            StepInput::Rental(form) => form.is_valid(),
            StepInput::Expenses(form) => form.is_valid(),
            StepInput::Ownership(form) => form.is_valid(),
        }
    }

    fn merge_into(self, draft: &mut PropertyDraft) {
        match self {
            StepInput::BasicInfo(form) => form.merge_into(draft),
            StepInput::Purchase(form) => form.merge_into(draft),
            StepInput::Rental(form) => form.merge_into(draft),
            StepInput::Expenses(form) => form.merge_into(draft),
            StepInput::Ownership(form) => form.merge_into(draft),
        }
    }
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Step is incomplete: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
    #[error("Cannot {action} from {phase}")]
    NotAvailable { action: &'static str, phase: Phase },
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A completed intake: what was sent and what the backend stored.
#[derive(Debug, Clone)]
pub struct Submission {
    pub request: NewProperty,
    pub property: Property,
}

impl Submission {
    /// Summary for the confirmation view. Always derived from the request.
    pub fn confirmation(&self) -> Confirmation {
        Confirmation::from_request(&self.request)
    }
}

#[derive(Debug)]
enum State {
    Editing(StepInput),
    Submitted(Box<Submission>),
}

#[derive(Debug)]
pub struct WizardController {
    draft: PropertyDraft,
    state: State,
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardController {
    pub fn new() -> Self {
        Self::with_draft(PropertyDraft::default())
    }

    /// Starts on step 1 with fields pre-filled from `draft`. Nothing is
    /// validated until the user advances.
    pub fn with_draft(draft: PropertyDraft) -> Self {
        let input = StepInput::load(Step::BasicInfo, &draft);
        Self {
            draft,
            state: State::Editing(input),
        }
    }

    pub fn phase(&self) -> Phase {
        match &self.state {
            State::Editing(input) => Phase::Editing(input.step()),
            State::Submitted(_) => Phase::Submitted,
        }
    }

    pub fn draft(&self) -> &PropertyDraft {
        &self.draft
    }

    pub fn input(&self) -> Option<&StepInput> {
        match &self.state {
            State::Editing(input) => Some(input),
            State::Submitted(_) => None,
        }
    }

    pub fn input_mut(&mut self) -> Option<&mut StepInput> {
        match &mut self.state {
            State::Editing(input) => Some(input),
            State::Submitted(_) => None,
        }
    }

    pub fn submission(&self) -> Option<&Submission> {
        match &self.state {
            State::Submitted(submission) => Some(&**submission),
            State::Editing(_) => None,
        }
    }

    /// Current problems with the active step. Empty once submitted.
    pub fn errors(&self) -> Vec<ValidationError> {
        self.input().map(StepInput::validate).unwrap_or_default()
    }

    /// Whether the Next/Submit control is enabled.
    pub fn can_advance(&self) -> bool {
        self.input().is_some_and(StepInput::is_valid)
    }

    fn not_available(&self, action: &'static str) -> WizardError {
        WizardError::NotAvailable {
            action,
            phase: self.phase(),
        }
    }

    /// Merges the active step into the draft and moves to the following step.
    pub fn next(&mut self) -> Result<Step, WizardError> {
        let Some(next) = self.input().and_then(|input| input.step().next()) else {
            return Err(self.not_available("go to next step"));
        };
        let errors = self.errors();
        if !errors.is_empty() {
            debug!(step = ?self.phase(), errors = errors.len(), "Step validation failed");
            return Err(WizardError::Invalid(errors));
        }

        if let State::Editing(input) = &self.state {
            input.clone().merge_into(&mut self.draft);
        }
        self.state = State::Editing(StepInput::load(next, &self.draft));
        debug!(step = next.number(), "Advanced wizard");
        Ok(next)
    }

    /// Returns to the previous step. Unmerged edits on the current step are dropped.
    pub fn back(&mut self) -> Result<Step, WizardError> {
        let Some(previous) = self.input().and_then(|input| input.step().previous()) else {
            return Err(self.not_available("go back"));
        };
        self.state = State::Editing(StepInput::load(previous, &self.draft));
        debug!(step = previous.number(), "Moved wizard back");
        Ok(previous)
    }

    /// Validates the final step and builds the create request from the draft.
    fn prepare_request(&mut self) -> Result<NewProperty, WizardError> {
        let Some(StepInput::Ownership(form)) = self.input() else {
            return Err(self.not_available("submit"));
        };
        let errors = form.validate();
        if !errors.is_empty() {
            debug!(errors = errors.len(), "Submission blocked by validation");
            return Err(WizardError::Invalid(errors));
        }
        let owners: Vec<Owner> = form.valid_owners().collect();
        let form = form.clone();
        form.merge_into(&mut self.draft);

        build_request(&self.draft, owners).map_err(WizardError::Invalid)
    }

    /// Sends the draft to the backend. On failure the wizard stays on the last
    /// step with everything intact, ready for another attempt.
    pub async fn submit(
        &mut self,
        api: &(dyn PropertyApi + Send + Sync),
    ) -> Result<Property, WizardError> {
        let request = self.prepare_request()?;
        info!(title = %request.title, "Submitting property");

        match api.create_property(&request).await {
            Ok(property) => {
                debug!(id = %property.id, "Property created");
                self.state = State::Submitted(Box::new(Submission {
                    request,
                    property: property.clone(),
                }));
                Ok(property)
            }
            Err(e) => {
                warn!(error = %e, "Property submission failed");
                Err(WizardError::Submission(e))
            }
        }
    }

    /// Acknowledges the confirmation and starts over with an empty draft.
    pub fn done(&mut self) -> Result<(), WizardError> {
        if !matches!(self.state, State::Submitted(_)) {
            return Err(self.not_available("finish"));
        }
        *self = Self::new();
        debug!("Wizard reset");
        Ok(())
    }
}

/// Unwraps a merged field, recording it as missing when absent.
fn take<T: Default>(missing: &mut Vec<ValidationError>, field: &str, value: Option<T>) -> T {
    if value.is_none() {
        missing.push(ValidationError::RequiredField {
            field: field.to_string(),
        });
    }
    value.unwrap_or_default()
}

/// Builds the typed request once every step has been merged.
fn build_request(
    draft: &PropertyDraft,
    owners: Vec<Owner>,
) -> Result<NewProperty, Vec<ValidationError>> {
    let mut missing = Vec::new();
    let purchase_price = take(&mut missing, "purchase_price", draft.purchase_price);
    let deposit = take(&mut missing, "deposit", draft.deposit);
    let loan_amount = take(&mut missing, "loan_amount", draft.loan_amount);
    let interest_rate = take(&mut missing, "interest_rate", draft.interest_rate);
    let loan_term = take(&mut missing, "loan_term", draft.loan_term);
    let rent = take(&mut missing, "rent", draft.rent);
    let vacancy_rate = take(&mut missing, "vacancy_rate", draft.vacancy_rate);
    let council_rates = take(&mut missing, "council_rates", draft.council_rates);
    let insurance = take(&mut missing, "insurance", draft.insurance);
    let maintenance = take(&mut missing, "maintenance", draft.maintenance);
    let property_manager = take(&mut missing, "property_manager", draft.property_manager);
    let wage_growth = take(&mut missing, "wage_growth", draft.wage_growth);

    let Some(property_type) = draft.property_type else {
        missing.push(ValidationError::RequiredField {
            field: "type".to_string(),
        });
        return Err(missing);
    };
    if !missing.is_empty() {
        return Err(missing);
    }

    Ok(NewProperty {
        title: draft.title.trim().to_string(),
        location: draft.location.trim().to_string(),
        property_type,
        purchase_price,
        deposit,
        loan_amount,
        interest_rate,
        loan_term,
        rent,
        vacancy_rate,
        council_rates,
        insurance,
        maintenance,
        property_manager,
        owners,
        wage_growth,
    })
}
