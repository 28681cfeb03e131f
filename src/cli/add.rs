//! Terminal front end for the intake wizard.
use super::ui;
use crate::core::api::PropertyApi;
use crate::core::property::{PropertyDraft, PropertyType};
use crate::core::summary::Confirmation;
use crate::core::validation::{OwnershipIncome, ValidationError};
use crate::core::wizard::{Phase, Step, StepInput, WizardController, WizardError};
use anyhow::{Context, Result, bail};
use std::fmt::Display;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Source of user input lines.
pub trait LineReader {
    fn read_line(&mut self) -> Result<String>;
}

pub struct StdinReader;

impl LineReader for StdinReader {
    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = std::io::stdin()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            bail!("Input closed before the wizard finished");
        }
        Ok(line)
    }
}

/// Prompting helpers over an input source and an output sink.
pub struct Console<R, W> {
    input: R,
    out: W,
}

impl<R: LineReader, W: Write> Console<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub(crate) fn say(&mut self, text: impl Display) -> Result<()> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    pub(crate) fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        Ok(self.input.read_line()?.trim().to_string())
    }

    fn edit_text(&mut self, label: &str, value: &mut String) -> Result<()> {
        let answer = self.ask(&format!("{label} [{value}]: "))?;
        if !answer.is_empty() {
            *value = answer;
        }
        Ok(())
    }

    /// Enter keeps the current value, `-` clears it.
    fn edit_number<T>(&mut self, label: &str, value: &mut Option<T>) -> Result<()>
    where
        T: FromStr + Display + Copy,
    {
        loop {
            let current = value.map(|v| v.to_string()).unwrap_or_default();
            let answer = self.ask(&format!("{label} [{current}]: "))?;
            match answer.as_str() {
                "" => return Ok(()),
                "-" => {
                    *value = None;
                    return Ok(());
                }
                text => match text.replace(',', "").parse::<T>() {
                    Ok(parsed) => {
                        *value = Some(parsed);
                        return Ok(());
                    }
                    Err(_) => self.say(ui::style_text(
                        &format!("'{text}' is not a valid number"),
                        ui::StyleType::Error,
                    ))?,
                },
            }
        }
    }

    fn edit_type(&mut self, value: &mut Option<PropertyType>) -> Result<()> {
        loop {
            let current = value.map(|t| t.to_string()).unwrap_or_default();
            let answer = self.ask(&format!(
                "Property type (1 House, 2 Townhouse, 3 Apartment) [{current}]: "
            ))?;
            if answer.is_empty() {
                return Ok(());
            }
            let parsed = match answer.as_str() {
                "1" => Ok(PropertyType::House),
                "2" => Ok(PropertyType::Townhouse),
                "3" => Ok(PropertyType::Apartment),
                other => other.parse::<PropertyType>(),
            };
            match parsed {
                Ok(property_type) => {
                    *value = Some(property_type);
                    return Ok(());
                }
                Err(e) => self.say(ui::style_text(&e.to_string(), ui::StyleType::Error))?,
            }
        }
    }

    fn show_errors(&mut self, errors: &[ValidationError]) -> Result<()> {
        for error in errors {
            self.say(ui::style_text(&format!("  ✘ {error}"), ui::StyleType::Error))?;
        }
        Ok(())
    }
}

/// Renders the confirmation view for a submitted property.
pub fn render_confirmation(confirmation: &Confirmation, currency: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Field"), ui::header_cell("Value")]);
    table.add_row(vec![
        ui::label_cell("Title"),
        comfy_table::Cell::new(&confirmation.title),
    ]);
    table.add_row(vec![
        ui::label_cell("Location"),
        comfy_table::Cell::new(&confirmation.location),
    ]);
    table.add_row(vec![
        ui::label_cell("Type"),
        comfy_table::Cell::new(confirmation.property_type),
    ]);
    table.add_row(vec![
        ui::label_cell("ROI"),
        ui::right_cell(confirmation.roi_display()),
    ]);
    table.add_row(vec![
        ui::label_cell("Cash Flow (est.)"),
        ui::right_cell(confirmation.cash_flow_display(currency)),
    ]);
    table.add_row(vec![
        ui::label_cell("Loan Term"),
        ui::right_cell(format!("{} yrs", confirmation.loan_term)),
    ]);

    format!(
        "{}\n\n{}",
        ui::style_text("✔ Property Added Successfully", ui::StyleType::Success),
        table
    )
}

/// Interactive wizard session over a console.
pub struct WizardSession<'a, R, W> {
    wizard: WizardController,
    console: Console<R, W>,
    api: &'a (dyn PropertyApi + Send + Sync),
    currency: &'a str,
}

enum Action {
    Next,
    Back,
    Edit,
    Quit,
}

impl<'a, R: LineReader, W: Write> WizardSession<'a, R, W> {
    pub fn new(
        console: Console<R, W>,
        api: &'a (dyn PropertyApi + Send + Sync),
        currency: &'a str,
    ) -> Self {
        Self {
            wizard: WizardController::new(),
            console,
            api,
            currency,
        }
    }

    pub fn into_console(self) -> Console<R, W> {
        self.console
    }

    /// Drives the wizard until the user quits. Returns how many properties were submitted.
    pub async fn run(&mut self) -> Result<usize> {
        let mut submitted = 0;
        loop {
            match self.wizard.phase() {
                Phase::Editing(Step::Ownership) => {
                    if !self.ownership_step().await? {
                        return Ok(submitted);
                    }
                }
                Phase::Editing(step) => {
                    if !self.field_step(step)? {
                        return Ok(submitted);
                    }
                }
                Phase::Submitted => {
                    submitted += 1;
                    if let Some(submission) = self.wizard.submission() {
                        let view = render_confirmation(&submission.confirmation(), self.currency);
                        self.console.say(format!("\n{view}\n"))?;
                    }
                    let answer = self.console.ask("Add another property? [y/N]: ")?;
                    if !answer.eq_ignore_ascii_case("y") {
                        return Ok(submitted);
                    }
                    self.wizard.done()?;
                }
            }
        }
    }

    fn header(&mut self, step: Step) -> Result<()> {
        self.console.say(format!(
            "\n{}\n{}",
            ui::step_progress(step),
            ui::style_text(&step.to_string(), ui::StyleType::Title)
        ))
    }

    fn edit_fields(&mut self) -> Result<()> {
        let Some(input) = self.wizard.input_mut() else {
            return Ok(());
        };
        let console = &mut self.console;
        match input {
            StepInput::BasicInfo(form) => {
                console.edit_text("Title", &mut form.title)?;
                console.edit_text("Location", &mut form.location)?;
                console.edit_type(&mut form.property_type)?;
            }
            StepInput::Purchase(form) => {
                console.edit_number("Purchase price ($)", &mut form.purchase_price)?;
                console.edit_number("Deposit ($)", &mut form.deposit)?;
                console.edit_number("Loan amount ($)", &mut form.loan_amount)?;
                console.edit_number("Interest rate (%)", &mut form.interest_rate)?;
                console.edit_number("Loan term (years)", &mut form.loan_term)?;
            }
            StepInput::Rental(form) => {
                console.edit_number("Monthly rent ($)", &mut form.rent)?;
                console.edit_number("Vacancy rate (%)", &mut form.vacancy_rate)?;
            }
            StepInput::Expenses(form) => {
                console.edit_number("Council rates ($/yr)", &mut form.council_rates)?;
                console.edit_number("Insurance ($/yr)", &mut form.insurance)?;
                console.edit_number("Maintenance ($/yr)", &mut form.maintenance)?;
                console.edit_number("Property manager ($/yr)", &mut form.property_manager)?;
            }
            StepInput::Ownership(form) => {
                console.edit_number("Wage growth (%)", &mut form.wage_growth)?;
            }
        }
        Ok(())
    }

    fn read_action(&mut self, first: bool) -> Result<Action> {
        let errors = self.wizard.errors();
        self.console.show_errors(&errors)?;
        let can_go_back = !first;
        let prompt = match (errors.is_empty(), can_go_back) {
            (true, true) => "[n]ext, [e]dit, [b]ack, [q]uit: ",
            (true, false) => "[n]ext, [e]dit, [q]uit: ",
            (false, true) => "[e]dit, [b]ack, [q]uit: ",
            (false, false) => "[e]dit, [q]uit: ",
        };
        loop {
            match self.console.ask(prompt)?.to_lowercase().as_str() {
                "n" if errors.is_empty() => return Ok(Action::Next),
                "n" => self
                    .console
                    .say("Next is disabled until the errors above are fixed.")?,
                "b" if can_go_back => return Ok(Action::Back),
                "e" | "" => return Ok(Action::Edit),
                "q" => return Ok(Action::Quit),
                _ => self.console.say("Unknown option.")?,
            }
        }
    }

    /// Runs one of steps 1-4. Returns false when the user quits.
    fn field_step(&mut self, step: Step) -> Result<bool> {
        self.header(step)?;
        self.edit_fields()?;
        loop {
            match self.read_action(step == Step::BasicInfo)? {
                Action::Next => {
                    self.wizard.next()?;
                    return Ok(true);
                }
                Action::Back => {
                    self.wizard.back()?;
                    return Ok(true);
                }
                Action::Edit => self.edit_fields()?,
                Action::Quit => return Ok(false),
            }
        }
    }

    fn ownership_form(&mut self) -> Option<&mut OwnershipIncome> {
        match self.wizard.input_mut() {
            Some(StepInput::Ownership(form)) => Some(form),
            _ => None,
        }
    }

    fn show_owners(&mut self) -> Result<()> {
        let Some(StepInput::Ownership(form)) = self.wizard.input() else {
            return Ok(());
        };
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("#"),
            ui::header_cell("Owner"),
            ui::header_cell("Ownership (%)"),
            ui::header_cell("Income ($)"),
        ]);
        for (i, row) in form.owners.iter().enumerate() {
            table.add_row(vec![
                comfy_table::Cell::new(i + 1),
                comfy_table::Cell::new(&row.name),
                ui::format_optional_cell(row.ownership, |v| v.to_string()),
                ui::format_optional_cell(row.income, |v| v.to_string()),
            ]);
        }
        let wage_growth = form
            .wage_growth
            .map_or("N/A".to_string(), |w| format!("{w}%"));
        let badge = ui::ownership_badge(form.live_ownership_sum());
        let text = if form.owners.is_empty() {
            ui::style_text("No owners yet.", ui::StyleType::Subtle)
        } else {
            table.to_string()
        };
        self.console.say(format!(
            "{text}\nWage growth: {wage_growth}\n{badge} (total ownership must equal 100%)"
        ))
    }

    fn edit_owner(&mut self, index: usize) -> Result<()> {
        let Some(StepInput::Ownership(form)) = self.wizard.input_mut() else {
            return Ok(());
        };
        let Some(row) = form.owner_mut(index) else {
            return self.console.say("No such owner.");
        };
        let console = &mut self.console;
        console.edit_text("Owner name", &mut row.name)?;
        console.edit_number("Ownership (%)", &mut row.ownership)?;
        console.edit_number("Income ($)", &mut row.income)?;
        Ok(())
    }

    fn parse_row(argument: Option<&str>) -> Option<usize> {
        argument
            .and_then(|n| n.parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1))
    }

    /// Runs step 5. Returns false when the user quits.
    async fn ownership_step(&mut self) -> Result<bool> {
        self.header(Step::Ownership)?;
        self.edit_fields()?;
        loop {
            self.show_owners()?;
            let answer = self.console.ask(
                "[a]dd owner, [e]dit N, [r]emove N, [w]age growth, [s]ubmit, [b]ack, [q]uit: ",
            )?;
            let mut words = answer.split_whitespace();
            let command = words.next().unwrap_or_default().to_lowercase();
            let row = Self::parse_row(words.next());

            match command.as_str() {
                "a" => {
                    if let Some(index) = self.ownership_form().map(OwnershipIncome::add_owner) {
                        self.edit_owner(index)?;
                    }
                }
                "e" => match row {
                    Some(index) => self.edit_owner(index)?,
                    None => self.console.say("Usage: e <owner number>")?,
                },
                "r" => {
                    let removed = row.and_then(|index| {
                        self.ownership_form().and_then(|form| form.remove_owner(index))
                    });
                    if removed.is_none() {
                        self.console.say("Usage: r <owner number>")?;
                    }
                }
                "w" => self.edit_fields()?,
                "s" => {
                    if !self.wizard.can_advance() {
                        self.console.show_errors(&self.wizard.errors())?;
                        self.console
                            .say("Submit is disabled until the errors above are fixed.")?;
                        continue;
                    }
                    let spinner = ui::new_spinner("Submitting property...");
                    let result = self.wizard.submit(self.api).await;
                    spinner.finish_and_clear();
                    match result {
                        Ok(property) => {
                            info!(id = %property.id, "Property submitted");
                            return Ok(true);
                        }
                        Err(WizardError::Submission(e)) => {
                            debug!(error = ?e, "Submission failed");
                            self.console.say(ui::style_text(
                                &format!("Submission failed. Try again. ({e})"),
                                ui::StyleType::Error,
                            ))?;
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                "b" => {
                    self.wizard.back()?;
                    return Ok(true);
                }
                "q" => return Ok(false),
                _ => self.console.say("Unknown option.")?,
            }
        }
    }
}

pub fn load_draft<P: AsRef<Path>>(path: P) -> Result<PropertyDraft> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read draft file: {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let draft = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse draft file: {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse draft file: {}", path.display()))?
    };
    debug!("Loaded draft from {}", path.display());
    Ok(draft)
}

fn failing_fields(errors: &[ValidationError]) -> String {
    let fields: Vec<&str> = errors.iter().filter_map(ValidationError::field).collect();
    fields.join(", ")
}

/// Walks a prepared draft through every step and submits it.
pub async fn submit_draft(
    draft: PropertyDraft,
    api: &(dyn PropertyApi + Send + Sync),
) -> Result<Confirmation> {
    let mut wizard = WizardController::with_draft(draft);
    while let Phase::Editing(step) = wizard.phase() {
        if step == Step::Ownership {
            break;
        }
        wizard
            .next()
            .with_context(|| match wizard.errors().as_slice() {
                [] => format!("{step} is incomplete"),
                errors => format!("{step} is incomplete: check {}", failing_fields(errors)),
            })?;
    }

    let spinner = ui::new_spinner("Submitting property...");
    let result = wizard.submit(api).await;
    spinner.finish_and_clear();
    let property = result.context("Failed to submit property")?;
    info!(id = %property.id, "Property submitted");

    wizard
        .submission()
        .map(|submission| submission.confirmation())
        .context("Wizard did not record the submission")
}

pub async fn run(
    api: &(dyn PropertyApi + Send + Sync),
    currency: &str,
    draft_path: Option<&str>,
) -> Result<()> {
    match draft_path {
        Some(path) => {
            let draft = load_draft(path)?;
            let confirmation = submit_draft(draft, api).await?;
            println!("{}", render_confirmation(&confirmation, currency));
        }
        None => {
            let console = Console::new(StdinReader, std::io::stdout());
            let mut session = WizardSession::new(console, api, currency);
            let submitted = session.run().await?;
            info!("Wizard finished with {submitted} properties submitted");
        }
    }
    Ok(())
}
