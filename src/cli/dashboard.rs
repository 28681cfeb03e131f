use super::ui;
use crate::core::api::PropertyApi;
use crate::core::dashboard::{DashboardMetrics, PropertyFilter};
use crate::core::summary::format_currency;
use anyhow::{Context, Result};
use comfy_table::Cell;
use tracing::debug;

const BAR_WIDTH: usize = 30;

fn describe_filter(filter: &PropertyFilter) -> String {
    if filter.is_empty() {
        return "all properties".to_string();
    }
    let mut parts = Vec::new();
    if let Some(property_type) = filter.property_type {
        parts.push(format!("type {property_type}"));
    }
    if let Some(start) = filter.start {
        parts.push(format!("from {}", start.format("%Y-%m-%d")));
    }
    if let Some(end) = filter.end {
        parts.push(format!("to {}", end.format("%Y-%m-%d")));
    }
    parts.join(", ")
}

impl DashboardMetrics {
    pub fn display_as_report(&self, currency: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}: {}\n{}: {}\n",
            ui::style_text("Properties", ui::StyleType::TotalLabel),
            ui::style_text(&self.count.to_string(), ui::StyleType::TotalValue),
            ui::style_text("Average purchase price", ui::StyleType::TotalLabel),
            ui::style_text(
                &format_currency(self.average_price, currency),
                ui::StyleType::TotalValue
            ),
        ));

        let mut types = ui::new_styled_table();
        types.set_header(vec![
            ui::header_cell("Type"),
            ui::header_cell("Count"),
            ui::header_cell("Share (%)"),
        ]);
        for (property_type, count) in &self.type_breakdown {
            let share = *count as f64 / self.count as f64 * 100.0;
            types.add_row(vec![
                Cell::new(property_type),
                ui::right_cell(count),
                ui::right_cell(format!("{share:.1}%")),
            ]);
        }
        output.push_str(&format!(
            "\n{}\n{}\n",
            ui::style_text("Property types", ui::StyleType::Title),
            types
        ));

        let max_price = self
            .price_series
            .iter()
            .map(|(_, price)| *price)
            .fold(0.0, f64::max);
        let mut prices = ui::new_styled_table();
        prices.set_header(vec![
            ui::header_cell("Property"),
            ui::header_cell(&format!("Purchase price ({currency})")),
            ui::header_cell(""),
        ]);
        for (title, price) in &self.price_series {
            prices.add_row(vec![
                Cell::new(title),
                ui::right_cell(format_currency(*price, currency)),
                Cell::new(ui::bar(*price, max_price, BAR_WIDTH)),
            ]);
        }
        output.push_str(&format!(
            "\n{}\n{}\n",
            ui::style_text("Purchase prices", ui::StyleType::Title),
            prices
        ));

        let mut recent = ui::new_styled_table();
        recent.set_header(vec![
            ui::header_cell("Title"),
            ui::header_cell("Type"),
            ui::header_cell("Added"),
        ]);
        for property in &self.recent {
            recent.add_row(vec![
                Cell::new(&property.title),
                Cell::new(&property.property_type),
                Cell::new(property.created_at.format("%Y-%m-%d")),
            ]);
        }
        output.push_str(&format!(
            "\n{}\n{}\n",
            ui::style_text("Recent properties", ui::StyleType::Title),
            recent
        ));

        output.push_str(&format!(
            "\n{}\n",
            ui::style_text("Owner analytics", ui::StyleType::Title)
        ));
        if self.owner_contributions.is_empty() {
            output.push_str(&ui::style_text(
                "No owner data recorded for these properties.",
                ui::StyleType::Subtle,
            ));
        } else {
            let mut owners = ui::new_styled_table();
            owners.set_header(vec![ui::header_cell("Owner"), ui::header_cell("Properties")]);
            for (name, count) in &self.owner_contributions {
                owners.add_row(vec![Cell::new(name), ui::right_cell(count)]);
            }
            output.push_str(&owners.to_string());
        }

        output
    }
}

/// Fetches every property, applies `filter` locally and renders the dashboard.
pub async fn build_report(
    api: &(dyn PropertyApi + Send + Sync),
    filter: &PropertyFilter,
    currency: &str,
) -> Result<String> {
    let spinner = ui::new_spinner("Fetching properties...");
    let fetched = api.list_properties().await;
    spinner.finish_and_clear();
    let properties = fetched.context("Failed to load properties for the dashboard")?;

    let filtered = filter.apply(&properties);
    debug!(
        fetched = properties.len(),
        shown = filtered.len(),
        "Applied dashboard filter"
    );

    let heading = format!(
        "{} ({})",
        ui::style_text("Property Dashboard", ui::StyleType::Title),
        describe_filter(filter)
    );
    if filtered.is_empty() {
        return Ok(format!(
            "{heading}\n\n{}",
            ui::style_text(
                "No properties match the selected filters.",
                ui::StyleType::Subtle
            )
        ));
    }

    let metrics = DashboardMetrics::from_properties(&filtered);
    Ok(format!(
        "{heading}\n\n{}",
        metrics.display_as_report(currency)
    ))
}

pub async fn run(
    api: &(dyn PropertyApi + Send + Sync),
    filter: &PropertyFilter,
    currency: &str,
) -> Result<()> {
    let report = build_report(api, filter, currency).await?;
    println!("{report}");
    Ok(())
}
