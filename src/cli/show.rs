use super::ui;
use crate::core::api::PropertyApi;
use crate::core::property::Property;
use crate::core::summary::format_currency;
use anyhow::{Context, Result};
use comfy_table::Cell;

impl Property {
    pub fn display_as_table(&self, currency: &str) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Field"), ui::header_cell("Value")]);
        table.add_row(vec![ui::label_cell("ID"), Cell::new(&self.id)]);
        table.add_row(vec![ui::label_cell("Title"), Cell::new(&self.title)]);
        table.add_row(vec![
            ui::label_cell("Location"),
            Cell::new(self.location.as_deref().unwrap_or("N/A")),
        ]);
        table.add_row(vec![ui::label_cell("Type"), Cell::new(&self.property_type)]);
        table.add_row(vec![
            ui::label_cell("Purchase price"),
            ui::right_cell(format_currency(self.purchase_price, currency)),
        ]);
        table.add_row(vec![
            ui::label_cell("Added"),
            Cell::new(self.created_at.format("%Y-%m-%d %H:%M UTC")),
        ]);

        let mut output = format!(
            "Property: {}\n\n{}",
            ui::style_text(&self.title, ui::StyleType::Title),
            table
        );

        if !self.owners.is_empty() {
            let mut owners = ui::new_styled_table();
            owners.set_header(vec![
                ui::header_cell("Owner"),
                ui::header_cell("Ownership (%)"),
            ]);
            for owner in &self.owners {
                owners.add_row(vec![
                    Cell::new(owner.name.as_deref().unwrap_or("N/A")),
                    ui::format_optional_cell(owner.ownership, |o| format!("{o}%")),
                ]);
            }
            output.push_str(&format!("\n\n{owners}"));
        }

        output
    }
}

pub async fn run(api: &(dyn PropertyApi + Send + Sync), id: &str, currency: &str) -> Result<()> {
    let spinner = ui::new_spinner("Fetching property...");
    let fetched = api.get_property(id).await;
    spinner.finish_and_clear();
    let property = fetched.with_context(|| format!("Failed to load property {id}"))?;
    println!("{}", property.display_as_table(currency));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::property::{PropertyOwner, parse_timestamp};

    #[test]
    fn test_display_as_table() {
        let property = Property {
            id: "65a1".to_string(),
            title: "Cottage".to_string(),
            location: None,
            property_type: "House".to_string(),
            purchase_price: 450000.0,
            created_at: parse_timestamp("Tue, 02 Jan 2024 03:04:05 GMT").unwrap(),
            owners: vec![PropertyOwner {
                name: Some("Ana".to_string()),
                ownership: None,
            }],
        };
        let text = console::strip_ansi_codes(&property.display_as_table("AUD")).to_string();
        assert!(text.contains("Property: Cottage"));
        assert!(text.contains("$450,000"));
        assert!(text.contains("2024-01-02 03:04 UTC"));
        assert!(text.contains("Ana"));
        assert!(text.contains("N/A"));
    }
}
