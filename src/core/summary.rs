//! Derived figures shown once a property has been submitted.

use crate::core::property::{NewProperty, PropertyType};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SummaryError {
    #[error("ROI is undefined when deposit, council rates and insurance total {denominator}")]
    UndefinedRoi { denominator: f64 },
}

/// Annual rent after vacancy as a percentage of the up-front outlay.
pub fn roi(property: &NewProperty) -> Result<f64, SummaryError> {
    let denominator = property.deposit + property.council_rates + property.insurance;
    if denominator == 0.0 {
        return Err(SummaryError::UndefinedRoi { denominator });
    }
    let annual_rent = property.rent * 12.0 * (1.0 - property.vacancy_rate / 100.0);
    Ok(annual_rent / denominator * 100.0)
}

/// Monthly rent less a twelfth of the annual expenses.
pub fn monthly_cash_flow(property: &NewProperty) -> f64 {
    let annual_expenses = property.council_rates
        + property.insurance
        + property.maintenance
        + property.property_manager;
    property.rent - annual_expenses / 12.0
}

fn currency_symbol(currency: &str) -> String {
    match currency.to_uppercase().as_str() {
        "AUD" | "USD" | "NZD" | "CAD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "INR" => "₹".to_string(),
        other => format!("{other} "),
    }
}

/// Formats a whole-unit currency amount, e.g. `-$1,235` for `-1234.5` AUD.
pub fn format_currency(value: f64, currency: &str) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    // f64::round rounds halves away from zero.
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{}{grouped}", currency_symbol(currency))
}

/// Formats a percentage without float noise or trailing zeros, e.g. `0.3` for `0.1 + 0.2`.
pub fn format_percent(value: f64) -> String {
    let fixed = format!("{value:.10}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// What the confirmation view shows for a submitted property.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub title: String,
    pub location: String,
    pub property_type: PropertyType,
    pub roi: Result<f64, SummaryError>,
    pub monthly_cash_flow: f64,
    pub loan_term: u32,
}

impl Confirmation {
    pub fn from_request(property: &NewProperty) -> Self {
        Self {
            title: property.title.clone(),
            location: property.location.clone(),
            property_type: property.property_type,
            roi: roi(property),
            monthly_cash_flow: monthly_cash_flow(property),
            loan_term: property.loan_term,
        }
    }

    pub fn roi_display(&self) -> String {
        match &self.roi {
            Ok(value) => format!("{value:.2}%"),
            Err(_) => "N/A".to_string(),
        }
    }

    pub fn cash_flow_display(&self, currency: &str) -> String {
        format!("{}/mo", format_currency(self.monthly_cash_flow, currency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::property::Owner;

    fn sample() -> NewProperty {
        NewProperty {
            title: "Beach House".to_string(),
            location: "Byron Bay".to_string(),
            property_type: PropertyType::House,
            purchase_price: 800000.0,
            deposit: 160000.0,
            loan_amount: 640000.0,
            interest_rate: 6.2,
            loan_term: 30,
            rent: 3000.0,
            vacancy_rate: 5.0,
            council_rates: 2000.0,
            insurance: 1500.0,
            maintenance: 1200.0,
            property_manager: 2400.0,
            owners: vec![Owner {
                name: "A".to_string(),
                ownership: 100.0,
                income: 90000.0,
            }],
            wage_growth: 3.0,
        }
    }

    #[test]
    fn test_roi() {
        let property = sample();
        let value = roi(&property).unwrap();
        // 3000 * 12 * 0.95 / 163500 * 100
        assert!((value - 20.917431).abs() < 1e-6);
        assert_eq!(Confirmation::from_request(&property).roi_display(), "20.92%");
    }

    #[test]
    fn test_roi_undefined_for_zero_outlay() {
        let mut property = sample();
        property.deposit = 0.0;
        property.council_rates = 0.0;
        property.insurance = 0.0;
        assert_eq!(
            roi(&property),
            Err(SummaryError::UndefinedRoi { denominator: 0.0 })
        );
        assert_eq!(Confirmation::from_request(&property).roi_display(), "N/A");
    }

    #[test]
    fn test_monthly_cash_flow() {
        let property = sample();
        let value = monthly_cash_flow(&property);
        assert!((value - 2408.333333).abs() < 1e-6);
        assert_eq!(
            Confirmation::from_request(&property).cash_flow_display("AUD"),
            "$2,408/mo"
        );
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0, "AUD"), "$0");
        assert_eq!(format_currency(999.4, "AUD"), "$999");
        assert_eq!(format_currency(1234.5, "AUD"), "$1,235");
        assert_eq!(format_currency(-1234.5, "AUD"), "-$1,235");
        assert_eq!(format_currency(1234567.0, "usd"), "$1,234,567");
        assert_eq!(format_currency(-0.4, "AUD"), "$0");
        assert_eq!(format_currency(100000.0, "EUR"), "€100,000");
        assert_eq!(format_currency(12.0, "JPY"), "JPY 12");
        assert_eq!(format_currency(f64::NAN, "AUD"), "N/A");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.1 + 0.2), "0.3");
        assert_eq!(format_percent(100.0), "100");
        assert_eq!(format_percent(99.5), "99.5");
        assert_eq!(format_percent(99.999999), "99.999999");
        assert_eq!(format_percent(0.0), "0");
        assert_eq!(format_percent(-0.0), "0");
    }
}
