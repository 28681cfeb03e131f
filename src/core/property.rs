//! Property records: the editable draft, the typed create request and the
//! representation returned by the backend.

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    House,
    Townhouse,
    Apartment,
}

impl PropertyType {
    pub const ALL: [PropertyType; 3] = [
        PropertyType::House,
        PropertyType::Townhouse,
        PropertyType::Apartment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "House",
            PropertyType::Townhouse => "Townhouse",
            PropertyType::Apartment => "Apartment",
        }
    }
}

impl Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                anyhow!(
                    "Invalid property type: {}. Expected one of House, Townhouse, Apartment",
                    s
                )
            })
    }
}

/// One editable row of the ownership breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OwnerRow {
    pub name: String,
    pub ownership: Option<f64>,
    pub income: Option<f64>,
}

impl OwnerRow {
    pub fn new(name: &str, ownership: f64, income: f64) -> Self {
        Self {
            name: name.to_string(),
            ownership: Some(ownership),
            income: Some(income),
        }
    }
}

/// The in-progress property assembled across the wizard steps.
///
/// Every scalar is optional because it mirrors a form field that may not have
/// been filled in yet. Field names match the create-property request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropertyDraft {
    pub title: String,
    pub location: String,
    #[serde(rename = "type")]
    pub property_type: Option<PropertyType>,
    pub purchase_price: Option<f64>,
    pub deposit: Option<f64>,
    pub loan_amount: Option<f64>,
    pub interest_rate: Option<f64>,
    #[serde(deserialize_with = "optional_whole_number")]
    pub loan_term: Option<u32>,
    pub rent: Option<f64>,
    pub vacancy_rate: Option<f64>,
    pub council_rates: Option<f64>,
    pub insurance: Option<f64>,
    pub maintenance: Option<f64>,
    pub property_manager: Option<f64>,
    pub owners: Vec<OwnerRow>,
    pub wage_growth: Option<f64>,
}

/// An owner as sent to the backend. Only complete rows make it this far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Owner {
    pub name: String,
    pub ownership: f64,
    pub income: f64,
}

/// Body of the create-property request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewProperty {
    pub title: String,
    pub location: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub purchase_price: f64,
    pub deposit: f64,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub loan_term: u32,
    pub rent: f64,
    pub vacancy_rate: f64,
    pub council_rates: f64,
    pub insurance: f64,
    pub maintenance: f64,
    pub property_manager: f64,
    pub owners: Vec<Owner>,
    pub wage_growth: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyOwner {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_number")]
    pub ownership: Option<f64>,
}

/// A stored property as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    // Kept as stored: the backend does not constrain the value.
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub property_type: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub purchase_price: f64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub owners: Vec<PropertyOwner>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Older records hold form values as strings, e.g. `"purchase_price": "500000"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn lenient_optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(value)) => Ok(Some(value)),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected a number, got \"{text}\""))),
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_optional_number(deserializer)?.unwrap_or_default())
}

/// Converts a year count entered as a number, rejecting fractions and negatives.
pub fn whole_years(value: f64) -> Option<u32> {
    let in_range = value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value);
    in_range.then_some(value as u32)
}

/// Accepts `30` as well as `30.0` for integer draft fields.
fn optional_whole_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<f64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(value) => whole_years(value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a whole number, got {value}"))),
    }
}

/// Parses the timestamp formats the backend is known to emit.
pub fn parse_timestamp(value: &str) -> anyhow::Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    // Flask serializes datetimes as HTTP dates, e.g. "Mon, 01 Jan 2024 00:00:00 GMT".
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| anyhow!("Unrecognized timestamp: {}", value))
}

mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(D::Error::custom)
    }
}
