//! Filtering and aggregation over a fetched property list.
use crate::core::property::{Property, PropertyType};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::collections::{HashMap, HashSet};

/// How many properties the "recent" list shows.
pub const RECENT_LIMIT: usize = 5;

/// Dashboard filter. Absent criteria match everything; date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFilter {
    pub property_type: Option<PropertyType>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl PropertyFilter {
    /// Builds a filter from calendar dates, each taken as midnight UTC.
    pub fn from_dates(
        property_type: Option<PropertyType>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Self {
        let midnight = |date: NaiveDate| date.and_time(NaiveTime::MIN).and_utc();
        Self {
            property_type,
            start: start.map(midnight),
            end: end.map(midnight),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.property_type.is_none() && self.start.is_none() && self.end.is_none()
    }

    pub fn matches(&self, property: &Property) -> bool {
        let type_matches = self
            .property_type
            .is_none_or(|t| property.property_type == t.as_str());
        let after_start = self.start.is_none_or(|start| property.created_at >= start);
        let before_end = self.end.is_none_or(|end| property.created_at <= end);
        type_matches && after_start && before_end
    }

    pub fn apply(&self, properties: &[Property]) -> Vec<Property> {
        properties
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect()
    }
}

/// Mean purchase price, 0 for an empty list.
pub fn average_price(properties: &[Property]) -> f64 {
    if properties.is_empty() {
        return 0.0;
    }
    properties.iter().map(|p| p.purchase_price).sum::<f64>() / properties.len() as f64
}

/// Counts occurrences of each key, ordered by first appearance.
fn count_in_order<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for key in keys {
        match index.get(key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key, counts.len());
                counts.push((key.to_string(), 1));
            }
        }
    }
    counts
}

pub fn type_breakdown(properties: &[Property]) -> Vec<(String, usize)> {
    count_in_order(properties.iter().map(|p| p.property_type.as_str()))
}

pub fn price_series(properties: &[Property]) -> Vec<(String, f64)> {
    properties
        .iter()
        .map(|p| (p.title.clone(), p.purchase_price))
        .collect()
}

/// Newest first; properties created at the same instant keep their list order.
pub fn most_recent(properties: &[Property], limit: usize) -> Vec<Property> {
    let mut sorted = properties.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(limit);
    sorted
}

/// Number of properties each named owner appears on.
pub fn owner_contribution_counts(properties: &[Property]) -> Vec<(String, usize)> {
    let names = properties.iter().flat_map(|p| {
        let mut seen = HashSet::new();
        p.owners
            .iter()
            .filter_map(|owner| owner.name.as_deref())
            .filter(|name| !name.is_empty())
            .filter(move |name| seen.insert(*name))
    });
    count_in_order(names)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardMetrics {
    pub count: usize,
    pub average_price: f64,
    pub type_breakdown: Vec<(String, usize)>,
    pub price_series: Vec<(String, f64)>,
    pub recent: Vec<Property>,
    pub owner_contributions: Vec<(String, usize)>,
}

impl DashboardMetrics {
    pub fn from_properties(properties: &[Property]) -> Self {
        Self {
            count: properties.len(),
            average_price: average_price(properties),
            type_breakdown: type_breakdown(properties),
            price_series: price_series(properties),
            recent: most_recent(properties, RECENT_LIMIT),
            owner_contributions: owner_contribution_counts(properties),
        }
    }
}
