//! Raw filter input and its translation into the typed [`FilterRequest`] payload.
//!
//! Attribute names the client does not recognise are dropped during
//! translation so newer server-advertised filters never break a request.

use std::{collections::BTreeMap, str::FromStr};

use shared::{error::ValidationError, protocol::FilterRequest};
use tracing::debug;

pub const BUILDING: &str = "building";
pub const ROOM_TYPE: &str = "room_type";
pub const BEDS: &str = "beds";
pub const GRADE: &str = "grade";
pub const PRIVATE_POOL: &str = "private_pool";
pub const CURRENCY: &str = "currency";

/// Attribute name to user-entered tokens. An attribute never maps to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    values: BTreeMap<String, Vec<String>>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Comma-separated input as typed into a filter box.
    pub fn set_input(&mut self, attribute: &str, raw: &str) {
        self.set_values(attribute, raw.split(','));
    }

    pub fn set_values<I, S>(&mut self, attribute: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = values
            .into_iter()
            .map(Into::into)
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .collect();

        if tokens.is_empty() {
            self.remove(attribute);
        } else {
            self.values.insert(attribute.to_string(), tokens);
        }
    }

    pub fn remove(&mut self, attribute: &str) {
        self.values.remove(attribute);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn get(&self, attribute: &str) -> Option<&[String]> {
        self.values.get(attribute).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Total number of tokens across all attributes.
    pub fn active_count(&self) -> usize {
        self.values.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values
            .iter()
            .map(|(attribute, values)| (attribute.as_str(), values.as_slice()))
    }
}

impl<A, I, S> FromIterator<(A, I)> for FilterSelection
where
    A: AsRef<str>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (A, I)>>(iter: T) -> Self {
        let mut selection = FilterSelection::new();
        for (attribute, values) in iter {
            selection.set_values(attribute.as_ref(), values);
        }
        selection
    }
}

/// Fails on the first non-integer token of a numeric attribute; nothing partial is returned.
pub fn translate(selection: &FilterSelection) -> Result<FilterRequest, ValidationError> {
    let mut request = FilterRequest::default();

    for (attribute, values) in selection.iter() {
        match attribute {
            BUILDING => request.buildings = Some(values.to_vec()),
            ROOM_TYPE => request.room_types = Some(values.to_vec()),
            BEDS => request.beds = Some(parse_integers(attribute, values)?),
            GRADE => request.grades = Some(parse_integers(attribute, values)?),
            PRIVATE_POOL => request.private_pool = Some(values.to_vec()),
            CURRENCY => request.currency = Some(values.to_vec()),
            other => debug!(attribute = other, "dropping unrecognised filter attribute"),
        }
    }

    Ok(request)
}

fn parse_integers<T: FromStr>(attribute: &str, values: &[String]) -> Result<Vec<T>, ValidationError> {
    values
        .iter()
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| ValidationError::invalid_integer(attribute, value.as_str()))
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/filters_tests.rs"]
mod tests;
