//! Converts the service's result payloads into a [`ResultSet`].
//!
//! The results endpoint has answered with two shapes over time: a plain list
//! of URLs, and a mapping from URL to a metadata record. This module is the
//! only place that knows about either.

use scrape_logging::scrape_debug;
use serde_json::{Map, Value};

use crate::results::{PageRecord, ResultSet, UNKNOWN_STATUS};

/// Raw result collection exactly as the service returned it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResults {
    /// No collection in the response, or an explicit `null`.
    Missing,
    /// Ordered list of bare URLs.
    Urls(Vec<Value>),
    /// Mapping from URL to a partial record.
    Records(Map<String, Value>),
    /// Anything else; normalization rejects it.
    Other(Value),
}

impl RawResults {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => RawResults::Missing,
            Value::Array(items) => RawResults::Urls(items),
            Value::Object(map) => RawResults::Records(map),
            other => RawResults::Other(other),
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            RawResults::Missing => "missing",
            RawResults::Urls(_) => "url list",
            RawResults::Records(_) => "record mapping",
            RawResults::Other(value) => json_type_name(value),
        }
    }
}

impl From<Value> for RawResults {
    fn from(value: Value) -> Self {
        RawResults::from_value(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized results payload: expected a url list or a url mapping, got {found}")]
pub struct NormalizationError {
    pub found: &'static str,
}

/// Normalizes a raw payload into the canonical mapping.
///
/// Bad entries are dropped one at a time; only a top-level payload of the
/// wrong type is an error. Duplicate URLs in a list keep their first
/// position and the last-seen record.
pub fn normalize(raw: &RawResults) -> Result<ResultSet, NormalizationError> {
    let mut results = ResultSet::new();
    let mut dropped = 0usize;

    match raw {
        RawResults::Missing => {}
        RawResults::Urls(items) => {
            for item in items {
                match item.as_str().map(str::trim) {
                    Some(url) if !url.is_empty() => {
                        results.insert(PageRecord::bare(url));
                    }
                    _ => dropped += 1,
                }
            }
        }
        RawResults::Records(map) => {
            for (url, entry) in map {
                match record_from_entry(url, entry) {
                    Some(record) => {
                        results.insert(record);
                    }
                    None => dropped += 1,
                }
            }
        }
        RawResults::Other(value) => {
            return Err(NormalizationError {
                found: json_type_name(value),
            })
        }
    }

    scrape_debug!(
        "normalized {} payload: kept={} dropped={}",
        raw.shape(),
        results.len(),
        dropped
    );
    Ok(results)
}

fn record_from_entry(url: &str, entry: &Value) -> Option<PageRecord> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    let fields = entry.as_object()?;

    Some(PageRecord {
        url: url.to_string(),
        status: status_field(fields.get("status")),
        meta_title: string_field(fields.get("meta_title")),
        meta_description: string_field(fields.get("meta_description")),
        heading_count: count_field(fields.get("heading_count"))?,
        internal_link_count: count_field(fields.get("internal_link_count"))?,
        internal_links: links_field(fields.get("internal_links")),
    })
}

fn status_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(status)) if !status.trim().is_empty() => status.clone(),
        Some(Value::Number(code)) => code.to_string(),
        _ => UNKNOWN_STATUS.to_string(),
    }
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(ToOwned::to_owned)
}

/// `Some(None)` for an absent count, `None` when the count is malformed.
fn count_field(value: Option<&Value>) -> Option<Option<u64>> {
    match value {
        None | Some(Value::Null) => Some(None),
        Some(value) => value.as_u64().map(Some),
    }
}

fn links_field(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(ToOwned::to_owned)
            .collect(),
    )
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
