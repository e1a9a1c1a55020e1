//! Filter parsing
//!
//! Decodes the grid's JSON filter list into validated [`FilterRule`]s.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::error::FilterError;
use super::types::{ColumnType, FilterRule, FilterValue, Operator};

/// Maximum size of filter JSON in bytes (64KB)
pub const DEFAULT_MAX_FILTER_JSON_BYTES: usize = 64 * 1024;

/// Maximum number of filters allowed
pub const DEFAULT_MAX_FILTERS: usize = 50;

/// Bounds applied while decoding a filter list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterLimits {
    pub max_json_bytes: usize,
    pub max_filters: usize,
}

impl Default for FilterLimits {
    fn default() -> Self {
        Self {
            max_json_bytes: DEFAULT_MAX_FILTER_JSON_BYTES,
            max_filters: DEFAULT_MAX_FILTERS,
        }
    }
}

/// One filter as the client sends it, before validation
///
/// Accepts either the field form
/// `{"column": "c", "type": "date", "operator": ">", "value": ..., "valueTo": ...}`
/// or Perspective's tuple form `{"type": "date", "filter": ["c", ">", ...]}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "DescriptorRepr")]
pub struct FilterDescriptor {
    pub column: String,
    pub column_type: String,
    pub operator: String,
    pub value: JsonValue,
    pub value_to: JsonValue,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DescriptorRepr {
    Tuple {
        #[serde(rename = "type", alias = "filterType", alias = "columnType")]
        column_type: String,
        filter: Vec<JsonValue>,
    },
    Fields {
        #[serde(alias = "colId", alias = "col", alias = "field")]
        column: String,
        #[serde(rename = "type", alias = "filterType", alias = "columnType")]
        column_type: String,
        #[serde(alias = "op")]
        operator: String,
        #[serde(default)]
        value: JsonValue,
        #[serde(default, rename = "valueTo", alias = "value_to", alias = "filterTo")]
        value_to: JsonValue,
    },
}

impl TryFrom<DescriptorRepr> for FilterDescriptor {
    type Error = String;

    fn try_from(repr: DescriptorRepr) -> Result<Self, Self::Error> {
        match repr {
            DescriptorRepr::Fields {
                column,
                column_type,
                operator,
                value,
                value_to,
            } => Ok(Self {
                column,
                column_type,
                operator,
                value,
                value_to,
            }),
            DescriptorRepr::Tuple {
                column_type,
                filter,
            } => {
                let mut parts = filter.into_iter();
                let (Some(JsonValue::String(column)), Some(JsonValue::String(operator))) =
                    (parts.next(), parts.next())
                else {
                    return Err("filter tuple must start with column and operator strings".into());
                };
                let value = parts.next().unwrap_or(JsonValue::Null);
                if parts.next().is_some() {
                    return Err("filter tuple has more than three elements".into());
                }
                Ok(Self {
                    column,
                    column_type,
                    operator,
                    value,
                    value_to: JsonValue::Null,
                })
            }
        }
    }
}

impl FilterRule {
    /// Validate a decoded descriptor
    ///
    /// Checks the column type, then the column name, then encodes the values.
    /// The operator text never fails to parse.
    pub fn from_descriptor(descriptor: FilterDescriptor) -> Result<Self, FilterError> {
        let column_type = ColumnType::parse(&descriptor.column_type)?;
        let operator = Operator::parse(&descriptor.operator);

        let scalar = |value: &JsonValue| {
            FilterValue::from_json(value)
                .map_err(|reason| FilterError::invalid_value(&descriptor.column, column_type, reason))
        };
        let value = scalar(&descriptor.value)?;
        let value_to = scalar(&descriptor.value_to)?;

        FilterRule::new(descriptor.column, column_type, operator, value, value_to)
    }
}

/// Parse filters from JSON query param
///
/// Validates JSON size, decodes the descriptor list, then validates each rule.
/// An empty string is treated as an empty list.
pub fn parse_filters(json_str: &str, limits: &FilterLimits) -> Result<Vec<FilterRule>, FilterError> {
    if json_str.len() > limits.max_json_bytes {
        return Err(FilterError::FilterJsonTooLarge {
            max: limits.max_json_bytes,
        });
    }
    if json_str.trim().is_empty() {
        return Ok(Vec::new());
    }

    let descriptors: Vec<FilterDescriptor> =
        serde_json::from_str(json_str).map_err(|e| FilterError::InvalidJson(e.to_string()))?;

    if descriptors.len() > limits.max_filters {
        return Err(FilterError::TooManyFilters {
            max: limits.max_filters,
        });
    }

    descriptors
        .into_iter()
        .map(FilterRule::from_descriptor)
        .collect()
}
