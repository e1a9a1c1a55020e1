//! Filter type definitions
//!
//! Defines the column types, operators and values a grid filter is made of,
//! and the validated [`FilterRule`] the compiler consumes. Construction is the
//! only fallible step: once a rule exists it can always be compiled.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::error::FilterError;
use crate::utils::time::{format_date, millis_to_date, parse_calendar_date, parse_datetime_millis};

/// Maximum length of a table or column name
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// DuckDB string predicates accepted verbatim as operator text:
/// LIKE, NOT LIKE, ILIKE, NOT ILIKE, GLOB and starts-with.
///
/// Every entry is a binary `VARCHAR op VARCHAR` predicate, so the generic
/// template is valid SQL for any column once it is cast to text.
const FALLBACK_OPERATORS: [&str; 6] = ["~~", "!~~", "~~*", "!~~*", "~~~", "^@"];

/// Check a table or column name against `^[A-Za-z_][A-Za-z0-9_]*$`
pub fn is_valid_identifier(name: &str) -> bool {
    static RE_IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    let re = RE_IDENTIFIER
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid regex"));
    name.len() <= MAX_IDENTIFIER_LENGTH && re.is_match(name)
}

// =============================================================================
// Column Type
// =============================================================================

/// Declared semantic type of the filtered column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Boolean,
    Date,
    Datetime,
    Float,
    Integer,
    String,
}

impl ColumnType {
    pub const ALL: [ColumnType; 6] = [
        ColumnType::Boolean,
        ColumnType::Date,
        ColumnType::Datetime,
        ColumnType::Float,
        ColumnType::Integer,
        ColumnType::String,
    ];

    /// Parse a declared type name (case-insensitive)
    ///
    /// Accepts the grid's own names plus `number`/`text`/`timestamp` spellings.
    pub fn parse(s: &str) -> Result<Self, FilterError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Ok(Self::Boolean),
            "date" => Ok(Self::Date),
            "datetime" | "timestamp" => Ok(Self::Datetime),
            "float" | "number" => Ok(Self::Float),
            "integer" | "int" => Ok(Self::Integer),
            "string" | "text" => Ok(Self::String),
            _ => Err(FilterError::InvalidFilterKind(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Float => "float",
            Self::Integer => "integer",
            Self::String => "string",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Operator
// =============================================================================

/// How many bind values an operator consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// `IS NULL` / `IS NOT NULL`: no value
    NullCheck,
    Binary,
    /// `BETWEEN`: two values
    Range,
}

/// Filter operator
///
/// Parsed case-insensitively from the grid's operator text. Perspective
/// (`==`, `begins with`, `is null`) and AG Grid (`equals`, `inRange`,
/// `notBlank`) spellings map onto the same variants; anything else is kept
/// as [`Operator::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Between,
    Contains,
    NotContains,
    BeginsWith,
    EndsWith,
    IsNull,
    IsNotNull,
    In,
    NotIn,
    /// Unrecognized operator text, trimmed
    Other(String),
}

impl Operator {
    /// Parse operator text. Never fails.
    pub fn parse(raw: &str) -> Self {
        let key: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "==" | "=" | "eq" | "equals" => Self::Equals,
            "!=" | "<>" | "ne" | "notequal" | "notequals" => Self::NotEqual,
            ">" | "gt" | "greaterthan" => Self::GreaterThan,
            ">=" | "gte" | "greaterthanorequal" => Self::GreaterThanOrEqual,
            "<" | "lt" | "lessthan" => Self::LessThan,
            "<=" | "lte" | "lessthanorequal" => Self::LessThanOrEqual,
            "between" | "inrange" => Self::Between,
            "contains" => Self::Contains,
            "notcontains" | "doesnotcontain" => Self::NotContains,
            "beginswith" | "startswith" => Self::BeginsWith,
            "endswith" => Self::EndsWith,
            "isnull" | "blank" => Self::IsNull,
            "isnotnull" | "notblank" => Self::IsNotNull,
            "in" => Self::In,
            "notin" => Self::NotIn,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Self::IsNull | Self::IsNotNull => Arity::NullCheck,
            Self::Between => Arity::Range,
            _ => Arity::Binary,
        }
    }

    /// Text-matching operators compare against the column's string form, so
    /// their operand is bound as text rather than encoded for the column type.
    /// Unrecognized operators are treated the same way.
    pub fn is_text_match(&self) -> bool {
        matches!(
            self,
            Self::Contains | Self::NotContains | Self::BeginsWith | Self::EndsWith | Self::Other(_)
        )
    }

    /// Operator token of an unrecognized operator, when it is one of the
    /// known DuckDB string predicates. Anything else is never spliced into SQL.
    pub fn fallback_symbol(&self) -> Option<&str> {
        match self {
            Self::Other(raw) => FALLBACK_OPERATORS.iter().copied().find(|op| *op == raw.as_str()),
            _ => None,
        }
    }
}

// =============================================================================
// Filter Value
// =============================================================================

/// Scalar bind value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FilterValue {
    /// Convert a decoded JSON value. `Ok(None)` means JSON `null`.
    pub fn from_json(value: &JsonValue) -> Result<Option<Self>, &'static str> {
        match value {
            JsonValue::Null => Ok(None),
            JsonValue::Bool(b) => Ok(Some(Self::Bool(*b))),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Ok(Some(Self::Integer(i))),
                None => n
                    .as_f64()
                    .map(|f| Some(Self::Float(f)))
                    .ok_or("number is out of range"),
            },
            JsonValue::String(s) => Ok(Some(Self::Text(s.clone()))),
            JsonValue::Array(_) | JsonValue::Object(_) => {
                Err("expected a string, number, boolean or null")
            }
        }
    }

    /// Text form of the value, as bound to string predicates
    fn into_text(self) -> Self {
        match self {
            Self::Bool(b) => Self::Text(b.to_string()),
            Self::Integer(i) => Self::Text(i.to_string()),
            Self::Float(f) => Self::Text(f.to_string()),
            text @ Self::Text(_) => text,
        }
    }

    /// Integral value of a number, if it has one
    fn as_integral(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Float(f)
                if f.is_finite()
                    && f.fract() == 0.0
                    && *f >= i64::MIN as f64
                    && *f < i64::MAX as f64 =>
            {
                Some(*f as i64)
            }
            _ => None,
        }
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Encode a value into the canonical form for its column type.
///
/// - date: `YYYY-MM-DD` text (numbers are epoch milliseconds)
/// - datetime: epoch milliseconds (strings are ISO 8601)
/// - everything else passes through; the engine coerces
fn encode_for_column(
    column: &str,
    column_type: ColumnType,
    value: FilterValue,
) -> Result<FilterValue, FilterError> {
    match column_type {
        ColumnType::Date => {
            let date = match &value {
                FilterValue::Text(s) => parse_calendar_date(s),
                FilterValue::Integer(_) | FilterValue::Float(_) => {
                    value.as_integral().and_then(millis_to_date)
                }
                FilterValue::Bool(_) => None,
            };
            date.map(|d| FilterValue::Text(format_date(d))).ok_or_else(|| {
                FilterError::invalid_value(
                    column,
                    column_type,
                    "expected an ISO date (YYYY-MM-DD) or epoch milliseconds",
                )
            })
        }
        ColumnType::Datetime => {
            let millis = match &value {
                FilterValue::Text(s) => parse_datetime_millis(s),
                FilterValue::Integer(_) | FilterValue::Float(_) => value
                    .as_integral()
                    .filter(|ms| crate::utils::time::millis_to_datetime(*ms).is_some()),
                FilterValue::Bool(_) => None,
            };
            millis.map(FilterValue::Integer).ok_or_else(|| {
                FilterError::invalid_value(
                    column,
                    column_type,
                    "expected integer epoch milliseconds or an ISO 8601 datetime",
                )
            })
        }
        ColumnType::Boolean | ColumnType::Float | ColumnType::Integer | ColumnType::String => {
            Ok(value)
        }
    }
}

// =============================================================================
// Filter Rule
// =============================================================================

/// One validated constraint on one column
///
/// Immutable once built. Values are already in the canonical encoding for
/// the column type, and only the values the operator consumes are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRule {
    column: String,
    column_type: ColumnType,
    operator: Operator,
    value: Option<FilterValue>,
    value_to: Option<FilterValue>,
}

impl FilterRule {
    pub fn new(
        column: impl Into<String>,
        column_type: ColumnType,
        operator: Operator,
        value: Option<FilterValue>,
        value_to: Option<FilterValue>,
    ) -> Result<Self, FilterError> {
        let column = column.into();
        if !is_valid_identifier(&column) {
            return Err(FilterError::InvalidColumnName(column));
        }

        let (value, value_to) = match operator.arity() {
            Arity::NullCheck => (None, None),
            Arity::Binary => (value, None),
            Arity::Range => (value, value_to),
        };

        let encode = |v: Option<FilterValue>| -> Result<Option<FilterValue>, FilterError> {
            match v {
                Some(v) if operator.is_text_match() => Ok(Some(v.into_text())),
                Some(v) => encode_for_column(&column, column_type, v).map(Some),
                None => Ok(None),
            }
        };
        let value = encode(value)?;
        let value_to = encode(value_to)?;

        Ok(Self {
            column,
            column_type,
            operator,
            value,
            value_to,
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn value(&self) -> Option<&FilterValue> {
        self.value.as_ref()
    }

    pub fn value_to(&self) -> Option<&FilterValue> {
        self.value_to.as_ref()
    }

    /// A rule the user has added but not filled in yet.
    ///
    /// Dragging a column into the filter panel produces `col == null`;
    /// compiling that would match nothing.
    pub fn is_incomplete(&self) -> bool {
        match self.operator.arity() {
            Arity::NullCheck => false,
            Arity::Binary => self.value.is_none(),
            Arity::Range => self.value.is_none() || self.value_to.is_none(),
        }
    }
}

// =============================================================================
// Table Name
// =============================================================================

/// Validated name of the dataset being queried
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    pub fn parse(name: &str) -> Result<Self, FilterError> {
        if !is_valid_identifier(name) {
            return Err(FilterError::InvalidTableName(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
