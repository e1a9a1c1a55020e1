//! Filter validation errors
//!
//! Every variant describes malformed client input and maps to a 400 response.

use thiserror::Error;

use super::types::ColumnType;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Declared column type outside the fixed vocabulary
    #[error(
        "Unknown filter type '{0}'. Valid types: boolean, date, datetime, float, integer, string"
    )]
    InvalidFilterKind(String),

    #[error("Invalid column name '{0}': must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidColumnName(String),

    #[error("Invalid table name '{0}': must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidTableName(String),

    /// Value that cannot be encoded for the column's declared type
    #[error("Invalid value for {column_type} column '{column}': {reason}")]
    InvalidFilterValue {
        column: String,
        column_type: ColumnType,
        reason: String,
    },

    #[error("Filter JSON exceeds maximum size of {max} bytes")]
    FilterJsonTooLarge { max: usize },

    #[error("Maximum {max} filters allowed")]
    TooManyFilters { max: usize },

    #[error("Invalid filter JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid pagination: {0}")]
    InvalidPage(String),
}

impl FilterError {
    /// Stable machine-readable code used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFilterKind(_) => "INVALID_FILTER_KIND",
            Self::InvalidColumnName(_) => "INVALID_FILTER_COLUMN",
            Self::InvalidTableName(_) => "INVALID_TABLE_NAME",
            Self::InvalidFilterValue { .. } => "INVALID_FILTER_VALUE",
            Self::FilterJsonTooLarge { .. } => "FILTER_JSON_TOO_LARGE",
            Self::TooManyFilters { .. } => "TOO_MANY_FILTERS",
            Self::InvalidJson(_) => "INVALID_FILTER_JSON",
            Self::InvalidPage(_) => "INVALID_PAGE",
        }
    }

    pub(crate) fn invalid_value(
        column: &str,
        column_type: ColumnType,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidFilterValue {
            column: column.to_string(),
            column_type,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            FilterError::InvalidFilterKind("x".into()),
            FilterError::InvalidColumnName("x".into()),
            FilterError::InvalidTableName("x".into()),
            FilterError::invalid_value("c", ColumnType::Date, "bad"),
            FilterError::FilterJsonTooLarge { max: 1 },
            FilterError::TooManyFilters { max: 1 },
            FilterError::InvalidJson("x".into()),
            FilterError::InvalidPage("x".into()),
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_invalid_value_message() {
        let err = FilterError::invalid_value("when", ColumnType::Datetime, "not a timestamp");
        assert_eq!(
            err.to_string(),
            "Invalid value for datetime column 'when': not a timestamp"
        );
    }
}
