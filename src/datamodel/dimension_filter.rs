use crate::error::CheckError;
use std::fmt;

/// Narrows the series listing to series carrying a dimension,
/// optionally with an exact value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DimensionFilter {
    pub name: String,
    pub value: Option<String>,
}

impl DimensionFilter {
    pub fn name_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Parse a single `Name` or `Name=Value` expression.
    pub fn parse(expression: &str) -> Result<Self, CheckError> {
        let trimmed = expression.trim();
        let segments: Vec<&str> = trimmed.split('=').collect();
        match segments.as_slice() {
            [name] => Ok(Self::name_only(*name)),
            [name, value] => Ok(Self::with_value(*name, *value)),
            _ => Err(CheckError::InvalidFilterSyntax {
                filter: expression.to_string(),
            }),
        }
    }
}

impl fmt::Display for DimensionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.name, value),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Parse filter expressions, keeping input order and duplicates.
pub fn parse_dimension_filters<S: AsRef<str>>(
    expressions: &[S],
) -> Result<Vec<DimensionFilter>, CheckError> {
    expressions
        .iter()
        .map(|expression| DimensionFilter::parse(expression.as_ref()))
        .collect()
}

/// Textual form of the filters with duplicates removed, first occurrence wins.
pub fn dedup_filter_strings(filters: &[DimensionFilter]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(filters.len());
    for filter in filters {
        let text = filter.to_string();
        if !seen.contains(&text) {
            seen.push(text);
        }
    }
    seen
}
