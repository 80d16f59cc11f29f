//! Line oriented output:
//! `label{name="value",...} value timestamp_ms`, plus `#` comment lines.

use crate::datamodel::Dimension;
use std::fmt;

/// Synthetic dimension carrying the configured region.
pub const REGION_DIMENSION: &str = "Region";

#[derive(Debug, Clone, PartialEq)]
pub enum ExpositionLine {
    Sample {
        label: String,
        dimensions: Vec<Dimension>,
        value: f64,
        timestamp_ms: i64,
    },
    /// Query announced but not fetched, in dry-run mode.
    Placeholder {
        label: String,
        dimensions: Vec<Dimension>,
    },
    Comment(String),
}

impl ExpositionLine {
    pub fn comment(text: impl Into<String>) -> Self {
        ExpositionLine::Comment(text.into())
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, ExpositionLine::Comment(_))
    }
}

/// Series dimensions, with the region appended when one is configured.
pub fn output_dimensions(dimensions: &[Dimension], region: Option<&str>) -> Vec<Dimension> {
    let mut output = dimensions.to_vec();
    if let Some(region) = region {
        output.push(Dimension::new(REGION_DIMENSION, region));
    }
    output
}

fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}

struct DimensionSet<'a>(&'a [Dimension]);

impl fmt::Display for DimensionSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, dimension) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}=\"{}\"", dimension.name, escape_value(&dimension.value))?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for ExpositionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpositionLine::Sample {
                label,
                dimensions,
                value,
                timestamp_ms,
            } => write!(
                f,
                "{}{} {} {}",
                label,
                DimensionSet(dimensions),
                value,
                timestamp_ms
            ),
            ExpositionLine::Placeholder { label, dimensions } => {
                write!(f, "# DRYRUN {}{}", label, DimensionSet(dimensions))
            }
            ExpositionLine::Comment(text) => write!(f, "# {}", text),
        }
    }
}

pub fn render(lines: &[ExpositionLine]) -> String {
    lines.iter().map(|line| format!("{}\n", line)).collect()
}
