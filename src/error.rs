use crate::status::RunStatus;
use thiserror::Error;

/// Errors that abort a check run.
///
/// Non-fatal conditions (page cap reached, provider diagnostics) are not
/// errors; they are collected as [`crate::engine::RunWarning`] values instead.
#[derive(Error, Debug)]
pub enum CheckError {
    /// Malformed measurement configuration document
    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    /// Malformed `name` / `name=value` dimension filter expression
    #[error("Invalid dimension filter '{filter}': expected 'Name' or 'Name=Value'")]
    InvalidFilterSyntax { filter: String },

    /// Preset name not present in the built-in catalog
    #[error("Preset {name} not defined\nChoose from:\n{catalog}")]
    UnknownPreset { name: String, catalog: String },

    /// Inconsistent or missing command line arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Listed series without a configuration entry, under strict mode
    #[error("{} listed metric(s) have no configuration entry:\n{}", .reasons.len(), .reasons.join("\n"))]
    PartialRejection { reasons: Vec<String> },

    /// A fetch result came back with an identifier no query was issued for
    #[error("Could not look up data query for result id {id}")]
    Reconciliation { id: String },

    /// The same identifier appeared twice in one fetch response
    #[error("Duplicate result for data query id {id} in a single fetch response")]
    DuplicateResult { id: String },

    /// The provider tried to paginate a single fetch batch
    #[error("GetMetricData result too long: continuation token returned for a single batch")]
    FetchPaginationUnsupported,

    /// Any failure of the underlying list or fetch call
    #[error("Provider call failed: {operation} - {details}")]
    Transport {
        operation: &'static str,
        details: String,
    },
}

impl CheckError {
    /// Wrap a provider failure, keeping the full error chain in the message.
    pub fn transport(operation: &'static str, error: anyhow::Error) -> Self {
        CheckError::Transport {
            operation,
            details: format!("{:#}", error),
        }
    }

    /// Every error that escapes a run makes it critical.
    pub fn status(&self) -> RunStatus {
        RunStatus::Critical
    }
}
