use thiserror::Error;

/// Why an import stopped. Records written before the failure stay in place.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid JSON file")]
    Parse(#[source] serde_json::Error),

    #[error("No valid lists or tasks found to import")]
    NoData,

    #[error("invalid {field} timestamp '{value}' on task '{title}'")]
    InvalidTimestamp {
        field: &'static str,
        value: String,
        title: String,
    },

    #[error("saving imported records failed: {0:#}")]
    Store(anyhow::Error),
}
