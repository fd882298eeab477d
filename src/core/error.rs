use thiserror::Error;

/// Fatal errors surfaced by the analysis pipeline.
///
/// Malformed individual rows are never fatal — they are skipped and
/// counted during ingestion. Everything here fails the whole request;
/// no partial result is returned.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Input bytes were not valid UTF-8. Raised by the collaborator
    /// that decodes the upload, not by the core itself.
    #[error("input is not valid UTF-8")]
    BadEncoding,

    /// The CSV header is missing, empty, or lacks required columns.
    #[error("missing required columns: {0}")]
    BadSchema(String),

    /// More rows than the per-batch cap were accepted.
    #[error("dataset exceeds maximum of {0} transactions")]
    TooLarge(usize),

    /// No row survived per-row parsing.
    #[error("no valid transactions found in CSV")]
    EmptyData,

    /// Any other failure during detection or scoring.
    #[error("internal error: {0}")]
    Internal(String),
}
