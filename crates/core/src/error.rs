#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Input is not valid UTF-8 text: {0}")]
    NotText(#[from] std::str::Utf8Error),

    #[error("Delimited text error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing metric: {0}")]
    MissingMetric(&'static str),

    #[error("Validation failed: {0}")]
    Validation(String),
}
