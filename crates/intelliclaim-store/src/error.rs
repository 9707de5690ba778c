use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("clause retrieval failed: {0}")]
    Retrieval(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("{0}")]
    Other(String),
}
