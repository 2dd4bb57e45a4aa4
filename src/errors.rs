//! Error types for acquisition, extraction and the record store.

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("http {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("transport error fetching {url}: {message}")]
    Transport { url: String, message: String },

    #[error("gave up after {attempts} timed out attempts")]
    RetriesExhausted { attempts: u32 },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }
}

/// Raised when a document does not have the layout the extractor expects.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("table #{0} not found")]
    MissingTable(String),

    #[error("no hidden fragment inside #{0}")]
    MissingFragment(String),

    #[error("{table}: row {row} missing")]
    MissingRow { table: String, row: usize },

    #[error("{table}: row {row} has no column {col}")]
    MissingCell {
        table: String,
        row: usize,
        col: usize,
    },

    #[error("{table}: row {row} column {col}: cannot parse {text:?} as a number")]
    BadNumber {
        table: String,
        row: usize,
        col: usize,
        text: String,
    },

    #[error("{field}: denominator is zero")]
    ZeroDenominator { field: &'static str },

    #[error("invalid selector {0:?}")]
    Selector(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed record file {path}: {reason}")]
    Malformed { path: String, reason: String },
}
