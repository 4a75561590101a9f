use thiserror::Error;

pub type FetchResult<T> = Result<T, FetchError>;

/// Error taxonomy for a release-fetch run.
///
/// `Config` means the reference itself is malformed and retrying is
/// pointless. `Transport`/`Status` cover the network layer. `Selection`
/// carries the candidate dump needed to correct a version or file rule.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{context}: unexpected response status {status}")]
    Status {
        context: String,
        status: reqwest::StatusCode,
    },

    #[error("{0}")]
    Selection(String),

    #[error("invalid size for {name}: want {want} bytes, got {got}")]
    SizeMismatch { name: String, want: i64, got: i64 },
}
