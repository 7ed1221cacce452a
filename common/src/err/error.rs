use thiserror::Error;

/// The eight error kinds the event-processing pipeline can raise.
///
/// `Config` and `Catalog` are refused at startup. `Parse`, `Mapping`, `Decode`
/// and `Apply` are per-event and classified under the connector's configured
/// error strategy. `Producer` is treated as fatal to the connector. `Internal`
/// is always fatal.
#[derive(Debug, Error)]
pub enum CdcError {
    #[error("config error: {0}")]
    Config(String),

    #[error("producer error: {0}")]
    Producer(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("mapping error: {0}")]
    Mapping(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("apply error: {0}")]
    Apply(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CdcError {
    /// Short, stable tag used when a message is persisted into `SharedStatus`
    /// or logged, so operators can grep by kind without parsing the text.
    pub fn kind(&self) -> &'static str {
        match self {
            CdcError::Config(_) => "config",
            CdcError::Producer(_) => "producer",
            CdcError::Parse(_) => "parse",
            CdcError::Mapping(_) => "mapping",
            CdcError::Decode(_) => "decode",
            CdcError::Catalog(_) => "catalog",
            CdcError::Apply(_) => "apply",
            CdcError::Internal(_) => "internal",
        }
    }

    /// True for errors the supervisor loop may classify under the
    /// configured per-event strategy (skip/exit/retry). `Producer` and
    /// `Internal` are always fatal regardless of strategy.
    pub fn is_per_event(&self) -> bool {
        matches!(
            self,
            CdcError::Parse(_) | CdcError::Mapping(_) | CdcError::Decode(_) | CdcError::Apply(_)
        )
    }
}

impl From<serde_json::Error> for CdcError {
    fn from(e: serde_json::Error) -> Self {
        CdcError::Parse(e.to_string())
    }
}

impl From<std::io::Error> for CdcError {
    fn from(e: std::io::Error) -> Self {
        CdcError::Internal(e.to_string())
    }
}

impl From<base64::DecodeError> for CdcError {
    fn from(e: base64::DecodeError) -> Self {
        CdcError::Decode(e.to_string())
    }
}

impl From<tokio_postgres::Error> for CdcError {
    fn from(e: tokio_postgres::Error) -> Self {
        CdcError::Apply(e.to_string())
    }
}
