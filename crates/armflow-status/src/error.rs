use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("a position needs exactly 6 values, got {got}")]
    AxisCount { got: usize },

    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    #[error("unknown query framing '{0}': expected 'tmsct' or 'raw'")]
    UnknownFraming(String),
}
