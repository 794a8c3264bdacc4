use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("serial port error: {0}")]
    Serial(String),
    #[error("sample rate must be a positive finite value, got {0}")]
    InvalidRate(f64),
    #[error("channel count must be at least 1")]
    NoChannels,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
