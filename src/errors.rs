use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeapBenchError {
    #[error("no benchmark rows parsed from {0}")]
    EmptyResult(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("variant mismatch: case {0} missing from comparison variant")]
    JoinMismatch(String),
    #[error("degenerate measurement: {0}")]
    DegenerateMeasurement(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("process error: {0}")]
    Process(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl HeapBenchError {
    pub fn empty_result<T: Into<String>>(source: T) -> Self {
        HeapBenchError::EmptyResult(source.into())
    }

    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        HeapBenchError::Configuration(msg.into())
    }

    pub fn join_mismatch<T: Into<String>>(key: T) -> Self {
        HeapBenchError::JoinMismatch(key.into())
    }

    pub fn degenerate<T: Into<String>>(msg: T) -> Self {
        HeapBenchError::DegenerateMeasurement(msg.into())
    }

    pub fn io<T: Into<String>>(msg: T) -> Self {
        HeapBenchError::Io(msg.into())
    }

    pub fn process<T: Into<String>>(msg: T) -> Self {
        HeapBenchError::Process(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        HeapBenchError::Serialization(msg.into())
    }

    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        HeapBenchError::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, HeapBenchError>;
