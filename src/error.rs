use thiserror::Error;

#[derive(Error, Debug)]
pub enum CounterError {
    #[error("IO error: {context}: {source}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },
    #[error("Failed to open {resource}: {message}")]
    Connection { resource: String, message: String },
    #[error("Bus error on '{command}': {message}")]
    Bus { command: String, message: String },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("No log file configured for this session")]
    NoLogFile,
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl From<std::io::Error> for CounterError {
    fn from(source: std::io::Error) -> Self {
        CounterError::Io {
            source,
            context: "I/O failure".to_string(),
        }
    }
}
