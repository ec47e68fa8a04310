use std::io;

/// Errors that can occur during nbrun operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("executable not found: {program}")]
    ExecutableNotFound { program: String },

    #[error("failed to spawn `{program}`: {source}")]
    ProcessExecution {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("command spec requires at least one element (the executable)")]
    EmptyCommand,

    #[error("invalid notebook document: {0}")]
    DocumentFormat(String),

    #[error("cell {cell_index} failed: {ename}: {evalue}")]
    CellExecution {
        cell_index: usize,
        ename: String,
        evalue: String,
        traceback: Vec<String>,
    },

    #[error("notebook run exceeded timeout of {timeout_secs}s")]
    ExecutionTimeout { timeout_secs: u64 },

    #[error("kernel error: {0}")]
    Kernel(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for nbrun operations
pub type Result<T> = std::result::Result<T, Error>;
