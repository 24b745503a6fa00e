//! Error types for the orchestrator pipeline.
//!
//! Errors carry context that chains through layers:
//! Session → Step → Operation → Detail

use std::io;

use thiserror::Error;

use crate::alignment::AlignError;
use crate::export::ExportError;
use crate::fingerprint::FingerprintError;
use crate::process::ProcessError;
use crate::subtitles::SubtitleError;

/// Top-level pipeline error with session context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A step failed during execution.
    #[error("Session '{session_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        session_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// Input validation failed before the pipeline started.
    #[error("Session '{session_name}' failed validation: {message}")]
    ValidationFailed {
        session_name: String,
        message: String,
    },

    /// Failed to set up the session (create directories, logger, etc.).
    #[error("Session '{session_name}' setup failed: {message}")]
    SetupFailed {
        session_name: String,
        message: String,
    },
}

impl PipelineError {
    /// Create a step failed error.
    pub fn step_failed(
        session_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            session_name: session_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    /// Create a validation failed error.
    pub fn validation_failed(session_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            session_name: session_name.into(),
            message: message.into(),
        }
    }

    /// Create a setup failed error.
    pub fn setup_failed(session_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            session_name: session_name.into(),
            message: message.into(),
        }
    }

    /// The step error underneath, if a step failed.
    pub fn step_error(&self) -> Option<&StepError> {
        match self {
            Self::StepFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Error from a pipeline step with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// A required file was not found.
    #[error("Required file not found: {path}")]
    FileNotFound { path: String },

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// A precondition was not met.
    #[error("Precondition not met: {0}")]
    PreconditionFailed(String),

    /// Alignment engine error.
    #[error(transparent)]
    Align(#[from] AlignError),

    /// Probing or fingerprinting error.
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),

    /// Export error.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Subtitle read/write error.
    #[error(transparent)]
    Subtitle(#[from] SubtitleError),

    /// An external command failed.
    #[error(transparent)]
    Process(#[from] ProcessError),
}

impl StepError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            operation: operation.into(),
            source,
        }
    }

    /// Create a precondition failed error.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_error_wraps_engine_errors() {
        let err: StepError = AlignError::UnresolvableOrdering {
            position: 3,
            previous: 7,
            value: 5,
        }
        .into();
        assert!(matches!(
            err,
            StepError::Align(AlignError::UnresolvableOrdering { .. })
        ));
        assert!(err.to_string().contains("unordered"));
    }

    #[test]
    fn pipeline_error_chains_context() {
        let step_err = StepError::file_not_found("/media/source.mkv");
        let pipeline_err = PipelineError::step_failed("source", "Probe", step_err);

        let msg = pipeline_err.to_string();
        assert!(msg.contains("source"));
        assert!(msg.contains("Probe"));
        assert!(msg.contains("/media/source.mkv"));
        assert!(matches!(
            pipeline_err.step_error(),
            Some(StepError::FileNotFound { .. })
        ));
    }
}
