use m4_buffer::BufferError;

use crate::frame::FrameError;

/// Errors that can end an engine run. All are fatal: the outer loop stops
/// and the caller reports a non-zero exit.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("input finished without unwinding the call stack")]
    UnterminatedCall,

    #[error("input finished without exiting quotes")]
    UnterminatedQuote,

    #[error(transparent)]
    Builtin(#[from] BuiltinError),
}

/// Errors raised by an individual built-in. Carries the builtin's own name
/// so the engine can report "which built-in" without the caller having to
/// thread it through separately.
#[derive(Debug, thiserror::Error)]
pub enum BuiltinError {
    #[error("{name}: {reason}")]
    Malformed { name: &'static str, reason: String },

    #[error("undefine: {0}: not defined")]
    UnknownUndefine(String),

    #[error(transparent)]
    Buffer(#[from] BufferError),
}

impl BuiltinError {
    pub fn malformed(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            name,
            reason: reason.into(),
        }
    }
}
