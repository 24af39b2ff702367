use llmapi::{ErrorKind, LlmError};

/// Outcome of a boundary call (`llmapi_error_t`).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Ok = 0,
    InvalidParam = -1,
    Network = -2,
    Parse = -3,
    State = -4,
    Unknown = -99,
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidArgument => Self::InvalidParam,
            ErrorKind::InvalidState => Self::State,
            ErrorKind::Network => Self::Network,
            ErrorKind::Parse => Self::Parse,
            // a well-formed answer with nothing in it: the turn cannot complete
            ErrorKind::EmptyResponse => Self::State,
            ErrorKind::Unknown => Self::Unknown,
        }
    }
}

impl From<&LlmError> for ErrorCode {
    fn from(err: &LlmError) -> Self {
        err.kind().into()
    }
}
