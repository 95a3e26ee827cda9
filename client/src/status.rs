//! Lifecycle state shared by read and write hooks

use std::fmt;
use std::sync::Arc;

use crate::cache::SharedResult;
use crate::error::ClientError;

/// `Idle -> Pending -> Success | Error`. A new invocation always passes
/// through `Pending` again.
pub enum Status<T> {
    Idle,
    Pending,
    Success(Arc<T>),
    Error(Arc<ClientError>),
}

impl<T> Status<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Status::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Status::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }

    pub fn data(&self) -> Option<&Arc<T>> {
        match self {
            Status::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Arc<ClientError>> {
        match self {
            Status::Error(error) => Some(error),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Pending => "pending",
            Status::Success(_) => "success",
            Status::Error(_) => "error",
        }
    }
}

impl<T> Clone for Status<T> {
    fn clone(&self) -> Self {
        match self {
            Status::Idle => Status::Idle,
            Status::Pending => Status::Pending,
            Status::Success(data) => Status::Success(data.clone()),
            Status::Error(error) => Status::Error(error.clone()),
        }
    }
}

impl<T> Default for Status<T> {
    fn default() -> Self {
        Status::Idle
    }
}

impl<T> From<SharedResult<T>> for Status<T> {
    fn from(result: SharedResult<T>) -> Self {
        match result {
            Ok(data) => Status::Success(data),
            Err(error) => Status::Error(error),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Status<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => f.write_str("Idle"),
            Status::Pending => f.write_str("Pending"),
            Status::Success(data) => f.debug_tuple("Success").field(data).finish(),
            Status::Error(error) => f.debug_tuple("Error").field(error).finish(),
        }
    }
}
