//! Structured errors and the controller failure channel.

use crate::response::Response;
use crate::status::Status;

/// An error raised by a controller that was not able to process the request
/// through to completion, carrying an explicit status classification.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{status}: {message}")]
pub struct HttpError {
    pub status: Status,
    pub message: String,
}

impl HttpError {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(Status::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(Status::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Status::NotFound, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(Status::InternalServerError, message)
    }
}

/// How a controller fails.
///
/// `Http` failures carry a classification that fallbacks match on.
/// `Internal` failures are unclassified; they propagate through every
/// combinator and only become a generic server error once an error handler
/// terminates them.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl Failure {
    /// Wrap any error as an unclassified failure.
    pub fn internal<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::Internal(err.into())
    }

    /// The status classification, if this failure carries one.
    pub fn status(&self) -> Option<Status> {
        match self {
            Self::Http(err) => Some(err.status),
            Self::Internal(_) => None,
        }
    }
}

/// What every controller produces: a response, or a failure that propagates
/// up the tree.
pub type ControllerResult = Result<Response, Failure>;
