//! Terminating failures as valid responses.

use arbor_http::{ControllerResult, Failure, HttpError, Request, Response};
use tracing::{info, warn};

use crate::Controller;

/// Catches failures and generates a valid error page.
///
/// Wraps a single controller and only responds when that controller fails to
/// generate a response. Structured errors keep their classification;
/// unclassified failures become a generic server error carrying the rendered
/// diagnostic chain in the message. Either way the result is a minimal page
/// showing the status line — sites wanting richer error pages can subsume
/// this with a [`Fallback`](crate::Fallback) rendering their own.
///
/// A tree is conventionally rooted at one of these, so no failure ever
/// escapes to the transport adapter.
pub struct ErrorHandler {
    controller: Box<dyn Controller>,
    handle_internal: bool,
}

impl ErrorHandler {
    pub fn new(controller: impl Controller + 'static) -> Self {
        Self {
            controller: Box::new(controller),
            handle_internal: true,
        }
    }

    /// Only terminate structured errors; let unclassified failures keep
    /// propagating so an outer layer can surface them.
    pub fn structured_only(mut self) -> Self {
        self.handle_internal = false;
        self
    }
}

impl Controller for ErrorHandler {
    fn handle(&self, request: &mut Request) -> ControllerResult {
        let error = match self.controller.handle(request) {
            Ok(response) => return Ok(response),
            Err(Failure::Http(err)) => {
                info!(request = %request.id, %err, "handling error");
                err
            }
            Err(Failure::Internal(err)) if self.handle_internal => {
                info!(request = %request.id, error = %format!("{err:#}"), "handling internal error");
                HttpError::server_error(format!("{err:#}"))
            }
            Err(failure) => {
                warn!(request = %request.id, "ignoring unclassified failure");
                return Err(failure);
            }
        };

        let body = format!("<html><body><h1>{}</h1></body></html>", error.status);
        Ok(Response::new(body).with_status(error.status))
    }

    fn children(&self) -> Vec<&dyn Controller> {
        vec![self.controller.as_ref()]
    }

    fn name(&self) -> &str {
        "ErrorHandler"
    }
}
