//! Trying alternatives in order.

use std::collections::HashSet;

use arbor_http::{ControllerResult, Failure, HttpError, Request, Status};
use tracing::debug;

use crate::Controller;

/// Tries a list of controllers in turn.
///
/// The first controller that succeeds has its response returned; the rest
/// are not tried. A controller failing with an absorbable classification is
/// noted and the next one is tried. If every controller fails, the last
/// absorbed error is re-raised.
///
/// By default every structured error is absorbable. [`absorb`](Self::absorb)
/// narrows that to a fixed set of classifications, so a fallback can step
/// past not-found errors, say, while letting server errors propagate
/// immediately. Unclassified failures always propagate immediately.
/// Responses are always returned; their status is never inspected.
pub struct Fallback {
    controllers: Vec<Box<dyn Controller>>,
    statuses: HashSet<Status>,
}

impl Fallback {
    pub fn new() -> Self {
        Self {
            controllers: Vec::new(),
            statuses: HashSet::new(),
        }
    }

    /// Append an alternative to try.
    pub fn push(mut self, controller: impl Controller + 'static) -> Self {
        self.controllers.push(Box::new(controller));
        self
    }

    /// Only absorb failures with these classifications; anything else
    /// propagates immediately.
    pub fn absorb(mut self, statuses: impl IntoIterator<Item = Status>) -> Self {
        self.statuses.extend(statuses);
        self
    }
}

impl Default for Fallback {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for Fallback {
    fn handle(&self, request: &mut Request) -> ControllerResult {
        let mut last_absorbed: Option<HttpError> = None;

        for controller in &self.controllers {
            match controller.handle(request) {
                Ok(response) => return Ok(response),
                Err(Failure::Http(err)) => {
                    if !self.statuses.is_empty() && !self.statuses.contains(&err.status) {
                        return Err(err.into());
                    }
                    debug!(request = %request.id, status = err.status.code(), "controller failed, falling back");
                    last_absorbed = Some(err);
                }
                // Unclassified failures are never absorbed.
                Err(failure) => return Err(failure),
            }
        }

        debug!(request = %request.id, "no more valid controllers");
        Err(last_absorbed
            .unwrap_or_else(|| HttpError::server_error("no controllers available"))
            .into())
    }

    fn children(&self) -> Vec<&dyn Controller> {
        self.controllers.iter().map(|c| c.as_ref()).collect()
    }

    fn name(&self) -> &str {
        "Fallback"
    }
}
