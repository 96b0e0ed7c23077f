//! Top-level dispatch.

use arbor_http::{ControllerResult, Request};
use tracing::debug;

use crate::Controller;

/// The entry point a transport adapter drives.
///
/// Owns the root of the controller tree — conventionally an
/// [`ErrorHandler`](crate::ErrorHandler) wrapping everything else, so the
/// adapter always gets a well-formed response. Dispatch is one synchronous
/// call; by the time it returns, every scope opened during the call has been
/// released.
pub struct Application {
    root: Box<dyn Controller>,
}

impl Application {
    pub fn new(root: impl Controller + 'static) -> Self {
        Self {
            root: Box::new(root),
        }
    }

    /// Run one request through the tree.
    pub fn dispatch(&self, request: &mut Request) -> ControllerResult {
        debug!(
            request = %request.id,
            method = %request.method,
            path = request.path(),
            "dispatching request"
        );
        self.root.handle(request)
    }

    pub fn root(&self) -> &dyn Controller {
        self.root.as_ref()
    }

    /// Render the tree structure, one node per line, for debugging.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        describe_node(self.root.as_ref(), 0, &mut out);
        out
    }
}

fn describe_node(controller: &dyn Controller, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(controller.name());
    out.push('\n');
    for child in controller.children() {
        describe_node(child, depth + 1, out);
    }
}
