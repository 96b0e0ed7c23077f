//! Arbor controller tree.
//!
//! Controllers form the basic structure of the framework. They are composed
//! into trees to build up functionality: each controller takes a mutable
//! [`Request`], and either returns a [`Response`](arbor_http::Response) or
//! fails with a classified or unclassified error that propagates up the
//! tree. The tree is built once, bottom-up, before any request arrives, and
//! is immutable afterwards, so one tree serves any number of dispatches.
//!
//! This crate provides the composite controllers: [`Router`] dispatches on
//! the request path, [`Fallback`] tries alternatives in order,
//! [`ErrorHandler`] converts failures into terminal responses, and
//! [`SetParams`] stages context values for a subtree. Plain functions and
//! closures act as leaves.

pub mod app;
pub mod error_handler;
pub mod fallback;
pub mod router;
pub mod set_params;

use arbor_http::{ControllerResult, Request};

pub use app::Application;
pub use error_handler::ErrorHandler;
pub use fallback::Fallback;
pub use router::Router;
pub use set_params::SetParams;

/// A node in the dispatch tree.
///
/// Controllers are configured at construction time and hold no per-request
/// state, so a tree may be shared across threads and reused across requests
/// without synchronization.
pub trait Controller: Send + Sync {
    /// Process the request, producing a response or a propagating failure.
    fn handle(&self, request: &mut Request) -> ControllerResult;

    /// The child controllers this node delegates to, in order. Empty for
    /// leaves. Intended for tree inspection and debugging output.
    fn children(&self) -> Vec<&dyn Controller> {
        Vec::new()
    }

    /// A short name for logging and tree dumps.
    fn name(&self) -> &str;
}

/// Plain functions and closures are leaf controllers.
impl<F> Controller for F
where
    F: Fn(&mut Request) -> ControllerResult + Send + Sync,
{
    fn handle(&self, request: &mut Request) -> ControllerResult {
        self(request)
    }

    fn name(&self) -> &str {
        "leaf"
    }
}

/// An error building a controller tree.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("invalid route pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
