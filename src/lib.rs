//! Arbor — a request-handling framework built from composable trees of
//! controllers.
//!
//! A site is a tree of [`Controller`]s constructed once, bottom-up. Each
//! dispatch wraps one inbound call in a [`Request`] and hands it to the
//! root; composite controllers delegate to their children, staging scoped
//! context along the way, until a leaf produces a [`Response`] or a failure
//! propagates back up to a [`Fallback`] or [`ErrorHandler`].
//!
//! ```
//! use arbor::{Application, ControllerResult, ErrorHandler, Request,
//!             Response, Router, TreeError};
//!
//! fn greet(request: &mut Request) -> ControllerResult {
//!     let name = &request.router_kws()["name"];
//!     Ok(Response::new(format!("Hello {name}")))
//! }
//!
//! fn main() -> Result<(), TreeError> {
//!     let site = Application::new(ErrorHandler::new(
//!         Router::new().route(r"^/hello/(?P<name>\w+)/$", greet)?,
//!     ));
//!
//!     let mut request = Request::new("GET", "/hello/world/");
//!     let response = site.dispatch(&mut request).expect("error handler is total");
//!     assert_eq!(response.content, "Hello world");
//!     Ok(())
//! }
//! ```

pub use arbor_core::{
    Application, Controller, ErrorHandler, Fallback, Router, SetParams, TreeError,
};
pub use arbor_http::{
    AttrValue, Blackboard, ControllerResult, Cookie, Failure, HttpError, ParamSet, Request,
    Response, Scope, Status,
};
