//! Arbor protocol types.
//!
//! This crate is the single source of truth for the request/response model:
//! the [`Request`] passed down the controller tree, the [`Response`] passed
//! back up, the [`Status`] classifications shared by responses and
//! structured errors, and the reversible [`Blackboard`] context store that
//! lets controllers stage per-subtree state.

pub mod blackboard;
pub mod error;
pub mod request;
pub mod response;
pub mod status;

pub use blackboard::{AttrValue, Blackboard, ParamSet, UndoLog};
pub use error::{ControllerResult, Failure, HttpError};
pub use request::{Request, Scope};
pub use response::{Cookie, Response};
pub use status::Status;
