//! The inbound request and its scoped context.
//!
//! A request is built once by the transport adapter, owned exclusively by a
//! single dispatch, and passed down the controller tree by mutable
//! reference. Fixed facts about the call (method, raw query and body,
//! cookies) live in plain fields; everything routers and parameter-setting
//! controllers rewrite on the way down (`path`, `router_args`,
//! `router_kws`, injected services) lives on the embedded [`Blackboard`] so
//! the rewrites are scoped and reversible.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::blackboard::{Blackboard, ParamSet, UndoLog};

/// Well-known blackboard keys populated by the framework.
pub mod keys {
    /// The not-yet-consumed remainder of the request path.
    pub const PATH: &str = "path";
    /// Positional captures accumulated by routers, root-most first.
    pub const ROUTER_ARGS: &str = "router_args";
    /// Named captures accumulated by routers; inner routers win on clashes.
    pub const ROUTER_KWS: &str = "router_kws";
}

/// One inbound call.
pub struct Request {
    /// Unique id for log correlation.
    pub id: Uuid,
    /// The HTTP method, uppercase by convention.
    pub method: String,
    /// The address the call arrived from, if the adapter knows it.
    pub remote_addr: Option<String>,
    /// When the request was constructed.
    pub received: DateTime<Utc>,
    /// The raw query string.
    pub query_raw: String,
    /// The raw request body.
    pub body_raw: String,
    /// Cookies sent with the request.
    pub cookies: HashMap<String, String>,
    /// Decoded query-string parameters.
    pub query_params: HashMap<String, Vec<String>>,
    /// Decoded form-encoded body parameters.
    pub body_params: HashMap<String, Vec<String>>,
    /// Query and body parameters merged; body wins on key collisions.
    pub all_params: HashMap<String, Vec<String>>,
    context: Blackboard,
}

impl Request {
    /// A new request for the given method and path. Adapters layer query,
    /// body, and cookie data on top with the `with_*` builders.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        let path: String = path.into();
        let mut context = Blackboard::new();
        // The initial path is permanent state, so no undo log is kept.
        let _ = context.apply(&ParamSet::new().set(keys::PATH, path));
        Self {
            id: Uuid::new_v4(),
            method: method.into(),
            remote_addr: None,
            received: Utc::now(),
            query_raw: String::new(),
            body_raw: String::new(),
            cookies: HashMap::new(),
            query_params: HashMap::new(),
            body_params: HashMap::new(),
            all_params: HashMap::new(),
            context,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query_raw = query.into();
        self.query_params = parse_form(&self.query_raw);
        self.rebuild_all_params();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body_raw = body.into();
        self.body_params = parse_form(&self.body_raw);
        self.rebuild_all_params();
        self
    }

    /// Parse a `Cookie` request header into the cookie map.
    pub fn with_cookie_header(mut self, header: &str) -> Self {
        for pair in header.split(';') {
            if let Some((name, value)) = pair.split_once('=') {
                self.cookies
                    .insert(name.trim().to_string(), value.trim().to_string());
            }
        }
        self
    }

    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    fn rebuild_all_params(&mut self) {
        self.all_params = self.query_params.clone();
        for (key, values) in &self.body_params {
            self.all_params.insert(key.clone(), values.clone());
        }
    }

    /// The not-yet-consumed remainder of the path. Routers shrink this as
    /// they match prefixes.
    pub fn path(&self) -> &str {
        self.context
            .get::<String>(keys::PATH)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Positional captures from every router above the current controller.
    pub fn router_args(&self) -> &[String] {
        self.context
            .get::<Vec<String>>(keys::ROUTER_ARGS)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Named captures from every router above the current controller.
    pub fn router_kws(&self) -> &HashMap<String, String> {
        self.context
            .get::<HashMap<String, String>>(keys::ROUTER_KWS)
            .unwrap_or_else(|| empty_kws())
    }

    /// The open-ended context namespace.
    pub fn context(&self) -> &Blackboard {
        &self.context
    }

    /// Look up a context value by dotted path.
    pub fn get<T: std::any::Any + Send + Sync>(&self, path: &str) -> Option<&T> {
        self.context.get(path)
    }

    /// Apply a set of context updates for the duration of the returned
    /// scope.
    ///
    /// The guard dereferences to the request, so a child controller is
    /// invoked straight through it. When the guard drops — on return, on
    /// `?`-propagation, or during a panic unwind — every update is reversed.
    pub fn scoped_set(&mut self, params: ParamSet) -> Scope<'_> {
        let undo = self.context.apply(&params);
        Scope { request: self, undo }
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("path", &self.path())
            .field("remote_addr", &self.remote_addr)
            .finish_non_exhaustive()
    }
}

/// A live set of scoped context updates.
///
/// Releasing the scope (dropping the guard) restores every slot it touched,
/// whichever way control leaves the guarded region.
pub struct Scope<'a> {
    request: &'a mut Request,
    undo: UndoLog,
}

impl Deref for Scope<'_> {
    type Target = Request;

    fn deref(&self) -> &Request {
        self.request
    }
}

impl DerefMut for Scope<'_> {
    fn deref_mut(&mut self) -> &mut Request {
        self.request
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        let undo = std::mem::take(&mut self.undo);
        self.request.context.unwind(undo);
    }
}

fn empty_kws() -> &'static HashMap<String, String> {
    static EMPTY: OnceLock<HashMap<String, String>> = OnceLock::new();
    EMPTY.get_or_init(HashMap::new)
}

/// Decode an `application/x-www-form-urlencoded` string into a multimap.
fn parse_form(raw: &str) -> HashMap<String, Vec<String>> {
    let mut params: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        params.entry(key.into_owned()).or_default().push(value.into_owned());
    }
    params
}
