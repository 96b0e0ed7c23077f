//! Path-based dispatch.

use std::collections::HashMap;

use arbor_http::request::keys;
use arbor_http::{ControllerResult, HttpError, ParamSet, Request};
use regex::Regex;
use tracing::debug;

use crate::{Controller, TreeError};

/// Dispatches requests based on the requested path.
///
/// A router holds an ordered list of regular expressions, each paired with a
/// controller. The first pattern matching at the start of the remaining path
/// wins, in declaration order; patterns need not be disjoint.
///
/// Capture groups in the pattern are appended to `router_args`, and named
/// groups are merged into `router_kws`, so when several routers sit on the
/// same branch of the tree both collections grow as new groups match.
/// Finally, the matched prefix is stripped from the path for the subtree, so
/// a router listening for a section prefix can delegate to another listening
/// for individual pages without the section name repeated in every entry.
/// All three updates are scoped to the matched child and reversed on the way
/// back out.
pub struct Router {
    routes: Vec<Route>,
}

struct Route {
    pattern: Regex,
    controller: Box<dyn Controller>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Append a route. The pattern is compiled once, anchored at the start
    /// of the remaining path.
    pub fn route(
        mut self,
        pattern: &str,
        controller: impl Controller + 'static,
    ) -> Result<Self, TreeError> {
        let anchored = format!(r"\A(?:{pattern})");
        let compiled = Regex::new(&anchored).map_err(|source| TreeError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.routes.push(Route {
            pattern: compiled,
            controller: Box::new(controller),
        });
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for Router {
    fn handle(&self, request: &mut Request) -> ControllerResult {
        let path = request.path().to_string();
        debug!(request = %request.id, %path, "routing path");

        for route in &self.routes {
            let Some(captures) = route.pattern.captures(&path) else {
                continue;
            };
            let Some(matched) = captures.get(0) else {
                continue;
            };

            // Grow the accumulated captures from any enclosing router.
            let mut args: Vec<String> = request.router_args().to_vec();
            args.extend(
                captures
                    .iter()
                    .skip(1)
                    .flatten()
                    .map(|group| group.as_str().to_string()),
            );
            let mut kws: HashMap<String, String> = request.router_kws().clone();
            for name in route.pattern.capture_names().flatten() {
                if let Some(group) = captures.name(name) {
                    kws.insert(name.to_string(), group.as_str().to_string());
                }
            }
            let remaining = path[matched.end()..].to_string();

            let updates = ParamSet::new()
                .set(keys::ROUTER_ARGS, args)
                .set(keys::ROUTER_KWS, kws)
                .set(keys::PATH, remaining);
            let mut scope = request.scoped_set(updates);
            return route.controller.handle(&mut scope);
        }

        debug!(request = %request.id, %path, "no route matched");
        Err(HttpError::not_found("no matching URL found").into())
    }

    fn children(&self) -> Vec<&dyn Controller> {
        self.routes
            .iter()
            .map(|route| route.controller.as_ref())
            .collect()
    }

    fn name(&self) -> &str {
        "Router"
    }
}
