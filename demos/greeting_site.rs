//! A small single-file site showing how controller trees compose: two
//! routed sections, a fallback between them, and settings plus a template
//! service injected through the scoped context.
//!
//! Run with `RUST_LOG=debug` to watch the dispatch decisions.

use std::sync::Arc;

use arbor::{
    Application, ControllerResult, ErrorHandler, Fallback, ParamSet, Request, Response, Router,
    SetParams, Status, TreeError,
};
use tracing_subscriber::EnvFilter;

/// A stand-in template engine, looked up by leaves through the context.
struct Templates;

impl Templates {
    fn render(&self, message: &str) -> String {
        format!("<html><body><h1>{message}</h1></body></html>")
    }
}

fn greet_someone(request: &mut Request) -> ControllerResult {
    let name = request.router_args()[0].clone();
    let shock = request.get::<&str>("settings.shock").copied().unwrap_or("");
    Ok(Response::new(format!("Hello {name} (no {shock} this time)")))
}

fn shock_someone(request: &mut Request) -> ControllerResult {
    let templates: Arc<Templates> = request
        .context()
        .get_arc("services.templates")
        .expect("templates are injected at the root");
    let shock = request.get::<&str>("settings.shock").copied().unwrap_or("");
    Ok(Response::new(templates.render(shock)))
}

fn build_site() -> Result<Application, TreeError> {
    let target_urls = Router::new().route(r"^(?P<name>\w+)/$", greet_someone)?;
    let greeting_urls = Router::new().route(r"^/hello/", target_urls)?;
    let shock_urls = Router::new().route(r"^/boo/", shock_someone)?;

    let site = ErrorHandler::new(
        Fallback::new()
            .push(greeting_urls)
            .push(SetParams::new(
                shock_urls,
                ParamSet::new().set("settings.shock", "Boo"),
            ))
            .absorb([Status::NotFound]),
    );

    Ok(Application::new(SetParams::new(
        site,
        ParamSet::new()
            .set("settings.shock", "loud shouting")
            .set("services.templates", Templates),
    )))
}

fn main() -> Result<(), TreeError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let site = build_site()?;
    println!("site structure:\n{}", site.describe());

    for path in ["/hello/world/", "/boo/", "/missing/"] {
        let mut request = Request::new("GET", path);
        match site.dispatch(&mut request) {
            Ok(response) => {
                println!("{path} -> {}", response.status_line());
                println!("  {}", response.content);
            }
            Err(failure) => println!("{path} -> unhandled failure: {failure}"),
        }
    }
    Ok(())
}
