//! Responses returned from controllers.
//!
//! A response is created by exactly one leaf or middleware controller and
//! passed unmodified up through the tree; wrapping controllers may add
//! headers or cookies but never replace the body.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::status::Status;

/// A successfully handled request, ready for the transport adapter to emit.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: Status,
    pub content_type: String,
    pub content: String,
    headers: Vec<(String, String)>,
    cookies: Vec<Cookie>,
}

impl Response {
    /// A `200 OK` HTML response with the given body.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            content_type: "text/html".into(),
            content: content.into(),
            headers: Vec::new(),
            cookies: Vec::new(),
        }
    }

    /// A JSON response encoding the given data.
    pub fn json<T: Serialize>(data: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_string(data)?;
        Ok(Self::new(body).with_content_type("application/json"))
    }

    /// A `302 FOUND` redirect to the given location.
    pub fn redirect(location: impl Into<String>) -> Self {
        let location = location.into();
        let body = format!("<html><body>Redirecting to {location}</body></html>");
        Self::new(body)
            .with_status(Status::Found)
            .with_header("Location", location)
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Append to the response body.
    pub fn write(&mut self, content: &str) {
        self.content.push_str(content);
    }

    pub fn set_cookie(&mut self, cookie: Cookie) {
        self.cookies.push(cookie);
    }

    /// The status line, e.g. `200 OK`.
    pub fn status_line(&self) -> String {
        self.status.to_string()
    }

    /// Assemble the full header list: content type, any extra headers, and
    /// one `Set-Cookie` line per cookie.
    pub fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![("Content-Type".to_string(), self.content_type.clone())];
        headers.extend(self.headers.iter().cloned());
        for cookie in &self.cookies {
            headers.push(("Set-Cookie".to_string(), cookie.header_value()));
        }
        headers
    }
}

/// A cookie set on a response.
#[derive(Debug, Clone)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub max_age: Option<i64>,
    pub expires: Option<DateTime<Utc>>,
    pub secure: bool,
    pub http_only: bool,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            max_age: None,
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    pub fn http_only(mut self) -> Self {
        self.http_only = true;
        self
    }

    /// Render the `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        let mut value = format!("{}={}", self.name, self.value);
        if let Some(path) = &self.path {
            value.push_str(&format!("; Path={path}"));
        }
        if let Some(domain) = &self.domain {
            value.push_str(&format!("; Domain={domain}"));
        }
        if let Some(max_age) = self.max_age {
            value.push_str(&format!("; Max-Age={max_age}"));
        }
        if let Some(expires) = self.expires {
            value.push_str(&format!(
                "; Expires={}",
                expires.format("%a, %d %b %Y %H:%M:%S GMT")
            ));
        }
        if self.secure {
            value.push_str("; Secure");
        }
        if self.http_only {
            value.push_str("; HttpOnly");
        }
        value
    }
}
