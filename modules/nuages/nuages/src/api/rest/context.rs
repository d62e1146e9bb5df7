use std::convert::Infallible;

use axum::extract::{FromRequestParts, OriginalUri};
use axum::http::HeaderMap;
use axum::http::request::Parts;

use super::error::Problem;

const TRACEPARENT: &str = "traceparent";

/// Per-request details copied into every problem response.
#[derive(Debug, Clone)]
pub struct RequestContext {
    path: String,
    trace_id: Option<String>,
}

impl RequestContext {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Stamp `instance` and, when the caller sent one, `trace_id`.
    pub fn decorate(&self, problem: Problem) -> Problem {
        let problem = problem.with_instance(self.path.clone());
        match &self.trace_id {
            Some(trace_id) => problem.with_trace_id(trace_id.clone()),
            None => problem,
        }
    }
}

/// Trace id of a W3C `traceparent` header (`00-{trace_id}-{span_id}-{flags}`).
fn parse_trace_id(traceparent: &str) -> Option<String> {
    let mut parts = traceparent.split('-');
    let version = parts.next()?;
    let trace_id = parts.next()?;
    let span_id = parts.next()?;
    let flags = parts.next()?;
    let well_formed = version == "00"
        && trace_id.len() == 32
        && span_id.len() == 16
        && flags.len() == 2
        && trace_id.bytes().all(|b| b.is_ascii_hexdigit())
        && trace_id.bytes().any(|b| b != b'0');
    well_formed.then(|| trace_id.to_ascii_lowercase())
}

fn trace_id_from(headers: &HeaderMap) -> Option<String> {
    headers
        .get(TRACEPARENT)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_trace_id)
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map_or_else(|| parts.uri.path().to_owned(), |uri| uri.path().to_owned());
        Ok(Self {
            path,
            trace_id: trace_id_from(&parts.headers),
        })
    }
}
