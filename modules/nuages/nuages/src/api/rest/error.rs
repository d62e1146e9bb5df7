//! RFC 9457 problem responses.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use nuages_sdk::FieldViolation;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::error::DomainError;

pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(title = "Problem", description = "RFC 9457 Problem Details for HTTP APIs")]
#[must_use]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    #[serde(serialize_with = "serialize_status_code")]
    #[schema(value_type = u16)]
    pub status: StatusCode,
    pub detail: String,
    pub instance: String,
    pub code: String,
    /// W3C trace id of the request, when the caller sent `traceparent`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationViolation>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[schema(title = "ValidationViolation")]
pub struct ValidationViolation {
    pub field: String,
    pub message: String,
}

impl From<&FieldViolation> for ValidationViolation {
    fn from(v: &FieldViolation) -> Self {
        Self {
            field: v.field.to_owned(),
            message: v.message.clone(),
        }
    }
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_owned(),
            title: title.into(),
            status,
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
            trace_id: None,
            errors: None,
        }
    }

    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = uri.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_errors(mut self, errors: Vec<ValidationViolation>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", detail).with_code("BAD_REQUEST")
    }

    /// 422 carrying every rejected field.
    pub fn invalid_fields(violations: &[FieldViolation]) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Validation Failed",
            format!("{} field(s) failed validation", violations.len()),
        )
        .with_code("VALIDATION_ERROR")
        .with_errors(violations.iter().map(ValidationViolation::from).collect())
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = self.status;
        let mut resp = axum::Json(self).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}

/// Map a domain error to a problem response.
///
/// Store failures are logged here and reported without detail.
pub fn domain_error_to_problem(e: &DomainError, instance: &str) -> Problem {
    let problem = match e {
        DomainError::NotFound { id } => {
            Problem::new(StatusCode::NOT_FOUND, "Not Found", format!("Nuage {id} not found"))
                .with_code("NUAGE_NOT_FOUND")
        }
        DomainError::NameConflict { name } => Problem::new(
            StatusCode::CONFLICT,
            "Conflict",
            format!("A nuage named '{name}' already exists"),
        )
        .with_code("NUAGE_NAME_CONFLICT"),
        DomainError::Validation { field, message } => Problem::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Validation Failed",
            format!("Validation error on '{field}': {message}"),
        )
        .with_code("VALIDATION_ERROR")
        .with_errors(vec![ValidationViolation {
            field: field.clone(),
            message: message.clone(),
        }]),
        DomainError::UpstreamUnavailable { operation, message } => Problem::new(
            StatusCode::BAD_GATEWAY,
            "Bad Gateway",
            format!("Cluster call '{operation}' failed: {message}"),
        )
        .with_code("CLUSTER_UNAVAILABLE"),
        DomainError::Store(msg) => {
            tracing::error!(error = %msg, "Store error occurred");
            Problem::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "An internal database error occurred",
            )
            .with_code("STORE_ERROR")
        }
    };
    problem.with_instance(instance)
}

impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        domain_error_to_problem(&e, "/")
    }
}
