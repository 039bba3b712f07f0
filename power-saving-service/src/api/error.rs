use axum::{
    extract::rejection::QueryRejection,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    aggregate::AggregateError,
    dates::DateParamError,
    pipeline::PipelineError,
    render::{ErrorEnvelope, RenderError},
};

/// Anything that ends a request early. Rendered as the `le` envelope.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Date(#[from] DateParamError),
    #[error(transparent)]
    Query(#[from] QueryRejection),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error(transparent)]
    Directory(#[from] PipelineError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Render(RenderError::InvalidReturnType)
            | ApiError::Date(_)
            | ApiError::Query(_) => {
                tracing::warn!(error = %self, "rejected request");
            }
            _ => tracing::error!(error = %self, "request failed"),
        }
        metrics::counter!("http_request_errors_total").increment(1);

        // Legacy clients check `returnCode`, not the status line.
        Json(ErrorEnvelope::new(self.to_string())).into_response()
    }
}
