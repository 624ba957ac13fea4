use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use transfer_domain::EngineError;

#[derive(Debug)]
pub enum AppError {
    Engine(EngineError),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Engine(err) => {
                let status = match &err {
                    EngineError::Validation(_) => StatusCode::BAD_REQUEST,
                    EngineError::UnsupportedLanguage(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    EngineError::NotFound(_) => StatusCode::NOT_FOUND,
                    EngineError::InvalidStateTransition { .. }
                    | EngineError::RefundNotAllowed(_) => StatusCode::CONFLICT,
                    EngineError::ExternalService { .. } => StatusCode::BAD_GATEWAY,
                };
                if status == StatusCode::BAD_GATEWAY {
                    tracing::error!("Upstream failure: {}", err);
                }
                (status, err.to_string())
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}
