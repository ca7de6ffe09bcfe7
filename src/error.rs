use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use thiserror::Error;

use crate::model::ErrorResponse;

/// Errors that can occur while suggesting recipes
#[derive(Error, Debug)]
pub enum RecipeError {
    /// Request body was missing, malformed or listed no ingredients
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Request used a method other than POST
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Required provider credential is not configured
    #[error("Missing credential: {0} is not configured")]
    MissingCredential(&'static str),

    /// Upstream rejected our credentials (401/403)
    #[error("{provider} rejected the credentials (HTTP {status})")]
    AuthFailed { provider: String, status: u16 },

    /// Upstream answered with HTTP 429
    #[error("{provider} rate limit exceeded")]
    RateLimited { provider: String },

    /// Upstream returned a well-formed but empty result set
    #[error("No recipes matched the given ingredients")]
    NoMatch,

    /// Upstream answered with any other non-success status
    #[error("{provider} returned HTTP {status}: {body}")]
    Upstream {
        provider: String,
        status: u16,
        body: String,
    },

    /// Model output could not be parsed into recipes
    #[error("Recipe generation failed: {0}")]
    Generation(String),

    /// Upstream call exceeded the configured timeout
    #[error("Upstream request timed out: {0}")]
    Timeout(String),

    /// Transport-level failure talking to an upstream
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    /// Upstream body was not the JSON we expected
    #[error("Failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid application configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error loading configuration sources
    #[error("Configuration error: {0}")]
    ConfigSource(#[from] config::ConfigError),
}

impl From<reqwest::Error> for RecipeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            let target = err
                .url()
                .and_then(|url| url.host_str().map(str::to_string))
                .unwrap_or_else(|| "upstream".to_string());
            RecipeError::Timeout(target)
        } else {
            RecipeError::Http(err)
        }
    }
}

impl RecipeError {
    /// HTTP status the handler answers with for this failure
    pub fn status_code(&self) -> StatusCode {
        match self {
            RecipeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RecipeError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RecipeError::AuthFailed { .. } => StatusCode::UNAUTHORIZED,
            RecipeError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            RecipeError::NoMatch => StatusCode::NOT_FOUND,
            RecipeError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RecipeError::MissingCredential(_)
            | RecipeError::Upstream { .. }
            | RecipeError::Generation(_)
            | RecipeError::Http(_)
            | RecipeError::Decode(_)
            | RecipeError::Config(_)
            | RecipeError::ConfigSource(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the end user
    pub fn user_message(&self) -> String {
        match self {
            RecipeError::InvalidInput(_) => "Lütfen malzeme listesi girin".to_string(),
            RecipeError::MethodNotAllowed => "Sadece POST isteklerine izin veriliyor".to_string(),
            RecipeError::MissingCredential(var) => format!(
                "Tarif servisi yapılandırılmamış. Lütfen {} ortam değişkenini ayarlayın.",
                var
            ),
            RecipeError::AuthFailed { .. } => {
                "Tarif servisi yetkilendirme hatası. API anahtarını kontrol edin.".to_string()
            }
            RecipeError::RateLimited { .. } => {
                "Çok fazla istek gönderildi. Lütfen biraz bekleyin.".to_string()
            }
            RecipeError::NoMatch => {
                "Bu malzemelerle tarif bulunamadı. Farklı malzemeler deneyin.".to_string()
            }
            RecipeError::Upstream { provider, .. } => {
                format!("Tarif servisi hatası ({})", provider)
            }
            RecipeError::Generation(_) => {
                "Tarif oluşturulamadı. Lütfen tekrar deneyin.".to_string()
            }
            RecipeError::Timeout(_) => {
                "Tarif servisi zaman aşımına uğradı. Lütfen tekrar deneyin.".to_string()
            }
            RecipeError::Http(_)
            | RecipeError::Decode(_)
            | RecipeError::Config(_)
            | RecipeError::ConfigSource(_) => {
                "Tarif oluşturulurken bir hata oluştu".to_string()
            }
        }
    }
}

impl IntoResponse for RecipeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        let body = ErrorResponse {
            error: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}
