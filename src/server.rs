//! HTTP surface: `POST /generate-recipes` plus permissive CORS.

use crate::error::RecipeError;
use crate::model::{ErrorResponse, GenerateRequest, RecipeResponse};
use crate::providers::RecipeProvider;
use crate::suggest_recipes;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use log::{debug, info};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;

const ALLOWED_METHODS: &str = "POST, OPTIONS";
const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// State shared by every request; holds only the configured provider
#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn RecipeProvider>,
}

impl AppState {
    pub fn new(provider: Arc<dyn RecipeProvider>) -> Self {
        AppState { provider }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let generate = post(generate_recipes)
        .options(preflight)
        .fallback(method_not_allowed);

    Router::new()
        .route("/generate-recipes", generate.clone())
        .route("/api/generate-recipes", generate)
        .fallback(not_found)
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .with_state(state)
}

async fn generate_recipes(State(state): State<AppState>, body: Bytes) -> Response {
    let ingredients = match parse_ingredients(&body) {
        Ok(ingredients) => ingredients,
        Err(e) => return e.into_response(),
    };
    info!("Recipe request via {}", state.provider.provider_name());

    match suggest_recipes(state.provider.as_ref(), &ingredients).await {
        Ok(recipes) => (StatusCode::OK, Json(RecipeResponse { recipes })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Extract the `ingredients` string; anything else is invalid input
fn parse_ingredients(body: &[u8]) -> Result<String, RecipeError> {
    let request: GenerateRequest = serde_json::from_slice(body).map_err(|e| {
        debug!("Rejecting request body: {}", e);
        RecipeError::InvalidInput(format!("malformed JSON body: {}", e))
    })?;

    match request.ingredients {
        Some(serde_json::Value::String(text)) if !text.trim().is_empty() => Ok(text),
        _ => Err(RecipeError::InvalidInput(
            "ingredients must be a non-blank string".to_string(),
        )),
    }
}

async fn preflight() -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS),
            (ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS),
        ],
    )
        .into_response()
}

async fn method_not_allowed() -> Response {
    RecipeError::MethodNotAllowed.into_response()
}

async fn not_found(method: Method) -> Response {
    if method == Method::OPTIONS {
        return preflight().await;
    }
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Bulunamadı".to_string(),
        }),
    )
        .into_response()
}
