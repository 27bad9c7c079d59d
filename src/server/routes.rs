//! 代理服务路由
//!
//! - `GET  /generate-solution`：默认提示词模板
//! - `POST /generate-solution`：生成提示或解析
//! - `GET  /test/:id`：转发试卷来源
//! - `GET  /health`

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::clients::TestSource;
use crate::error::{AppError, ErrorKind};
use crate::models::TestDocument;
use crate::server::AppState;
use crate::services::gateway::{
    ErrorResponse, GenerateRequest, GenerateResponse, LlmGateway, PromptDefaults,
};
use crate::utils::logging::truncate_text;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: AppError) -> ApiError {
    let status = match err.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::ValidationFailure => StatusCode::BAD_REQUEST,
        ErrorKind::UpstreamFailure => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.user_message(),
        }),
    )
}

// ============================================================================
// Generation Routes
// ============================================================================

pub fn generation_routes<G, S>() -> Router<Arc<AppState<G, S>>>
where
    G: LlmGateway + 'static,
    S: TestSource + 'static,
{
    Router::new().route(
        "/generate-solution",
        get(prompt_defaults::<G, S>).post(generate::<G, S>),
    )
}

async fn prompt_defaults<G, S>(State(state): State<Arc<AppState<G, S>>>) -> Json<PromptDefaults>
where
    G: LlmGateway + 'static,
    S: TestSource + 'static,
{
    Json(state.prompts.defaults())
}

async fn generate<G, S>(
    State(state): State<Arc<AppState<G, S>>>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError>
where
    G: LlmGateway + 'static,
    S: TestSource + 'static,
{
    // 自己解析请求体，坏 JSON、未知的 type 等都按校验失败返回 400
    let Json(body) = body.map_err(|e| {
        api_error(AppError::Validation(format!(
            "Invalid request: {}",
            e.body_text()
        )))
    })?;
    let req: GenerateRequest = serde_json::from_value(body)
        .map_err(|e| api_error(AppError::Validation(format!("Invalid request: {}", e))))?;
    req.validate().map_err(api_error)?;
    info!(
        "  生成{}: {}",
        req.kind,
        truncate_text(&req.question_text, 40)
    );

    let solution = state.gateway.generate(req).await.map_err(|e| {
        error!("  生成失败: {}", e);
        api_error(e)
    })?;

    Ok(Json(GenerateResponse { solution }))
}

// ============================================================================
// Test Routes
// ============================================================================

pub fn test_routes<G, S>() -> Router<Arc<AppState<G, S>>>
where
    G: LlmGateway + 'static,
    S: TestSource + 'static,
{
    Router::new().route("/test/:id", get(fetch_test::<G, S>))
}

async fn fetch_test<G, S>(
    State(state): State<Arc<AppState<G, S>>>,
    Path(id): Path<String>,
) -> Result<Json<TestDocument>, ApiError>
where
    G: LlmGateway + 'static,
    S: TestSource + 'static,
{
    state.tests.fetch_test(&id).await.map(Json).map_err(|e| {
        error!("  获取试卷 {} 失败: {}", id, e);
        api_error(e)
    })
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes<G, S>() -> Router<Arc<AppState<G, S>>>
where
    G: LlmGateway + 'static,
    S: TestSource + 'static,
{
    Router::new().route("/health", get(|| async { "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_mapping() {
        let (status, body) = api_error(AppError::test_not_found("x"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.0.error, "Test not found");

        let (status, _) = api_error(AppError::Validation("questionText is required".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = api_error(AppError::upstream("llm", "rate limited"));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.0.error, "rate limited");
    }
}
