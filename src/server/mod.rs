//! HTTP 代理服务
//!
//! 把模型服务商和内容管理后台藏在服务端，前端只访问这里

pub mod routes;

use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::clients::{ConfiguredTestSource, TestSource};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::{LlmGateway, LlmService, PromptStore};

/// 所有请求共享的只读状态
pub struct AppState<G, S> {
    pub gateway: G,
    pub tests: S,
    pub prompts: PromptStore,
}

impl<G, S> AppState<G, S> {
    pub fn new(gateway: G, tests: S, prompts: PromptStore) -> Self {
        Self {
            gateway,
            tests,
            prompts,
        }
    }
}

/// 构建路由
pub fn router<G, S>(state: AppState<G, S>) -> Router
where
    G: LlmGateway + 'static,
    S: TestSource + 'static,
{
    Router::new()
        .merge(routes::generation_routes::<G, S>())
        .merge(routes::test_routes::<G, S>())
        .merge(routes::health_routes::<G, S>())
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
}

/// 在给定的监听器上提供服务
pub async fn serve<G, S>(listener: TcpListener, state: AppState<G, S>) -> AppResult<()>
where
    G: LlmGateway + 'static,
    S: TestSource + 'static,
{
    let app = router(state);
    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::upstream("server", e.to_string()))
}

/// 按配置启动代理服务
pub async fn run(config: &Config) -> AppResult<()> {
    let prompts = PromptStore::from_config(config).await?;
    let gateway = LlmService::new(config, prompts.clone());
    let tests = ConfiguredTestSource::from_config(config)?;

    let listener = TcpListener::bind(config.server_addr.as_str())
        .await
        .map_err(|e| AppError::Config(format!("无法监听 {}: {}", config.server_addr, e)))?;
    info!("  Listening on http://{}", config.server_addr);

    serve(listener, AppState::new(gateway, tests, prompts)).await
}
