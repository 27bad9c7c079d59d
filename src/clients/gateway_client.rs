/// LLM 网关 HTTP 客户端
///
/// 调用代理服务的 `/generate-solution`，不直接接触模型服务商
use std::time::Duration;

use reqwest::{Client, Response};
use tracing::debug;

use crate::clients::response::{error_from_response, join_url};
use crate::error::{AppError, AppResult, GENERIC_UPSTREAM_MESSAGE};
use crate::services::gateway::{GenerateRequest, GenerateResponse, LlmGateway, PromptDefaults};

const ENDPOINT: &str = "generate-solution";
const SERVICE: &str = "llm-gateway";

/// 网关没有"不存在"这一类错误，404 说明地址配错了
async fn gateway_error(response: Response) -> AppError {
    match error_from_response(SERVICE, response).await {
        AppError::NotFound { .. } => AppError::upstream(SERVICE, GENERIC_UPSTREAM_MESSAGE),
        other => other,
    }
}

/// LLM 网关客户端
pub struct GatewayClient {
    client: Client,
    base_url: String,
}

impl GatewayClient {
    /// 创建新的网关客户端
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("无法创建 HTTP 客户端: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// 获取默认提示词模板
    pub async fn fetch_defaults(&self) -> AppResult<PromptDefaults> {
        let url = join_url(&self.base_url, &[ENDPOINT])?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(gateway_error(response).await);
        }
        Ok(response.json().await?)
    }
}

impl LlmGateway for GatewayClient {
    async fn generate(&self, request: GenerateRequest) -> AppResult<String> {
        let url = join_url(&self.base_url, &[ENDPOINT])?;
        debug!("请求网关生成 {}", request.kind);

        let response = self.client.post(url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(gateway_error(response).await);
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.solution)
    }
}
