use reqwest::{Response, StatusCode};
use tracing::warn;

use crate::error::{AppError, GENERIC_UPSTREAM_MESSAGE};
use crate::services::gateway::ErrorResponse;

/// 把非 2xx 响应转换为 AppError
///
/// 响应体是 `{ "error": "..." }` 时使用其中的文案
pub async fn error_from_response(service: &str, response: Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .ok()
        .filter(|m| !m.trim().is_empty());

    warn!("{} 返回错误状态 {}: {:?}", service, status, message);

    match status {
        StatusCode::NOT_FOUND => AppError::NotFound {
            resource: message.unwrap_or_else(|| service.to_string()),
        },
        StatusCode::BAD_REQUEST => {
            AppError::Validation(message.unwrap_or_else(|| "Bad request".to_string()))
        }
        _ => AppError::Upstream {
            service: service.to_string(),
            message: message.unwrap_or_else(|| GENERIC_UPSTREAM_MESSAGE.to_string()),
        },
    }
}

/// 拼接 `base/segment/...`，每一段都做 URL 编码
pub fn join_url(base: &str, segments: &[&str]) -> Result<reqwest::Url, AppError> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|e| AppError::Config(format!("无效的地址 {}: {}", base, e)))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| AppError::Config(format!("地址不能作为基础路径: {}", base)))?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}
