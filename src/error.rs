use thiserror::Error;

/// 错误分类
///
/// 展示层只需要知道这三类，其余错误都归并到其中之一
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 试卷不存在
    NotFound,
    /// 题库服务或模型服务返回失败
    UpstreamFailure,
    /// 请求内容不合法
    ValidationFailure,
}

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 资源不存在
    #[error("未找到: {resource}")]
    NotFound { resource: String },

    /// 上游服务失败（题库 / LLM / 网络）
    #[error("上游服务失败 ({service}): {message}")]
    Upstream { service: String, message: String },

    /// 请求校验失败
    #[error("请求校验失败: {0}")]
    Validation(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 本地文件错误
    #[error("文件错误 ({path}): {source}")]
    File {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let service = err
            .url()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "http".to_string());
        tracing::warn!("网络请求失败 ({}): {}", service, err);
        AppError::Upstream {
            service,
            message: GENERIC_UPSTREAM_MESSAGE.to_string(),
        }
    }
}

/// 网络层异常统一展示的文案
pub const GENERIC_UPSTREAM_MESSAGE: &str = "Upstream service request failed";

/// 试卷不存在时展示的文案
pub const TEST_NOT_FOUND_MESSAGE: &str = "Test not found";

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建试卷不存在错误
    pub fn test_not_found(test_id: impl Into<String>) -> Self {
        AppError::NotFound {
            resource: format!("test {}", test_id.into()),
        }
    }

    /// 创建上游失败错误
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Upstream {
            service: service.into(),
            message: message.into(),
        }
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(model: impl Into<String>, source: impl std::fmt::Display) -> Self {
        AppError::Upstream {
            service: format!("llm:{}", model.into()),
            message: source.to_string(),
        }
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// 错误所属分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound { .. } => ErrorKind::NotFound,
            AppError::Validation(_) => ErrorKind::ValidationFailure,
            AppError::Upstream { .. } | AppError::Config(_) | AppError::File { .. } => {
                ErrorKind::UpstreamFailure
            }
        }
    }

    /// 展示给用户的文案
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound { .. } => TEST_NOT_FOUND_MESSAGE.to_string(),
            AppError::Upstream { message, .. } => message.clone(),
            AppError::Validation(message) => message.clone(),
            AppError::Config(_) | AppError::File { .. } => GENERIC_UPSTREAM_MESSAGE.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(AppError::test_not_found("7").kind(), ErrorKind::NotFound);
        assert_eq!(
            AppError::upstream("cms", "boom").kind(),
            ErrorKind::UpstreamFailure
        );
        assert_eq!(
            AppError::Validation("questionText is required".into()).kind(),
            ErrorKind::ValidationFailure
        );
    }

    #[test]
    fn test_user_message() {
        assert_eq!(AppError::test_not_found("7").user_message(), "Test not found");
        assert_eq!(
            AppError::upstream("llm", "quota exceeded").user_message(),
            "quota exceeded"
        );
        assert_eq!(
            AppError::Config("LLM_API_KEY".into()).user_message(),
            GENERIC_UPSTREAM_MESSAGE
        );
    }
}
