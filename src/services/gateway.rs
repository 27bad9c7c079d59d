//! LLM 网关 - 请求/响应格式与能力抽象
//!
//! `POST /generate-solution` 的请求体、响应体都定义在这里，
//! 代理服务端和 HTTP 客户端共用同一套类型。

use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::error::{AppError, AppResult};

/// 生成意图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    Hint,
    Solution,
}

impl std::fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationKind::Hint => write!(f, "hint"),
            GenerationKind::Solution => write!(f, "solution"),
        }
    }
}

/// `POST /generate-solution` 请求体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passage_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub kind: GenerationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_hints: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
}

impl GenerateRequest {
    /// 检查必填字段
    pub fn validate(&self) -> AppResult<()> {
        if self.question_text.trim().is_empty() {
            return Err(AppError::Validation("questionText is required".to_string()));
        }
        Ok(())
    }

    /// 提示请求才携带历史提示
    pub fn history(&self) -> &[String] {
        match self.kind {
            GenerationKind::Hint => self.previous_hints.as_deref().unwrap_or_default(),
            GenerationKind::Solution => &[],
        }
    }

    /// 非空的自定义提示词
    pub fn custom_template(&self) -> Option<&str> {
        self.custom_prompt
            .as_deref()
            .filter(|p| !p.trim().is_empty())
    }
}

/// 成功响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub solution: String,
}

/// 失败响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `GET /generate-solution` 响应体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptDefaults {
    pub default_hint_prompt: String,
    pub default_solution_prompt: String,
}

/// LLM 网关能力
///
/// 给定题目内容和意图，返回模型生成的文本
pub trait LlmGateway: Send + Sync {
    fn generate(
        &self,
        request: GenerateRequest,
    ) -> impl Future<Output = AppResult<String>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request: GenerateRequest = serde_json::from_str(
            r#"{"questionText": "Q", "type": "hint", "previousHints": ["h1"]}"#,
        )
        .unwrap();
        assert_eq!(request.kind, GenerationKind::Hint);
        assert_eq!(request.history(), ["h1".to_string()]);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "hint");
        assert!(json.get("passageText").is_none());
    }

    #[test]
    fn test_validation_and_history() {
        let request = GenerateRequest {
            question_text: "  ".to_string(),
            passage_text: None,
            options: None,
            kind: GenerationKind::Solution,
            previous_hints: Some(vec!["ignored".to_string()]),
            custom_prompt: Some(" ".to_string()),
        };
        assert!(matches!(request.validate(), Err(AppError::Validation(_))));
        assert!(request.history().is_empty());
        assert!(request.custom_template().is_none());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let parsed: Result<GenerateRequest, _> =
            serde_json::from_str(r#"{"questionText": "Q", "type": "essay"}"#);
        assert!(parsed.is_err());
    }
}
