//! LLM 服务 - 业务能力层
//!
//! 只负责"生成提示 / 生成解析"能力，不关心题目状态
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::gateway::{GenerateRequest, GenerationKind, LlmGateway};
use crate::services::prompt_store::{
    assemble_question_content, render_hint_prompt, render_solution_prompt, PromptStore,
};
use crate::utils::logging::truncate_text;

const SYSTEM_MESSAGE: &str = "You are a helpful, accurate tutor for multiple-choice exams.";

/// LLM 服务
///
/// 职责：
/// - 把题目内容套进提示词模板
/// - 调用 LLM API 返回生成文本
/// - 不持有任何题目状态
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
    prompts: PromptStore,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config, prompts: PromptStore) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            prompts,
        }
    }

    pub fn prompts(&self) -> &PromptStore {
        &self.prompts
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（去掉首尾空白）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                AppError::upstream(
                    format!("llm:{}", self.model_name),
                    "LLM returned empty content",
                )
            })?;

        Ok(content)
    }

    /// 生成最终发给模型的提示词
    pub fn build_prompt(&self, request: &GenerateRequest) -> String {
        let options = request.options.as_deref().unwrap_or_default();
        let content = assemble_question_content(
            &request.question_text,
            request.passage_text.as_deref(),
            options,
        );

        match request.kind {
            GenerationKind::Hint => {
                let template = request
                    .custom_template()
                    .unwrap_or(self.prompts.hint_template());
                render_hint_prompt(template, &content, request.history())
            }
            GenerationKind::Solution => {
                let template = request
                    .custom_template()
                    .unwrap_or(self.prompts.solution_template());
                render_solution_prompt(template, &content)
            }
        }
    }
}

impl LlmGateway for LlmService {
    async fn generate(&self, request: GenerateRequest) -> AppResult<String> {
        request.validate()?;

        info!(
            "🤖 生成{}: {}",
            request.kind,
            truncate_text(&request.question_text, 40)
        );

        let prompt = self.build_prompt(&request);
        self.send_to_llm(&prompt, Some(SYSTEM_MESSAGE)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 创建测试用的 LlmService
    fn create_test_service(prompts: PromptStore) -> LlmService {
        let config = Config {
            llm_api_key: "test-key".to_string(),
            llm_api_base_url: "http://127.0.0.1:9/v1".to_string(),
            ..Config::default()
        };
        LlmService::new(&config, prompts)
    }

    fn request(kind: GenerationKind) -> GenerateRequest {
        GenerateRequest {
            question_text: "<p>Pick the prime</p>".to_string(),
            passage_text: None,
            options: Some(vec!["4".to_string(), "7".to_string()]),
            kind,
            previous_hints: Some(vec!["Primes have two divisors".to_string()]),
            custom_prompt: None,
        }
    }

    #[test]
    fn test_build_hint_prompt_includes_history() {
        let service = create_test_service(PromptStore::new(
            "{{QUESTION_CONTENT}}\n---\n{{HINT_INSTRUCTIONS}}",
            "{{QUESTION_CONTENT}}",
        ));
        let prompt = service.build_prompt(&request(GenerationKind::Hint));
        assert!(prompt.starts_with("Question:\nPick the prime\n\nOptions:\nA. 4\nB. 7\n---\n"));
        assert!(prompt.contains("1. Primes have two divisors"));
    }

    #[test]
    fn test_build_solution_prompt_ignores_history() {
        let service = create_test_service(PromptStore::default());
        let prompt = service.build_prompt(&request(GenerationKind::Solution));
        assert!(!prompt.contains("Primes have two divisors"));
        assert!(prompt.contains("B. 7"));
    }

    #[test]
    fn test_custom_prompt_overrides_template() {
        let service = create_test_service(PromptStore::default());
        let mut req = request(GenerationKind::Solution);
        req.custom_prompt = Some("Short answer for: {{QUESTION_CONTENT}}".to_string());
        let prompt = service.build_prompt(&req);
        assert!(prompt.starts_with("Short answer for: Question:"));
    }

    #[tokio::test]
    async fn test_generate_rejects_missing_question_text() {
        let service = create_test_service(PromptStore::default());
        let mut req = request(GenerationKind::Hint);
        req.question_text = String::new();
        let err = service.generate(req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    /// 测试真实 LLM 调用
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_generate_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_generate_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env();
        let service = LlmService::new(&config, PromptStore::default());

        let result = service.generate(request(GenerationKind::Hint)).await;
        match result {
            Ok(response) => {
                println!("\n========== LLM 响应 ==========\n{}\n", response);
                assert!(!response.is_empty());
            }
            Err(e) => panic!("LLM 调用失败: {}", e),
        }
    }
}
