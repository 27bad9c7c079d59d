/// 试卷来源
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestSourceKind {
    /// 通过 HTTP 从内容管理后台获取
    Http,
    /// 从本地 TOML 文件夹读取
    Toml,
}

impl TestSourceKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "http" | "cms" => Some(Self::Http),
            "toml" | "file" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// 答案解析的开放策略
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SolutionGate {
    /// 题目或整卷提交后才能请求解析
    #[default]
    AfterSubmit,
    /// 随时可以请求解析
    Always,
}

impl SolutionGate {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "after_submit" | "after-submit" | "submitted" => Some(Self::AfterSubmit),
            "always" => Some(Self::Always),
            _ => None,
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 代理服务监听地址
    pub server_addr: String,
    /// 试卷来源
    pub test_source: TestSourceKind,
    /// 内容管理后台地址
    pub cms_base_url: String,
    /// TOML 试卷存放目录
    pub toml_folder: String,
    /// HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 解析开放策略
    pub solution_gate: SolutionGate,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    // --- 提示词覆盖文件 ---
    pub hint_prompt_file: Option<String>,
    pub solution_prompt_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:8787".to_string(),
            test_source: TestSourceKind::Http,
            cms_base_url: "http://127.0.0.1:1337/api".to_string(),
            toml_folder: "tests_toml".to_string(),
            request_timeout_secs: 60,
            solution_gate: SolutionGate::AfterSubmit,
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_temperature: 0.3,
            llm_max_tokens: 1024,
            hint_prompt_file: None,
            solution_prompt_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 从任意键值来源构建配置，未设置或无法解析的值使用默认值
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        Self {
            server_addr: lookup("SERVER_ADDR").unwrap_or(default.server_addr),
            test_source: lookup("TEST_SOURCE").and_then(|v| TestSourceKind::parse(&v)).unwrap_or(default.test_source),
            cms_base_url: lookup("CMS_BASE_URL").unwrap_or(default.cms_base_url),
            toml_folder: lookup("TOML_FOLDER").unwrap_or(default.toml_folder),
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            solution_gate: lookup("SOLUTION_GATE").and_then(|v| SolutionGate::parse(&v)).unwrap_or(default.solution_gate),
            verbose_logging: lookup("VERBOSE_LOGGING").and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            llm_api_key: lookup("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: lookup("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: lookup("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: lookup("LLM_TEMPERATURE").and_then(|v| v.parse().ok()).unwrap_or(default.llm_temperature),
            llm_max_tokens: lookup("LLM_MAX_TOKENS").and_then(|v| v.parse().ok()).unwrap_or(default.llm_max_tokens),
            hint_prompt_file: lookup("HINT_PROMPT_FILE").filter(|v| !v.trim().is_empty()),
            solution_prompt_file: lookup("SOLUTION_PROMPT_FILE").filter(|v| !v.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.server_addr, "127.0.0.1:8787");
        assert_eq!(config.test_source, TestSourceKind::Http);
        assert_eq!(config.solution_gate, SolutionGate::AfterSubmit);
        assert!(config.hint_prompt_file.is_none());
    }

    #[test]
    fn test_overrides_and_fallbacks() {
        let config = Config::from_lookup(lookup_from(&[
            ("TEST_SOURCE", "toml"),
            ("SOLUTION_GATE", "always"),
            ("LLM_MAX_TOKENS", "not-a-number"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("HINT_PROMPT_FILE", "  "),
        ]));
        assert_eq!(config.test_source, TestSourceKind::Toml);
        assert_eq!(config.solution_gate, SolutionGate::Always);
        assert_eq!(config.llm_max_tokens, 1024);
        assert_eq!(config.request_timeout_secs, 5);
        assert!(config.hint_prompt_file.is_none());
    }
}
