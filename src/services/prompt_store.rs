//! 提示词模板
//!
//! 模板中的占位符会被原样替换：
//! - `{{QUESTION_CONTENT}}`：阅读材料 + 题干 + 带字母的选项
//! - `{{HINT_INSTRUCTIONS}}`：根据已有提示生成的说明（`{{PREVIOUS_HINTS}}` 是旧写法）

use regex::Regex;
use std::sync::OnceLock;
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::option_letter;
use crate::services::gateway::PromptDefaults;

pub const QUESTION_CONTENT_TOKEN: &str = "{{QUESTION_CONTENT}}";
pub const HINT_INSTRUCTIONS_TOKEN: &str = "{{HINT_INSTRUCTIONS}}";
pub const PREVIOUS_HINTS_TOKEN: &str = "{{PREVIOUS_HINTS}}";

const DEFAULT_HINT_TEMPLATE: &str = r#"You are a patient tutor helping a student with an exam question.

{{QUESTION_CONTENT}}

{{HINT_INSTRUCTIONS}}

Rules:
- Do NOT reveal the correct option letter or state the final answer.
- Keep the hint to two or three sentences.
- Point the student at the part of the passage or the concept they should look at."#;

const DEFAULT_SOLUTION_TEMPLATE: &str = r#"You are an expert tutor explaining an exam question.

{{QUESTION_CONTENT}}

Explain step by step how to reach the correct answer, say why each wrong option is wrong,
and finish with a line of the form "Answer: <letter>"."#;

/// 提示词模板存储
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptStore {
    hint_template: String,
    solution_template: String,
}

impl Default for PromptStore {
    fn default() -> Self {
        Self {
            hint_template: DEFAULT_HINT_TEMPLATE.to_string(),
            solution_template: DEFAULT_SOLUTION_TEMPLATE.to_string(),
        }
    }
}

impl PromptStore {
    pub fn new(hint_template: impl Into<String>, solution_template: impl Into<String>) -> Self {
        Self {
            hint_template: hint_template.into(),
            solution_template: solution_template.into(),
        }
    }

    /// 按配置加载，配置了覆盖文件时用文件内容替换默认模板
    pub async fn from_config(config: &Config) -> AppResult<Self> {
        let mut store = Self::default();

        if let Some(path) = &config.hint_prompt_file {
            store.hint_template = read_template(path).await?;
            info!("📝 已加载提示模板: {}", path);
        }
        if let Some(path) = &config.solution_prompt_file {
            store.solution_template = read_template(path).await?;
            info!("📝 已加载解析模板: {}", path);
        }

        Ok(store)
    }

    pub fn hint_template(&self) -> &str {
        &self.hint_template
    }

    pub fn solution_template(&self) -> &str {
        &self.solution_template
    }

    pub fn defaults(&self) -> PromptDefaults {
        PromptDefaults {
            default_hint_prompt: self.hint_template.clone(),
            default_solution_prompt: self.solution_template.clone(),
        }
    }
}

async fn read_template(path: &str) -> AppResult<String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path, e))?;
    if !content.contains(QUESTION_CONTENT_TOKEN) {
        return Err(AppError::Config(format!(
            "模板 {} 缺少占位符 {}",
            path, QUESTION_CONTENT_TOKEN
        )));
    }
    Ok(content)
}

/// 去掉富文本标签并压缩空白
pub fn plain_text(raw: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    static SPACES: OnceLock<Regex> = OnceLock::new();

    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex"));
    let spaces = SPACES.get_or_init(|| Regex::new(r"[ \t\u{a0}]+").expect("static regex"));

    let without_tags = tags.replace_all(raw, " ").replace("&nbsp;", " ");
    without_tags
        .lines()
        .map(|line| spaces.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// 拼出发给模型的题目内容
pub fn assemble_question_content(
    question_text: &str,
    passage_text: Option<&str>,
    options: &[String],
) -> String {
    let mut sections = Vec::new();

    if let Some(passage) = passage_text.map(plain_text).filter(|p| !p.is_empty()) {
        sections.push(format!("Passage:\n{}", passage));
    }

    sections.push(format!("Question:\n{}", plain_text(question_text)));

    if !options.is_empty() {
        let lines: Vec<String> = options
            .iter()
            .enumerate()
            .map(|(i, text)| format!("{}. {}", option_letter(i), plain_text(text)))
            .collect();
        sections.push(format!("Options:\n{}", lines.join("\n")));
    }

    sections.join("\n\n")
}

/// 根据已有提示生成说明
pub fn hint_instructions(previous_hints: &[String]) -> String {
    if previous_hints.is_empty() {
        return "This is the first hint. Give a gentle nudge in the right direction.".to_string();
    }

    let listed: Vec<String> = previous_hints
        .iter()
        .enumerate()
        .map(|(i, hint)| format!("{}. {}", i + 1, hint.trim()))
        .collect();

    format!(
        "The student has already received these hints:\n{}\n\nGive hint number {}. It must go one step further than the previous hints without repeating them.",
        listed.join("\n"),
        previous_hints.len() + 1
    )
}

/// 一次扫描替换模板里的占位符，替换进去的文本不会再被展开
fn substitute(template: &str, content: &str, instructions: Option<&str>) -> String {
    static TOKENS: OnceLock<Regex> = OnceLock::new();
    let tokens = TOKENS.get_or_init(|| {
        Regex::new(r"\{\{(QUESTION_CONTENT|HINT_INSTRUCTIONS|PREVIOUS_HINTS)\}\}")
            .expect("static regex")
    });

    tokens
        .replace_all(template, |caps: &regex::Captures<'_>| match (&caps[1], instructions) {
            ("QUESTION_CONTENT", _) => content.to_string(),
            (_, Some(text)) => text.to_string(),
            // 解析模板不认识提示占位符，原样保留
            (_, None) => caps[0].to_string(),
        })
        .into_owned()
}

/// 渲染提示模板
pub fn render_hint_prompt(template: &str, content: &str, previous_hints: &[String]) -> String {
    let instructions = hint_instructions(previous_hints);
    substitute(template, content, Some(&instructions))
}

/// 渲染解析模板
pub fn render_solution_prompt(template: &str, content: &str) -> String {
    substitute(template, content, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_carry_placeholders() {
        let store = PromptStore::default();
        assert!(store.hint_template().contains(QUESTION_CONTENT_TOKEN));
        assert!(store.hint_template().contains(HINT_INSTRUCTIONS_TOKEN));
        assert!(store.solution_template().contains(QUESTION_CONTENT_TOKEN));
        let defaults = store.defaults();
        assert_eq!(defaults.default_hint_prompt, store.hint_template());
    }

    #[test]
    fn test_plain_text_strips_markup() {
        assert_eq!(plain_text("<p>Hello&nbsp; <b>world</b></p>"), "Hello world");
        assert_eq!(plain_text("line one\n\n  line two "), "line one\nline two");
    }

    #[test]
    fn test_assemble_question_content() {
        let content = assemble_question_content(
            "Which is even?",
            Some("Numbers"),
            &["3".to_string(), "4".to_string()],
        );
        assert_eq!(
            content,
            "Passage:\nNumbers\n\nQuestion:\nWhich is even?\n\nOptions:\nA. 3\nB. 4"
        );

        let bare = assemble_question_content("Q", Some("   "), &[]);
        assert_eq!(bare, "Question:\nQ");
    }

    #[test]
    fn test_render_hint_substitutes_both_tokens() {
        let hints = vec!["look at B".to_string()];
        let rendered = render_hint_prompt(
            "[{{QUESTION_CONTENT}}] {{HINT_INSTRUCTIONS}} | {{PREVIOUS_HINTS}}",
            "CONTENT",
            &hints,
        );
        assert!(rendered.starts_with("[CONTENT] "));
        assert!(!rendered.contains("{{"));
        assert_eq!(rendered.matches("1. look at B").count(), 2);
        assert!(rendered.contains("hint number 2"));
    }

    #[test]
    fn test_inserted_text_is_not_expanded_again() {
        let hints = vec!["see {{QUESTION_CONTENT}}".to_string()];
        let rendered = render_hint_prompt(
            "{{QUESTION_CONTENT}} / {{HINT_INSTRUCTIONS}}",
            "Q mentions {{HINT_INSTRUCTIONS}} and {{PREVIOUS_HINTS}}",
            &hints,
        );
        assert!(rendered
            .starts_with("Q mentions {{HINT_INSTRUCTIONS}} and {{PREVIOUS_HINTS}} / "));
        assert!(rendered.contains("1. see {{QUESTION_CONTENT}}"));
        assert_eq!(rendered.matches("hint number 2").count(), 1);

        let solution = render_solution_prompt("{{QUESTION_CONTENT}}", "{{QUESTION_CONTENT}}");
        assert_eq!(solution, "{{QUESTION_CONTENT}}");
    }

    #[test]
    fn test_render_solution() {
        assert_eq!(render_solution_prompt("S: {{QUESTION_CONTENT}}", "X"), "S: X");
    }
}
