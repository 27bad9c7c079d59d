/// 试卷来源
///
/// 给定试卷ID，返回结构化的试卷，或者"不存在"/"获取失败"
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info};

use crate::clients::response::{error_from_response, join_url};
use crate::config::{Config, TestSourceKind};
use crate::error::{AppError, AppResult};
use crate::models::{list_test_ids, load_test_document, TestDocument};

/// 试卷来源能力
pub trait TestSource: Send + Sync {
    fn fetch_test(&self, test_id: &str) -> impl Future<Output = AppResult<TestDocument>> + Send;
}

fn check_test_id(test_id: &str) -> AppResult<&str> {
    let trimmed = test_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("test id is required".to_string()));
    }
    Ok(trimmed)
}

/// 通过 HTTP 获取试卷：`GET {base_url}/test/{id}`
pub struct HttpTestSource {
    client: Client,
    base_url: String,
}

impl HttpTestSource {
    /// 创建新的 HTTP 试卷来源
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
}

impl TestSource for HttpTestSource {
    async fn fetch_test(&self, test_id: &str) -> AppResult<TestDocument> {
        let test_id = check_test_id(test_id)?;
        let url = join_url(&self.base_url, &["test", test_id])?;
        debug!("获取试卷: {}", url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(match error_from_response("test-source", response).await {
                AppError::NotFound { .. } => AppError::test_not_found(test_id),
                other => other,
            });
        }

        let mut document: TestDocument = response.json().await?;
        if document.id.is_empty() {
            document.id = test_id.to_string();
        }

        info!(
            "✓ 已获取试卷 {}，共 {} 道题",
            document.id,
            document.question_count()
        );
        Ok(document)
    }
}

/// 从本地文件夹读取试卷：`{folder}/{id}.toml`
pub struct TomlTestSource {
    folder: PathBuf,
}

impl TomlTestSource {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    /// 列出可用的试卷ID
    pub async fn list_tests(&self) -> AppResult<Vec<String>> {
        list_test_ids(&self.folder.to_string_lossy()).await
    }
}

impl TestSource for TomlTestSource {
    async fn fetch_test(&self, test_id: &str) -> AppResult<TestDocument> {
        let test_id = check_test_id(test_id)?;
        if test_id.contains(['/', '\\']) || test_id.starts_with('.') {
            return Err(AppError::test_not_found(test_id));
        }

        let path = self.folder.join(format!("{}.toml", test_id));
        match load_test_document(&path).await {
            Ok(document) => Ok(document),
            Err(AppError::NotFound { .. }) => Err(AppError::test_not_found(test_id)),
            Err(e) => Err(e),
        }
    }
}

/// 按配置选择的试卷来源
pub enum ConfiguredTestSource {
    Http(HttpTestSource),
    Toml(TomlTestSource),
}

impl ConfiguredTestSource {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(match config.test_source {
            TestSourceKind::Http => Self::Http(HttpTestSource::new(
                &config.cms_base_url,
                Duration::from_secs(config.request_timeout_secs),
            )?),
            TestSourceKind::Toml => Self::Toml(TomlTestSource::new(&config.toml_folder)),
        })
    }
}

impl TestSource for ConfiguredTestSource {
    async fn fetch_test(&self, test_id: &str) -> AppResult<TestDocument> {
        match self {
            Self::Http(source) => source.fetch_test(test_id).await,
            Self::Toml(source) => source.fetch_test(test_id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_folder(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("exam_hint_viewer_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_toml_source_loads_and_lists() {
        let dir = temp_folder("toml_source");
        std::fs::write(
            dir.join("algebra.toml"),
            r#"
title = "Algebra"

[[sections]]
passageText = "x + 1 = 3"

[[sections.problems]]
text = "What is x?"
options = ["1", "2", "3"]
answer = 2
"#,
        )
        .unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let source = TomlTestSource::new(&dir);
        let document = tokio_test::block_on(source.fetch_test("algebra")).unwrap();
        assert_eq!(document.id, "algebra");
        assert_eq!(document.question_count(), 1);
        assert_eq!(document.sections[0].problems[0].answer.letter(), "B");

        let ids = tokio_test::block_on(source.list_tests()).unwrap();
        assert_eq!(ids, vec!["algebra".to_string()]);
    }

    #[test]
    fn test_toml_source_not_found() {
        let dir = temp_folder("toml_missing");
        let source = TomlTestSource::new(&dir);

        let err = tokio_test::block_on(source.fetch_test("nope")).unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));

        let err = tokio_test::block_on(source.fetch_test("../etc/passwd")).unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));

        let err = tokio_test::block_on(source.fetch_test("  ")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
