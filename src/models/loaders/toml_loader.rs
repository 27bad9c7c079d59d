use crate::error::{AppError, AppResult};
use crate::models::test_document::TestDocument;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载试卷
///
/// 文件中没有写 `id` 时，用文件名（不含扩展名）作为试卷ID
pub async fn load_test_document(toml_file_path: &Path) -> AppResult<TestDocument> {
    let display = toml_file_path.display().to_string();

    let content = match fs::read_to_string(toml_file_path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound { resource: display });
        }
        Err(e) => return Err(AppError::file_read_failed(display, e)),
    };

    let mut document: TestDocument =
        toml::from_str(&content).map_err(|e| AppError::file_read_failed(display.clone(), e))?;

    if document.id.is_empty() {
        document.id = toml_file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
    }

    Ok(document)
}

/// 列出文件夹中所有 TOML 试卷的ID（按名称排序）
pub async fn list_test_ids(folder_path: &str) -> AppResult<Vec<String>> {
    let folder = PathBuf::from(folder_path);

    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?;

    let mut ids = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            if let Some(stem) = path.file_stem() {
                ids.push(stem.to_string_lossy().to_string());
            }
        }
    }

    ids.sort();
    tracing::debug!("在 {} 中找到 {} 份试卷", folder_path, ids.len());
    Ok(ids)
}
