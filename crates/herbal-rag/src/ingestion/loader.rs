//! Reads a category folder of plain-text source documents

use std::path::Path;
use walkdir::WalkDir;

use crate::error::Result;
use crate::types::{Category, SourceDocument};

/// Load every `.txt` file directly inside `dir`, in file-name order
///
/// A missing folder yields no documents; unreadable files are logged and skipped.
pub async fn load_documents(dir: &Path, category: Category) -> Result<Vec<SourceDocument>> {
    if !dir.is_dir() {
        tracing::warn!(
            category = %category,
            path = %dir.display(),
            "Source folder not found, skipping category"
        );
        return Ok(Vec::new());
    }

    let mut documents = Vec::new();
    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in entries {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        let is_txt = path.extension().map_or(false, |ext| ext == "txt");
        if !entry.file_type().is_file() || !is_txt {
            continue;
        }

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot read source document, skipping");
                continue;
            }
        };
        documents.push(SourceDocument::new(path.to_path_buf(), category, content));
    }

    tracing::debug!(
        category = %category,
        path = %dir.display(),
        count = documents.len(),
        "Loaded source documents"
    );

    Ok(documents)
}
