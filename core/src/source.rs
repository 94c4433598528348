//! Loading documents from JSON (`.json`, object or array) and JSON Lines
//! (`.jsonl`) files, or from a directory tree containing them.

use crate::document::{DocumentId, DocumentStatus};
use crate::error::{Result as SearchResult, SearchError};
use crate::index::SearchServer;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDocument {
    pub id: DocumentId,
    pub text: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub ratings: Vec<i32>,
}

impl SearchServer {
    pub fn add_input_document(&mut self, doc: &InputDocument) -> SearchResult<()> {
        self.add_document(doc.id, &doc.text, doc.status, &doc.ratings)
    }

    /// Adds all of `docs` or none of them. Every document is checked, ids
    /// repeated within the batch included, before the index is touched.
    pub fn add_input_documents(&mut self, docs: &[InputDocument]) -> SearchResult<usize> {
        let mut batch_ids = HashSet::with_capacity(docs.len());
        for doc in docs {
            self.check_document(doc.id, &doc.text)?;
            if !batch_ids.insert(doc.id) {
                return Err(SearchError::DuplicateDocumentId(doc.id));
            }
        }
        for doc in docs {
            self.add_input_document(doc)?;
        }
        Ok(docs.len())
    }
}

/// Read every document under `path`, files in sorted path order.
pub fn load_documents<P: AsRef<Path>>(path: P) -> Result<Vec<InputDocument>> {
    let path = path.as_ref();
    let mut files: Vec<PathBuf> = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.with_context(|| format!("walking {}", path.display()))?;
            let p = entry.path();
            if p.is_file() && matches!(extension(p), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if path.is_file() {
        files.push(path.to_path_buf());
    } else {
        anyhow::bail!("no such file or directory: {}", path.display());
    }

    let mut docs = Vec::new();
    for file in files {
        if extension(&file) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
    }
    Ok(docs)
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|s| s.to_str())
}

fn read_jsonl(file: &Path, docs: &mut Vec<InputDocument>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    for (n, line) in BufReader::new(f).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: InputDocument = serde_json::from_str(&line).with_context(|| format!("{}:{}", file.display(), n + 1))?;
        docs.push(doc);
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<InputDocument>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parsing {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for (i, v) in arr.into_iter().enumerate() {
                let doc: InputDocument = serde_json::from_value(v).with_context(|| format!("{}[{}]", file.display(), i))?;
                docs.push(doc);
            }
        }
        serde_json::Value::Object(_) => {
            let doc: InputDocument = serde_json::from_value(json).with_context(|| format!("{}", file.display()))?;
            docs.push(doc);
        }
        _ => anyhow::bail!("{}: expected a document object or array", file.display()),
    }
    Ok(())
}
