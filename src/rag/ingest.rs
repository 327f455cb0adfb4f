//! Offline index build: corpus readers plus the chunk -> embed -> write loop.
//!
//! Supported inputs:
//! - dataset records (`.jsonl` lines or a `.json` array of objects)
//! - PDF files, one document per page
//! - plain `.txt` / `.md` files

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use super::chunker::{Chunker, ChunkerConfig};
use super::sqlite::{IndexWriter, NewPassage};
use crate::core::errors::ProviderError;
use crate::embedding::EmbeddingProvider;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}: invalid record: {message}")]
    Record {
        path: String,
        line: usize,
        message: String,
    },
    #[error("failed to extract text from {path}: {message}")]
    Pdf { path: String, message: String },
    #[error("unsupported input file: {0}")]
    Unsupported(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// One source document before chunking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    pub source: String,
}

/// Which record fields hold the symptom description and the diagnosis.
#[derive(Debug, Clone)]
pub struct DatasetFields {
    pub symptoms: String,
    pub diagnosis: String,
}

impl Default for DatasetFields {
    fn default() -> Self {
        Self {
            symptoms: "text".to_string(),
            diagnosis: "diagnosis".to_string(),
        }
    }
}

/// Reads documents from a file, dispatching on its extension.
pub fn load_documents(path: &Path, fields: &DatasetFields) -> Result<Vec<Document>, IngestError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jsonl" | "json" => load_dataset_records(path, fields),
        "pdf" => load_pdf_pages(path),
        "txt" | "md" => {
            let text = read_to_string(path)?;
            Ok(vec![Document {
                text,
                source: display_name(path),
            }])
        }
        _ => Err(IngestError::Unsupported(path.display().to_string())),
    }
}

/// Each record becomes `"Symptoms: {symptoms} -> Disease: {diagnosis}"`.
pub fn load_dataset_records(
    path: &Path,
    fields: &DatasetFields,
) -> Result<Vec<Document>, IngestError> {
    let contents = read_to_string(path)?;
    let name = display_name(path);

    let records: Vec<(usize, Value)> = if contents.trim_start().starts_with('[') {
        let parsed: Value = serde_json::from_str(&contents).map_err(|e| IngestError::Record {
            path: name.clone(),
            line: e.line(),
            message: e.to_string(),
        })?;
        match parsed {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| (idx + 1, item))
                .collect(),
            _ => {
                return Err(IngestError::Record {
                    path: name,
                    line: 1,
                    message: "expected a JSON array of records".to_string(),
                })
            }
        }
    } else {
        let mut records = Vec::new();
        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let value = serde_json::from_str(line).map_err(|e| IngestError::Record {
                path: name.clone(),
                line: idx + 1,
                message: e.to_string(),
            })?;
            records.push((idx + 1, value));
        }
        records
    };

    records
        .into_iter()
        .map(|(line, record)| {
            let symptoms = field_text(&record, &fields.symptoms).ok_or_else(|| IngestError::Record {
                path: name.clone(),
                line,
                message: format!("missing field '{}'", fields.symptoms),
            })?;
            let diagnosis =
                field_text(&record, &fields.diagnosis).ok_or_else(|| IngestError::Record {
                    path: name.clone(),
                    line,
                    message: format!("missing field '{}'", fields.diagnosis),
                })?;
            Ok(Document {
                text: format!("Symptoms: {} -> Disease: {}", symptoms, diagnosis),
                source: format!("{}:{}", name, line),
            })
        })
        .collect()
}

fn field_text(record: &Value, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(text) => Some(text.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// One document per page; pdf-extract separates pages with form feeds.
pub fn load_pdf_pages(path: &Path) -> Result<Vec<Document>, IngestError> {
    let text = pdf_extract::extract_text(path).map_err(|e| IngestError::Pdf {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(split_pages(&text, &display_name(path)))
}

fn split_pages(text: &str, name: &str) -> Vec<Document> {
    text.split('\u{c}')
        .enumerate()
        .filter(|(_, page)| !page.trim().is_empty())
        .map(|(idx, page)| Document {
            text: page.to_string(),
            source: format!("{}#page={}", name, idx + 1),
        })
        .collect()
}

fn read_to_string(path: &Path) -> Result<String, IngestError> {
    fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    pub documents: usize,
    pub passages: usize,
}

/// Chunks documents, embeds the chunks in batches and writes the index.
pub struct IndexBuilder {
    embedder: Arc<dyn EmbeddingProvider>,
    chunker: Chunker,
    batch_size: usize,
}

impl IndexBuilder {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        chunker: ChunkerConfig,
        batch_size: usize,
    ) -> Self {
        Self {
            embedder,
            chunker: Chunker::new(chunker),
            batch_size: batch_size.max(1),
        }
    }

    pub async fn build(
        &self,
        documents: &[Document],
        output: &Path,
    ) -> Result<BuildReport, IngestError> {
        // Sources repeat across same-named inputs, so the document position
        // keeps ids unique within one build.
        let passages: Vec<NewPassage> = documents
            .iter()
            .enumerate()
            .flat_map(|(doc_no, doc)| {
                self.chunker
                    .split(&doc.text, &doc.source)
                    .into_iter()
                    .map(move |chunk| NewPassage {
                        id: format!("{}:{}#{}", doc_no, chunk.source, chunk.chunk_index),
                        content: chunk.text,
                        source: chunk.source,
                    })
            })
            .collect();

        tracing::info!(
            "Prepared {} passages from {} documents (chunk size {}, overlap {})",
            passages.len(),
            documents.len(),
            self.chunker.config().chunk_size,
            self.chunker.config().chunk_overlap
        );

        let mut writer = IndexWriter::create(output, self.embedder.model_name()).await?;

        for (batch_no, batch) in passages.chunks(self.batch_size).enumerate() {
            let inputs: Vec<String> = batch.iter().map(|p| p.content.clone()).collect();
            let vectors = self.embedder.embed(&inputs).await?;
            if vectors.len() != batch.len() {
                return Err(ProviderError::Malformed {
                    provider: "embedding",
                    message: format!(
                        "expected {} embeddings, received {}",
                        batch.len(),
                        vectors.len()
                    ),
                }
                .into());
            }

            let items: Vec<(NewPassage, Vec<f32>)> =
                batch.iter().cloned().zip(vectors).collect();
            writer.insert_batch(&items).await?;
            tracing::debug!("Embedded batch {} ({} passages)", batch_no + 1, batch.len());
        }

        let written = writer.finish().await?;
        Ok(BuildReport {
            documents: documents.len(),
            passages: written,
        })
    }
}
