//! SQLite-backed vector index.
//!
//! The offline build writes passages and little-endian f32 embedding blobs
//! into a single SQLite file. At query time the whole file is loaded into
//! memory once and searched with brute-force cosine similarity.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::store::{Passage, VectorIndex};
use super::vector_math::{deserialize_embedding, rank_descending_by_cosine, serialize_embedding};
use crate::core::errors::ProviderError;

const META_EMBEDDING_MODEL: &str = "embedding_model";
const META_DIMENSION: &str = "dimension";

/// Read-only, fully in-memory view of a built index.
pub struct SqliteVectorIndex {
    passages: Vec<Passage>,
    embeddings: Vec<Vec<f32>>,
    dimension: usize,
    embedding_model: Option<String>,
}

impl SqliteVectorIndex {
    pub async fn open(path: &Path) -> Result<Self, ProviderError> {
        if !path.exists() {
            return Err(ProviderError::Storage(format!(
                "index not found at {}",
                path.display()
            )));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(ProviderError::storage)?;

        let loaded = Self::load(&pool).await;
        pool.close().await;
        let index = loaded?;

        tracing::info!(
            "Loaded vector index {} ({} passages, dimension {}, model {})",
            path.display(),
            index.passages.len(),
            index.dimension,
            index.embedding_model.as_deref().unwrap_or("unknown")
        );
        Ok(index)
    }

    async fn load(pool: &SqlitePool) -> Result<Self, ProviderError> {
        let embedding_model: Option<String> =
            sqlx::query_scalar("SELECT value FROM index_meta WHERE key = ?1")
                .bind(META_EMBEDDING_MODEL)
                .fetch_optional(pool)
                .await
                .map_err(ProviderError::storage)?;

        let declared_dimension: Option<String> =
            sqlx::query_scalar("SELECT value FROM index_meta WHERE key = ?1")
                .bind(META_DIMENSION)
                .fetch_optional(pool)
                .await
                .map_err(ProviderError::storage)?;
        let declared_dimension = declared_dimension
            .map(|value| {
                value.parse::<usize>().map_err(|_| {
                    ProviderError::Storage(format!("invalid dimension in index_meta: {value}"))
                })
            })
            .transpose()?;

        let rows = sqlx::query("SELECT content, embedding FROM passages ORDER BY rowid")
            .fetch_all(pool)
            .await
            .map_err(ProviderError::storage)?;

        let mut passages = Vec::with_capacity(rows.len());
        let mut embeddings = Vec::with_capacity(rows.len());
        for row in rows {
            let content: String = row.get("content");
            let blob: Vec<u8> = row.get("embedding");
            passages.push(Passage { content });
            embeddings.push(deserialize_embedding(&blob));
        }

        let dimension = declared_dimension
            .or_else(|| embeddings.first().map(Vec::len))
            .unwrap_or(0);
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimension) {
            return Err(ProviderError::Storage(format!(
                "corrupt index: passage embedding has dimension {}, expected {}",
                bad.len(),
                dimension
            )));
        }

        Ok(Self {
            passages,
            embeddings,
            dimension,
            embedding_model,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn embedding_model(&self) -> Option<&str> {
        self.embedding_model.as_deref()
    }
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<Passage>, ProviderError> {
        if self.passages.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        if query_embedding.len() != self.dimension {
            return Err(ProviderError::DimensionMismatch {
                expected: self.dimension,
                actual: query_embedding.len(),
            });
        }

        Ok(rank_descending_by_cosine(query_embedding, &self.embeddings)
            .into_iter()
            .take(limit)
            .filter_map(|(idx, _)| self.passages.get(idx).cloned())
            .collect())
    }

    fn len(&self) -> usize {
        self.passages.len()
    }
}

/// A passage about to be written by the offline build.
#[derive(Debug, Clone)]
pub struct NewPassage {
    pub id: String,
    pub content: String,
    pub source: String,
}

/// Writes a fresh index file. Any existing file at the path is replaced.
pub struct IndexWriter {
    pool: SqlitePool,
    path: PathBuf,
    dimension: Option<usize>,
    written: usize,
}

impl IndexWriter {
    pub async fn create(path: &Path, embedding_model: &str) -> Result<Self, ProviderError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(ProviderError::storage)?;
            }
        }
        if path.exists() {
            fs::remove_file(path).map_err(ProviderError::storage)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Delete)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(ProviderError::storage)?;

        let writer = Self {
            pool,
            path: path.to_path_buf(),
            dimension: None,
            written: 0,
        };
        writer.init_schema().await?;
        writer.put_meta(META_EMBEDDING_MODEL, embedding_model).await?;
        Ok(writer)
    }

    async fn init_schema(&self) -> Result<(), ProviderError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS passages (
                id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                source TEXT NOT NULL DEFAULT '',
                embedding BLOB NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ProviderError::storage)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS index_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ProviderError::storage)?;

        Ok(())
    }

    async fn put_meta(&self, key: &str, value: &str) -> Result<(), ProviderError> {
        sqlx::query("INSERT OR REPLACE INTO index_meta (key, value) VALUES (?1, ?2)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(ProviderError::storage)?;
        Ok(())
    }

    /// Inserts one batch in a single transaction. All embeddings written to
    /// one index must share a dimension.
    pub async fn insert_batch(
        &mut self,
        items: &[(NewPassage, Vec<f32>)],
    ) -> Result<(), ProviderError> {
        if items.is_empty() {
            return Ok(());
        }

        // The dimension is only recorded once the whole batch has passed.
        let expected = self.dimension.unwrap_or(items[0].1.len());
        for (_, embedding) in items {
            if embedding.len() != expected || expected == 0 {
                return Err(ProviderError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                });
            }
        }

        let mut tx = self.pool.begin().await.map_err(ProviderError::storage)?;

        // Plain INSERT: a repeated id fails the batch instead of replacing a row.
        for (passage, embedding) in items {
            sqlx::query(
                "INSERT INTO passages (id, content, source, embedding)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(&passage.id)
            .bind(&passage.content)
            .bind(&passage.source)
            .bind(serialize_embedding(embedding))
            .execute(&mut *tx)
            .await
            .map_err(ProviderError::storage)?;
        }

        tx.commit().await.map_err(ProviderError::storage)?;
        self.dimension = Some(expected);
        self.written += items.len();
        Ok(())
    }

    /// Records the dimension and closes the file. Returns the passage count.
    pub async fn finish(self) -> Result<usize, ProviderError> {
        if let Some(dimension) = self.dimension {
            self.put_meta(META_DIMENSION, &dimension.to_string()).await?;
        }
        self.pool.close().await;
        tracing::info!(
            "Wrote {} passages to {}",
            self.written,
            self.path.display()
        );
        Ok(self.written)
    }
}
