//! Message persistence.
//!
//! Successful transformations are recorded fire-and-forget: a store
//! failure is logged and never affects the HTTP response.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::validate::TransformResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub source: String,
    pub input: String,
    pub result: TransformResult,
}

impl MessageRecord {
    pub fn new(source: &str, input: &str, result: TransformResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            source: source.to_string(),
            input: input.to_string(),
            result,
        }
    }
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn record(&self, entry: &MessageRecord) -> Result<()>;
}

/// Append-only JSONL file, one record per line.
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MessageStore for JsonlStore {
    async fn record(&self, entry: &MessageRecord) -> Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.ok();
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        file.write_all(line.as_bytes())
            .await
            .context("Failed to append message record")?;
        Ok(())
    }
}

/// Discards everything. Used when persistence is disabled and in tests.
pub struct NullStore;

#[async_trait]
impl MessageStore for NullStore {
    async fn record(&self, _entry: &MessageRecord) -> Result<()> {
        Ok(())
    }
}
