use async_trait::async_trait;
use chrono::NaiveDate;
use std::error::Error;
use std::path::PathBuf;

use crate::models::EventKind;

/// Persisted agent state: the last confirmed block per event kind and the
/// last successful daily-trigger date (UTC). Both survive restarts so the
/// backfiller can resume and the scheduler cannot double-fire.
#[async_trait]
pub trait CursorStorage: Send + Sync {
    async fn get_last_processed_block(
        &self,
        kind: EventKind,
    ) -> Result<Option<u64>, Box<dyn Error + Send + Sync>>;
    async fn save_last_processed_block(
        &self,
        kind: EventKind,
        block: u64,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
    async fn get_last_fired_date(
        &self,
    ) -> Result<Option<NaiveDate>, Box<dyn Error + Send + Sync>>;
    async fn save_last_fired_date(
        &self,
        date: NaiveDate,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

pub struct FileCursorStorage {
    storage_path: PathBuf,
}

impl FileCursorStorage {
    pub fn new(storage_path: impl Into<PathBuf>) -> Self {
        FileCursorStorage {
            storage_path: storage_path.into(),
        }
    }

    fn cursor_path(&self, kind: EventKind) -> PathBuf {
        self.storage_path.join(format!("{}_last_block.txt", kind))
    }

    fn fired_date_path(&self) -> PathBuf {
        self.storage_path.join("last_fired_date.txt")
    }
}

#[async_trait]
impl CursorStorage for FileCursorStorage {
    async fn get_last_processed_block(
        &self,
        kind: EventKind,
    ) -> Result<Option<u64>, Box<dyn Error + Send + Sync>> {
        let file_path = self.cursor_path(kind);

        if !file_path.exists() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(file_path).await?;
        let block_number = content.trim().parse()?;
        Ok(Some(block_number))
    }

    async fn save_last_processed_block(
        &self,
        kind: EventKind,
        block: u64,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        tokio::fs::create_dir_all(&self.storage_path).await?;
        tokio::fs::write(self.cursor_path(kind), block.to_string()).await?;
        Ok(())
    }

    async fn get_last_fired_date(
        &self,
    ) -> Result<Option<NaiveDate>, Box<dyn Error + Send + Sync>> {
        let file_path = self.fired_date_path();

        if !file_path.exists() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(file_path).await?;
        let date = content.trim().parse()?;
        Ok(Some(date))
    }

    async fn save_last_fired_date(
        &self,
        date: NaiveDate,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        tokio::fs::create_dir_all(&self.storage_path).await?;
        tokio::fs::write(self.fired_date_path(), date.to_string()).await?;
        Ok(())
    }
}
