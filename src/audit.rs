use crate::error::Result;
use crate::models::AlertRecord;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};

/// Append-only audit trail for dispatched alerts. Ordering is call order;
/// nothing is ever read back through this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, record: &AlertRecord) -> Result<()>;
}

/// Writes one JSON object per line and keeps the latest records in memory.
#[derive(Debug)]
pub struct AuditLog {
    records: RwLock<VecDeque<AlertRecord>>,
    max_records: usize,
    log_file: Option<PathBuf>,
    file: Option<Mutex<File>>,
}

impl AuditLog {
    pub async fn new(max_records: usize, log_file: Option<PathBuf>) -> Result<Self> {
        let file = match &log_file {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                Some(Mutex::new(
                    OpenOptions::new().create(true).append(true).open(path).await?,
                ))
            }
            None => None,
        };

        Ok(Self {
            records: RwLock::new(VecDeque::with_capacity(max_records)),
            max_records,
            log_file,
            file,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Most recent records first.
    pub async fn recent(&self, limit: usize) -> Vec<AlertRecord> {
        let records = self.records.read().await;
        records.iter().rev().take(limit).cloned().collect()
    }
}

#[async_trait]
impl AuditSink for AuditLog {
    async fn append(&self, record: &AlertRecord) -> Result<()> {
        // The tail only ever shows what reached the file.
        if let Some(file) = &self.file {
            let mut line = serde_json::to_string(record)?;
            line.push('\n');
            let mut file = file.lock().await;
            file.write_all(line.as_bytes()).await?;
            file.flush().await?;
        }

        if self.max_records > 0 {
            let mut records = self.records.write().await;
            if records.len() >= self.max_records {
                records.pop_front();
            }
            records.push_back(record.clone());
        }

        Ok(())
    }
}
