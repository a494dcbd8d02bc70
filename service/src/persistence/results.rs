use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use chrono::{DateTime, Utc};
use common::{models::DocumentFormat, util::random::generate_30_alphanumeric};
use mime::Mime;
use tokio::{fs, sync::Mutex, task::JoinHandle};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct StoredResult {
    /// Public basename, e.g. `Xk2...9a.docx`.
    pub id: String,
    /// Name suggested to the browser on download.
    pub file_name: String,
    pub mime_type: Mime,
    pub path: PathBuf,
    pub expires_at: DateTime<Utc>,
}

/// Keeps converted files around for a while so the download link stays valid.
#[async_trait::async_trait]
pub trait ResultStorage: Send + Sync {
    async fn store(&self, source: &Path, format: DocumentFormat, file_name: &str) -> io::Result<StoredResult>;
    async fn get(&self, id: &str) -> Option<StoredResult>;
    async fn sweep_expired(&self, now: DateTime<Utc>) -> usize;
}

pub struct LocalResultStorage {
    directory: PathBuf,
    max_age: chrono::Duration,
    entries: Mutex<HashMap<String, StoredResult>>,
}

impl LocalResultStorage {
    /// Files left over from a previous run are not indexed and get removed.
    pub async fn build(directory: PathBuf, max_age: Duration) -> io::Result<LocalResultStorage> {
        if fs::try_exists(&directory).await? {
            fs::remove_dir_all(&directory).await?;
        }
        fs::create_dir_all(&directory).await?;
        Ok(LocalResultStorage {
            directory,
            max_age: chrono::Duration::from_std(max_age).unwrap_or_else(|_| chrono::Duration::days(1)),
            entries: Mutex::new(HashMap::new()),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[async_trait::async_trait]
impl ResultStorage for LocalResultStorage {
    async fn store(&self, source: &Path, format: DocumentFormat, file_name: &str) -> io::Result<StoredResult> {
        let id = format!("{}.{}", generate_30_alphanumeric(), format.extension());
        let path = self.directory.join(&id);
        move_file(source, &path).await?;
        let stored = StoredResult {
            id: id.clone(),
            file_name: file_name.to_string(),
            mime_type: format.mime_type(),
            path,
            expires_at: Utc::now() + self.max_age,
        };
        info!("Stored result {} until {}", &id, stored.expires_at);
        self.entries.lock().await.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: &str) -> Option<StoredResult> {
        let entries = self.entries.lock().await;
        entries.get(id).filter(|stored| stored.expires_at > Utc::now()).cloned()
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let expired: Vec<StoredResult> = {
            let mut entries = self.entries.lock().await;
            let ids: Vec<String> = entries.values().filter(|stored| stored.expires_at <= now).map(|stored| stored.id.clone()).collect();
            ids.iter().filter_map(|id| entries.remove(id)).collect()
        };
        for stored in &expired {
            match fs::remove_file(&stored.path).await {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => warn!("Error occured, while deleting result {}: {}", &stored.id, err),
            }
        }
        expired.len()
    }
}

/// Rename when possible, copy when the two paths sit on different filesystems.
async fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    if fs::rename(source, destination).await.is_ok() {
        return Ok(());
    }
    fs::copy(source, destination).await?;
    fs::remove_file(source).await
}

pub fn spawn_sweeper(storage: Arc<dyn ResultStorage>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let removed = storage.sweep_expired(Utc::now()).await;
            if removed > 0 {
                info!("Removed {} expired results", removed);
            }
        }
    })
}
