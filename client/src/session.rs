use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};

use common::{
    error::ValidationError,
    util::consts::{CONVERSION_FAILED_MESSAGE, MAX_FILE_SIZE},
    validation::{derive_download_name, validate_upload},
};
use tracing::warn;

use crate::{candidate::CandidateFile, error::ClientError, upload::ConvertClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FileSelected,
    Converting,
    Converted,
    Error,
}

/// Rounded upload percentage, `None` while the total is unknown.
pub fn upload_percent(loaded: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let percent = (loaded as f64 / total as f64 * 100.0).round();
    Some(percent.clamp(0.0, 100.0) as u8)
}

/// Shared view of the upload percentage, updated from the request body stream.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    percent: Arc<AtomicU8>,
}

impl ProgressTracker {
    pub fn record(&self, loaded: u64, total: u64) -> Option<u8> {
        let percent = upload_percent(loaded, total)?;
        self.percent.store(percent, Ordering::Relaxed);
        Some(percent)
    }

    pub fn get(&self) -> u8 {
        self.percent.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        self.percent.store(0, Ordering::Relaxed);
    }
}

/// State of one upload form:
/// `Idle -> FileSelected -> Converting -> Converted`, or
/// `Converting -> Error -> FileSelected` with the same file kept for a retry.
#[derive(Debug)]
pub struct UploadSession {
    candidate: Option<CandidateFile>,
    phase: Phase,
    progress: ProgressTracker,
    error: Option<String>,
    download_url: Option<String>,
    max_size: u64,
}

impl Default for UploadSession {
    fn default() -> Self {
        UploadSession::new(MAX_FILE_SIZE)
    }
}

impl UploadSession {
    pub fn new(max_size: u64) -> UploadSession {
        UploadSession {
            candidate: None,
            phase: Phase::Idle,
            progress: ProgressTracker::default(),
            error: None,
            download_url: None,
            max_size,
        }
    }

    /// A rejected file clears the current candidate and leaves the message in [`Self::error`].
    pub fn select(&mut self, candidate: CandidateFile) -> Result<(), ValidationError> {
        if let Err(err) = validate_upload(&candidate.name, candidate.size, self.max_size) {
            self.error = Some(err.to_string());
            self.candidate = None;
            self.phase = Phase::Idle;
            return Err(err);
        }
        self.candidate = Some(candidate);
        self.phase = Phase::FileSelected;
        self.progress.reset();
        self.error = None;
        self.download_url = None;
        Ok(())
    }

    /// `None` when there is nothing to send or a conversion is already running.
    /// A converted file may be sent again and gets a fresh result.
    pub fn begin_conversion(&mut self) -> Option<CandidateFile> {
        match self.phase {
            Phase::FileSelected | Phase::Error | Phase::Converted => {}
            Phase::Idle | Phase::Converting => return None,
        }
        let candidate = self.candidate.clone()?;
        self.phase = Phase::Converting;
        self.progress.reset();
        self.error = None;
        self.download_url = None;
        Some(candidate)
    }

    pub fn complete(&mut self, download_url: String) {
        self.download_url = Some(download_url);
        self.phase = Phase::Converted;
    }

    /// Only a generic message is kept, whatever the server said.
    pub fn fail(&mut self) {
        self.error = Some(CONVERSION_FAILED_MESSAGE.to_string());
        self.phase = Phase::Error;
    }

    pub fn dismiss_error(&mut self) {
        if self.phase == Phase::Error {
            self.phase = Phase::FileSelected;
            self.error = None;
        }
    }

    /// Runs one conversion round trip. `Ok(None)` means there was nothing to submit.
    pub async fn submit<F>(&mut self, client: &ConvertClient, on_progress: F) -> Result<Option<String>, ClientError>
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        let Some(candidate) = self.begin_conversion() else {
            return Ok(None);
        };
        let tracker = self.progress.clone();
        let result = client
            .convert(&candidate, move |loaded, total| {
                if let Some(percent) = tracker.record(loaded, total) {
                    on_progress(percent);
                }
            })
            .await;
        match result {
            Ok(response) => {
                self.complete(response.download_url.clone());
                Ok(Some(response.download_url))
            }
            Err(err) => {
                warn!("Conversion of {} failed: {}", &candidate.name, err);
                self.fail();
                Err(err)
            }
        }
    }

    pub fn download_name(&self) -> String {
        derive_download_name(self.candidate.as_ref().map(|candidate| candidate.name.as_str()))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn candidate(&self) -> Option<&CandidateFile> {
        self.candidate.as_ref()
    }

    pub fn progress(&self) -> u8 {
        self.progress.get()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn download_url(&self) -> Option<&str> {
        self.download_url.as_deref()
    }
}
