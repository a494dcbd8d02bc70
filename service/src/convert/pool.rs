use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use common::models::ConversionDirection;
use tokio::sync::Semaphore;
use tracing::info;

use crate::error::ConversionError;

use super::Converter;

/// Caps how many conversions run at once and how many may wait for a slot.
///
/// A request that finds every running and waiting slot taken is refused with
/// [`ConversionError::Busy`] instead of queueing without bound.
pub struct ConversionPool {
    converter: Arc<dyn Converter>,
    admission: Arc<Semaphore>,
    workers: Arc<Semaphore>,
}

impl ConversionPool {
    pub fn new(converter: Arc<dyn Converter>, parallelism: usize, max_queued: usize) -> Self {
        let parallelism = parallelism.max(1);
        ConversionPool {
            converter,
            admission: Arc::new(Semaphore::new(parallelism + max_queued)),
            workers: Arc::new(Semaphore::new(parallelism)),
        }
    }

    pub async fn convert(&self, input: &Path, direction: ConversionDirection) -> Result<PathBuf, ConversionError> {
        let _admitted = self.admission.clone().try_acquire_owned().map_err(|_| ConversionError::Busy)?;
        let _worker = self.workers.clone().acquire_owned().await.map_err(|_| ConversionError::Busy)?;
        info!("Converting with {} free slots", self.workers.available_permits());
        self.converter.convert(input, direction).await
    }

    pub fn available_slots(&self) -> usize {
        self.admission.available_permits()
    }
}
