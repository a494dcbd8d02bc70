use std::{io, sync::Arc};

use crate::{
    convert::{ConversionPool, Converter, ScriptConverter},
    persistence::{
        results::{LocalResultStorage, ResultStorage},
        tempfiles::TempFileProvider,
    },
    settings::ServiceSettings,
};

pub type Services = Arc<ServiceCollection>;

pub struct ServiceCollection {
    pub settings: ServiceSettings,
    pub temp_files: TempFileProvider,
    pub conversion_pool: ConversionPool,
    pub result_storage: Arc<dyn ResultStorage>,
}

impl ServiceCollection {
    pub async fn build(settings: ServiceSettings) -> io::Result<Services> {
        let converter = Arc::new(ScriptConverter {
            scripts: settings.scripts.clone(),
            timeout: settings.convert_timeout,
        });
        Self::build_with_converter(settings, converter).await
    }

    pub async fn build_with_converter(settings: ServiceSettings, converter: Arc<dyn Converter>) -> io::Result<Services> {
        let temp_files = TempFileProvider::build(settings.tmp_dir()).await?;
        let result_storage = Arc::new(LocalResultStorage::build(settings.results_dir(), settings.max_age).await?);
        Ok(Arc::new(ServiceCollection {
            conversion_pool: ConversionPool::new(converter, settings.parallelism, settings.max_queued),
            temp_files,
            result_storage,
            settings,
        }))
    }
}
