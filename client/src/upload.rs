use std::path::Path;

use common::{
    dtos::ConvertResponseDto,
    util::{
        consts::UPLOAD_FIELD,
        mime::get_content_type,
        routes::{absolute_url, convert_route},
    },
};
use futures::StreamExt;
use reqwest::{
    multipart::{Form, Part},
    Body, Url,
};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

use crate::{candidate::CandidateFile, error::ClientError};

/// Talks to the conversion service at a configured base URL.
#[derive(Debug, Clone)]
pub struct ConvertClient {
    http: reqwest::Client,
    base_url: String,
}

impl ConvertClient {
    pub fn new(base_url: &str) -> Result<ConvertClient, ClientError> {
        Url::parse(base_url).map_err(|_| ClientError::InvalidUrl(base_url.to_string()))?;
        Ok(ConvertClient {
            http: reqwest::Client::new(),
            base_url: base_url.to_string(),
        })
    }

    /// Uploads the file as multipart field `file`. `on_progress` receives
    /// `(bytes sent, total bytes)` every time a chunk is handed to the connection.
    pub async fn convert<F>(&self, candidate: &CandidateFile, on_progress: F) -> Result<ConvertResponseDto, ClientError>
    where
        F: Fn(u64, u64) + Send + Sync + 'static,
    {
        let file = File::open(&candidate.path).await?;
        let total = candidate.size;
        let mut sent: u64 = 0;
        let stream = ReaderStream::new(file).map(move |chunk| {
            if let Ok(bytes) = &chunk {
                sent += bytes.len() as u64;
                on_progress(sent, total);
            }
            chunk
        });

        let mime = get_content_type(None, &candidate.name).to_string();
        let part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(candidate.name.clone())
            .mime_str(&mime)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let url = absolute_url(&self.base_url, convert_route());
        info!("Uploading {} ({} bytes) to {}", &candidate.name, total, &url);
        let response = self.http.post(&url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!("Conversion failed with {}: {}", status, response.text().await.unwrap_or_default());
            return Err(ClientError::Status(status));
        }
        Ok(response.json::<ConvertResponseDto>().await?)
    }

    /// Streams the converted artifact to `destination`. A download that breaks
    /// off leaves no partial file behind.
    pub async fn download(&self, download_url: &str, destination: &Path) -> Result<u64, ClientError> {
        let response = self.http.get(download_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }
        let mut file = File::create(destination).await?;
        let written = match write_body(response, &mut file).await {
            Ok(written) => written,
            Err(err) => {
                drop(file);
                if let Err(remove_err) = fs::remove_file(destination).await {
                    warn!("Could not remove partial download {}: {}", destination.display(), remove_err);
                }
                return Err(err);
            }
        };
        info!("Saved {} bytes to {}", written, destination.display());
        Ok(written)
    }
}

async fn write_body(response: reqwest::Response, file: &mut File) -> Result<u64, ClientError> {
    let mut written: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        written += chunk.len() as u64;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    Ok(written)
}

