use std::{env, path::PathBuf, str::FromStr, time::Duration};

use common::util::consts::MAX_FILE_SIZE;

use crate::convert::ConverterScripts;

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub port: u16,
    pub public_base_url: String,
    pub upload_dir: PathBuf,
    pub max_file_size: u64,
    pub parallelism: usize,
    pub max_queued: usize,
    pub convert_timeout: Duration,
    pub max_age: Duration,
    pub sweep_interval: Duration,
    pub scripts: ConverterScripts,
}

impl ServiceSettings {
    pub fn from_env() -> Self {
        let port = get_port();
        ServiceSettings {
            port,
            public_base_url: get_public_base_url(port),
            upload_dir: get_upload_dir(),
            max_file_size: get_max_file_size(),
            parallelism: get_parallelism(),
            max_queued: get_max_queued(),
            convert_timeout: get_convert_timeout(),
            max_age: get_max_age(),
            sweep_interval: get_sweep_interval(),
            scripts: get_scripts(),
        }
    }

    /// Requests may take as long as a conversion plus time for the upload itself.
    pub fn request_timeout(&self) -> Duration {
        self.convert_timeout + Duration::from_secs(30)
    }

    /// Multipart framing adds a little on top of the file itself.
    pub fn body_limit(&self) -> usize {
        self.max_file_size as usize + 64 * 1024
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.upload_dir.join("tmp")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.upload_dir.join("results")
    }
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse::<T>().ok())
}

fn get_port() -> u16 {
    parse_env("PORT").unwrap_or(5000)
}

fn get_public_base_url(port: u16) -> String {
    env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| format!("http://localhost:{}", port))
}

fn get_upload_dir() -> PathBuf {
    env::var("UPLOAD_DIR").map(PathBuf::from).unwrap_or_else(|_| env::temp_dir().join("docstron"))
}

fn get_max_file_size() -> u64 {
    match parse_env("MAX_FILE_SIZE_BYTES") {
        Some(size) if size > 0 => size,
        _ => MAX_FILE_SIZE,
    }
}

fn get_parallelism() -> usize {
    match parse_env("PARALLELISM") {
        Some(parallelism) if parallelism > 0 => parallelism,
        _ => 4,
    }
}

fn get_max_queued() -> usize {
    parse_env("MAX_QUEUED_CONVERSIONS").unwrap_or(16)
}

fn get_convert_timeout() -> Duration {
    match parse_env("CONVERT_TIMEOUT_SECONDS") {
        Some(seconds) if seconds > 0 => Duration::from_secs(seconds),
        _ => Duration::from_secs(120),
    }
}

fn get_max_age() -> Duration {
    match parse_env("MAX_AGE_SECONDS") {
        Some(seconds) if seconds > 0 => Duration::from_secs(seconds),
        _ => Duration::from_secs(5 * 60),
    }
}

fn get_sweep_interval() -> Duration {
    match parse_env("SWEEP_INTERVAL_SECONDS") {
        Some(seconds) if seconds > 0 => Duration::from_secs(seconds),
        _ => Duration::from_secs(30),
    }
}

fn get_scripts() -> ConverterScripts {
    ConverterScripts {
        interpreter: env::var("CONVERTER_INTERPRETER").unwrap_or_else(|_| "python3".to_string()),
        pdf_to_docx: env::var("PDF_TO_DOCX_SCRIPT").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("convert_pdf_to_docx.py")),
        docx_to_pdf: env::var("DOCX_TO_PDF_SCRIPT").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("convert_docx_to_pdf.py")),
    }
}
