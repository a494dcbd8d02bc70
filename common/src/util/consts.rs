pub static NAME: &str = "docstron";
pub static VERSION: &str = env!("CARGO_PKG_VERSION");

pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const UPLOAD_FIELD: &str = "file";
pub const DEFAULT_DOWNLOAD_NAME: &str = "converted";

pub const NO_FILE_MESSAGE: &str = "No file uploaded.";
pub const INVALID_TYPE_MESSAGE: &str = "Please upload a PDF or DOCX file.";
pub const TOO_LARGE_MESSAGE: &str = "File size exceeds the 10MB limit.";
pub const CONVERSION_FAILED_MESSAGE: &str = "Error converting file.";
pub const BUSY_MESSAGE: &str = "Server is busy, please retry later.";
pub const NOT_FOUND_MESSAGE: &str = "File not found.";
pub const LIVENESS_MESSAGE: &str = "Docstron backend is live!";
