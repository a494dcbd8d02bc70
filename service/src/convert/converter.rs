use std::{
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use common::models::ConversionDirection;
use tokio::{fs, process::Command};
use tracing::{debug, info};

use crate::error::ConversionError;

#[async_trait::async_trait]
pub trait Converter: Send + Sync {
    /// Converts `input` and returns the path of the produced file.
    async fn convert(&self, input: &Path, direction: ConversionDirection) -> Result<PathBuf, ConversionError>;
}

/// The external scripts, one per direction, each run as
/// `<interpreter> <script> <input> <output>`.
#[derive(Debug, Clone)]
pub struct ConverterScripts {
    pub interpreter: String,
    pub pdf_to_docx: PathBuf,
    pub docx_to_pdf: PathBuf,
}

impl ConverterScripts {
    pub fn script_for(&self, direction: ConversionDirection) -> &Path {
        match direction {
            ConversionDirection::PdfToDocx => &self.pdf_to_docx,
            ConversionDirection::DocxToPdf => &self.docx_to_pdf,
        }
    }
}

pub struct ScriptConverter {
    pub scripts: ConverterScripts,
    pub timeout: Duration,
}

/// The output sits next to the input with the target extension.
pub fn output_path(input: &Path, direction: ConversionDirection) -> PathBuf {
    input.with_extension(direction.target().extension())
}

#[async_trait::async_trait]
impl Converter for ScriptConverter {
    #[tracing::instrument(skip(self))]
    async fn convert(&self, input: &Path, direction: ConversionDirection) -> Result<PathBuf, ConversionError> {
        let output = output_path(input, direction);
        let script = self.scripts.script_for(direction);
        info!("Running {} {} for {}", &self.scripts.interpreter, script.display(), direction);

        let child = Command::new(&self.scripts.interpreter)
            .arg(script)
            .arg(input)
            .arg(&output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ConversionError::Spawn {
                program: self.scripts.interpreter.clone(),
                source,
            })?;

        // dropping the child on timeout kills it
        let result = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ConversionError::TimedOut(self.timeout))??;

        let stdout = String::from_utf8_lossy(&result.stdout);
        if !stdout.trim().is_empty() {
            debug!("Converter output: {}", stdout.trim());
        }
        if !result.status.success() {
            return Err(ConversionError::Failed {
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        if !fs::try_exists(&output).await.unwrap_or(false) {
            return Err(ConversionError::MissingOutput(output));
        }
        Ok(output)
    }
}
