use std::{fmt, str::FromStr};

use mime::Mime;
use serde::{Deserialize, Serialize};

pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// The two document formats the converter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }

    pub fn mime_type(&self) -> Mime {
        match self {
            DocumentFormat::Pdf => mime::APPLICATION_PDF,
            DocumentFormat::Docx => Mime::from_str(DOCX_MIME).unwrap_or(mime::APPLICATION_OCTET_STREAM),
        }
    }

    pub fn opposite(&self) -> DocumentFormat {
        match self {
            DocumentFormat::Pdf => DocumentFormat::Docx,
            DocumentFormat::Docx => DocumentFormat::Pdf,
        }
    }

    /// Case-insensitive match on a bare extension without the dot.
    pub fn from_extension(extension: &str) -> Option<DocumentFormat> {
        if extension.eq_ignore_ascii_case("pdf") {
            Some(DocumentFormat::Pdf)
        } else if extension.eq_ignore_ascii_case("docx") {
            Some(DocumentFormat::Docx)
        } else {
            None
        }
    }

    /// Requires a real `.pdf`/`.docx` suffix, so `reportpdf` is not a pdf.
    pub fn from_file_name(file_name: &str) -> Option<DocumentFormat> {
        let (_, extension) = file_name.rsplit_once('.')?;
        DocumentFormat::from_extension(extension)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Which way a conversion runs. Always derived from the uploaded format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConversionDirection {
    PdfToDocx,
    DocxToPdf,
}

impl ConversionDirection {
    pub fn from_source(source: DocumentFormat) -> ConversionDirection {
        match source {
            DocumentFormat::Pdf => ConversionDirection::PdfToDocx,
            DocumentFormat::Docx => ConversionDirection::DocxToPdf,
        }
    }

    pub fn source(&self) -> DocumentFormat {
        match self {
            ConversionDirection::PdfToDocx => DocumentFormat::Pdf,
            ConversionDirection::DocxToPdf => DocumentFormat::Docx,
        }
    }

    pub fn target(&self) -> DocumentFormat {
        self.source().opposite()
    }
}

impl fmt::Display for ConversionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source(), self.target())
    }
}
