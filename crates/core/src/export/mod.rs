//! Document exporters: standalone HTML, PDF and DOCX.
//!
//! PDF and DOCX are behind the `pdf` and `docx` cargo features. With a
//! feature disabled the corresponding format reports
//! [`ExportError::Unavailable`] instead of failing to compile callers.

pub mod html;

#[cfg(feature = "docx")]
pub mod docx;
#[cfg(feature = "pdf")]
pub mod pdf;

use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Date format used in the "Generated on" line of every exporter.
pub const GENERATED_ON_FORMAT: &str = "%d/%m/%Y %H:%M";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Export to {0} is not available in this build")]
    Unavailable(&'static str),

    #[error("Invalid export format '{0}'. Must be one of: html, pdf, docx")]
    UnknownFormat(String),

    #[error("DOCX packaging failed: {0}")]
    Docx(String),
}

impl From<ExportError> for CoreError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Unavailable(_) => CoreError::Unsupported(err.to_string()),
            ExportError::UnknownFormat(_) => CoreError::Validation(err.to_string()),
            other => CoreError::Internal(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Html,
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Result<Self, ExportError> {
        match s {
            "html" => Ok(Self::Html),
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }

    /// Whether this build can produce the format.
    pub fn is_available(self) -> bool {
        match self {
            Self::Html => true,
            Self::Pdf => cfg!(feature = "pdf"),
            Self::Docx => cfg!(feature = "docx"),
        }
    }
}

/// Everything an exporter needs about a rendered document.
#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub title: String,
    pub template_title: String,
    /// Rendered content (placeholders already substituted).
    pub body: String,
    pub generated_at: Timestamp,
}

impl ExportDocument {
    pub fn generated_on(&self) -> String {
        format!(
            "Generated on {}",
            self.generated_at.format(GENERATED_ON_FORMAT)
        )
    }

    pub fn footer(&self) -> String {
        format!("Document generated from template: {}", self.template_title)
    }
}

/// Filesystem-safe stem for an attachment named after `title`.
///
/// Spaces become underscores and path-hostile characters are dropped. An
/// empty result falls back to `document`.
pub fn filename_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    if stem.is_empty() {
        "document".to_string()
    } else {
        stem
    }
}

/// Attachment filename for an exported document.
pub fn export_filename(title: &str, format: ExportFormat) -> String {
    format!("{}.{}", filename_stem(title), format.extension())
}

/// Produce the bytes of `doc` in `format`.
pub fn export_document(doc: &ExportDocument, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Html => Ok(html::render_html(doc).into_bytes()),
        ExportFormat::Pdf => export_pdf(doc),
        ExportFormat::Docx => export_docx(doc),
    }
}

#[cfg(feature = "pdf")]
fn export_pdf(doc: &ExportDocument) -> Result<Vec<u8>, ExportError> {
    Ok(pdf::render_pdf(doc))
}

#[cfg(not(feature = "pdf"))]
fn export_pdf(_doc: &ExportDocument) -> Result<Vec<u8>, ExportError> {
    Err(ExportError::Unavailable("PDF"))
}

#[cfg(feature = "docx")]
fn export_docx(doc: &ExportDocument) -> Result<Vec<u8>, ExportError> {
    docx::render_docx(doc)
}

#[cfg(not(feature = "docx"))]
fn export_docx(_doc: &ExportDocument) -> Result<Vec<u8>, ExportError> {
    Err(ExportError::Unavailable("DOCX"))
}
