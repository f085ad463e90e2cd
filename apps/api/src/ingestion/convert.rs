//! Document normalisation: every accepted CV ends up as PDF bytes.
//!
//! Office formats are converted with a headless office suite inside a
//! throwaway temp directory.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Output;

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::ToolConfig;
use crate::errors::AppError;
use crate::uploads::{extension, safe_file_name};

const OFFICE_EXTENSIONS: &[&str] = &["doc", "docx", "odt", "rtf"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Office,
}

/// Classifies an upload by file extension.
pub fn detect_kind(file_name: &str) -> Result<DocumentKind, AppError> {
    match extension(file_name).as_deref() {
        Some("pdf") => Ok(DocumentKind::Pdf),
        Some(ext) if OFFICE_EXTENSIONS.contains(&ext) => Ok(DocumentKind::Office),
        _ => Err(AppError::Validation(format!(
            "Unsupported CV format for '{file_name}'. Accepted: pdf, {}",
            OFFICE_EXTENSIONS.join(", ")
        ))),
    }
}

/// Returns the document as PDF bytes, converting office formats first.
pub async fn prepare_pdf(
    tools: &ToolConfig,
    file_name: &str,
    bytes: &[u8],
) -> Result<Vec<u8>, AppError> {
    if bytes.is_empty() {
        return Err(AppError::Validation(format!("File '{file_name}' is empty")));
    }
    match detect_kind(file_name)? {
        DocumentKind::Pdf => {
            if !bytes.starts_with(b"%PDF") {
                return Err(AppError::Validation(format!(
                    "File '{file_name}' is not a valid PDF"
                )));
            }
            Ok(bytes.to_vec())
        }
        DocumentKind::Office => convert_to_pdf(tools, file_name, bytes).await,
    }
}

async fn convert_to_pdf(
    tools: &ToolConfig,
    file_name: &str,
    bytes: &[u8],
) -> Result<Vec<u8>, AppError> {
    let dir = tempfile::tempdir()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create temp dir: {e}")))?;
    let input_name = safe_file_name(file_name);
    let input_path = dir.path().join(&input_name);
    tokio::fs::write(&input_path, bytes)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to stage upload: {e}")))?;

    info!("Converting '{file_name}' to PDF");
    run_tool(
        &tools.soffice_bin,
        &[
            OsStr::new("--headless"),
            OsStr::new("--convert-to"),
            OsStr::new("pdf"),
            OsStr::new("--outdir"),
            dir.path().as_os_str(),
            input_path.as_os_str(),
        ],
    )
    .await?;

    let pdf_path = converted_path(dir.path(), &input_name);
    let pdf = tokio::fs::read(&pdf_path).await.map_err(|_| {
        AppError::UnprocessableEntity(format!("Conversion of '{file_name}' produced no PDF"))
    })?;
    debug!("Converted '{file_name}' ({} bytes of PDF)", pdf.len());
    Ok(pdf)
}

/// Where the converter writes its output: same stem, `.pdf` extension.
fn converted_path(dir: &Path, input_name: &str) -> std::path::PathBuf {
    dir.join(Path::new(input_name).with_extension("pdf"))
}

/// Runs an external tool to completion. A missing binary is an internal
/// error; a non-zero exit means the document could not be processed.
pub(crate) async fn run_tool(
    program: &str,
    args: &[&OsStr],
) -> Result<Output, AppError> {
    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to run '{program}': {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::UnprocessableEntity(format!(
            "'{program}' exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_kind() {
        assert_eq!(detect_kind("cv.pdf").unwrap(), DocumentKind::Pdf);
        assert_eq!(detect_kind("CV.DOC").unwrap(), DocumentKind::Office);
        assert_eq!(detect_kind("cv.docx").unwrap(), DocumentKind::Office);
        assert!(matches!(
            detect_kind("cv.png"),
            Err(AppError::Validation(_))
        ));
        assert!(detect_kind("cv").is_err());
    }

    #[test]
    fn test_converted_path_swaps_extension() {
        let path = converted_path(Path::new("/tmp/x"), "Mario Rossi.docx");
        assert_eq!(path, Path::new("/tmp/x/Mario Rossi.pdf"));
    }

    #[tokio::test]
    async fn test_empty_file_rejected_before_conversion() {
        let err = prepare_pdf(&ToolConfig::default(), "cv.docx", b"")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_pdf_passthrough_checks_magic() {
        let tools = ToolConfig::default();
        let pdf = prepare_pdf(&tools, "cv.pdf", b"%PDF-1.7 body").await.unwrap();
        assert_eq!(pdf, b"%PDF-1.7 body");
        assert!(prepare_pdf(&tools, "cv.pdf", b"GIF89a").await.is_err());
    }

    #[tokio::test]
    async fn test_missing_tool_is_internal_error() {
        let err = run_tool("definitely-not-a-real-binary-xyz", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
