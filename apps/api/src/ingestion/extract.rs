//! PDF text extraction with an OCR fallback for scanned documents.

use std::ffi::OsStr;

use tracing::{info, warn};

use crate::config::ToolConfig;
use crate::errors::AppError;
use crate::ingestion::convert::run_tool;

/// Below this many non-whitespace characters a PDF is treated as scanned.
pub const MIN_TEXT_CHARS: usize = 20;
const OCR_DPI: &str = "300";

/// Extracts text from PDF bytes, running OCR when the embedded text layer is
/// missing or too thin. Fails when neither yields any text.
pub async fn extract_text(tools: &ToolConfig, pdf: Vec<u8>) -> Result<String, AppError> {
    let embedded = extract_embedded_text(pdf.clone()).await;
    if !needs_ocr(&embedded) {
        return Ok(normalize_text(&embedded));
    }

    info!(
        "PDF text layer has {} usable characters; running OCR",
        meaningful_chars(&embedded)
    );
    let ocr_text = ocr_pdf(tools, &pdf).await?;
    let text = normalize_text(&ocr_text);
    if text.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "No text extracted from document".to_string(),
        ));
    }
    Ok(text)
}

/// Text from the PDF's own text layer. Parser failures (including panics
/// inside the parser) yield an empty string so OCR can take over.
pub async fn extract_embedded_text(pdf: Vec<u8>) -> String {
    match tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf)).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!("PDF text extraction failed: {e:?}");
            String::new()
        }
        Err(e) => {
            warn!("PDF text extraction aborted: {e}");
            String::new()
        }
    }
}

pub fn needs_ocr(text: &str) -> bool {
    meaningful_chars(text) < MIN_TEXT_CHARS
}

fn meaningful_chars(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// Strips trailing whitespace from every line and collapses runs of blank
/// lines into one.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            out.push('\n');
        } else {
            blank_run = 0;
            out.push_str(line);
            out.push('\n');
        }
    }
    out.trim().to_string()
}

/// Rasterises each page and OCRs it, concatenating page texts in order.
async fn ocr_pdf(tools: &ToolConfig, pdf: &[u8]) -> Result<String, AppError> {
    let dir = tempfile::tempdir()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create temp dir: {e}")))?;
    let input = dir.path().join("input.pdf");
    tokio::fs::write(&input, pdf)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to stage PDF for OCR: {e}")))?;

    let prefix = dir.path().join("page");
    run_tool(
        &tools.pdftoppm_bin,
        &[
            OsStr::new("-r"),
            OsStr::new(OCR_DPI),
            OsStr::new("-png"),
            input.as_os_str(),
            prefix.as_os_str(),
        ],
    )
    .await?;

    let mut pages = Vec::new();
    let mut entries = tokio::fs::read_dir(dir.path())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to list OCR pages: {e}")))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to list OCR pages: {e}")))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_page_image(&name) {
            pages.push(entry.path());
        }
    }
    // pdftoppm zero-pads page numbers to a common width, so name order is page order.
    pages.sort();

    let mut text = String::new();
    for page in &pages {
        let output = run_tool(
            &tools.tesseract_bin,
            &[
                page.as_os_str(),
                OsStr::new("stdout"),
                OsStr::new("-l"),
                OsStr::new(&tools.ocr_lang),
            ],
        )
        .await?;
        text.push_str(&String::from_utf8_lossy(&output.stdout));
        text.push('\n');
    }
    info!("OCR processed {} page(s)", pages.len());
    Ok(text)
}

fn is_page_image(name: &str) -> bool {
    name.starts_with("page") && name.ends_with(".png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_ocr_threshold() {
        assert!(needs_ocr(""));
        assert!(needs_ocr(" \n\t \n"));
        assert!(needs_ocr("Mario Rossi"));
        assert!(!needs_ocr("Mario Rossi, Senior Backend Engineer, Milano"));
    }

    #[test]
    fn test_normalize_collapses_blank_runs() {
        let raw = "  Mario Rossi   \n\n\n\nExperience\t\n \nAcme S.p.A.\n\n";
        assert_eq!(normalize_text(raw), "Mario Rossi\n\nExperience\n\nAcme S.p.A.");
    }

    #[test]
    fn test_page_image_filter() {
        assert!(is_page_image("page-01.png"));
        assert!(!is_page_image("input.pdf"));
        assert!(!is_page_image("page-01.ppm"));
    }

    #[tokio::test]
    async fn test_garbage_pdf_yields_empty_text() {
        let text = extract_embedded_text(b"%PDF-1.4 not really a pdf".to_vec()).await;
        assert!(text.is_empty());
    }
}
