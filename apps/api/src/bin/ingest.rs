//! Batch CV ingestion: every supported file in a folder, one at a time.
//! Files that fail any step are moved to the rejected folder.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cvmatch::config::Config;
use cvmatch::ingestion::convert::detect_kind;
use cvmatch::ingestion::pipeline::{ingest_cv, CvUpload};
use cvmatch::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "cvmatch-ingest", about = "Ingest a folder of CVs into cvmatch")]
struct Cli {
    /// Folder containing the CVs to ingest
    #[arg(long, env = "CV_DIR", default_value = "data/cvs")]
    dir: PathBuf,

    /// Where files that fail ingestion are moved
    #[arg(long, env = "CV_REJECTED_DIR", default_value = "data/rejected")]
    rejected_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "cvmatch={level},{}={level}",
                env!("CARGO_CRATE_NAME"),
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let files = supported_files(&cli.dir).await?;
    info!("Found {} CV(s) in {}", files.len(), cli.dir.display());
    if files.is_empty() {
        return Ok(());
    }

    let state = AppState::build(config).await?;

    let (mut ingested, mut rejected) = (0usize, 0usize);
    for path in &files {
        match ingest_file(&state, path).await {
            Ok(()) => ingested += 1,
            Err(e) => {
                rejected += 1;
                error!("Failed to ingest {}: {e:#}", path.display());
                if let Err(e) = move_to_rejected(path, &cli.rejected_dir).await {
                    error!("Could not move {} to rejected folder: {e:#}", path.display());
                }
            }
        }
    }

    info!("Batch finished: {ingested} ingested, {rejected} rejected");
    Ok(())
}

async fn ingest_file(state: &AppState, path: &Path) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let upload = CvUpload {
        file_name: file_name(path),
        bytes,
    };
    let outcome = ingest_cv(state, upload).await?;
    info!(
        "{} → candidate {}{}",
        outcome.file_name,
        outcome.candidate_id,
        if outcome.re_ingested { " (re-ingested)" } else { "" }
    );
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Regular, non-hidden files with a supported extension, sorted by name.
async fn supported_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read CV folder {}", dir.display()))?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let name = file_name(&path);
        if name.starts_with('.') || !entry.file_type().await?.is_file() {
            continue;
        }
        if detect_kind(&name).is_err() {
            warn!("Skipping unsupported file {name}");
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

async fn move_to_rejected(path: &Path, rejected_dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(rejected_dir)
        .await
        .with_context(|| format!("Failed to create {}", rejected_dir.display()))?;
    let target = rejected_dir.join(file_name(path));

    // rename fails across filesystems; fall back to copy + remove
    if tokio::fs::rename(path, &target).await.is_err() {
        tokio::fs::copy(path, &target).await?;
        tokio::fs::remove_file(path).await?;
    }
    warn!("Moved {} to {}", path.display(), target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_supported_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.docx", "a.pdf", "notes.txt", ".hidden.pdf", "photo.png"] {
            tokio::fs::write(dir.path().join(name), b"x").await.unwrap();
        }
        tokio::fs::create_dir(dir.path().join("nested.pdf")).await.unwrap();

        let files = supported_files(dir.path()).await.unwrap();
        let names: Vec<String> = files.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["a.pdf", "b.docx"]);
    }

    #[tokio::test]
    async fn test_move_to_rejected_creates_folder() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("broken.pdf");
        tokio::fs::write(&source, b"%PDF-").await.unwrap();

        let rejected = dir.path().join("rejected");
        let target = move_to_rejected(&source, &rejected).await.unwrap();
        assert_eq!(target, rejected.join("broken.pdf"));
        assert!(!source.exists());
        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"%PDF-");
    }

    #[tokio::test]
    async fn test_missing_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(supported_files(&dir.path().join("absent")).await.is_err());
    }
}
