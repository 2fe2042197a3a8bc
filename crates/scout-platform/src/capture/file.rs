//! File-backed capture for desktop hosts

use std::path::{Path, PathBuf};

use scout_core::prelude::*;
use scout_core::{content_type_for_path, CapturedImage};

use super::CaptureProvider;

/// Read a photo that already exists on disk.
async fn read_capture(path: &Path) -> Result<CapturedImage> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read capture {}", path.display()))?;

    if bytes.is_empty() {
        return Err(Error::empty_capture(path));
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "capture".to_string());

    debug!("Captured {} ({} bytes)", file_name, bytes.len());
    Ok(CapturedImage::new(
        bytes,
        content_type_for_path(path),
        file_name,
    ))
}

/// Always "captures" the same file. Each call re-reads it.
#[derive(Debug, Clone)]
pub struct FileCaptureProvider {
    path: PathBuf,
}

impl FileCaptureProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CaptureProvider for FileCaptureProvider {
    async fn capture_image(&self) -> Result<Option<CapturedImage>> {
        read_capture(&self.path).await.map(Some)
    }
}

/// Interpret one line typed at the capture prompt.
///
/// Blank input cancels. Surrounding quotes (as pasted from a file manager)
/// are stripped.
pub fn parse_prompt_line(line: &str) -> Option<PathBuf> {
    let trimmed = line.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| {
            trimmed
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
        })
        .unwrap_or(trimmed);

    if unquoted.is_empty() {
        None
    } else {
        Some(PathBuf::from(unquoted))
    }
}

/// Asks for a photo path on stdin each time a capture starts.
#[derive(Debug, Clone, Default)]
pub struct PromptCaptureProvider;

impl PromptCaptureProvider {
    pub fn new() -> Self {
        Self
    }
}

impl CaptureProvider for PromptCaptureProvider {
    async fn capture_image(&self) -> Result<Option<CapturedImage>> {
        let line = tokio::task::spawn_blocking(|| {
            use std::io::Write;

            eprint!("Photo path (blank to cancel): ");
            let _ = std::io::stderr().flush();

            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| line)
        })
        .await
        .map_err(|e| Error::camera(format!("prompt task failed: {e}")))??;

        match parse_prompt_line(&line) {
            Some(path) => read_capture(&path).await.map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_capture_reads_bytes_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crack.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"\x89PNG\r\n\x1a\nrest")
            .unwrap();

        let provider = FileCaptureProvider::new(&path);
        let image = provider.capture_image().await.unwrap().unwrap();

        assert_eq!(image.file_name(), "crack.png");
        assert_eq!(image.content_type(), "image/png");
        assert_eq!(&image.bytes()[..], b"\x89PNG\r\n\x1a\nrest");
    }

    #[tokio::test]
    async fn test_file_capture_missing_file_is_error() {
        let provider = FileCaptureProvider::new("/definitely/not/here.jpg");
        let result = provider.capture_image().await;
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_file_capture_empty_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jpg");
        std::fs::File::create(&path).unwrap();

        let result = FileCaptureProvider::new(&path).capture_image().await;
        assert!(matches!(result, Err(Error::EmptyCapture { .. })));
    }

    #[test]
    fn test_parse_prompt_line() {
        assert_eq!(parse_prompt_line(""), None);
        assert_eq!(parse_prompt_line("   \n"), None);
        assert_eq!(parse_prompt_line("\"\""), None);
        assert_eq!(
            parse_prompt_line(" /tmp/road.jpg \n"),
            Some(PathBuf::from("/tmp/road.jpg"))
        );
        assert_eq!(
            parse_prompt_line("'/tmp/with space.jpg'"),
            Some(PathBuf::from("/tmp/with space.jpg"))
        );
    }
}
