use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::UploadError;

pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];
pub const ALLOWED_AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "wav", "ogg", "m4a"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Audio,
}

impl UploadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadKind::Image => "image",
            UploadKind::Audio => "audio",
        }
    }

    fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Image => &ALLOWED_IMAGE_EXTENSIONS,
            UploadKind::Audio => &ALLOWED_AUDIO_EXTENSIONS,
        }
    }
}

/// True when `filename` ends in an extension from the kind's allow-list.
pub fn is_allowed(filename: &str, kind: UploadKind) -> bool {
    let Some((_, ext)) = filename.rsplit_once('.') else {
        return false;
    };
    let ext = ext.to_lowercase();
    kind.allowed_extensions().contains(&ext.as_str())
}

/// Reduces a client-supplied name to something safe to join onto a
/// directory: ASCII only, no separators, no leading dots.
pub fn secure_filename(filename: &str) -> String {
    let spaced: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Validates and writes an upload under `dir` with a random prefix,
/// returning the stored path.
pub async fn store(
    dir: &Path,
    original_name: &str,
    bytes: &[u8],
    kind: UploadKind,
) -> Result<PathBuf, UploadError> {
    if original_name.trim().is_empty() {
        return Err(UploadError::MissingFilename);
    }
    if !is_allowed(original_name, kind) {
        return Err(UploadError::UnsupportedExtension {
            kind: kind.as_str(),
            filename: original_name.to_string(),
        });
    }

    let stored_name = secure_filename(&format!("{}_{}", Uuid::new_v4(), original_name));
    let path = dir.join(stored_name);
    tokio::fs::write(&path, bytes).await?;

    tracing::info!(
        "Stored {} upload {} ({} bytes) as {}",
        kind.as_str(),
        original_name,
        bytes.len(),
        path.display()
    );
    Ok(path)
}

/// Resolves a client-supplied file name inside `dir`, refusing anything that
/// would escape it.
pub fn resolve(dir: &Path, requested: &str) -> Option<PathBuf> {
    let safe = secure_filename(requested);
    if safe.is_empty() {
        return None;
    }
    Some(dir.join(safe))
}

/// Best-effort removal of request-scoped files.
pub async fn remove_quietly(paths: &[PathBuf]) {
    for path in paths {
        if let Err(err) = tokio::fs::remove_file(path).await {
            tracing::debug!("Could not remove {}: {}", path.display(), err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_checked_case_insensitively() {
        assert!(is_allowed("photo.PNG", UploadKind::Image));
        assert!(is_allowed("archive.tar.jpeg", UploadKind::Image));
        assert!(is_allowed("song.m4a", UploadKind::Audio));
        assert!(!is_allowed("song.m4a", UploadKind::Image));
        assert!(!is_allowed("photo.png", UploadKind::Audio));
        assert!(!is_allowed("script.sh", UploadKind::Image));
        assert!(!is_allowed("noextension", UploadKind::Image));
        assert!(!is_allowed("png", UploadKind::Image));
    }

    #[test]
    fn secure_filename_strips_paths_and_odd_characters() {
        assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("i contain cool \u{fc}ml\u{e4}uts.txt"), "i_contain_cool_mluts.txt");
        assert_eq!(secure_filename("..\\windows\\win.ini"), "windows_win.ini");
        assert_eq!(secure_filename("..."), "");
    }

    #[test]
    fn resolve_keeps_lookups_inside_the_directory() {
        let dir = Path::new("uploads");
        assert_eq!(
            resolve(dir, "video_abc.mp4"),
            Some(PathBuf::from("uploads/video_abc.mp4"))
        );
        assert_eq!(
            resolve(dir, "../secret.mp4"),
            Some(PathBuf::from("uploads/secret.mp4"))
        );
        assert_eq!(resolve(dir, "../.."), None);
    }

    #[tokio::test]
    async fn store_rejects_disallowed_files() {
        let dir = std::env::temp_dir();
        let err = store(&dir, "notes.txt", b"hello", UploadKind::Image)
            .await
            .expect_err("txt rejected");
        assert!(matches!(err, UploadError::UnsupportedExtension { .. }));

        let err = store(&dir, "", b"hello", UploadKind::Audio)
            .await
            .expect_err("empty name");
        assert!(matches!(err, UploadError::MissingFilename));
    }

    #[tokio::test]
    async fn store_writes_uniquely_named_files() {
        let dir = std::env::temp_dir();
        let first = store(&dir, "beach photo.jpg", b"jpeg-bytes", UploadKind::Image)
            .await
            .expect("stored");
        let second = store(&dir, "beach photo.jpg", b"jpeg-bytes", UploadKind::Image)
            .await
            .expect("stored");
        assert_ne!(first, second);
        let name = first.file_name().and_then(|n| n.to_str()).expect("name");
        assert!(name.ends_with("_beach_photo.jpg"));
        assert_eq!(tokio::fs::read(&first).await.expect("read"), b"jpeg-bytes");
        remove_quietly(&[first.clone(), second.clone()]).await;
        assert!(!first.exists());
    }
}
