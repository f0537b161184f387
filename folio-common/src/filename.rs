//! Upload filename sanitation and path containment checks

use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`
///
/// Non-ASCII characters become a single `_` each, regardless of their UTF-8
/// width.
pub fn sanitize_filename(original: &str) -> String {
    original
        .chars()
        .map(|c| if is_allowed_char(c) { c } else { '_' })
        .collect()
}

/// Default display title for an uploaded file: its name without extension
pub fn title_from_filename(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| filename.to_string())
}

/// Check a track filename taken from a request and resolve it inside `work_dir`
///
/// Purely lexical: the filesystem is not consulted, so callers can reject a
/// bad name before touching any file.
pub fn resolve_track_path(work_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.is_empty() {
        return Err(Error::InvalidInput("Filename is required".to_string()));
    }
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(Error::InvalidInput("Invalid filename".to_string()));
    }
    if filename == "." {
        return Err(Error::InvalidInput("Invalid filename".to_string()));
    }

    let base = work_dir.absolutize()?.into_owned();
    let candidate = base.join(filename).absolutize()?.into_owned();

    if candidate.parent() != Some(base.as_path()) {
        return Err(Error::InvalidInput("Invalid file path".to_string()));
    }
    Ok(candidate)
}
