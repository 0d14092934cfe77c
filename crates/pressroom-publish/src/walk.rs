//! Recursive directory listing.

use std::{
    io,
    path::{Path, PathBuf},
};

use pressroom_core::path_guard::to_slash;
use tracing::trace;

/// List files under `start` whose names satisfy `keep`.
///
/// Returned paths are relative to `root`, slash-separated and sorted, so a
/// listing started in a subdirectory still yields root-relative paths. A
/// missing `start` directory yields an empty list, as does a directory that
/// disappears while it is being walked. Symlinks are not followed.
///
/// Directories whose root-relative path appears in `skip` are not entered,
/// including `start` itself.
pub async fn list_files<F>(
    root: &Path,
    start: &Path,
    skip: &[&str],
    keep: F,
) -> io::Result<Vec<String>>
where
    F: Fn(&str) -> bool,
{
    let mut files = Vec::new();
    let mut pending: Vec<PathBuf> = vec![start.to_path_buf()];

    while let Some(dir) = pending.pop() {
        if let Ok(rel) = dir.strip_prefix(root)
            && skip.contains(&to_slash(rel).as_str())
        {
            trace!(dir = %dir.display(), "skipping directory");
            continue;
        }

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;

            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                let name = entry.file_name();
                if !keep(name.to_string_lossy().as_ref()) {
                    continue;
                }
                if let Ok(rel) = path.strip_prefix(root) {
                    files.push(to_slash(rel));
                }
            }
        }
    }

    files.sort();
    trace!(root = %root.display(), count = files.len(), "listed files");
    Ok(files)
}
