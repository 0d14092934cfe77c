//! Safe resolution of untrusted relative paths.
//!
//! Every path that originates from a request or from generated content is
//! resolved against a trusted root here before it touches the file system.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{CoreError, Result};

/// Resolve `untrusted` against `root`, rejecting anything that escapes it.
///
/// Resolution is lexical and works on path components: `.` is dropped, `..`
/// pops the previous component and an absolute input replaces the root the
/// way [`Path::join`] does. The result must be `root` itself or lie beneath
/// it, compared component-wise, so `/srv/site-evil` is not inside `/srv/site`.
///
/// # Errors
///
/// Returns [`CoreError::PathTraversal`] when the input is empty, contains a
/// NUL byte, or resolves outside `root`.
pub fn resolve(root: &Path, untrusted: &str) -> Result<PathBuf> {
    if untrusted.trim().is_empty() || untrusted.contains('\0') {
        debug!(input = untrusted, "rejected empty or malformed path");
        return Err(CoreError::path_traversal(untrusted));
    }

    let root = normalize(&absolute(root)?);
    let resolved = normalize(&root.join(untrusted));

    if resolved == root || resolved.starts_with(&root) {
        Ok(resolved)
    } else {
        debug!(
            input = untrusted,
            root = %root.display(),
            "rejected path outside root"
        );
        Err(CoreError::path_traversal(untrusted))
    }
}

/// Render a relative path with forward slashes.
#[must_use]
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        std::env::temp_dir().join("pressroom-guard")
    }

    #[test]
    fn test_resolves_nested_page() {
        let resolved = resolve(&root(), "a/b.html").unwrap();
        assert!(resolved.starts_with(root()));
        assert!(resolved.ends_with("a/b.html"));
    }

    #[test]
    fn test_rejects_parent_traversal() {
        let err = resolve(&root(), "../../etc/passwd").unwrap_err();
        assert!(matches!(err, CoreError::PathTraversal { .. }));
    }

    #[test]
    fn test_rejects_traversal_for_any_root() {
        for root in ["/srv/site", "/srv/site/drafts/assets", "relative/root"] {
            let result = resolve(Path::new(root), "../../etc/passwd");
            assert!(result.is_err(), "root {root} accepted traversal");
        }
    }

    #[test]
    fn test_rejects_nested_traversal() {
        assert!(resolve(&root(), "blog/../../outside.html").is_err());
    }

    #[test]
    fn test_allows_dotdot_that_stays_inside() {
        let resolved = resolve(&root(), "blog/../about.html").unwrap();
        assert_eq!(resolved, root().join("about.html"));
    }

    #[test]
    fn test_rejects_absolute_override() {
        assert!(resolve(&root(), "/etc/passwd").is_err());
    }

    #[test]
    fn test_rejects_sibling_with_shared_prefix() {
        let root = Path::new("/srv/site");
        assert!(resolve(root, "../site-evil/index.html").is_err());
    }

    #[test]
    fn test_rejects_empty_and_nul() {
        assert!(resolve(&root(), "").is_err());
        assert!(resolve(&root(), "   ").is_err());
        assert!(resolve(&root(), "a\0b.html").is_err());
    }

    #[test]
    fn test_root_itself_is_allowed() {
        assert_eq!(resolve(&root(), ".").unwrap(), root());
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("./a//b.html")), "a/b.html");
    }
}
