//! Path helpers: home expansion, absolutisation and lexical normalisation.
//!
//! Normalisation is purely lexical. Symlinks are not followed here; callers
//! that need the on-disk identity of a path canonicalise it themselves.

use std::path::{Component, Path, PathBuf};

/// Replace a leading `~` component with the user's home directory.
///
/// `~user` forms are left untouched, as is everything when no home directory
/// can be determined.
pub fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match dirs::home_dir() {
            Some(home) => home.join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// Remove `.` components and fold `..` into its parent.
///
/// `..` at the root stays at the root; leading `..` on a relative path is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Expand `~`, make absolute against the current directory, and normalise.
pub fn resolve(path: &Path) -> std::io::Result<PathBuf> {
    let expanded = expand_home(path);
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()?.join(expanded)
    };
    Ok(normalize(&absolute))
}
