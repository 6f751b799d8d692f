//! Config path resolution and symlink checks.

use dirs::config_dir;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "LOCKED_FIO_CONFIG";

/// OS-appropriate default config path (`<config_dir>/locked_fio/config.xml`).
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(mut base) = config_dir() {
        base.push("locked_fio");
        base.push("config.xml");
        Some(base)
    } else {
        env::var("HOME").ok().map(|h| {
            PathBuf::from(h)
                .join(".config")
                .join("locked_fio")
                .join("config.xml")
        })
    }
}

/// `$LOCKED_FIO_CONFIG` if set (and non-empty), else the default path.
pub fn resolve_config_path() -> Option<PathBuf> {
    match env::var_os(CONFIG_ENV) {
        Some(p) if !p.is_empty() => Some(PathBuf::from(p)),
        _ => default_config_path(),
    }
}

/// Whether the config path came from the environment.
pub fn config_path_is_explicit() -> bool {
    env::var_os(CONFIG_ENV).is_some_and(|p| !p.is_empty())
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_path_ends_with_app_dir() {
        if let Some(p) = default_config_path() {
            assert!(p.ends_with(Path::new("locked_fio").join("config.xml")));
        }
    }

    #[test]
    fn plain_directories_are_not_symlinks() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("a").join("b.log");
        std::fs::create_dir_all(p.parent().unwrap()).unwrap();
        assert!(!path_has_symlink_ancestor(&p).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_ancestor_is_detected() {
        let dir = tempdir().unwrap();
        let real = dir.path().join("real");
        std::fs::create_dir(&real).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        assert!(path_has_symlink_ancestor(&link.join("x.log")).unwrap());
    }
}
