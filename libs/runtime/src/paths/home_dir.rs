use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the server home directory to an absolute path.
///
/// - `None` (or blank) selects `<platform home>/<default_subdir>`.
/// - A leading `~` is expanded against the platform home.
/// - Relative paths are anchored at the current working directory.
///
/// When `create` is set the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let resolved = match configured.as_deref().map(str::trim) {
        None | Some("") => platform_home()?.join(default_subdir),
        Some(raw) => expand(raw)?,
    };

    if create {
        std::fs::create_dir_all(&resolved)
            .with_context(|| format!("cannot create home dir {}", resolved.display()))?;
    }
    Ok(resolved)
}

fn platform_home() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let base = dirs::config_dir();
    #[cfg(not(target_os = "windows"))]
    let base = dirs::home_dir();

    base.ok_or_else(|| anyhow!("unable to determine the user home directory"))
}

fn expand(raw: &str) -> Result<PathBuf> {
    let path = if raw == "~" {
        platform_home()?
    } else if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        platform_home()?.join(rest)
    } else {
        PathBuf::from(raw)
    };

    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("cannot read current directory")?;
    Ok(cwd.join(Path::new(&path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absolute_path_is_kept_and_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("nested/home");
        let resolved =
            resolve_home_dir(Some(target.to_string_lossy().to_string()), ".x", true).unwrap();
        assert_eq!(resolved, target);
        assert!(target.exists());
    }

    #[test]
    fn relative_path_becomes_absolute() {
        let resolved = resolve_home_dir(Some("some/rel".into()), ".x", false).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("some/rel"));
    }

    #[test]
    fn tilde_is_expanded() {
        let resolved = resolve_home_dir(Some("~/.dormease_tilde".into()), ".x", false).unwrap();
        assert!(resolved.is_absolute());
        assert!(!resolved.to_string_lossy().starts_with('~'));
        assert!(resolved.ends_with(".dormease_tilde"));
    }
}
