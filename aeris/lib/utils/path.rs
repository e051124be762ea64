use std::path::{Component, Path, PathBuf};

use typed_path::Utf8UnixPathBuf;

use crate::{AerisError, AerisResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The name of the project description file.
pub const PROJECT_CONFIG_FILENAME: &str = ".aeriscloud.yml";

/// The file name of the git configuration read from the user's home directory.
pub const GITCONFIG_FILENAME: &str = ".gitconfig";

/// The BIOS boot logo, relative to the install root.
pub const BIOS_LOGO_SUBPATH: &str = "docs/images/aeris.bmp";

/// The directory Vagrant keeps per-machine state in, relative to the project directory.
pub const MACHINES_SUBDIR: &str = ".vagrant/machines";

/// The provider directory below a machine directory.
pub const PROVIDER_SUBDIR: &str = "virtualbox";

/// The private key file name below the provider directory.
pub const PRIVATE_KEY_FILENAME: &str = "private_key";

/// The guest directory the data volume is mounted at.
pub const GUEST_DATA_DIR: &str = "/data";

/// The guest home directory of the provisioning user.
pub const GUEST_HOME_DIR: &str = "/home/vagrant";

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Expands `path` into an absolute path.
///
/// A leading `~` is replaced with the user's home directory and relative paths are joined onto
/// `base`. `.` and `..` components are folded lexically; symlinks are not resolved.
///
/// ## Examples
///
/// ```
/// use aeris::utils::expand_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(expand_path("src/../data", Path::new("/work")), PathBuf::from("/work/data"));
/// assert_eq!(expand_path("/srv/./www", Path::new("/work")), PathBuf::from("/srv/www"));
/// ```
pub fn expand_path(path: impl AsRef<Path>, base: &Path) -> PathBuf {
    let path = path.as_ref();

    let joined = match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => base.join(path),
        },
        Err(_) => base.join(path),
    };

    normalize(&joined)
}

/// Folds `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}

/// Returns the current working directory, falling back to `/` when it cannot be read.
pub fn current_dir_or_root() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"))
}

/// Walks upward from `start` until a directory containing `.aeriscloud.yml` is found.
pub fn find_project_root(start: impl AsRef<Path>) -> AerisResult<PathBuf> {
    let start = start.as_ref();
    let start = expand_path(start, &current_dir_or_root());

    let mut current = Some(start.as_path());
    while let Some(dir) = current {
        if dir.join(PROJECT_CONFIG_FILENAME).is_file() {
            tracing::debug!("found project config in {}", dir.display());
            return Ok(dir.to_path_buf());
        }
        current = dir.parent();
    }

    Err(AerisError::ConfigNotFound(start))
}

/// Returns the guest directory a project's data is synced into.
pub fn guest_data_dir(project_name: &str) -> Utf8UnixPathBuf {
    Utf8UnixPathBuf::from(GUEST_DATA_DIR).join(project_name)
}

/// Returns the guest directory a project's data is bind-mounted onto.
pub fn guest_project_dir(project_name: &str) -> Utf8UnixPathBuf {
    Utf8UnixPathBuf::from(GUEST_HOME_DIR).join(project_name)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_expand_path_relative_and_absolute() {
        let base = Path::new("/projects/demo");
        assert_eq!(expand_path("shared", base), PathBuf::from("/projects/demo/shared"));
        assert_eq!(expand_path("../other", base), PathBuf::from("/projects/other"));
        assert_eq!(expand_path("/var/lib/./x", base), PathBuf::from("/var/lib/x"));
    }

    #[test]
    fn test_expand_path_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/code", Path::new("/tmp")), home.join("code"));
        }
    }

    #[test]
    fn test_find_project_root_walks_upward() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let root = temp.path().join("game");
        let nested = root.join("src").join("server");
        fs::create_dir_all(&nested)?;
        fs::write(root.join(PROJECT_CONFIG_FILENAME), "project_name: game\n")?;

        let found = find_project_root(&nested)?;
        assert_eq!(found, normalize(&root));

        Ok(())
    }

    #[test]
    fn test_find_project_root_not_found() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let err = find_project_root(temp.path()).unwrap_err();
        assert!(matches!(err, AerisError::ConfigNotFound(_)));

        Ok(())
    }

    #[test]
    fn test_guest_dirs() {
        assert_eq!(guest_data_dir("game").as_str(), "/data/game");
        assert_eq!(guest_project_dir("game").as_str(), "/home/vagrant/game");
    }
}
