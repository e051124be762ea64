//! The process-wide environment snapshot.

use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
};

use getset::Getters;
use serde::{Deserialize, Serialize};

use crate::utils::{
    self, AERISCLOUD_PATH_ENV_VAR, ANSIBLE_DEBUG_ENV_VAR, ANSIBLE_SKIP_TAGS_ENV_VAR,
    ANSIBLE_TAGS_ENV_VAR, DEBUG_ENV_VAR, DEFAULT_ORGANIZATION_ENV_VAR, DISKS_PATH_ENV_VAR,
    GITCONFIG_ENV_VAR, GITCONFIG_FILENAME, GUI_ENV_VAR, ORGANIZATIONS_DIR_ENV_VAR,
};

use super::{DEFAULT_BASE_PATH, NFS_MOUNT_OPTIONS};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A read-only snapshot of the settings aeris takes from the operating environment.
///
/// The snapshot is taken once at startup and shared with every [`Project`](crate::project::Project)
/// loaded afterwards. Unset variables resolve to their defaults; loading never fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
#[getset(get = "pub with_prefix")]
pub struct Environment {
    /// The aeriscloud install root.
    base_path: PathBuf,

    /// The directory VM data disks are created in.
    disks_path: Option<PathBuf>,

    /// The organization used when a project names none.
    organization: String,

    /// The directory organization files are looked up in.
    organizations_dir: String,

    /// Whether boxes boot with a graphical console.
    #[getset(skip)]
    gui_enabled: bool,

    /// The debug flag handed to the provisioning tool.
    ansible_debug: DebugFlag,

    /// Provisioning tags to run.
    ansible_tags: Option<String>,

    /// Provisioning tags to skip.
    ansible_skip_tags: Option<String>,

    /// The generic debug flag.
    debug: DebugFlag,

    /// Where the embedded git identity is read from.
    gitconfig_path: PathBuf,

    /// The contents of the git configuration, empty if the file does not exist.
    #[serde(skip)]
    gitconfig: String,
}

/// A debug switch that is either a plain toggle or a verbatim value.
///
/// The document may say `debug: true`, while the environment carries whatever string the user
/// exported, e.g. `DEBUG=vvv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DebugFlag {
    /// An explicit on/off value.
    Toggle(bool),

    /// A value passed through to the provisioning tool as written.
    Value(String),
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Environment {
    /// Takes a snapshot of the current process environment.
    pub fn load() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a snapshot from an arbitrary variable lookup.
    ///
    /// ## Examples
    ///
    /// ```
    /// use aeris::config::Environment;
    ///
    /// let env = Environment::from_lookup(|name| match name {
    ///     "GUI" => Some("1".to_string()),
    ///     _ => None,
    /// });
    ///
    /// assert!(env.is_gui_enabled());
    /// assert_eq!(env.get_base_path().to_str(), Some("/opt/aeriscloud"));
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let cwd = utils::current_dir_or_root();

        let base_path = lookup(AERISCLOUD_PATH_ENV_VAR)
            .map(|path| utils::expand_path(path, &cwd))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_PATH));

        let gitconfig_path = lookup(GITCONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("/"))
                    .join(GITCONFIG_FILENAME)
            });
        let gitconfig = read_gitconfig(&gitconfig_path);

        let env = Self {
            base_path,
            disks_path: lookup(DISKS_PATH_ENV_VAR).map(PathBuf::from),
            organization: lookup(DEFAULT_ORGANIZATION_ENV_VAR).unwrap_or_default(),
            organizations_dir: lookup(ORGANIZATIONS_DIR_ENV_VAR).unwrap_or_default(),
            gui_enabled: lookup(GUI_ENV_VAR).is_some(),
            ansible_debug: lookup(ANSIBLE_DEBUG_ENV_VAR)
                .map(DebugFlag::Value)
                .unwrap_or_default(),
            ansible_tags: lookup(ANSIBLE_TAGS_ENV_VAR),
            ansible_skip_tags: lookup(ANSIBLE_SKIP_TAGS_ENV_VAR),
            debug: lookup(DEBUG_ENV_VAR).map(DebugFlag::Value).unwrap_or_default(),
            gitconfig_path,
            gitconfig,
        };

        tracing::debug!(
            base_path = %env.base_path.display(),
            gui = env.gui_enabled,
            "loaded environment"
        );
        env
    }

    /// Returns whether boxes boot with a graphical console.
    pub fn is_gui_enabled(&self) -> bool {
        self.gui_enabled
    }

    /// Returns the mount options used for NFS shares.
    pub fn nfs_mount_options(&self) -> &'static [&'static str] {
        NFS_MOUNT_OPTIONS
    }
}

impl DebugFlag {
    /// Returns whether the flag turns debugging on.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Toggle(enabled) => *enabled,
            Self::Value(value) => !value.is_empty(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn read_gitconfig(path: &Path) -> String {
    if !path.is_file() {
        return String::new();
    }

    fs::read_to_string(path).unwrap_or_else(|err| {
        tracing::warn!("could not read {}: {err}", path.display());
        String::new()
    })
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for DebugFlag {
    fn default() -> Self {
        Self::Toggle(false)
    }
}

impl fmt::Display for DebugFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toggle(enabled) => write!(f, "{}", enabled),
            Self::Value(value) => write!(f, "{}", value),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::TempDir;

    use super::*;

    fn env_from(vars: &[(&str, &str)]) -> Environment {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_environment_defaults() {
        let env = env_from(&[("GITCONFIG", "/nonexistent/.gitconfig")]);

        assert_eq!(env.get_base_path(), Path::new(DEFAULT_BASE_PATH));
        assert_eq!(env.get_disks_path(), &None);
        assert_eq!(env.get_organization(), "");
        assert_eq!(env.get_organizations_dir(), "");
        assert!(!env.is_gui_enabled());
        assert_eq!(env.get_ansible_debug(), &DebugFlag::Toggle(false));
        assert_eq!(env.get_debug(), &DebugFlag::Toggle(false));
        assert_eq!(env.get_ansible_tags(), &None);
        assert_eq!(env.get_ansible_skip_tags(), &None);
        assert_eq!(env.get_gitconfig(), "");
    }

    #[test]
    fn test_environment_reads_variables() {
        let env = env_from(&[
            ("AERISCLOUD_PATH", "/srv/aeris/./cloud"),
            ("VAGRANT_DISKS_PATH", "/mnt/disks"),
            ("AERISCLOUD_DEFAULT_ORGANIZATION", "wizcorp"),
            ("AERISCLOUD_ORGANIZATIONS_DIR", "/srv/orgs"),
            ("GUI", ""),
            ("DEBUG", "vvv"),
            ("tags", "web"),
            ("skip_tags", "db"),
            ("debug", "1"),
            ("GITCONFIG", "/nonexistent/.gitconfig"),
        ]);

        assert_eq!(env.get_base_path(), Path::new("/srv/aeris/cloud"));
        assert_eq!(env.get_disks_path(), &Some(PathBuf::from("/mnt/disks")));
        assert_eq!(env.get_organization(), "wizcorp");
        assert_eq!(env.get_organizations_dir(), "/srv/orgs");
        assert!(env.is_gui_enabled());
        assert_eq!(env.get_ansible_debug(), &DebugFlag::Value("vvv".into()));
        assert_eq!(env.get_ansible_tags().as_deref(), Some("web"));
        assert_eq!(env.get_ansible_skip_tags().as_deref(), Some("db"));
        assert_eq!(env.get_debug(), &DebugFlag::Value("1".into()));
    }

    #[test]
    fn test_environment_reads_gitconfig() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("gitconfig");
        std::fs::write(&path, "[user]\n\tname = Aeris\n")?;

        let env = env_from(&[("GITCONFIG", path.to_str().unwrap_or_default())]);
        assert_eq!(env.get_gitconfig_path(), &path);
        assert_eq!(env.get_gitconfig(), "[user]\n\tname = Aeris\n");

        Ok(())
    }

    #[test]
    fn test_debug_flag() {
        assert!(!DebugFlag::default().is_enabled());
        assert!(DebugFlag::Toggle(true).is_enabled());
        assert!(DebugFlag::Value("vv".into()).is_enabled());
        assert!(!DebugFlag::Value(String::new()).is_enabled());
        assert_eq!(DebugFlag::Toggle(true).to_string(), "true");
        assert_eq!(DebugFlag::Value("vv".into()).to_string(), "vv");
    }

    #[test]
    fn test_nfs_mount_options() {
        let env = env_from(&[]);
        assert_eq!(env.nfs_mount_options().first(), Some(&"fsc"));
        assert!(env.nfs_mount_options().contains(&"vers=3"));
    }
}
