//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Environment variable overriding the aeriscloud install root.
pub const AERISCLOUD_PATH_ENV_VAR: &str = "AERISCLOUD_PATH";

/// Environment variable naming the directory VM data disks are created in.
pub const DISKS_PATH_ENV_VAR: &str = "VAGRANT_DISKS_PATH";

/// Environment variable holding the organization used when a project names none.
pub const DEFAULT_ORGANIZATION_ENV_VAR: &str = "AERISCLOUD_DEFAULT_ORGANIZATION";

/// Environment variable naming the directory organization files are looked up in.
pub const ORGANIZATIONS_DIR_ENV_VAR: &str = "AERISCLOUD_ORGANIZATIONS_DIR";

/// Environment variable enabling the graphical console. Any value enables it.
pub const GUI_ENV_VAR: &str = "GUI";

/// Environment variable holding the provisioning debug flag.
pub const ANSIBLE_DEBUG_ENV_VAR: &str = "DEBUG";

/// Environment variable holding provisioning tags.
pub const ANSIBLE_TAGS_ENV_VAR: &str = "tags";

/// Environment variable holding provisioning tags to skip.
pub const ANSIBLE_SKIP_TAGS_ENV_VAR: &str = "skip_tags";

/// Environment variable holding the generic debug flag.
pub const DEBUG_ENV_VAR: &str = "debug";

/// Environment variable overriding the git configuration file embedded in boxes.
pub const GITCONFIG_ENV_VAR: &str = "GITCONFIG";
