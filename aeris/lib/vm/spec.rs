use std::sync::LazyLock;

use getset::Getters;
use regex::Regex;
use serde::Serialize;

use crate::{
    config::{BoxEntry, DEFAULT_BASEBOX, DEFAULT_NUM_CPUS, DEFAULT_RAM_MB, MIN_RAM_MB},
    ConfigError, ConfigResult,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Runs of characters that are not allowed in a box name.
static NAME_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.]+").expect("static pattern"));

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The validated, stored fields of one box.
///
/// Everything else about a box is derived from these fields and its project; see
/// [`VmBox`](super::VmBox).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
#[getset(get = "pub with_prefix")]
pub struct BoxSpec {
    /// The sanitized box name.
    name: String,

    /// The base image the box is created from.
    basebox: String,

    #[getset(skip)]
    cpus: u32,

    #[getset(skip)]
    ram_mb: u32,

    #[getset(skip)]
    provision: bool,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl BoxSpec {
    /// Validates a `boxes` entry.
    ///
    /// Absent `cpu`, `ram` and `basebox` fall back to their defaults and `provision` defaults to
    /// `true`. The name is required and the box needs at least [`MIN_RAM_MB`] of memory.
    pub fn from_entry(entry: &BoxEntry) -> ConfigResult<Self> {
        let name = entry
            .get_name()
            .as_deref()
            .map(sanitize_name)
            .unwrap_or_default();

        let cpus = match entry.get_cpu() {
            Some(cpu) => cpu.to_u32("cpu")?,
            None => DEFAULT_NUM_CPUS,
        };

        let ram_mb = match entry.get_ram() {
            Some(ram) => ram.to_u32("ram")?,
            None => DEFAULT_RAM_MB,
        };

        if name.is_empty() {
            return Err(ConfigError::MissingName);
        }

        if ram_mb < MIN_RAM_MB {
            return Err(ConfigError::InsufficientMemory {
                ram: ram_mb,
                min: MIN_RAM_MB,
            });
        }

        Ok(Self {
            name,
            basebox: entry
                .get_basebox()
                .clone()
                .unwrap_or_else(|| DEFAULT_BASEBOX.to_string()),
            cpus,
            ram_mb,
            provision: entry.get_provision().unwrap_or(true),
        })
    }

    /// Returns the number of CPUs.
    pub fn get_cpus(&self) -> u32 {
        self.cpus
    }

    /// Returns the amount of RAM in MB.
    pub fn get_ram_mb(&self) -> u32 {
        self.ram_mb
    }

    /// Returns whether the box is provisioned after boot.
    pub fn is_provision_enabled(&self) -> bool {
        self.provision
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Turns a user-supplied box name into an identifier safe for VM names and paths.
///
/// The name is lowercased and trimmed, then every run of characters other than ASCII letters,
/// digits, `_` and `.` becomes a single `-`.
///
/// ## Examples
///
/// ```
/// use aeris::vm::sanitize_name;
///
/// assert_eq!(sanitize_name("  My DB!! Box "), "my-db-box");
/// assert_eq!(sanitize_name("web_1.internal"), "web_1.internal");
/// ```
pub fn sanitize_name(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    NAME_SEPARATORS
        .replace_all(lowered.trim(), "-")
        .into_owned()
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::config::IntLike;

    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("  My DB!! Box "), "my-db-box");
        assert_eq!(sanitize_name("Web"), "web");
        assert_eq!(sanitize_name("a  /  b"), "a-b");
        assert_eq!(sanitize_name("x--y"), "x-y");
        assert_eq!(sanitize_name("db.v2_final"), "db.v2_final");
        assert_eq!(sanitize_name("café"), "caf-");
        assert_eq!(sanitize_name("   "), "");
    }

    #[test]
    fn test_box_spec_defaults() -> anyhow::Result<()> {
        let spec = BoxSpec::from_entry(&BoxEntry::builder().name("Web").build())?;

        assert_eq!(spec.get_name(), "web");
        assert_eq!(spec.get_basebox(), DEFAULT_BASEBOX);
        assert_eq!(spec.get_cpus(), DEFAULT_NUM_CPUS);
        assert_eq!(spec.get_ram_mb(), DEFAULT_RAM_MB);
        assert!(spec.is_provision_enabled());

        Ok(())
    }

    #[test]
    fn test_box_spec_explicit_fields() -> anyhow::Result<()> {
        let entry = BoxEntry::builder()
            .name("db")
            .basebox("centos-7")
            .cpu(4)
            .ram(4096)
            .provision(false)
            .build();
        let spec = BoxSpec::from_entry(&entry)?;

        assert_eq!(spec.get_basebox(), "centos-7");
        assert_eq!(spec.get_cpus(), 4);
        assert_eq!(spec.get_ram_mb(), 4096);
        assert!(!spec.is_provision_enabled());

        Ok(())
    }

    #[test]
    fn test_box_spec_memory_threshold() {
        let low = BoxEntry::builder().name("db").ram(512).build();
        assert!(matches!(
            BoxSpec::from_entry(&low),
            Err(ConfigError::InsufficientMemory { ram: 512, .. })
        ));

        let exact = BoxEntry::builder().name("db").ram(1024).build();
        assert!(BoxSpec::from_entry(&exact).is_ok());
    }

    #[test]
    fn test_box_spec_missing_name() {
        let unnamed = BoxEntry::builder().ram(2048).build();
        assert!(matches!(
            BoxSpec::from_entry(&unnamed),
            Err(ConfigError::MissingName)
        ));

        let blank = BoxEntry::builder().name("   ").build();
        assert!(matches!(
            BoxSpec::from_entry(&blank),
            Err(ConfigError::MissingName)
        ));
    }

    #[test]
    fn test_box_spec_rejects_non_numeric_ram() {
        let mut entry = BoxEntry::builder().name("db").build();
        entry.ram = Some(IntLike::Text("lots".into()));

        assert!(matches!(
            BoxSpec::from_entry(&entry),
            Err(ConfigError::InvalidInteger { field, .. }) if field == "ram"
        ));
    }
}
