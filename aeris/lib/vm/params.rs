use std::{net::Ipv4Addr, path::PathBuf};

use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::config::Forwards;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The hypervisor settings applied to one box, in the order they are applied.
///
/// Only `memory`, `cpus` and `bioslogodisplaytime` vary between boxes; the rest pin the CPU
/// features, GPU and NAT behaviour every aeris box runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualizationParams {
    entries: Vec<(&'static str, String)>,
}

/// Everything the hypervisor driver needs to create and wire up one box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoxParameters {
    /// The hypervisor-level VM name.
    pub vm_name: String,

    /// The sanitized box name.
    pub name: String,

    /// The position of the box in the project.
    pub index: usize,

    /// Whether this is the project's primary box.
    pub primary: bool,

    /// The base image.
    pub basebox: String,

    /// Where the base image is downloaded from, if the project says.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basebox_url: Option<String>,

    /// Whether the box is provisioned after boot.
    pub provision: bool,

    /// The private network address.
    pub ip: Ipv4Addr,

    /// The private network broadcast address.
    pub broadcast: Ipv4Addr,

    /// The private network mask.
    pub netmask: Ipv4Addr,

    /// The host port forwards.
    pub forwards: Forwards,

    /// The data disk image, when a disks directory is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_path: Option<PathBuf>,

    /// The SSH private key used to reach the box.
    pub private_key: PathBuf,

    /// The hypervisor settings.
    pub virtualization: VirtualizationParams,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl VirtualizationParams {
    /// Builds the parameter set for a box.
    pub fn new(ram_mb: u32, cpus: u32, bios_logo_display_ms: u32, bios_logo_path: String) -> Self {
        let fixed = |key: &'static str, value: &str| (key, value.to_string());

        let entries = vec![
            ("memory", ram_mb.to_string()),
            ("cpus", cpus.to_string()),
            // BIOS
            ("bioslogodisplaytime", bios_logo_display_ms.to_string()),
            ("bioslogoimagepath", bios_logo_path),
            fixed("bioslogofadein", "off"),
            fixed("bioslogofadeout", "off"),
            // CPU features
            fixed("ioapic", "on"),
            fixed("hpet", "on"),
            fixed("nestedpaging", "on"),
            fixed("largepages", "on"),
            fixed("pae", "on"),
            fixed("hwvirtex", "on"),
            fixed("vtxvpid", "on"),
            fixed("vtxux", "on"),
            // GPU
            fixed("accelerate3d", "off"),
            fixed("accelerate2dvideo", "off"),
            fixed("vram", "9"),
            // NAT
            fixed("natdnsproxy1", "off"),
            fixed("natdnsproxy2", "off"),
            // NICs
            fixed("nictype1", "virtio"),
            fixed("nictype2", "virtio"),
        ];

        Self { entries }
    }

    /// Returns the value of `key`, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over the settings in application order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Returns the number of settings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether there are no settings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the settings as `modifyvm` arguments, e.g. `["--memory", "2048", ...]`.
    pub fn to_modifyvm_args(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|(k, v)| [format!("--{k}"), v.clone()])
            .collect()
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Serialize for VirtualizationParams {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
