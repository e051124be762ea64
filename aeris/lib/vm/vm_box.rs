use std::{net::Ipv4Addr, path::PathBuf};

use crate::{
    config::{
        Forwards, FIRST_GUEST_HOST_OCTET, GUI_BIOS_LOGO_DISPLAY_MS, HEADLESS_BIOS_LOGO_DISPLAY_MS,
    },
    project::Project,
    utils::{BIOS_LOGO_SUBPATH, MACHINES_SUBDIR, PRIVATE_KEY_FILENAME, PROVIDER_SUBDIR},
    ConfigError, ConfigResult,
};

use super::{BoxParameters, BoxSpec, VirtualizationParams};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// One box of a project, seen through the project that owns it.
///
/// A `VmBox` borrows its [`Project`], so it can never outlive it. All derived values are
/// recomputed from the stored fields and the project's name and id on every call.
///
/// ## Examples
///
/// ```
/// use std::sync::Arc;
/// use aeris::{config::Environment, project::Project};
///
/// # fn main() -> anyhow::Result<()> {
/// let env = Arc::new(Environment::from_lookup(|_| None));
/// let project = Project::parse(
///     "project_name: game\nid: 3\nboxes:\n  - name: web\n  - name: db\n    ram: 2048\n",
///     env,
/// )?;
///
/// let db = project.get_box("db").unwrap();
/// assert_eq!(db.ip().to_string(), "172.16.3.3");
/// assert_eq!(db.forwards().ssh.get_host(), 20062);
/// assert_eq!(db.vm_name(), "game-db");
/// assert!(!db.is_primary());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct VmBox<'p> {
    project: &'p Project,
    index: usize,
    spec: &'p BoxSpec,
}

/// Looks up a box of a project by position.
#[derive(Debug, Default)]
pub struct VmBoxBuilder<'p> {
    project: Option<&'p Project>,
    index: Option<usize>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<'p> VmBox<'p> {
    /// Creates a builder for a box view.
    pub fn builder() -> VmBoxBuilder<'p> {
        VmBoxBuilder::default()
    }

    pub(crate) fn new(project: &'p Project, index: usize, spec: &'p BoxSpec) -> Self {
        Self {
            project,
            index,
            spec,
        }
    }

    /// Returns the project that owns the box.
    pub fn get_project(&self) -> &'p Project {
        self.project
    }

    /// Returns the validated stored fields.
    pub fn get_spec(&self) -> &'p BoxSpec {
        self.spec
    }

    /// Returns the position of the box in the project.
    pub fn get_index(&self) -> usize {
        self.index
    }

    /// Returns the sanitized box name.
    pub fn get_name(&self) -> &'p str {
        self.spec.get_name()
    }

    /// Returns the base image.
    pub fn get_basebox(&self) -> &'p str {
        self.spec.get_basebox()
    }

    /// Returns the number of CPUs.
    pub fn get_cpus(&self) -> u32 {
        self.spec.get_cpus()
    }

    /// Returns the amount of RAM in MB.
    pub fn get_ram_mb(&self) -> u32 {
        self.spec.get_ram_mb()
    }

    /// Returns whether the box is provisioned after boot.
    pub fn is_provision_enabled(&self) -> bool {
        self.spec.is_provision_enabled()
    }

    /// Returns whether this is the first box of the project.
    pub fn is_primary(&self) -> bool {
        self.index == 0
    }

    /// Returns the hypervisor-level VM name, `{project}-{box}`.
    pub fn vm_name(&self) -> String {
        format!("{}-{}", self.project.get_name(), self.spec.get_name())
    }

    /// Returns the box's address on the project network.
    ///
    /// `.1` is the router, so the box at index `i` gets `.{i + 2}`.
    pub fn ip(&self) -> Ipv4Addr {
        let [a, b, c, _] = self.project.subnet().network().octets();
        // index < MAX_BOXES_PER_PROJECT, checked when the project is parsed
        Ipv4Addr::new(a, b, c, self.index as u8 + FIRST_GUEST_HOST_OCTET)
    }

    /// Returns the broadcast address of the project network.
    pub fn broadcast(&self) -> Ipv4Addr {
        self.project.subnet().broadcast()
    }

    /// Returns the netmask of the project network.
    pub fn netmask(&self) -> Ipv4Addr {
        self.project.subnet().mask()
    }

    /// Returns the SSH and web port forwards.
    pub fn forwards(&self) -> Forwards {
        Forwards::for_box(*self.project.get_id(), self.index)
    }

    /// Returns the data disk image path, or `None` when no disks directory is configured.
    pub fn disk_path(&self) -> Option<PathBuf> {
        self.project
            .get_environment()
            .get_disks_path()
            .as_ref()
            .map(|dir| dir.join(format!("{}-data.vdi", self.vm_name())))
    }

    /// Returns the private key Vagrant generated for this box.
    pub fn private_key_path(&self) -> PathBuf {
        self.project
            .base_dir()
            .join(MACHINES_SUBDIR)
            .join(self.spec.get_name())
            .join(PROVIDER_SUBDIR)
            .join(PRIVATE_KEY_FILENAME)
    }

    /// Returns the hypervisor settings for this box.
    ///
    /// The BIOS logo stays up longer when the graphical console is enabled so the boot menu can be
    /// reached.
    pub fn virtualization_params(&self) -> VirtualizationParams {
        let env = self.project.get_environment();
        let bios_logo_display_ms = if env.is_gui_enabled() {
            GUI_BIOS_LOGO_DISPLAY_MS
        } else {
            HEADLESS_BIOS_LOGO_DISPLAY_MS
        };
        let bios_logo_path = env.get_base_path().join(BIOS_LOGO_SUBPATH);

        VirtualizationParams::new(
            self.get_ram_mb(),
            self.get_cpus(),
            bios_logo_display_ms,
            bios_logo_path.display().to_string(),
        )
    }

    /// Collects every derived value the hypervisor driver needs.
    pub fn parameters(&self) -> BoxParameters {
        BoxParameters {
            vm_name: self.vm_name(),
            name: self.get_name().to_string(),
            index: self.index,
            primary: self.is_primary(),
            basebox: self.get_basebox().to_string(),
            basebox_url: self.project.get_basebox_url().clone(),
            provision: self.is_provision_enabled(),
            ip: self.ip(),
            broadcast: self.broadcast(),
            netmask: self.netmask(),
            forwards: self.forwards(),
            disk_path: self.disk_path(),
            private_key: self.private_key_path(),
            virtualization: self.virtualization_params(),
        }
    }
}

impl<'p> VmBoxBuilder<'p> {
    /// Sets the owning project.
    pub fn project(mut self, project: &'p Project) -> Self {
        self.project = Some(project);
        self
    }

    /// Sets the position of the box in the project.
    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Resolves the box.
    ///
    /// Fails with [`ConfigError::MissingProject`] or [`ConfigError::MissingIndex`] when either is
    /// unset, and with [`ConfigError::MissingIndex`] when the project has no box at that index.
    pub fn build(self) -> ConfigResult<VmBox<'p>> {
        let project = self.project.ok_or(ConfigError::MissingProject)?;
        let index = self.index.ok_or(ConfigError::MissingIndex)?;
        let spec = project
            .get_box_specs()
            .get(index)
            .ok_or(ConfigError::MissingIndex)?;

        Ok(VmBox::new(project, index, spec))
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
