use std::fmt;

use serde::Serialize;

use super::{
    MAX_BOXES_PER_PROJECT, PORT_STRIDE, SSH_GUEST_PORT, SSH_HOST_PORT_BASE, WEB_GUEST_PORT,
    WEB_HOST_PORT_BASE,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A guest port exposed on a host port.
///
/// ## Format
/// A forward is written `host:guest`, the same way the hypervisor's port-forward rules are
/// usually read (e.g. "20021:22").
///
/// ## Examples
///
/// ```
/// use aeris::config::Forward;
///
/// let ssh = Forward::new(22, 20021);
/// assert_eq!(ssh.to_string(), "20021:22");
/// assert_eq!(serde_json::to_string(&ssh).unwrap(), r#""20021:22""#);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Forward {
    /// The guest port, called `src` by the hypervisor driver.
    guest: u16,

    /// The host port, called `dest` by the hypervisor driver.
    host: u16,
}

/// The two forwards every box gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Forwards {
    /// Guest SSH exposed on the host.
    pub ssh: Forward,

    /// Guest HTTP exposed on the host.
    pub web: Forward,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Forward {
    /// Creates a forward from `guest` to `host`.
    pub fn new(guest: u16, host: u16) -> Self {
        Self { guest, host }
    }

    /// Returns the guest port.
    pub fn get_guest(&self) -> u16 {
        self.guest
    }

    /// Returns the host port.
    pub fn get_host(&self) -> u16 {
        self.host
    }
}

impl Forwards {
    /// Derives the forwards of the box at `index` in the project with `project_id`.
    ///
    /// Each project owns a block of [`PORT_STRIDE`] host ports above each base, so boxes of the
    /// same project never collide and neither do boxes of different projects as long as a
    /// project holds at most [`PORT_STRIDE`] boxes.
    ///
    /// `index` must be below [`MAX_BOXES_PER_PROJECT`], which project parsing guarantees; with
    /// that bound the highest port is `30001 + 255 * 20 + 19`.
    pub(crate) fn for_box(project_id: u8, index: usize) -> Self {
        debug_assert!(index < MAX_BOXES_PER_PROJECT);
        let offset = u16::from(project_id) * PORT_STRIDE + index as u16;
        Self {
            ssh: Forward::new(SSH_GUEST_PORT, SSH_HOST_PORT_BASE + offset),
            web: Forward::new(WEB_GUEST_PORT, WEB_HOST_PORT_BASE + offset),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Display for Forward {
    /// Formats the forward as "host:guest".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.guest)
    }
}

impl Serialize for Forward {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
