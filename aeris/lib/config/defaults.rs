use std::net::Ipv4Addr;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The install root used when `AERISCLOUD_PATH` is not set.
pub const DEFAULT_BASE_PATH: &str = "/opt/aeriscloud";

/// The base image used when a box entry does not name one.
pub const DEFAULT_BASEBOX: &str = "chef/centos-7.0";

/// The number of CPUs given to a box that does not ask for any.
pub const DEFAULT_NUM_CPUS: u32 = 1;

/// The amount of RAM in MB given to a box that does not ask for any.
pub const DEFAULT_RAM_MB: u32 = 1024;

/// The smallest amount of RAM in MB a box may be declared with.
pub const MIN_RAM_MB: u32 = 1024;

/// The number of boxes that fit in one project's port range.
pub const MAX_BOXES_PER_PROJECT: usize = 20;

/// The stride between two consecutive projects' port ranges.
pub const PORT_STRIDE: u16 = 20;

/// The first host port used for SSH forwards.
pub const SSH_HOST_PORT_BASE: u16 = 20001;

/// The first host port used for web forwards.
pub const WEB_HOST_PORT_BASE: u16 = 30001;

/// The guest SSH port.
pub const SSH_GUEST_PORT: u16 = 22;

/// The guest web port.
pub const WEB_GUEST_PORT: u16 = 80;

/// The first two octets of every project subnet.
pub const PROJECT_NETWORK_PREFIX: [u8; 2] = [172, 16];

/// The prefix length of every project subnet.
pub const PROJECT_SUBNET_PREFIX_LEN: u8 = 24;

/// The netmask handed to the hypervisor for the private network.
pub const PROJECT_NETMASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

/// Guest addresses start at `.2`; `.1` is the router.
pub const FIRST_GUEST_HOST_OCTET: u8 = 2;

/// BIOS logo display time in ms when the graphical console is enabled.
pub const GUI_BIOS_LOGO_DISPLAY_MS: u32 = 10_000;

/// BIOS logo display time in ms for headless boots.
pub const HEADLESS_BIOS_LOGO_DISPLAY_MS: u32 = 10;

/// Mount options for NFS shares between the host and the boxes.
pub const NFS_MOUNT_OPTIONS: &[&str] = &[
    "fsc",
    "vers=3",
    "tcp",
    "nosuid",
    "nodev",
    "noatime",
    "nodiratime",
    "nolock",
    "async",
    "rsize=65536",
    "wsize=65536",
    "intr",
    "acregmin=6",
    "acregmax=120",
    "acdirmin=60",
    "acdirmax=120",
];
