//! `aeris` turns an aeriscloud project description into the parameters a hypervisor driver needs
//! to create its virtual machines.
//!
//! # Overview
//!
//! A project lives in a directory with a `.aeriscloud.yml` document. The document names the
//! project, gives it a numeric id and lists its boxes. From that, aeris derives everything the
//! driver consumes:
//!
//! - Network identity: every project gets `172.16.{id}.0/24` and each box an address in it
//! - Port forwards: SSH and HTTP exposed on host ports that never collide across projects
//! - Virtualization settings: memory, CPUs and a fixed set of hypervisor toggles
//! - Paths: data disk image and the SSH private key of each box
//! - Host mounts shared with the boxes
//!
//! It can also mirror the project directory into a box's data volume over SSH and rsync.
//!
//! # Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//! use aeris::{config::Environment, project::Project};
//!
//! # fn main() -> anyhow::Result<()> {
//! let env = Arc::new(Environment::from_lookup(|_| None));
//! let project = Project::parse(
//!     r#"
//! project_name: game
//! id: 7
//! boxes:
//!   - name: Web
//!     cpu: 2
//!     ram: 2048
//! "#,
//!     env,
//! )?;
//!
//! let web = project.primary_box().unwrap();
//! assert_eq!(web.vm_name(), "game-web");
//! assert_eq!(web.ip().to_string(), "172.16.7.2");
//! assert_eq!(web.forwards().ssh.get_host(), 20141);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Environment snapshot, document schema and defaults
//! - [`project`] - The validated project model
//! - [`sync`] - Mirroring the project directory into a box
//! - [`utils`] - Path helpers and project discovery
//! - [`vm`] - Boxes and their derived parameters

#![warn(missing_docs)]

mod error;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod cli;
pub mod config;
pub mod project;
pub mod sync;
pub mod utils;
pub mod vm;

pub use error::*;
