//! Mirroring the project directory into a box's data volume.
//!
//! Syncing is best effort: every step is an external process, and a failed step is logged and
//! reported in the [`SyncOutcome`] rather than raised as an error.

use std::{io, path::Path, process::Command};

use serde::Serialize;

use crate::{
    utils::{self, GUEST_DATA_DIR},
    vm::VmBox,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The remote shell used to reach a box.
pub const SSH_PROGRAM: &str = "ssh";

/// The mirroring tool.
pub const RSYNC_PROGRAM: &str = "rsync";

/// The guest user files are synced as.
pub const GUEST_USER: &str = "vagrant";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Runs external processes on behalf of the sync action.
pub trait CommandRunner {
    /// Runs `program` with `args` to completion and returns whether it exited successfully.
    fn run(&self, program: &str, args: &[String]) -> io::Result<bool>;

    /// Returns whether `program` can be found on the search path.
    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Spawns real processes, inheriting the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

/// What a sync attempt did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The project does not enable syncing.
    Disabled,

    /// A required program is not installed.
    ToolMissing(&'static str),

    /// The box has no data volume yet, usually because it has not been provisioned.
    DataVolumeMissing,

    /// The sync ran; each step reports its own result.
    Completed(Vec<SyncStep>),
}

/// One step of a completed sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncStep {
    /// The step.
    pub kind: SyncStepKind,

    /// Whether the step's process ran and exited successfully.
    pub succeeded: bool,
}

/// The steps of a sync, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStepKind {
    /// Creating the data directory and handing it to the guest user.
    PrepareDataDir,

    /// Mirroring the project directory into the data directory.
    Mirror,

    /// Bind-mounting the data directory onto the project path in the guest.
    BindMount,
}

/// The commands that make up a sync of one box.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SyncPlan {
    volume_check: Vec<String>,
    steps: Vec<(SyncStepKind, &'static str, Vec<String>)>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<'p> VmBox<'p> {
    /// Syncs the project directory into this box using real processes.
    pub fn sync(&self) -> SyncOutcome {
        self.sync_with(&SystemRunner)
    }

    /// Syncs the project directory into this box through `runner`.
    ///
    /// Nothing runs unless the project enables syncing, both [`SSH_PROGRAM`] and
    /// [`RSYNC_PROGRAM`] are installed, and the box already has its data volume.
    pub fn sync_with(&self, runner: &dyn CommandRunner) -> SyncOutcome {
        let project = self.get_project();
        if !project.is_rsync_enabled() {
            tracing::debug!(project = %project.get_name(), "sync disabled");
            return SyncOutcome::Disabled;
        }

        for program in [SSH_PROGRAM, RSYNC_PROGRAM] {
            if !runner.is_available(program) {
                tracing::warn!("{program} not found, skipping sync");
                return SyncOutcome::ToolMissing(program);
            }
        }

        let plan = SyncPlan::for_box(self);

        match runner.run(SSH_PROGRAM, &plan.volume_check) {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(
                    "{GUEST_DATA_DIR} disk not mounted and formatted yet, skipping sync for now"
                );
                return SyncOutcome::DataVolumeMissing;
            }
            Err(err) => {
                tracing::warn!("could not check {} for its data volume: {err}", self.get_name());
                return SyncOutcome::DataVolumeMissing;
            }
        }

        tracing::info!(
            "syncing your project directory to the box's data directory ({})",
            utils::guest_data_dir(project.get_name())
        );

        let steps = plan
            .steps
            .into_iter()
            .map(|(kind, program, args)| {
                let succeeded = match runner.run(program, &args) {
                    Ok(succeeded) => succeeded,
                    Err(err) => {
                        tracing::warn!("could not run {program}: {err}");
                        false
                    }
                };

                if !succeeded {
                    tracing::warn!(step = ?kind, "sync step failed");
                }

                SyncStep { kind, succeeded }
            })
            .collect();

        SyncOutcome::Completed(steps)
    }
}

impl SyncOutcome {
    /// Returns whether the sync ran and every step succeeded.
    pub fn is_complete_success(&self) -> bool {
        matches!(self, Self::Completed(steps) if steps.iter().all(|step| step.succeeded))
    }
}

impl SyncPlan {
    fn for_box(vm: &VmBox<'_>) -> Self {
        let project = vm.get_project();
        let key = vm.private_key_path();
        let ip = vm.ip().to_string();
        let data_dir = utils::guest_data_dir(project.get_name());
        let project_dir = utils::guest_project_dir(project.get_name());

        let remote = |command: String| -> Vec<String> {
            vec![
                "-l".into(),
                GUEST_USER.into(),
                "-i".into(),
                key.display().to_string(),
                ip.clone(),
                command,
            ]
        };

        let volume_check = remote(format!("[ -d {GUEST_DATA_DIR} ]"));

        let prepare = remote(format!(
            "sudo mkdir -p {data_dir} && sudo chown {GUEST_USER}:{GUEST_USER} {data_dir}"
        ));

        let mut mirror: Vec<String> = [
            "--archive",
            "--hard-links",
            "--one-file-system",
            "--delete",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        mirror.extend(project.rsync_exclude_args());
        mirror.extend([
            "--compress-level=0".to_string(),
            "--omit-dir-times".to_string(),
            "-e".to_string(),
            remote_shell(&key),
            source_dir(project.base_dir()),
            format!("{ip}:{data_dir}/"),
        ]);

        let bind_mount = remote(format!(
            "mkdir -p {project_dir} && sudo mount -o bind {data_dir} {project_dir}"
        ));

        Self {
            volume_check,
            steps: vec![
                (SyncStepKind::PrepareDataDir, SSH_PROGRAM, prepare),
                (SyncStepKind::Mirror, RSYNC_PROGRAM, mirror),
                (SyncStepKind::BindMount, SSH_PROGRAM, bind_mount),
            ],
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// The `-e` value rsync uses to open its remote shell.
fn remote_shell(key: &Path) -> String {
    format!(
        "{SSH_PROGRAM} -l {GUEST_USER} -i {} -T -o Compression=no -x",
        quote_rsync_arg(&key.display().to_string())
    )
}

/// Single-quotes `arg` for rsync's `-e` splitter, which reads `''` inside quotes as a literal `'`
/// and does no other escaping.
fn quote_rsync_arg(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', "''"))
}

/// rsync copies a directory's contents, not the directory, when the source ends with `/`.
fn source_dir(dir: &Path) -> String {
    let dir = dir.display().to_string();
    if dir.ends_with('/') {
        dir
    } else {
        format!("{dir}/")
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<bool> {
        tracing::debug!("running {program} {}", args.join(" "));
        let status = Command::new(program).args(args).status()?;
        Ok(status.success())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
