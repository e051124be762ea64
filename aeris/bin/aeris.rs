use std::{path::PathBuf, sync::Arc};

use aeris::{
    cli::{AerisArgs, AerisSubcommand, AnsiStyles, OutputFormat},
    config::Environment,
    project::{Project, ProvisionOptions},
    sync::SyncOutcome,
    utils,
    vm::{BoxParameters, VmBox},
    AerisError, AerisResult,
};
use clap::{CommandFactory, Parser};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// What `aeris show` prints.
#[derive(Debug, Serialize)]
struct ProjectReport {
    project: String,
    id: u8,
    subnet: String,
    organization: Option<String>,
    rsync: bool,
    provision: ProvisionOptions,
    boxes: Vec<BoxParameters>,
}

//--------------------------------------------------------------------------------------------------
// Functions: main
//--------------------------------------------------------------------------------------------------

fn main() -> AerisResult<()> {
    // Variables from a local .env file, if any, feed the environment snapshot
    dotenvy::dotenv().ok();

    let args = AerisArgs::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    fmt()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_level(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let env = Arc::new(Environment::load());

    match args.subcommand {
        Some(AerisSubcommand::Show { box_name, format }) => {
            let project = load_project(args.path, env)?;
            show(&project, box_name.as_deref(), format)?;
        }
        Some(AerisSubcommand::Mounts) => {
            let project = load_project(args.path, env)?;
            for (name, path) in project.mounts()? {
                println!("{} {}", name.header(), path.display());
            }
        }
        Some(AerisSubcommand::Sync { box_name }) => {
            let project = load_project(args.path, env)?;
            sync(&project, box_name.as_deref())?;
        }
        Some(AerisSubcommand::Env) => {
            print!("{}", serde_yaml::to_string(env.as_ref())?);
        }
        None => {
            AerisArgs::command().print_help()?;
        }
    }

    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Functions: Handlers
//--------------------------------------------------------------------------------------------------

fn show(project: &Project, box_name: Option<&str>, format: OutputFormat) -> AerisResult<()> {
    let boxes = match box_name {
        Some(name) => vec![find_box(project, name)?.parameters()],
        None => project.boxes().map(|vm| vm.parameters()).collect(),
    };

    let report = ProjectReport {
        project: project.get_name().clone(),
        id: *project.get_id(),
        subnet: project.subnet().to_string(),
        organization: project.organization(),
        rsync: project.is_rsync_enabled(),
        provision: project.provision_options(),
        boxes,
    };

    match format {
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&report)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

fn sync(project: &Project, box_name: Option<&str>) -> AerisResult<()> {
    let vm = match box_name {
        Some(name) => find_box(project, name)?,
        None => project
            .primary_box()
            .ok_or_else(|| AerisError::BoxNotFound("<primary>".to_string()))?,
    };

    match vm.sync() {
        SyncOutcome::Disabled => {
            println!("sync is not enabled for {}", project.get_name().literal());
        }
        SyncOutcome::ToolMissing(program) => {
            eprintln!(
                "{} {} is required to sync, please install it",
                "error:".error(),
                program.literal()
            );
        }
        SyncOutcome::DataVolumeMissing => {
            println!(
                "{} has no data volume yet, provision it first",
                vm.get_name().literal()
            );
        }
        SyncOutcome::Completed(steps) => {
            for step in steps {
                let status = if step.succeeded {
                    "ok".valid()
                } else {
                    "failed".error()
                };
                println!("{:?} {}", step.kind, status);
            }
        }
    }

    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn load_project(path: Option<PathBuf>, env: Arc<Environment>) -> AerisResult<Project> {
    let root = match path {
        Some(path) => path,
        None => utils::find_project_root(utils::current_dir_or_root())?,
    };

    tracing::debug!("loading project from {}", root.display());
    Project::load(root, env)
}

fn find_box<'p>(project: &'p Project, name: &str) -> AerisResult<VmBox<'p>> {
    project
        .get_box(&aeris::vm::sanitize_name(name))
        .ok_or_else(|| AerisError::BoxNotFound(name.to_string()))
}
