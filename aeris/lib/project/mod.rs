//! The project model.
//!
//! A [`Project`] is parsed once from `.aeriscloud.yml`, validated, and then only queried. It owns
//! its boxes; [`VmBox`] views borrow it.

mod mounts;

use std::{
    fs,
    net::Ipv4Addr,
    path::{Path, PathBuf},
    sync::{Arc, LazyLock},
};

use getset::Getters;
use ipnetwork::Ipv4Network;
use regex::Regex;
use serde::Serialize;

use crate::{
    config::{
        DebugFlag, Environment, ProjectDocument, MAX_BOXES_PER_PROJECT, PROJECT_NETWORK_PREFIX,
        PROJECT_SUBNET_PREFIX_LEN,
    },
    utils::{self, PROJECT_CONFIG_FILENAME},
    vm::{BoxSpec, VmBox},
    AerisResult, ConfigError, ConfigResult,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Project names are spliced into guest paths and remote commands, so they stay shell-inert.
static PROJECT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("static pattern"));

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A validated project and the boxes it declares.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub with_prefix")]
pub struct Project {
    /// The project name.
    name: String,

    /// The project id, which picks the project's subnet and port range.
    id: u8,

    /// Where the project's base images are downloaded from.
    basebox_url: Option<String>,

    /// The directory relative paths resolve against.
    root: PathBuf,

    /// The boxes in declaration order.
    #[getset(skip)]
    boxes: Vec<BoxSpec>,

    /// The document the project was built from.
    document: ProjectDocument,

    /// The environment snapshot used for fallbacks.
    environment: Arc<Environment>,

    #[getset(skip)]
    subnet: Ipv4Network,
}

/// What the provisioning tool is told besides the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionOptions {
    /// The debug flag.
    pub debug: DebugFlag,

    /// Tags to run.
    pub tags: Option<String>,

    /// Tags to skip.
    pub skip_tags: Option<String>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Project {
    /// Parses and validates a project document.
    ///
    /// Relative paths in the document resolve against the current directory at the time of the
    /// call.
    pub fn parse(text: &str, environment: Arc<Environment>) -> ConfigResult<Self> {
        let document = ProjectDocument::parse(text)?;
        Self::from_document(document, utils::current_dir_or_root(), environment)
    }

    /// Loads `.aeriscloud.yml` from `dir`.
    ///
    /// Relative paths in the document resolve against `dir`.
    pub fn load(dir: impl AsRef<Path>, environment: Arc<Environment>) -> AerisResult<Self> {
        let dir = utils::expand_path(dir, &utils::current_dir_or_root());
        let config_path = dir.join(PROJECT_CONFIG_FILENAME);
        if !config_path.is_file() {
            return Err(crate::AerisError::ConfigNotFound(dir));
        }

        let text = fs::read_to_string(&config_path)?;
        let document = ProjectDocument::parse(&text)?;

        Ok(Self::from_document(document, dir, environment)?)
    }

    /// Validates an already parsed document whose relative paths resolve against `root`.
    pub fn from_document(
        document: ProjectDocument,
        root: impl Into<PathBuf>,
        environment: Arc<Environment>,
    ) -> ConfigResult<Self> {
        let name = document
            .get_project_name()
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(ConfigError::MissingField("project_name"))?
            .to_string();

        if !PROJECT_NAME.is_match(&name) {
            return Err(ConfigError::InvalidProjectName(name));
        }

        let raw_id = document
            .get_id()
            .as_ref()
            .ok_or(ConfigError::MissingField("id"))?
            .to_i64("id")?;
        let id = u8::try_from(raw_id).map_err(|_| ConfigError::InvalidProjectId(raw_id))?;

        let [a, b] = PROJECT_NETWORK_PREFIX;
        let subnet = Ipv4Network::new(Ipv4Addr::new(a, b, id, 0), PROJECT_SUBNET_PREFIX_LEN)
            .map_err(|_| ConfigError::InvalidProjectId(raw_id))?;

        let entries = document.get_boxes().as_deref().unwrap_or_default();
        if entries.len() > MAX_BOXES_PER_PROJECT {
            return Err(ConfigError::TooManyBoxes {
                count: entries.len(),
                max: MAX_BOXES_PER_PROJECT,
            });
        }

        let boxes = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                BoxSpec::from_entry(entry).map_err(|err| ConfigError::invalid_box(index, err))
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        tracing::debug!(project = %name, id, boxes = boxes.len(), "loaded project");

        Ok(Self {
            name,
            id,
            basebox_url: document.get_basebox_url().clone(),
            root: root.into(),
            boxes,
            document,
            environment,
            subnet,
        })
    }

    /// Returns the project network, `172.16.{id}.0/24`.
    pub fn subnet(&self) -> Ipv4Network {
        self.subnet
    }

    /// Returns the directory relative paths resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub(crate) fn get_box_specs(&self) -> &[BoxSpec] {
        &self.boxes
    }

    /// Iterates over the boxes in declaration order.
    pub fn boxes(&self) -> impl ExactSizeIterator<Item = VmBox<'_>> + '_ {
        self.boxes
            .iter()
            .enumerate()
            .map(move |(index, spec)| VmBox::new(self, index, spec))
    }

    /// Returns the box with the given sanitized name.
    pub fn get_box(&self, name: &str) -> Option<VmBox<'_>> {
        self.boxes().find(|vm| vm.get_name() == name)
    }

    /// Returns the first declared box.
    pub fn primary_box(&self) -> Option<VmBox<'_>> {
        self.boxes().next()
    }

    /// Returns the provisioning debug flag, from the document if set, else from the environment.
    pub fn debug(&self) -> DebugFlag {
        self.document
            .get_debug()
            .clone()
            .unwrap_or_else(|| self.environment.get_ansible_debug().clone())
    }

    /// Returns the organization, from the document if the key is present, else from the
    /// environment.
    ///
    /// An explicit `organization: ~` yields `None` rather than the environment default.
    pub fn organization(&self) -> Option<String> {
        match self.document.get_organization() {
            Some(organization) => organization.clone(),
            None => Some(self.environment.get_organization().clone()),
        }
    }

    /// Returns whether the project directory is synced into the boxes.
    ///
    /// Only `true` or the string `"true"` enable it.
    pub fn is_rsync_enabled(&self) -> bool {
        match self.document.get_use_rsync() {
            Some(serde_yaml::Value::Bool(enabled)) => *enabled,
            Some(serde_yaml::Value::String(value)) => value == "true",
            _ => false,
        }
    }

    /// Renders the ignore patterns as exclusion flags, e.g. `--exclude=.git --exclude=*.log`.
    pub fn rsync_ignores(&self) -> String {
        self.rsync_exclude_args().join(" ")
    }

    /// Returns the ignore patterns as separate exclusion arguments.
    pub fn rsync_exclude_args(&self) -> Vec<String> {
        self.document
            .get_rsync_ignores()
            .iter()
            .flatten()
            .map(|pattern| format!("--exclude={pattern}"))
            .collect()
    }

    /// Returns the options handed to the provisioning tool.
    pub fn provision_options(&self) -> ProvisionOptions {
        ProvisionOptions {
            debug: self.debug(),
            tags: self.environment.get_ansible_tags().clone(),
            skip_tags: self.environment.get_ansible_skip_tags().clone(),
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

    use crate::AerisError;

    use super::*;

    fn env_from(vars: &[(&str, &str)]) -> Arc<Environment> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(Environment::from_lookup(|name| vars.get(name).cloned()))
    }

    fn parse(text: &str) -> ConfigResult<Project> {
        Project::parse(text, env_from(&[]))
    }

    #[test]
    fn test_project_parse_basic_fields() -> anyhow::Result<()> {
        let project = parse(
            "project_name: game\nid: 5\nbasebox_url: https://boxes.example.com\nboxes:\n  - name: web\n",
        )?;

        assert_eq!(project.get_name(), "game");
        assert_eq!(*project.get_id(), 5);
        assert_eq!(
            project.get_basebox_url().as_deref(),
            Some("https://boxes.example.com")
        );
        assert_eq!(project.boxes().len(), 1);
        assert_eq!(project.subnet().to_string(), "172.16.5.0/24");

        Ok(())
    }

    #[test]
    fn test_project_accepts_quoted_id() -> anyhow::Result<()> {
        let project = parse("project_name: game\nid: \"17\"\n")?;
        assert_eq!(*project.get_id(), 17);
        Ok(())
    }

    #[test]
    fn test_project_rejects_bad_ids() {
        assert!(matches!(
            parse("project_name: game\nid: abc\n"),
            Err(ConfigError::InvalidInteger { field, .. }) if field == "id"
        ));
        assert!(matches!(
            parse("project_name: game\nid: 256\n"),
            Err(ConfigError::InvalidProjectId(256))
        ));
        assert!(matches!(
            parse("project_name: game\nid: -1\n"),
            Err(ConfigError::InvalidProjectId(-1))
        ));
        assert!(matches!(
            parse("project_name: game\n"),
            Err(ConfigError::MissingField("id"))
        ));
    }

    #[test]
    fn test_project_requires_name() {
        assert!(matches!(
            parse("id: 1\n"),
            Err(ConfigError::MissingField("project_name"))
        ));
        assert!(matches!(
            parse("project_name: '  '\nid: 1\n"),
            Err(ConfigError::MissingField("project_name"))
        ));
    }

    #[test]
    fn test_project_name_must_be_shell_inert() -> anyhow::Result<()> {
        for name in ["my game", "x; touch /tmp/owned", "a&&b", "$(id)", "it's", "a/b"] {
            let document = format!("project_name: {name:?}\nid: 1\nuse_rsync: true\n");
            assert!(
                matches!(parse(&document), Err(ConfigError::InvalidProjectName(n)) if n == name),
                "{name}"
            );
        }

        let project = parse("project_name: game_v2.0-beta\nid: 1\n")?;
        assert_eq!(project.get_name(), "game_v2.0-beta");

        Ok(())
    }

    #[test]
    fn test_project_parse_captures_current_dir() -> anyhow::Result<()> {
        let project = parse("project_name: game\nid: 1\nboxes:\n  - name: web\n")?;
        let root = utils::current_dir_or_root();

        assert_eq!(project.get_root(), &root);
        assert_eq!(project.base_dir(), root.as_path());
        assert!(project
            .primary_box()
            .unwrap()
            .private_key_path()
            .starts_with(&root));

        Ok(())
    }

    #[test]
    fn test_project_syntax_error() {
        assert!(matches!(
            parse("project_name: game\nid: [1\n"),
            Err(ConfigError::Syntax(_))
        ));
    }

    #[test]
    fn test_project_without_boxes_or_mounts() -> anyhow::Result<()> {
        let project = parse("project_name: game\nid: 1\n")?;

        assert_eq!(project.boxes().len(), 0);
        assert!(project.primary_box().is_none());
        assert!(project.mounts()?.is_empty());

        Ok(())
    }

    #[test]
    fn test_project_keeps_box_order() -> anyhow::Result<()> {
        let project = parse(
            "project_name: game\nid: 1\nboxes:\n  - name: Web\n  - name: DB Master\n  - name: cache\n",
        )?;

        let names: Vec<_> = project.boxes().map(|vm| vm.get_name()).collect();
        assert_eq!(names, ["web", "db-master", "cache"]);
        assert_eq!(project.get_box("db-master").map(|vm| vm.get_index()), Some(1));
        assert!(project.get_box("DB Master").is_none());

        Ok(())
    }

    #[test]
    fn test_project_reports_failing_box_index() {
        let err = parse(
            "project_name: game\nid: 1\nboxes:\n  - name: web\n  - name: db\n    ram: 512\n",
        )
        .unwrap_err();

        match err {
            ConfigError::InvalidBox { index, source } => {
                assert_eq!(index, 1);
                assert!(matches!(
                    *source,
                    ConfigError::InsufficientMemory { ram: 512, .. }
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_project_rejects_too_many_boxes() {
        let mut text = "project_name: game\nid: 1\nboxes:\n".to_string();
        for i in 0..=MAX_BOXES_PER_PROJECT {
            text.push_str(&format!("  - name: box{i}\n"));
        }

        assert!(matches!(
            parse(&text),
            Err(ConfigError::TooManyBoxes { count, .. }) if count == MAX_BOXES_PER_PROJECT + 1
        ));
    }

    #[test]
    fn test_project_rsync_enabled() -> anyhow::Result<()> {
        let cases = [
            ("use_rsync: true", true),
            ("use_rsync: \"true\"", true),
            ("use_rsync: false", false),
            ("use_rsync: \"false\"", false),
            ("use_rsync: \"yes\"", false),
            ("use_rsync: 1", false),
            ("", false),
        ];

        for (line, expected) in cases {
            let project = parse(&format!("project_name: game\nid: 1\n{line}\n"))?;
            assert_eq!(project.is_rsync_enabled(), expected, "{line}");
        }

        Ok(())
    }

    #[test]
    fn test_project_rsync_ignores() -> anyhow::Result<()> {
        let project = parse("project_name: game\nid: 1\nrsync_ignores:\n  - .git\n  - '*.log'\n")?;
        assert_eq!(project.rsync_ignores(), "--exclude=.git --exclude=*.log");
        assert_eq!(
            project.rsync_exclude_args(),
            ["--exclude=.git", "--exclude=*.log"]
        );

        let project = parse("project_name: game\nid: 1\n")?;
        assert_eq!(project.rsync_ignores(), "");
        assert!(project.rsync_exclude_args().is_empty());

        Ok(())
    }

    #[test]
    fn test_project_debug_and_organization_fallback() -> anyhow::Result<()> {
        let env = env_from(&[("DEBUG", "vvv"), ("AERISCLOUD_DEFAULT_ORGANIZATION", "wizcorp")]);

        let project = Project::parse("project_name: game\nid: 1\n", env.clone())?;
        assert_eq!(project.debug(), DebugFlag::Value("vvv".into()));
        assert_eq!(project.organization().as_deref(), Some("wizcorp"));

        let project = Project::parse(
            "project_name: game\nid: 1\ndebug: false\norganization: acme\n",
            env,
        )?;
        assert_eq!(project.debug(), DebugFlag::Toggle(false));
        assert_eq!(project.organization().as_deref(), Some("acme"));

        Ok(())
    }

    #[test]
    fn test_project_explicit_null_organization_skips_fallback() -> anyhow::Result<()> {
        let env = env_from(&[("AERISCLOUD_DEFAULT_ORGANIZATION", "wizcorp")]);
        let project = Project::parse("project_name: game\nid: 1\norganization: ~\n", env)?;

        assert_eq!(project.organization(), None);

        Ok(())
    }

    #[test]
    fn test_project_provision_options() -> anyhow::Result<()> {
        let env = env_from(&[("tags", "web"), ("skip_tags", "slow")]);
        let project = Project::parse("project_name: game\nid: 1\ndebug: true\n", env)?;

        assert_eq!(
            project.provision_options(),
            ProvisionOptions {
                debug: DebugFlag::Toggle(true),
                tags: Some("web".into()),
                skip_tags: Some("slow".into()),
            }
        );

        Ok(())
    }

    #[test]
    fn test_project_load_from_dir() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        fs::write(
            temp.path().join(PROJECT_CONFIG_FILENAME),
            "project_name: game\nid: 9\nboxes:\n  - name: web\n",
        )?;

        let project = Project::load(temp.path(), env_from(&[]))?;
        assert_eq!(project.get_root(), temp.path());
        assert!(project
            .primary_box()
            .unwrap()
            .private_key_path()
            .starts_with(temp.path()));

        Ok(())
    }

    #[test]
    fn test_project_load_missing_config() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let err = Project::load(temp.path(), env_from(&[])).unwrap_err();
        assert!(matches!(err, AerisError::ConfigNotFound(_)));
        Ok(())
    }
}
