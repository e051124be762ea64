use std::path::PathBuf;
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of an aeris-related operation.
pub type AerisResult<T> = Result<T, AerisError>;

/// The result of loading or querying a project configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// An error that occurred while loading a project or deriving its parameters.
#[derive(pretty_error_debug::Debug, Error)]
pub enum AerisError {
    /// An I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The project configuration is invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// No `.aeriscloud.yml` could be found for the given directory.
    #[error("project config not found in {0} or any parent directory")]
    ConfigNotFound(PathBuf),

    /// The project declares no box with the requested name.
    #[error("project has no box named `{0}`")]
    BoxNotFound(String),

    /// An error that occurred while rendering JSON output.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error that occurred while rendering YAML output.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// An error raised by project or box validation.
///
/// Every variant is an operator mistake in the project document; none of them are retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not well-formed YAML or does not match the expected shape.
    #[error("malformed project document: {0}")]
    Syntax(#[source] serde_yaml::Error),

    /// A required top-level field is absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A field that must be an integer holds something else.
    #[error("field `{field}` must be a non-negative integer, got `{value}`")]
    InvalidInteger {
        /// The document key.
        field: String,

        /// The offending value as written.
        value: String,
    },

    /// The project id does not fit in the third octet of the project subnet.
    #[error("project id {0} is out of range, expected 0..=255")]
    InvalidProjectId(i64),

    /// The project name holds characters that are unsafe in guest paths and remote commands.
    #[error("project name `{0}` may only contain letters, digits, `_`, `.` and `-`")]
    InvalidProjectName(String),

    /// The project declares more boxes than its port range can hold.
    #[error("project declares {count} boxes, at most {max} are supported")]
    TooManyBoxes {
        /// The number of declared boxes.
        count: usize,

        /// The maximum number of boxes per project.
        max: usize,
    },

    /// A box entry failed validation.
    #[error("invalid box at index {index}: {source}")]
    InvalidBox {
        /// The position of the entry in the `boxes` list.
        index: usize,

        /// The underlying failure.
        #[source]
        source: Box<ConfigError>,
    },

    /// A box was built without its owning project.
    #[error("missing project for box")]
    MissingProject,

    /// A box was built without an index, or with one that names no declared box.
    #[error("missing index for box")]
    MissingIndex,

    /// The box name is empty after sanitization.
    #[error("missing name for box")]
    MissingName,

    /// The box asks for less memory than a box can boot with.
    #[error("boxes need at least {min} MB of memory, got {ram}")]
    InsufficientMemory {
        /// The requested amount of RAM in MB.
        ram: u32,

        /// The minimum amount of RAM in MB.
        min: u32,
    },

    /// A mount uses the project name, which is reserved for the project share.
    #[error("project name `{0}` cannot be used as a mount name")]
    ReservedMountName(String),

    /// A mount path does not exist or is not a directory.
    #[error("mount path {0} does not exist or is not a directory")]
    MountPathMissing(PathBuf),
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ConfigError {
    /// Wraps a box-level failure with the index of the offending entry.
    pub fn invalid_box(index: usize, source: ConfigError) -> Self {
        ConfigError::InvalidBox {
            index,
            source: Box::new(source),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl From<serde_yaml::Error> for ConfigError {
    fn from(error: serde_yaml::Error) -> Self {
        ConfigError::Syntax(error)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
