//! The `.aeriscloud.yml` document schema.

use std::{collections::BTreeMap, fmt};

use getset::Getters;
use serde::{Deserialize, Deserializer, Serialize};
use typed_builder::TypedBuilder;

use crate::{ConfigError, ConfigResult};

use super::DebugFlag;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The project document as written by the user, before validation.
#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq, Getters)]
#[getset(get = "pub with_prefix")]
pub struct ProjectDocument {
    /// The project name.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub(crate) project_name: Option<String>,

    /// The numeric project id.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub(crate) id: Option<IntLike>,

    /// Where the project's base images are downloaded from.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub(crate) basebox_url: Option<String>,

    /// The provisioning debug flag.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub(crate) debug: Option<DebugFlag>,

    /// Host directories shared with the boxes, by mount name.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub(crate) mounts: Option<BTreeMap<String, String>>,

    /// The organization the project belongs to.
    ///
    /// `Some(None)` records an explicit null, which is distinct from an absent key.
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "deserialize_present"
    )]
    pub(crate) organization: Option<Option<String>>,

    /// Glob patterns left out of the sync.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub(crate) rsync_ignores: Option<Vec<String>>,

    /// Whether the project directory is synced into the primary data volume.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub(crate) use_rsync: Option<serde_yaml::Value>,

    /// The boxes, in declaration order.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub(crate) boxes: Option<Vec<BoxEntry>>,
}

/// A single entry of the `boxes` list.
#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq, TypedBuilder, Getters)]
#[getset(get = "pub with_prefix")]
pub struct BoxEntry {
    /// The box name, sanitized before use.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[builder(default, setter(transform = |name: impl AsRef<str>| Some(name.as_ref().to_string())))]
    pub(crate) name: Option<String>,

    /// The base image the box is created from.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[builder(default, setter(transform = |basebox: impl AsRef<str>| Some(basebox.as_ref().to_string())))]
    pub(crate) basebox: Option<String>,

    /// The number of CPUs.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[builder(default, setter(transform = |cpu: u32| Some(IntLike::Int(i64::from(cpu)))))]
    pub(crate) cpu: Option<IntLike>,

    /// The amount of RAM in MB.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[builder(default, setter(transform = |ram: u32| Some(IntLike::Int(i64::from(ram)))))]
    pub(crate) ram: Option<IntLike>,

    /// Whether the box is provisioned after boot.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[builder(default, setter(strip_option))]
    pub(crate) provision: Option<bool>,
}

/// An integer that may have been written as a YAML number or as a quoted string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IntLike {
    /// A YAML integer.
    Int(i64),

    /// A string that should hold an integer.
    Text(String),
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ProjectDocument {
    /// Parses a project document.
    ///
    /// An empty document parses to an empty [`ProjectDocument`].
    pub fn parse(text: &str) -> ConfigResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        let document: Option<Self> = serde_yaml::from_str(text)?;
        Ok(document.unwrap_or_default())
    }
}

impl IntLike {
    /// Resolves the value to a signed integer, naming `field` on failure.
    pub fn to_i64(&self, field: &str) -> ConfigResult<i64> {
        match self {
            Self::Int(value) => Ok(*value),
            Self::Text(text) => text.trim().parse().map_err(|_| ConfigError::InvalidInteger {
                field: field.to_string(),
                value: text.clone(),
            }),
        }
    }

    /// Resolves the value to an unsigned 32-bit integer, naming `field` on failure.
    pub fn to_u32(&self, field: &str) -> ConfigResult<u32> {
        let value = self.to_i64(field)?;
        u32::try_from(value).map_err(|_| ConfigError::InvalidInteger {
            field: field.to_string(),
            value: self.to_string(),
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Marks a key as present, keeping a null value as `Some(None)`. Absent keys fall back to
/// `default`.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Display for IntLike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{}", value),
            Self::Text(text) => write!(f, "{}", text),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
