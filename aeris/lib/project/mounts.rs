use std::{collections::BTreeMap, path::PathBuf};

use crate::{utils, ConfigError, ConfigResult};

use super::Project;

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Project {
    /// Resolves the host directories shared with the boxes, keyed by mount name.
    ///
    /// Paths are expanded against [`Project::base_dir`] and must name existing directories. The
    /// project name is reserved for the project share itself and cannot be used as a mount name.
    pub fn mounts(&self) -> ConfigResult<BTreeMap<String, PathBuf>> {
        let Some(mounts) = self.document.get_mounts() else {
            return Ok(BTreeMap::new());
        };

        let base_dir = self.base_dir();
        mounts
            .iter()
            .map(|(name, path)| {
                if name == &self.name {
                    return Err(ConfigError::ReservedMountName(name.clone()));
                }

                let resolved = utils::expand_path(path, base_dir);
                if !resolved.is_dir() {
                    return Err(ConfigError::MountPathMissing(resolved));
                }

                Ok((name.clone(), resolved))
            })
            .collect()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
