use std::{collections::HashMap, fs, path::Path};

use color_eyre::Result;
use serde_derive::Deserialize;
use tracing::debug;

/// Build configuration parameters loaded from a TOML file:
///
/// ```toml
/// [params]
/// "build.run-as.command" = "sudo -n {start_build_script}"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct ParamFile {
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl ParamFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let encoded_toml = fs::read_to_string(path)?;
        let parsed = toml::from_str(&encoded_toml)?;

        debug!(?path, "loaded configuration parameters");

        Ok(parsed)
    }
}
