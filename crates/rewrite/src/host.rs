//! Facilities the build host provides to the rewriter.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

/// Read-only view of the host the rewriter runs inside.
pub trait HostContext {
    /// Value of a build configuration parameter, if one is set.
    fn config_param(&self, key: &str) -> Option<&str>;

    /// Build-scoped directory for transient artifacts. Unique file
    /// names within it are the rewriter's problem, concurrent builds
    /// colliding on the directory is the host's.
    fn temp_dir(&self) -> &Path;

    /// Resolves host-level shared parameter references embedded in
    /// `text`. Opaque to the rewriter; runs before macro substitution.
    fn resolve_params(&self, text: &str) -> String;
}

/// A fixed parameter map over a fixed temp directory, with an identity
/// parameter resolver. Backs the CLI harness and the test suite.
#[derive(Clone, Debug, Default)]
pub struct StaticHost {
    params: HashMap<String, String>,
    temp_dir: PathBuf,
}

impl StaticHost {
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            params: HashMap::new(),
            temp_dir: temp_dir.into(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.params.extend(params);
        self
    }
}

impl HostContext for StaticHost {
    fn config_param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    fn resolve_params(&self, text: &str) -> String {
        text.to_owned()
    }
}
