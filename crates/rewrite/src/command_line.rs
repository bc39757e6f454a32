use std::{collections::HashMap, path::PathBuf};

/// A build step invocation: what runs, where, and with which
/// environment.
///
/// The host hands the rewriter one of these and gets a new one back;
/// neither side mutates a descriptor after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandLine {
    pub executable: String,
    pub working_dir: PathBuf,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
}

impl CommandLine {
    pub fn new(executable: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            working_dir: working_dir.into(),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// A copy of this command line running `executable` with `args`
    /// instead, keeping the working directory and environment.
    pub fn relaunched_through(&self, executable: String, args: Vec<String>) -> Self {
        Self {
            executable,
            args,
            working_dir: self.working_dir.clone(),
            env: self.env.clone(),
        }
    }
}
