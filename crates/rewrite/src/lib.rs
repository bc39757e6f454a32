//! Rewrites build-step command lines to run through a configured
//! "run-as" launcher.
//!
//! When the host configuration carries a launcher command template
//! (e.g. `sudo -n {start_build_script}`), the original invocation is
//! captured into a platform-native temp script and the template's
//! macro is replaced with the script path. Without the parameter the
//! original command line passes through untouched.

use tracing::{debug, warn};

pub mod command_line;
pub mod host;
pub mod script;
pub mod shellwords;

pub use command_line::CommandLine;
pub use host::{HostContext, StaticHost};
pub use script::{ChmodPermissions, ChmodProcess, MarkExecutable, NoopMark, Platform};

/// Configuration parameter holding the launcher command template.
pub const RUN_AS_COMMAND_PARAM: &str = "build.run-as.command";

/// Placeholder in the template replaced with the generated script's
/// path.
pub const START_BUILD_SCRIPT_MACRO: &str = "{start_build_script}";

#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("unsupported operating system: {0}")]
    UnsupportedOs(&'static str),

    #[error("failed to create run-as script: {0}")]
    ScriptIo(#[from] std::io::Error),
}

/// Rewrites command lines for one platform, with the parameter key and
/// macro token injectable so hosts and tests can substitute their own.
pub struct Rewriter {
    command_param: String,
    script_macro: String,
    platform: Platform,
    marker: Box<dyn MarkExecutable>,
}

impl Rewriter {
    /// Rewriter for the running OS with the default parameter key and
    /// macro token.
    pub fn new() -> Result<Self, RewriteError> {
        Ok(Self::for_platform(Platform::current()?))
    }

    pub fn for_platform(platform: Platform) -> Self {
        Self {
            command_param: RUN_AS_COMMAND_PARAM.to_owned(),
            script_macro: START_BUILD_SCRIPT_MACRO.to_owned(),
            marker: platform.executable_marker(),
            platform,
        }
    }

    pub fn with_command_param(mut self, key: impl Into<String>) -> Self {
        self.command_param = key.into();
        self
    }

    pub fn with_script_macro(mut self, token: impl Into<String>) -> Self {
        self.script_macro = token.into();
        self
    }

    pub fn with_marker(mut self, marker: Box<dyn MarkExecutable>) -> Self {
        self.marker = marker;
        self
    }

    /// Rewrites `original` to run through the configured launcher.
    ///
    /// Returns `original` unchanged, with no script created, when the
    /// launcher parameter is absent or tokenizes to nothing. Otherwise
    /// the first template token becomes the new executable and the
    /// remaining tokens, with the macro replaced by the script path,
    /// become the new arguments. Working directory and environment are
    /// carried over as-is.
    pub fn process<H: HostContext>(
        &self,
        host: &H,
        original: &CommandLine,
    ) -> Result<CommandLine, RewriteError> {
        let Some(run_as) = host.config_param(&self.command_param) else {
            debug!(param = %self.command_param, "no run-as command configured, passing through");
            return Ok(original.clone());
        };

        let tokens = shellwords::split(run_as);
        let Some(launcher) = tokens.first() else {
            debug!("run-as command is blank, passing through");
            return Ok(original.clone());
        };

        let script = script::create_script(
            original,
            host.temp_dir(),
            self.platform,
            self.marker.as_ref(),
        )?;

        let resolved = host.resolve_params(run_as);
        if !resolved.contains(&self.script_macro) {
            // Substitution becomes a no-op and the script is never
            // referenced; almost certainly a misconfigured template.
            warn!(
                token = %self.script_macro,
                "run-as command does not contain the script macro, generated script will be unused"
            );
        }

        let script_arg = shellwords::quote_if_needed(&script.to_string_lossy()).into_owned();
        let substituted = resolved.replace(&self.script_macro, &script_arg);

        let mut args = shellwords::split(&substituted);
        if !args.is_empty() {
            args.remove(0);
        }

        debug!(launcher = %launcher, ?args, "rewrote command line through run-as launcher");

        Ok(original.relaunched_through(launcher.clone(), args))
    }
}
