//! Renders an original command line into a platform-native script file.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process::Command,
};

use tracing::{debug, warn};

use crate::{command_line::CommandLine, shellwords, RewriteError};

/// Script flavor for the build agent's operating system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    Posix,
    Windows,
}

impl Platform {
    /// Classifies the running OS. An OS that is neither unix-like nor
    /// Windows is an error rather than a silent default: the script
    /// flavor must never be guessed.
    pub fn current() -> Result<Self, RewriteError> {
        if cfg!(windows) {
            Ok(Self::Windows)
        } else if cfg!(unix) {
            Ok(Self::Posix)
        } else {
            Err(RewriteError::UnsupportedOs(std::env::consts::OS))
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Posix => ".sh",
            Self::Windows => ".cmd",
        }
    }

    pub fn line_ending(self) -> &'static str {
        match self {
            Self::Posix => "\n",
            Self::Windows => "\r\n",
        }
    }

    /// The strategy used to make generated scripts runnable on this
    /// platform.
    pub fn executable_marker(self) -> Box<dyn MarkExecutable> {
        match self {
            Self::Posix => Box::new(ChmodPermissions),
            Self::Windows => Box::new(NoopMark),
        }
    }
}

/// Marks a generated script runnable for every principal (`chmod a+x`).
pub trait MarkExecutable {
    fn mark(&self, script: &Path) -> io::Result<()>;
}

/// Sets the execute bits directly through the filesystem API.
pub struct ChmodPermissions;

impl MarkExecutable for ChmodPermissions {
    fn mark(&self, script: &Path) -> io::Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut permissions = std::fs::metadata(script)?.permissions();
            permissions.set_mode(permissions.mode() | 0o111);
            std::fs::set_permissions(script, permissions)
        }
        #[cfg(not(unix))]
        {
            let _ = script;
            Ok(())
        }
    }
}

/// Shells out to `chmod a+x` and waits for it, for hosts where the
/// filesystem API is off limits.
pub struct ChmodProcess;

impl MarkExecutable for ChmodProcess {
    fn mark(&self, script: &Path) -> io::Result<()> {
        let status = Command::new("chmod").arg("a+x").arg(script).status()?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("chmod exited with {status}")))
        }
    }
}

/// Windows has no execute bit.
pub struct NoopMark;

impl MarkExecutable for NoopMark {
    fn mark(&self, _script: &Path) -> io::Result<()> {
        Ok(())
    }
}

/// Writes `original` as a uniquely named script in `temp_dir` and
/// returns its path.
///
/// The file is left on disk for the host to execute and eventually
/// clean up. A failure to mark the script executable is logged and
/// ignored; the script is still used.
pub fn create_script(
    original: &CommandLine,
    temp_dir: &Path,
    platform: Platform,
    marker: &dyn MarkExecutable,
) -> Result<PathBuf, RewriteError> {
    let eol = platform.line_ending();

    let mut body = String::from("cd ");
    body.push_str(&original.working_dir.to_string_lossy());
    body.push_str(eol);
    body.push_str(&shellwords::render_invocation(
        &original.executable,
        &original.args,
    ));
    body.push_str(eol);

    let mut file = tempfile::Builder::new()
        .prefix("build")
        .suffix(platform.extension())
        .tempfile_in(temp_dir)?;

    file.write_all(body.as_bytes())?;

    // Ownership of the file passes to the host from here on; disarm
    // tempfile's delete-on-drop.
    let (_, path) = file.keep().map_err(|e| e.error)?;

    if platform == Platform::Posix {
        if let Err(e) = marker.mark(&path) {
            warn!(path = %path.display(), "failed to mark script executable: {e}");
        }
    }

    debug!(path = %path.display(), "created run-as script");

    Ok(path)
}
