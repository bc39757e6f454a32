use std::{collections::HashMap, env, path::PathBuf, process::Command};

use clap::{ArgAction, Parser};
use color_eyre::eyre::WrapErr;
use runshim_rewrite::{shellwords, CommandLine, Rewriter, StaticHost};
use tracing::info;

mod config;

use crate::config::ParamFile;

/// Runs a build command through a configured run-as launcher.
///
/// With a `build.run-as.command` parameter configured, the command is
/// captured into a temp script and handed to the launcher; without
/// one it runs directly.
#[derive(Parser, Debug)]
#[command(name = "runshim", version)]
struct Args {
    /// Path to a TOML file with configuration parameters.
    #[arg(long, env("RUNSHIM_CONFIG"), value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Extra configuration parameter, KEY=VALUE. [repeatable option]
    #[arg(short, long("param"), action = ArgAction::Append, value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Working directory for the build command. Defaults to the
    /// current directory.
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    workdir: Option<PathBuf>,

    /// Print the rewritten command line instead of running it.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,

    /// The build command to run.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))
}

fn run() -> color_eyre::Result<i32> {
    let args = Args::parse();

    let mut params = match &args.config {
        Some(path) => {
            ParamFile::from_file(path)
                .wrap_err_with(|| format!("failed to load {}", path.display()))?
                .params
        }
        None => HashMap::new(),
    };
    params.extend(args.params.iter().cloned());

    let (executable, step_args) = args
        .command
        .split_first()
        .expect("clap requires a command");

    let working_dir = match args.workdir {
        Some(dir) => dir,
        None => env::current_dir()?,
    };

    let original = CommandLine::new(executable, working_dir)
        .with_args(step_args.iter().cloned())
        .with_env(env::vars().collect());

    let temp_dir = tempfile::Builder::new().prefix("runshim").tempdir()?;
    let host = StaticHost::new(temp_dir.path()).with_params(params);

    let rewritten = Rewriter::new()?.process(&host, &original)?;

    if args.dry_run {
        // A printed script path must outlive this process.
        let _ = temp_dir.keep();
        println!("{}", render_command(&rewritten));
        return Ok(0);
    }

    info!(executable = %rewritten.executable, "running build command");

    let status = Command::new(&rewritten.executable)
        .args(&rewritten.args)
        .current_dir(&rewritten.working_dir)
        .envs(&rewritten.env)
        .status()
        .wrap_err_with(|| format!("failed to run {}", rewritten.executable))?;

    Ok(status.code().unwrap_or(1))
}

fn render_command(command: &CommandLine) -> String {
    let mut line = shellwords::quote_if_needed(&command.executable).into_owned();

    for arg in &command.args {
        line.push(' ');
        line.push_str(&shellwords::quote_if_needed(arg));
    }

    line
}

fn install_tracing() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let fmt_layer = fmt::layer().with_target(false);
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();
}

fn install_panic_hook() {
    let _ = color_eyre::config::HookBuilder::default().install();
}

fn main() {
    install_tracing();
    install_panic_hook();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("{error:?}");
            std::process::exit(1);
        }
    }
}
