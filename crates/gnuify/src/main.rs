//! gnuify - install GNU command-line utilities on macOS and prefer them over BSD

use anyhow::Result;
use clap::{Parser, Subcommand};
use gnuify_core::tui::RunArgs;
use gnuify_core::{ProductConfig, Profile};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Built-in package and shell-file profile
const DEFAULT_PROFILE: &str = include_str!("../profile.yaml");

/// gnuify product configuration
#[derive(Clone)]
pub struct GnuifyConfig;

impl ProductConfig for GnuifyConfig {
    fn name(&self) -> &'static str {
        "gnuify"
    }

    fn display_name(&self) -> &'static str {
        "gnuify"
    }

    fn cli_description(&self) -> &'static str {
        "Install GNU command-line utilities on macOS and prefer them over the BSD defaults"
    }

    fn block_marker(&self) -> &'static str {
        "gnuify: prefer GNU utilities over BSD"
    }

    fn default_profile(&self) -> gnuify_core::error::Result<Profile> {
        Profile::from_yaml(DEFAULT_PROFILE)
    }

    fn next_steps(&self, updated_files: &[PathBuf]) -> Vec<String> {
        let mut steps = Vec::new();

        if let Some(file) = updated_files.first() {
            steps.push(format!(
                "Open a new terminal, or run: source {}",
                file.display()
            ));
        }
        steps.push(format!("Run `{} verify` to re-check your PATH", self.name()));

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "gnuify")]
#[command(about = GnuifyConfig.cli_description())]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable debug logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install the GNU tools and update shell startup files
    Install(InstallArgs),
    /// Check which tools resolve to their GNU variants
    Verify(VerifyArgs),
}

#[derive(Parser, Debug, Default)]
pub struct InstallArgs {
    /// YAML profile listing packages and shell files (replaces the built-in one)
    #[arg(long, env = "GNUIFY_PROFILE")]
    pub profile: Option<PathBuf>,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,

    /// Make the installed bash the login shell without asking (with --yes)
    #[arg(long = "change-shell")]
    pub change_shell: bool,

    /// Skip verification after installing
    #[arg(long = "skip-verify")]
    pub skip_verify: bool,
}

impl From<InstallArgs> for RunArgs {
    fn from(args: InstallArgs) -> Self {
        RunArgs {
            profile: args.profile,
            yes: args.yes,
            change_shell: args.change_shell,
            skip_verify: args.skip_verify,
        }
    }
}

#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// YAML profile listing packages and shell files (replaces the built-in one)
    #[arg(long, env = "GNUIFY_PROFILE")]
    pub profile: Option<PathBuf>,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "gnuify=debug,gnuify_core=debug"
    } else {
        "gnuify=warn,gnuify_core=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    init_logging(args.verbose);
    let config = GnuifyConfig;

    let result = match args.command {
        Some(Command::Install(install_args)) => gnuify_core::run(&config, install_args.into()).await,
        Some(Command::Verify(verify_args)) => {
            gnuify_core::verify_only(&config, verify_args.profile.as_deref()).await
        }
        // No subcommand provided, default to an interactive install
        None => gnuify_core::run(&config, RunArgs::default()).await,
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}
