mod install;
mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::Verbosity;
use std::path::PathBuf;
use std::time::Duration;
use tracing::level_filters::LevelFilter;

use crate::commands::{install::InstallArgs, status::StatusArgs};
use crate::config::DefaultAppConfig;

#[derive(Parser)]
#[command(about, version, author, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub verbose: Verbosity,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "QGIS python plugins directory, detected from the QGIS profile when omitted"
    )]
    pub plugins_dir: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        default_value = "default",
        help = "QGIS profile whose plugins directory is used"
    )]
    pub profile: String,

    #[arg(
        long,
        global = true,
        value_name = "SECONDS",
        default_value_t = 300,
        help = "Download timeout in seconds"
    )]
    pub timeout: u64,

    #[arg(long, global = true, hide = true, default_value = "https://github.com")]
    pub github_base_url: String,
}

#[derive(Subcommand)]
pub enum Commands {
    Install(InstallArgs),
    Status(StatusArgs),
}

impl Cli {
    pub fn app_config(&self) -> Result<DefaultAppConfig> {
        Ok(
            DefaultAppConfig::resolve(self.plugins_dir.clone(), &self.profile)?
                .with_github_base_url(self.github_base_url.clone())
                .with_download_timeout(Duration::from_secs(self.timeout)),
        )
    }

    /// `-q` turns every output but the final result off, progress bars included
    pub fn show_progress(&self) -> bool {
        self.verbose.tracing_level_filter() != LevelFilter::OFF
    }
}

pub async fn handle(cli: &Cli) -> Result<()> {
    let app_config = cli.app_config()?;

    match &cli.command {
        Commands::Install(install_args) => {
            install::handle(install_args, app_config, cli.show_progress()).await?;
        }
        Commands::Status(status_args) => {
            status::handle(status_args, &app_config)?;
        }
    }

    Ok(())
}
