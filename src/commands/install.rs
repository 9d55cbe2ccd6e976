use anyhow::{Context, Result};
use clap::Args;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::debug;

use crate::config::{AppConfig, DefaultAppConfig};
use crate::models::{Branch, InstallRequest, InstalledPlugin};
use crate::services::{
    DefaultDetectService, DefaultFileService, DefaultInstallService, DetectService,
};
use crate::ui::{InstallController, OperationManager};

#[derive(Args, Debug)]
#[command(about = "Download a PyArchInit branch from GitHub and install it into the QGIS plugins directory.")]
pub struct InstallArgs {
    #[arg(
        long,
        short,
        value_enum,
        default_value_t = Branch::Stable,
        help = "Branch to install: stable (master) or development (feature/qt6-migration)"
    )]
    branch: Branch,
    #[arg(long, short, help = "Replace an existing installation without asking")]
    yes: bool,
}

fn confirm_replace(existing: &InstalledPlugin, branch: Branch) -> Result<bool> {
    println!("This will replace the existing PyArchInit installation.");
    println!();
    println!("Current version: {}", existing.version_or_unknown());
    println!("Current folder: {}", existing.folder_name);
    println!();
    print!("Install {} branch? [y/N] ", branch);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(is_confirmation(&answer))
}

fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub async fn handle(
    args: &InstallArgs,
    app_config: DefaultAppConfig,
    show_progress: bool,
) -> Result<()> {
    debug!("Installing with args: {:?}", args);
    let app_config: Arc<dyn AppConfig> = Arc::new(app_config);

    let detect_service = DefaultDetectService::new(Arc::new(DefaultFileService));
    let existing =
        detect_service.find_existing_installation(app_config.get_plugins_folder_path())?;
    if let Some(existing) = &existing
        && !args.yes
        && !confirm_replace(existing, args.branch)?
    {
        println!("Installation cancelled.");
        return Ok(());
    }

    println!("Starting installation of {} branch...", args.branch);

    let operation_manager = if show_progress {
        OperationManager::new()?
    } else {
        OperationManager::hidden()?
    };
    let install_service = DefaultInstallService::from_config(app_config)?;
    let controller =
        InstallController::new(Arc::new(install_service), Arc::new(operation_manager));

    let outcome = controller
        .start(InstallRequest::new(args.branch))?
        .await
        .context("Installation task ended without a result")?;
    controller.operation_manager().finish();

    match outcome {
        Ok(plugin) => {
            println!("Installation completed successfully!");
            println!(
                "PyArchInit {} (v{}) installed successfully!",
                args.branch,
                plugin.version_or_unknown()
            );
            println!("Location: {}", plugin.path.display());
            println!();
            println!("Please restart QGIS to load the plugin.");
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context("Installation failed")),
    }
}
