use anyhow::Result;
use clap::Args;
use serde_derive::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::config::{AppConfig, DefaultAppConfig};
use crate::models::InstalledPlugin;
use crate::services::{DefaultDetectService, DefaultFileService, DetectService};

#[derive(Args, Debug)]
#[command(about = "Show the current PyArchInit installation.")]
pub struct StatusArgs {
    #[arg(long, help = "Print the status as JSON")]
    json: bool,
}

#[derive(Serialize)]
struct StatusReport<'a> {
    plugins_path: &'a Path,
    installed: Option<&'a InstalledPlugin>,
}

fn render_status(
    installed: Option<&InstalledPlugin>,
    plugins_path: &Path,
    target_folder_name: &str,
) -> String {
    match installed {
        Some(plugin) => {
            let mut lines = vec![
                "PyArchInit is currently installed".to_string(),
                format!("Version: {}", plugin.version_or_unknown()),
                format!("Location: {}", plugin.path.display()),
            ];
            if plugin.folder_name != target_folder_name {
                lines.push(format!(
                    "Warning: Plugin folder is named '{}' instead of '{}'",
                    plugin.folder_name, target_folder_name
                ));
            }
            lines.join("\n")
        }
        None => format!(
            "PyArchInit is not installed\nPlugins path: {}",
            plugins_path.display()
        ),
    }
}

pub fn handle(args: &StatusArgs, app_config: &DefaultAppConfig) -> Result<()> {
    let detect_service = DefaultDetectService::new(Arc::new(DefaultFileService));
    let plugins_path = app_config.get_plugins_folder_path();
    let installed = detect_service.find_existing_installation(plugins_path)?;

    if args.json {
        let report = StatusReport {
            plugins_path,
            installed: installed.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{}",
            render_status(
                installed.as_ref(),
                plugins_path,
                app_config.get_target_folder_name()
            )
        );
    }

    Ok(())
}
