mod controller;

pub use controller::InstallController;

use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Steps of one installation, each rendered as its own progress bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Download,
    Extract,
    Replace,
}

impl Operation {
    const STEP_COUNT: usize = 3;

    pub fn progress_bar_style(&self) -> Result<ProgressStyle> {
        let template = match self {
            Operation::Download => {
                "{spinner:.green} {prefix} {msg} [{elapsed_precise}] {bytes} ({bytes_per_sec})"
            }
            Operation::Extract => "{spinner:.green} {prefix} {msg} [{bar:30}] {pos}/{len}",
            Operation::Replace => "{spinner:.green} {prefix} {msg}",
        };

        ProgressStyle::with_template(template)
            .context("Failed to create progress bar style")
            .map(|style| style.progress_chars(self.progress_chars()))
    }

    pub fn action_verb(&self) -> &'static str {
        match self {
            Operation::Download => "Downloading",
            Operation::Extract => "Extracting",
            Operation::Replace => "Replacing",
        }
    }

    pub fn step_index(&self) -> usize {
        match self {
            Operation::Download => 1,
            Operation::Extract => 2,
            Operation::Replace => 3,
        }
    }

    pub fn default_progress_bar_length(&self) -> u64 {
        match self {
            Operation::Replace => 1,
            _ => 500,
        }
    }

    pub fn progress_chars(&self) -> &'static str {
        "#>-"
    }

    pub fn create_progress_bar(
        &self,
        m: &MultiProgress,
        title: &str,
        branch: &str,
    ) -> Result<ProgressBar> {
        let pb = m.add(ProgressBar::new(self.default_progress_bar_length()));
        pb.set_style(self.progress_bar_style()?);
        pb.set_prefix(format!("[{}/{}]", self.step_index(), Self::STEP_COUNT));
        pb.set_message(format!("{}: {} ({})", self.action_verb(), title, branch));
        Ok(pb)
    }
}

/// Progress indicator of the install command
pub struct OperationManager {
    multi_progress: MultiProgress,
    main_progress: ProgressBar,
}

impl OperationManager {
    pub fn new() -> Result<Self> {
        let manager = Self::with_draw_target(ProgressDrawTarget::stderr())?;
        manager
            .main_progress
            .enable_steady_tick(Duration::from_millis(100));
        Ok(manager)
    }

    /// Renders nothing, used with `--quiet` and in tests
    pub fn hidden() -> Result<Self> {
        Self::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Result<Self> {
        let multi_progress = MultiProgress::with_draw_target(target);
        let main_progress = multi_progress.add(ProgressBar::no_length());

        main_progress.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .map_err(|e| anyhow::anyhow!("Failed to create main progress style: {}", e))?,
        );
        main_progress.set_message("Installing PyArchInit");

        Ok(Self {
            multi_progress,
            main_progress,
        })
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.main_progress.set_message(message.into());
    }

    pub fn add_progress_bar(
        &self,
        operation: Operation,
        title: &str,
        branch: &str,
    ) -> Result<ProgressBar> {
        operation.create_progress_bar(&self.multi_progress, title, branch)
    }

    pub fn finish(&self) {
        self.main_progress.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_styles() {
        for operation in [
            Operation::Download,
            Operation::Extract,
            Operation::Replace,
        ] {
            assert!(operation.progress_bar_style().is_ok());
        }
    }

    #[test]
    fn test_action_verb() {
        assert_eq!(Operation::Download.action_verb(), "Downloading");
        assert_eq!(Operation::Extract.action_verb(), "Extracting");
        assert_eq!(Operation::Replace.action_verb(), "Replacing");
    }

    #[test]
    fn test_default_progress_bar_length() {
        assert_eq!(Operation::Download.default_progress_bar_length(), 500);
        assert_eq!(Operation::Replace.default_progress_bar_length(), 1);
    }

    #[test]
    fn test_progress_chars() {
        assert_eq!(Operation::Download.progress_chars(), "#>-");
    }

    #[test]
    fn test_create_progress_bar_download() {
        let m = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let pb = Operation::Download
            .create_progress_bar(&m, "PyArchInit", "master")
            .unwrap();
        assert_eq!(pb.length().unwrap(), 500);
        assert_eq!(pb.prefix(), "[1/3]");
        assert_eq!(pb.message(), "Downloading: PyArchInit (master)");
    }

    #[test]
    fn test_create_progress_bar_replace() {
        let m = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let pb = Operation::Replace
            .create_progress_bar(&m, "PyArchInit", "dev")
            .unwrap();
        assert_eq!(pb.length().unwrap(), 1);
        assert_eq!(pb.prefix(), "[3/3]");
    }

    #[test]
    fn test_operation_manager_workflow() {
        let manager = OperationManager::hidden().unwrap();
        manager.set_message("Downloading master branch...");
        let pb = manager
            .add_progress_bar(Operation::Download, "PyArchInit", "master")
            .unwrap();
        pb.finish();
        manager.finish();
    }
}
