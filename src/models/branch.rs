use clap::ValueEnum;
use serde_derive::Serialize;
use std::fmt;

/// Source line of the upstream repository to install from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    #[default]
    #[value(alias = "master")]
    Stable,
    #[value(alias = "dev")]
    Development,
}

impl Branch {
    /// Git branch the archive is built from
    pub fn git_ref(&self) -> &'static str {
        match self {
            Branch::Stable => "master",
            Branch::Development => "feature/qt6-migration",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Branch::Stable => "master",
            Branch::Development => "dev",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallRequest {
    pub branch: Branch,
}

impl InstallRequest {
    pub fn new(branch: Branch) -> InstallRequest {
        InstallRequest { branch }
    }
}
