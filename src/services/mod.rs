mod detect;
mod extract;
mod file;
mod http;
mod install;
mod metadata;

pub use detect::{DefaultDetectService, DetectService};
pub use extract::{DefaultExtractService, ExtractService};
pub use file::{DefaultFileService, FileService};
pub use http::{DefaultHttpService, HttpService};
pub use install::{DefaultInstallService, InstallError, InstallService};
pub use metadata::MetadataParser;

#[cfg(test)]
#[allow(unused)]
pub use detect::MockDefaultDetectService;
#[cfg(test)]
#[allow(unused)]
pub use extract::MockDefaultExtractService;
#[cfg(test)]
pub use file::MockDefaultFileService;
#[cfg(test)]
pub use http::MockDefaultHttpService;
#[cfg(test)]
pub use install::MockInstallService;
