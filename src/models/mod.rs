mod branch;
mod plugin;

pub use branch::{Branch, InstallRequest};
pub use plugin::{InstalledPlugin, PluginMetadata};
