mod app;

pub use app::{AppConfig, DefaultAppConfig};

#[cfg(test)]
#[allow(unused)]
pub use app::MockDefaultAppConfig;
