use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::models::PluginMetadata;
use crate::services::FileService;

pub const METADATA_FILE_NAME: &str = "metadata.txt";

/// Reads the `[general]` section of a QGIS plugin `metadata.txt`
///
/// metadata.txt is an INI file:
/// ```text
/// [general]
/// name=pyArchInit
/// version=4.9.3
/// about=Long text that may continue
///   on indented lines
/// ```
pub struct MetadataParser {
    file_service: Arc<dyn FileService + Send + Sync>,
}

impl MetadataParser {
    pub fn new(file_service: Arc<dyn FileService + Send + Sync>) -> Self {
        Self { file_service }
    }

    /// Returns `Ok(None)` when the plugin folder has no metadata.txt
    pub fn read(&self, plugin_folder: &Path) -> Result<Option<PluginMetadata>> {
        let metadata_path = plugin_folder.join(METADATA_FILE_NAME);
        if !self.file_service.file_exists(&metadata_path)? {
            debug!("No {} in {}", METADATA_FILE_NAME, plugin_folder.display());
            return Ok(None);
        }
        let content = self.file_service.read_to_string(&metadata_path)?;
        Ok(Some(Self::parse(&content)))
    }

    pub fn parse(content: &str) -> PluginMetadata {
        let mut metadata = PluginMetadata::default();
        let mut section = String::new();

        for raw_line in content.lines() {
            // Indented lines continue the previous value
            if raw_line.starts_with([' ', '\t']) {
                continue;
            }

            let line = raw_line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                section = line[1..line.len() - 1].trim().to_lowercase();
                continue;
            }

            if section != "general" {
                continue;
            }

            if let Some((key, value)) = line.split_once(['=', ':']) {
                let value = value.trim();
                let value = (!value.is_empty()).then(|| value.to_string());
                match key.trim().to_lowercase().as_str() {
                    "name" => metadata.name = value,
                    "version" => metadata.version = value,
                    _ => {}
                }
            }
        }

        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{DefaultFileService, MockDefaultFileService};
    use std::path::PathBuf;

    #[test]
    fn test_parse_general_section() {
        let content = "[general]\nname=pyArchInit\nqgisMinimumVersion=3.0\nversion=4.9.3\n";
        let metadata = MetadataParser::parse(content);
        assert_eq!(metadata.name.as_deref(), Some("pyArchInit"));
        assert_eq!(metadata.version.as_deref(), Some("4.9.3"));
    }

    #[test]
    fn test_parse_ignores_other_sections() {
        let content = "[other]\nname=Wrong\nversion=0.0.1\n\n[general]\nname=pyArchInit\n";
        let metadata = MetadataParser::parse(content);
        assert_eq!(metadata.name.as_deref(), Some("pyArchInit"));
        assert_eq!(metadata.version, None);
    }

    #[test]
    fn test_parse_colon_separator_comments_and_whitespace() {
        let content =
            "; QGIS metadata\n# generated\n[ General ]\n  name = continuation\nName : pyArchInit \nversion = 5.0.0-dev\n";
        let metadata = MetadataParser::parse(content);
        assert_eq!(metadata.name.as_deref(), Some("pyArchInit"));
        assert_eq!(metadata.version.as_deref(), Some("5.0.0-dev"));
    }

    #[test]
    fn test_parse_value_containing_separator() {
        let content = "[general]\nname=pyArchInit: archaeology\nversion=\n";
        let metadata = MetadataParser::parse(content);
        assert_eq!(metadata.name.as_deref(), Some("pyArchInit: archaeology"));
        assert_eq!(metadata.version, None);
    }

    #[test]
    fn test_parse_empty_content() {
        assert_eq!(MetadataParser::parse(""), PluginMetadata::default());
    }

    #[test]
    fn test_read_returns_none_without_metadata_file() {
        let mut file_service = MockDefaultFileService::new();
        file_service
            .expect_file_exists()
            .withf(|p: &Path| p == Path::new("plugins/pyarchinit/metadata.txt"))
            .returning(|_| Ok(false));
        file_service.expect_read_to_string().never();

        let parser = MetadataParser::new(Arc::new(file_service));
        let result = parser.read(&PathBuf::from("plugins/pyarchinit")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_read_from_disk() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join(METADATA_FILE_NAME),
            "[general]\nname=pyArchInit\nversion=4.9.3\n",
        )
        .unwrap();

        let parser = MetadataParser::new(Arc::new(DefaultFileService));
        let metadata = parser.read(temp_dir.path()).unwrap().unwrap();
        assert_eq!(metadata.version.as_deref(), Some("4.9.3"));
    }
}
