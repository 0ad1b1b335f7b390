use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AssetError, AssetResult};

/// Tunables for the asset layer.
///
/// Loaded from TOML; every field is optional and falls back to its default.
///
/// ```toml
/// max_link_hops = 32
/// default_mime_type = "*/*"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Links followed before resolution gives up with a cyclic reference.
    pub max_link_hops: usize,
    /// Mime type reported when none is stored.
    pub default_mime_type: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            max_link_hops: 32,
            default_mime_type: "*/*".to_string(),
        }
    }
}

impl AssetsConfig {
    pub fn from_toml_str(raw: &str) -> AssetResult<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| AssetError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> AssetResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AssetError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> AssetResult<()> {
        if self.max_link_hops == 0 {
            return Err(AssetError::Config("max_link_hops must be at least 1".into()));
        }
        if self.default_mime_type.trim().is_empty() {
            return Err(AssetError::Config("default_mime_type must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = AssetsConfig::default();
        assert_eq!(c.max_link_hops, 32);
        assert_eq!(c.default_mime_type, "*/*");
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = AssetsConfig::from_toml_str("max_link_hops = 4").unwrap();
        assert_eq!(c.max_link_hops, 4);
        assert_eq!(c.default_mime_type, "*/*");
    }

    #[test]
    fn rejects_zero_hops() {
        let err = AssetsConfig::from_toml_str("max_link_hops = 0").unwrap_err();
        assert!(matches!(err, AssetError::Config(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(AssetsConfig::from_toml_str("max_link_hops = \"many\"").is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.toml");
        std::fs::write(&path, "default_mime_type = \"application/octet-stream\"\n").unwrap();
        let c = AssetsConfig::load(&path).unwrap();
        assert_eq!(c.default_mime_type, "application/octet-stream");
        assert!(AssetsConfig::load(dir.path().join("missing.toml")).is_err());
    }
}
