use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::loader::{ParentSchema, RegionSchema};

/// Data layout for a run, loaded from TOML.
///
/// ```toml
/// [data]
/// regions = "tl_2024_us_county.geojson"
/// parents = "tl_2024_us_state.geojson"
///
/// [regions]
/// id_property = "GEOID"
/// parent_property = "STATEFP"
/// name_property = "NAME"
///
/// [parents]
/// key_property = "STATEFP"
/// name_property = "NAME"
/// ```
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub regions: RegionSchema,
    pub parents: ParentSchema,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    pub regions: Option<PathBuf>,
    pub parents: Option<PathBuf>,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        // Relative data paths are relative to the config file
        if let Some(dir) = path.parent() {
            for p in [&mut config.data.regions, &mut config.data.parents]
                .into_iter()
                .flatten()
            {
                if p.is_relative() {
                    *p = dir.join(&*p);
                }
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.regions.id_property, "GEOID");
        assert_eq!(config.parents.name_property, "NAME");
    }

    #[test]
    fn test_partial_override() {
        let config: Config = toml::from_str(
            r#"
            [regions]
            id_property = "COUNTYNS"
            name_property = "NAMELSAD"
            "#,
        )
        .unwrap();
        assert_eq!(config.regions.id_property, "COUNTYNS");
        assert_eq!(config.regions.parent_property, "STATEFP");
        assert_eq!(config.regions.name_property.as_deref(), Some("NAMELSAD"));
    }

    #[test]
    fn test_paths_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("footprint.toml");
        fs::write(
            &path,
            "[data]\nregions = \"counties.geojson\"\nparents = \"/abs/states.geojson\"\n",
        )
        .unwrap();
        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.data.regions, Some(dir.path().join("counties.geojson")));
        assert_eq!(config.data.parents, Some(PathBuf::from("/abs/states.geojson")));
    }

    #[test]
    fn test_missing_file_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Config::load_from_file(&path).unwrap_err();
        assert!(format!("{err}").contains("missing.toml"));
    }
}
