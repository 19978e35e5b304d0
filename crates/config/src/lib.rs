//! Configuration models and loaders for the sky map engine.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which anomaly the orbital reconstruction uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyModelSetting {
    #[default]
    Mean,
    Kepler,
}

/// How the device is held relative to the line of sight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewDirectionSetting {
    #[default]
    Standard,
    Rotate90,
    Telescope,
}

/// Engine tunables; every field has a default so partial documents are accepted.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub anomaly_model: AnomalyModelSetting,
    pub field_of_view_deg: f64,
    pub use_magnetic_correction: bool,
    pub view_direction: ViewDirectionSetting,
    pub celestial_update_interval_ms: i64,
    /// Squared sensor vector length below which readings are discarded.
    pub sensor_tolerance: f64,
    pub location_change_threshold_deg: f64,
    pub transition_time_ms: i64,
    pub rise_set_max_iterations: usize,
    pub rise_set_convergence_hours: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            anomaly_model: AnomalyModelSetting::Mean,
            field_of_view_deg: 45.0,
            use_magnetic_correction: true,
            view_direction: ViewDirectionSetting::Standard,
            celestial_update_interval_ms: 60_000,
            sensor_tolerance: 0.01,
            location_change_threshold_deg: 0.01,
            transition_time_ms: 2_500,
            rise_set_max_iterations: 25,
            rise_set_convergence_hours: 0.008,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fov = self.field_of_view_deg;
        if fov.is_nan() || fov <= 0.0 || fov > 180.0 {
            return Err(ConfigError::Validation(format!(
                "field_of_view_deg must be in (0, 180], got {}",
                self.field_of_view_deg
            )));
        }
        if self.rise_set_max_iterations == 0 {
            return Err(ConfigError::Validation(
                "rise_set_max_iterations must be at least 1".into(),
            ));
        }
        let positive = [
            ("rise_set_convergence_hours", self.rise_set_convergence_hours),
            ("sensor_tolerance", self.sensor_tolerance),
            ("location_change_threshold_deg", self.location_change_threshold_deg),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.celestial_update_interval_ms < 0 || self.transition_time_ms <= 0 {
            return Err(ConfigError::Validation(
                "intervals must be non-negative and the transition time positive".into(),
            ));
        }
        Ok(())
    }
}

/// A named observing site.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SiteConfig {
    pub name: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    #[serde(default)]
    pub utc_offset_hours: Option<f64>,
}

impl SiteConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-90.0..=90.0).contains(&self.latitude_deg) {
            return Err(ConfigError::Validation(format!(
                "site '{}' latitude {} outside [-90, 90]",
                self.name, self.latitude_deg
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude_deg) {
            return Err(ConfigError::Validation(format!(
                "site '{}' longitude {} outside [-180, 180]",
                self.name, self.longitude_deg
            )));
        }
        if let Some(offset) = self.utc_offset_hours {
            if !(-14.0..=14.0).contains(&offset) {
                return Err(ConfigError::Validation(format!(
                    "site '{}' utc offset {offset} outside [-14, 14]",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
    #[error("no site named '{0}'")]
    UnknownSite(String),
}

/// Load observing sites from a YAML list, a TOML file or a directory of TOML files.
pub fn load_sites<P: AsRef<Path>>(path: P) -> Result<Vec<SiteConfig>, ConfigError> {
    let sites: Vec<SiteConfig> = load_records(path)?;
    for site in &sites {
        site.validate()?;
    }
    Ok(sites)
}

/// Find a site by case-insensitive name.
pub fn find_site<'a>(sites: &'a [SiteConfig], name: &str) -> Result<&'a SiteConfig, ConfigError> {
    sites
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| ConfigError::UnknownSite(name.to_string()))
}

/// Load and validate engine settings from a single YAML or TOML document.
pub fn load_engine_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let config: EngineConfig = if is_toml(path) {
        toml::from_str(&std::fs::read_to_string(path)?)?
    } else {
        serde_yaml::from_reader(File::open(path)?)?
    };
    config.validate()?;
    Ok(config)
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn partial_documents_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.yaml");
        fs::write(&path, "anomaly_model: kepler\nview_direction: rotate90\n").unwrap();
        let config = load_engine_config(&path).unwrap();
        assert_eq!(config.anomaly_model, AnomalyModelSetting::Kepler);
        assert_eq!(config.view_direction, ViewDirectionSetting::Rotate90);
        assert_eq!(config.field_of_view_deg, 45.0);
        assert_eq!(config.rise_set_max_iterations, 25);
        assert!(config.use_magnetic_correction);
    }

    #[test]
    fn toml_engine_config_is_validated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        fs::write(&path, "field_of_view_deg = 0.0\n").unwrap();
        match load_engine_config(&path) {
            Err(ConfigError::Validation(msg)) => assert!(msg.contains("field_of_view_deg")),
            other => panic!("expected validation error, got {other:?}"),
        }
        fs::write(&path, "rise_set_convergence_hours = 0.01\n").unwrap();
        assert_eq!(load_engine_config(&path).unwrap().rise_set_convergence_hours, 0.01);
    }

    #[test]
    fn sites_load_from_toml_directory_in_path_order() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("b_quito.toml"),
            "name = \"Quito\"\nlatitude_deg = -0.18\nlongitude_deg = -78.47\nutc_offset_hours = -5.0\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("a_greenwich.toml"),
            "name = \"Greenwich\"\nlatitude_deg = 51.48\nlongitude_deg = 0.0\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let sites = load_sites(dir.path()).unwrap();
        let names: Vec<_> = sites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Greenwich", "Quito"]);
        assert_eq!(sites[0].utc_offset_hours, None);
        assert_eq!(find_site(&sites, "quito").unwrap().utc_offset_hours, Some(-5.0));
        assert!(matches!(find_site(&sites, "Lima"), Err(ConfigError::UnknownSite(_))));
    }

    #[test]
    fn out_of_range_site_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sites.yaml");
        fs::write(&path, "- name: Nowhere\n  latitude_deg: 91.0\n  longitude_deg: 0.0\n").unwrap();
        assert!(matches!(load_sites(&path), Err(ConfigError::Validation(_))));
    }
}
