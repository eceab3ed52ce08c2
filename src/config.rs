use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::aggregate::{
    AggregateSettings, DEFAULT_BUCKET_WIDTH_KM, DEFAULT_TOP_COMMODITIES, MIN_BUCKET_WIDTH_KM,
};
use crate::data::distance::{BaseLocation, RegionBounds, DEFAULT_ROAD_SPEED_KMH};
use crate::data::loader::LoaderSettings;

pub const DEFAULT_DATA_FILE: &str = "zambia_mining_app_data.csv";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Process-wide settings, resolved once at startup.
///
/// Precedence, lowest first: built-in defaults, TOML file, `MINE_PLANNER_*`
/// environment variables, command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub base: BaseLocation,
    pub average_speed_kmh: f64,
    pub histogram_bucket_km: f64,
    pub top_commodities: usize,
    pub region: RegionBounds,
    /// Flag properties whose coordinates fall outside `region`.
    pub flag_outside_region: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            base: BaseLocation::default(),
            average_speed_kmh: DEFAULT_ROAD_SPEED_KMH,
            histogram_bucket_km: DEFAULT_BUCKET_WIDTH_KM,
            top_commodities: DEFAULT_TOP_COMMODITIES,
            region: RegionBounds::default(),
            flag_outside_region: true,
        }
    }
}

/// Values given on the command line; `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_path: Option<PathBuf>,
    pub average_speed_kmh: Option<f64>,
    pub histogram_bucket_km: Option<f64>,
    pub top_commodities: Option<usize>,
}

impl DashboardConfig {
    /// Resolve the full configuration stack and validate the result.
    pub fn load(file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config
            .apply_env(|key| std::env::var(key).ok())
            .apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Layer environment variables on top. Unparseable values are logged and
    /// ignored.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            let raw = lookup(key)?;
            match raw.trim().parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    log::warn!("Ignoring invalid {key} value '{raw}'");
                    None
                }
            }
        }

        if let Some(path) = lookup("MINE_PLANNER_DATA") {
            self.data_path = PathBuf::from(path);
        }
        if let Some(name) = lookup("MINE_PLANNER_BASE_NAME") {
            self.base.name = name;
        }
        if let Some(lat) = parsed(&lookup, "MINE_PLANNER_BASE_LAT") {
            self.base.latitude = lat;
        }
        if let Some(lon) = parsed(&lookup, "MINE_PLANNER_BASE_LON") {
            self.base.longitude = lon;
        }
        if let Some(speed) = parsed(&lookup, "MINE_PLANNER_SPEED_KMH") {
            self.average_speed_kmh = speed;
        }
        if let Some(width) = parsed(&lookup, "MINE_PLANNER_BUCKET_KM") {
            self.histogram_bucket_km = width;
        }
        if let Some(n) = parsed(&lookup, "MINE_PLANNER_TOP_COMMODITIES") {
            self.top_commodities = n;
        }
        self
    }

    pub fn apply_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(path) = &overrides.data_path {
            self.data_path = path.clone();
        }
        if let Some(speed) = overrides.average_speed_kmh {
            self.average_speed_kmh = speed;
        }
        if let Some(width) = overrides.histogram_bucket_km {
            self.histogram_bucket_km = width;
        }
        if let Some(n) = overrides.top_commodities {
            self.top_commodities = n;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |key: &'static str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    key,
                    reason: format!("expected a positive number, got {v}"),
                })
            }
        };
        positive("average_speed_kmh", self.average_speed_kmh)?;
        positive("histogram_bucket_km", self.histogram_bucket_km)?;
        if self.histogram_bucket_km < MIN_BUCKET_WIDTH_KM {
            return Err(ConfigError::Invalid {
                key: "histogram_bucket_km",
                reason: format!(
                    "{} km is narrower than the {MIN_BUCKET_WIDTH_KM} km minimum",
                    self.histogram_bucket_km
                ),
            });
        }

        if self.top_commodities == 0 {
            return Err(ConfigError::Invalid {
                key: "top_commodities",
                reason: "must be at least 1".into(),
            });
        }
        if !(-90.0..=90.0).contains(&self.base.latitude) {
            return Err(ConfigError::Invalid {
                key: "base.latitude",
                reason: format!("{} is outside -90..90", self.base.latitude),
            });
        }
        if !(-180.0..=180.0).contains(&self.base.longitude) {
            return Err(ConfigError::Invalid {
                key: "base.longitude",
                reason: format!("{} is outside -180..180", self.base.longitude),
            });
        }
        Ok(())
    }

    pub fn loader_settings(&self) -> LoaderSettings {
        LoaderSettings {
            base: self.base.clone(),
            road_speed_kmh: self.average_speed_kmh,
            region: self.flag_outside_region.then_some(self.region),
        }
    }

    pub fn aggregate_settings(&self) -> AggregateSettings {
        AggregateSettings {
            top_commodities: self.top_commodities,
            bucket_width_km: self.histogram_bucket_km,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_chingola() {
        let config = DashboardConfig::default();
        assert_eq!(config.base.latitude, -12.5333);
        assert_eq!(config.base.longitude, 27.85);
        assert_eq!(config.average_speed_kmh, 70.0);
        assert_eq!(config.top_commodities, 10);
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_FILE));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
data_path = "data/properties.csv"
histogram_bucket_km = 25.0

[base]
name = "Kitwe Office"
"#
        )
        .unwrap();

        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.data_path, PathBuf::from("data/properties.csv"));
        assert_eq!(config.histogram_bucket_km, 25.0);
        assert_eq!(config.base.name, "Kitwe Office");
        assert_eq!(config.base.latitude, -12.5333);
        assert_eq!(config.average_speed_kmh, 70.0);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(matches!(
            DashboardConfig::from_toml_str("top_commodities = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn environment_overrides_file_and_ignores_garbage() {
        let config = DashboardConfig::from_toml_str("average_speed_kmh = 60.0")
            .unwrap()
            .apply_env(env(&[
                ("MINE_PLANNER_SPEED_KMH", "55"),
                ("MINE_PLANNER_BASE_LAT", "north"),
                ("MINE_PLANNER_DATA", "/srv/props.parquet"),
            ]));
        assert_eq!(config.average_speed_kmh, 55.0);
        assert_eq!(config.base.latitude, -12.5333);
        assert_eq!(config.data_path, PathBuf::from("/srv/props.parquet"));
    }

    #[test]
    fn cli_overrides_win() {
        let overrides = ConfigOverrides {
            top_commodities: Some(5),
            ..Default::default()
        };
        let config = DashboardConfig::default()
            .apply_env(env(&[("MINE_PLANNER_TOP_COMMODITIES", "15")]))
            .apply_overrides(&overrides);
        assert_eq!(config.top_commodities, 5);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = DashboardConfig::default();
        config.histogram_bucket_km = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "histogram_bucket_km", .. })
        ));

        let mut config = DashboardConfig::default();
        config.base.latitude = -120.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_rejects_hairline_buckets() {
        for width in [1e-300, 1e-6, 0.05] {
            let config = DashboardConfig::default().apply_overrides(&ConfigOverrides {
                histogram_bucket_km: Some(width),
                ..Default::default()
            });
            assert!(matches!(
                config.validate(),
                Err(ConfigError::Invalid { key: "histogram_bucket_km", .. })
            ));
        }

        let mut config = DashboardConfig::default();
        config.histogram_bucket_km = MIN_BUCKET_WIDTH_KM;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn region_flagging_can_be_disabled() {
        let mut config = DashboardConfig::default();
        assert_eq!(config.loader_settings().region, Some(RegionBounds::ZAMBIA));
        config.flag_outside_region = false;
        assert_eq!(config.loader_settings().region, None);
    }
}
