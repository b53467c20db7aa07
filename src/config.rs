//! Static and loadable configuration.
//!
//! Ship stats are compiled into `world::ship`. This module holds the
//! per-map-size planet counts, the per-difficulty strategist profiles, and
//! the engine configuration file. Profiles are validated once when loaded;
//! everything downstream trusts them.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("profile '{profile}': {field} = {value} is outside {range}")]
    OutOfRange {
        profile: String,
        field: &'static str,
        value: f64,
        range: &'static str,
    },

    #[error("unknown {kind} '{value}'")]
    UnknownName { kind: &'static str, value: String },

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("option {name} needs a value")]
    MissingValue { name: String },

    #[error("invalid value '{value}' for option {name}")]
    InvalidValue { name: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub const fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_name(name: &str) -> Result<Difficulty, ConfigError> {
        match name {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ConfigError::UnknownName { kind: "difficulty", value: other.to_string() }),
        }
    }

    /// The built-in profile for this level.
    pub fn profile(self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                expansion_priority: 0.5,
                military_priority: 0.4,
                aggressiveness: 0.2,
                build_efficiency: 0.5,
                targeting: Targeting::Random,
                fleet_coordination: false,
                attack_force_ratio: 0.5,
                escort_size: 1,
                overkill_factor: 1.0,
                home_defense_ratio: 0.5,
                counter_attack_enabled: false,
            },
            Difficulty::Normal => DifficultyProfile {
                expansion_priority: 0.7,
                military_priority: 0.6,
                aggressiveness: 0.35,
                build_efficiency: 0.75,
                targeting: Targeting::Nearest,
                fleet_coordination: true,
                attack_force_ratio: 0.6,
                escort_size: 2,
                overkill_factor: 1.3,
                home_defense_ratio: 0.35,
                counter_attack_enabled: true,
            },
            Difficulty::Hard => DifficultyProfile {
                expansion_priority: 0.85,
                military_priority: 0.8,
                aggressiveness: 0.5,
                build_efficiency: 0.95,
                targeting: Targeting::Optimal,
                fleet_coordination: true,
                attack_force_ratio: 0.75,
                escort_size: 3,
                overkill_factor: 1.5,
                home_defense_ratio: 0.25,
                counter_attack_enabled: true,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapSize {
    Small,
    Medium,
    Large,
}

impl MapSize {
    pub const fn planet_count(self) -> usize {
        match self {
            MapSize::Small => 10,
            MapSize::Medium => 16,
            MapSize::Large => 24,
        }
    }

    pub fn from_name(name: &str) -> Result<MapSize, ConfigError> {
        match name {
            "small" => Ok(MapSize::Small),
            "medium" => Ok(MapSize::Medium),
            "large" => Ok(MapSize::Large),
            other => Err(ConfigError::UnknownName { kind: "map size", value: other.to_string() }),
        }
    }
}

/// How the strategist picks among candidate planets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Targeting {
    Random,
    Nearest,
    Optimal,
}

/// Strategist tuning for one difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DifficultyProfile {
    /// Probability of preferring a colonizer build.
    pub expansion_priority: f64,
    /// Probability of building a warship when outnumbered.
    pub military_priority: f64,
    /// Probability of launching an offensive on a given roll.
    pub aggressiveness: f64,
    /// Probability that a planet builds anything this turn.
    pub build_efficiency: f64,
    pub targeting: Targeting,
    pub fleet_coordination: bool,
    /// Fraction of a planet's available force sent on an attack.
    pub attack_force_ratio: f64,
    /// Warships escorting each colonizer.
    pub escort_size: u32,
    /// Required strength multiple over the target's defense.
    pub overkill_factor: f64,
    /// Fraction of each planet's warships held back in coordinated attacks.
    pub home_defense_ratio: f64,
    pub counter_attack_enabled: bool,
}

impl DifficultyProfile {
    /// Checks every numeric field against its legal range.
    pub fn validate(&self, profile: &str) -> Result<(), ConfigError> {
        let probability = "[0, 1]";
        let checks: [(&'static str, f64, bool, &'static str); 8] = [
            ("expansion_priority", self.expansion_priority, unit(self.expansion_priority), probability),
            ("military_priority", self.military_priority, unit(self.military_priority), probability),
            ("aggressiveness", self.aggressiveness, unit(self.aggressiveness), probability),
            ("build_efficiency", self.build_efficiency, unit(self.build_efficiency), probability),
            (
                "attack_force_ratio",
                self.attack_force_ratio,
                self.attack_force_ratio > 0.0 && self.attack_force_ratio <= 1.0,
                "(0, 1]",
            ),
            ("home_defense_ratio", self.home_defense_ratio, unit(self.home_defense_ratio), probability),
            (
                "overkill_factor",
                self.overkill_factor,
                self.overkill_factor >= 1.0 && self.overkill_factor.is_finite(),
                "[1, inf)",
            ),
            ("escort_size", self.escort_size as f64, self.escort_size <= 10, "[0, 10]"),
        ];
        for (field, value, ok, range) in checks {
            if !ok {
                return Err(ConfigError::OutOfRange {
                    profile: profile.to_string(),
                    field,
                    value,
                    range,
                });
            }
        }
        Ok(())
    }
}

fn unit(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}

/// Engine configuration, optionally loaded from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub difficulty: Difficulty,
    pub map_size: MapSize,
    /// Seed for galaxy layout only.
    pub map_seed: u64,
    /// Replacement profiles keyed by difficulty name.
    pub profiles: BTreeMap<String, DifficultyProfile>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            difficulty: Difficulty::Normal,
            map_size: MapSize::Medium,
            map_seed: 1,
            profiles: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// The active profile: an override if one was loaded, else the built-in.
    pub fn profile(&self) -> DifficultyProfile {
        self.profile_for(self.difficulty)
    }

    pub fn profile_for(&self, difficulty: Difficulty) -> DifficultyProfile {
        self.profiles
            .get(difficulty.name())
            .copied()
            .unwrap_or_else(|| difficulty.profile())
    }
}

/// Parses and validates a configuration from a TOML string.
pub fn parse_config(content: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = toml::from_str(content)?;
    for (name, profile) in &config.profiles {
        Difficulty::from_name(name)?;
        profile.validate(name)?;
    }
    Ok(config)
}

/// Loads and validates a configuration file.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profiles_are_valid() {
        for d in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            d.profile().validate(d.name()).unwrap();
        }
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.profile(), Difficulty::Normal.profile());
    }

    #[test]
    fn override_replaces_builtin_profile() {
        let toml = r#"
difficulty = "hard"
map_size = "small"
map_seed = 99

[profiles.hard]
expansion_priority = 0.1
military_priority = 0.2
aggressiveness = 0.3
build_efficiency = 0.4
targeting = "random"
fleet_coordination = false
attack_force_ratio = 0.5
escort_size = 0
overkill_factor = 2.0
home_defense_ratio = 0.0
counter_attack_enabled = false
"#;
        let config = parse_config(toml).unwrap();
        assert_eq!(config.map_size, MapSize::Small);
        assert_eq!(config.map_seed, 99);
        let profile = config.profile();
        assert_eq!(profile.targeting, Targeting::Random);
        assert_eq!(profile.overkill_factor, 2.0);
        assert_eq!(config.profile_for(Difficulty::Easy), Difficulty::Easy.profile());
    }

    #[test]
    fn out_of_range_profile_is_rejected() {
        let mut profile = Difficulty::Normal.profile();
        profile.aggressiveness = 1.5;
        let err = profile.validate("normal").unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "aggressiveness", .. }));

        let mut profile = Difficulty::Normal.profile();
        profile.overkill_factor = 0.5;
        assert!(profile.validate("normal").is_err());
    }

    #[test]
    fn unknown_profile_name_is_rejected() {
        let mut toml = String::from("[profiles.brutal]\n");
        toml.push_str(&toml::to_string(&Difficulty::Hard.profile()).unwrap());
        assert!(matches!(
            parse_config(&toml),
            Err(ConfigError::UnknownName { kind: "difficulty", .. })
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(parse_config("speed = 3"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn names_parse() {
        assert_eq!(Difficulty::from_name("hard").unwrap(), Difficulty::Hard);
        assert!(Difficulty::from_name("brutal").is_err());
        assert_eq!(MapSize::from_name("large").unwrap().planet_count(), 24);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config(Path::new("/nonexistent/starclaim.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/starclaim.toml"));
    }
}
