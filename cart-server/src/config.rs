use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cart::{preset, CartConfig};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Fixed physics rate; dt = 1 / tick_hz.
    pub tick_hz: u32,
    pub debug_overlay: bool,
    pub spawn_height: f32,
    pub world: WorldConfig,
    /// Name of a built-in cart preset; ignored when `cart` is given.
    pub cart_preset: Option<String>,
    pub cart: Option<CartConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:9001".to_string(),
            tick_hz: 50,
            debug_overlay: false,
            spawn_height: 1.2,
            world: WorldConfig::default(),
            cart_preset: None,
            cart: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub ground_half_extent: f32, // m, square slab, top surface at y = 0
    pub bumps: u32,              // scattered low boxes to drive over
    pub bump_height: f32,        // m
    pub bump_seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            ground_half_extent: 200.0,
            bumps: 0,
            bump_height: 0.08,
            bump_seed: 7,
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: ServerConfig = read_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn dt(&self) -> f32 {
        1.0 / self.tick_hz as f32
    }

    /// Cart tuning used for every newly connected client.
    pub fn cart_config(&self) -> Result<CartConfig, ConfigError> {
        if let Some(cart) = &self.cart {
            return Ok(cart.clone());
        }

        match &self.cart_preset {
            None => Ok(CartConfig::default()),
            Some(name) => preset(name).ok_or_else(|| {
                ConfigError::Validation(format!("unknown cart_preset `{name}`"))
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_hz == 0 || self.tick_hz > 1000 {
            return Err(ConfigError::Validation(format!(
                "tick_hz must be in 1..=1000, got {}",
                self.tick_hz
            )));
        }

        if !(self.world.ground_half_extent.is_finite() && self.world.ground_half_extent > 0.0) {
            return Err(ConfigError::Validation("world.ground_half_extent must be > 0".into()));
        }

        if !(self.world.bump_height.is_finite() && self.world.bump_height > 0.0) {
            return Err(ConfigError::Validation("world.bump_height must be > 0".into()));
        }

        self.cart_config()?
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: Box<toml::de::Error>,
    },
    Validation(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse `{}`: {source}", path.display())
            }
            Self::Validation(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_toml(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

pub(crate) fn parse_toml<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, toml::de::Error> {
    toml::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg: ServerConfig = parse_toml("").unwrap();
        assert_eq!(cfg, ServerConfig::default());
        assert!(cfg.validate().is_ok());
        assert!((cfg.dt() - 0.02).abs() < 1e-6);
    }

    #[test]
    fn preset_and_wheel_overrides() {
        let cfg: ServerConfig = parse_toml(
            r#"
            tick_hz = 60
            cart_preset = "buggy"

            [world]
            bumps = 12
            "#,
        )
        .unwrap();

        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.world.bumps, 12);
        assert_eq!(cfg.cart_config().unwrap().mass, 600.0);
    }

    #[test]
    fn inline_cart_with_partial_wheel_tuning() {
        let cfg: ServerConfig = parse_toml(
            r#"
            [cart]
            mass = 80.0
            linear_damping = 0.1
            angular_damping = 0.5
            chassis_half_extents = [0.5, 0.2, 0.7]

            [[cart.wheels]]
            id = "L"
            offset = [0.5, -0.2, 0.0]
            config = { spring_strength = 3000.0, driven = true }

            [[cart.wheels]]
            id = "R"
            offset = [-0.5, -0.2, 0.0]
            "#,
        )
        .unwrap();

        assert!(cfg.validate().is_ok());
        let cart = cfg.cart_config().unwrap();
        assert_eq!(cart.wheels.len(), 2);
        assert_eq!(cart.wheels[0].config.spring_strength, 3000.0);
        assert!(cart.wheels[0].config.driven);
        assert_eq!(cart.wheels[0].config.radius, 0.35);
        assert!(!cart.wheels[1].config.driven);
    }

    #[test]
    fn degenerate_travel_fails_validation() {
        let cfg: ServerConfig = parse_toml(
            r#"
            [cart]
            mass = 80.0
            linear_damping = 0.1
            angular_damping = 0.5
            chassis_half_extents = [0.5, 0.2, 0.7]

            [[cart.wheels]]
            id = "L"
            offset = [0.5, -0.2, 0.0]
            config = { min_length = 0.6, max_length = 0.5 }
            "#,
        )
        .unwrap();

        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn unknown_preset_and_zero_rate_are_rejected() {
        let cfg = ServerConfig { cart_preset: Some("rocket".into()), ..Default::default() };
        assert!(cfg.validate().is_err());

        let cfg = ServerConfig { tick_hz: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn shipped_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/server.toml");
        let cfg = ServerConfig::load(&path).unwrap();
        assert!(cfg.debug_overlay);
        assert_eq!(cfg.world.bumps, 40);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ServerConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
