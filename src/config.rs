use std::{fmt::Display, str::FromStr};
use tracing::warn;

use crate::game::MAX_WIRE_TILES;

/// Server settings, read from `MEMGAME_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Number of game slots offered in the lobby.
    pub slots: usize,
    /// Largest board a client may ask for.
    pub max_tiles: usize,
    /// Dump the board after every move.
    pub verbose: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8088".to_string(),
            slots: 20,
            max_tiles: 100,
            verbose: false,
        }
    }
}

fn parse_var<T>(name: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(e) => {
                warn!(variable = name, value = %raw, error = %e, "Ignoring invalid setting");
                default
            }
        },
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from any variable lookup, falling back to the default
    /// for missing or unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let max_tiles = parse_var("MEMGAME_MAX_TILES", lookup("MEMGAME_MAX_TILES"), defaults.max_tiles);
        let max_tiles = if (2..=MAX_WIRE_TILES).contains(&max_tiles) {
            max_tiles
        } else {
            warn!(max_tiles, "MEMGAME_MAX_TILES out of range, using default");
            defaults.max_tiles
        };
        Self {
            bind_addr: lookup("MEMGAME_BIND_ADDR").unwrap_or(defaults.bind_addr),
            slots: parse_var("MEMGAME_SLOTS", lookup("MEMGAME_SLOTS"), defaults.slots),
            max_tiles,
            verbose: parse_var("MEMGAME_VERBOSE", lookup("MEMGAME_VERBOSE"), defaults.verbose),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(config_from(&[]), ServerConfig::default());
    }

    #[test]
    fn test_values_are_read() {
        let config = config_from(&[
            ("MEMGAME_BIND_ADDR", "127.0.0.1:9000"),
            ("MEMGAME_SLOTS", "4"),
            ("MEMGAME_MAX_TILES", "36"),
            ("MEMGAME_VERBOSE", "true"),
        ]);
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.slots, 4);
        assert_eq!(config.max_tiles, 36);
        assert!(config.verbose);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("MEMGAME_SLOTS", "many"),
            ("MEMGAME_MAX_TILES", "5000"),
            ("MEMGAME_VERBOSE", "loud"),
        ]);
        assert_eq!(config.slots, 20);
        assert_eq!(config.max_tiles, 100);
        assert!(!config.verbose);
    }
}
