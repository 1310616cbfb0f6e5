use std::collections::HashMap;

use anyhow::{anyhow, Result};
use dotenv::dotenv;

pub trait Config: Send + Sync {
    fn get(&self, key: &str) -> Result<String>;
    fn clone_box_dyn(&self) -> Box<dyn Config>;
}

impl Clone for Box<dyn Config> {
    fn clone(&self) -> Self {
        self.clone_box_dyn()
    }
}

/// Configuration that consults `main` first and falls back to `fallback`
/// for keys that `main` cannot resolve.
#[derive(Clone)]
pub struct CompositeConfig {
    main: Box<dyn Config>,
    fallback: Box<dyn Config>,
}

impl CompositeConfig {
    pub fn from_configs(main: Box<dyn Config>, fallback: Box<dyn Config>) -> CompositeConfig {
        CompositeConfig { main, fallback }
    }
}

impl Config for CompositeConfig {
    fn get(&self, key: &str) -> Result<String> {
        self.main.get(key).or_else(|_e| self.fallback.get(key))
    }

    fn clone_box_dyn(&self) -> Box<dyn Config> {
        Box::new(CompositeConfig {
            main: self.main.clone_box_dyn(),
            fallback: self.fallback.clone_box_dyn(),
        })
    }
}

/// Configuration backed by process environment variables, with any
/// `.env` file contents loaded into the environment on construction.
#[derive(Clone)]
pub struct EnvConfig;

impl EnvConfig {
    pub fn from_env() -> EnvConfig {
        match dotenv() {
            Ok(path) => {
                let path = path.to_string_lossy();
                println!("additional environment variables loaded from {path}");
            }
            Err(e) => {
                println!("no .env file loaded: {e}");
            }
        }

        EnvConfig
    }
}

impl Config for EnvConfig {
    fn get(&self, key: &str) -> Result<String> {
        std::env::var(key).map_err(|_| anyhow!("no such environment variable {key}"))
    }

    fn clone_box_dyn(&self) -> Box<dyn Config> {
        Box::new(self.clone())
    }
}

/// Built-in tunables of the tracker. Every key here can be overridden
/// through the environment; `STORE_URL` intentionally has no default so
/// that an unconfigured tracker stays in dry-run mode.
pub fn default_config() -> impl Config {
    let default_values = [
        ("SAMPLE_INTERVAL_MINUTES", "15"),
        ("WINDOW_START", "06:00"),
        ("WINDOW_END", "24:00"),
        ("FIX_TIMEOUT_SECS", "30"),
        ("GEOCODER_URL", "https://nominatim.openstreetmap.org"),
        ("FIXED_LAT", "0.0"),
        ("FIXED_LON", "0.0"),
    ];
    let mut default_config = HashMap::<String, String>::new();
    for (k, v) in default_values {
        default_config.insert(k.to_string(), v.to_string());
    }
    HashMapConfig::new(default_config)
}

pub struct HashMapConfig {
    map: HashMap<String, String>,
}

impl HashMapConfig {
    pub fn new(map: HashMap<String, String>) -> HashMapConfig {
        Self { map }
    }
}

impl Config for HashMapConfig {
    fn get(&self, key: &str) -> Result<String> {
        self.map
            .get(key)
            .map(String::clone)
            .ok_or_else(|| anyhow!("key '{key}' not found"))
    }

    fn clone_box_dyn(&self) -> Box<dyn Config> {
        Box::new(HashMapConfig {
            map: self.map.clone(),
        })
    }
}

#[test]
fn test_composite_prefers_main() {
    let mut main = HashMap::new();
    main.insert("A".to_string(), "from-main".to_string());
    let mut fallback = HashMap::new();
    fallback.insert("A".to_string(), "from-fallback".to_string());
    fallback.insert("B".to_string(), "only-fallback".to_string());

    let config = CompositeConfig::from_configs(
        Box::new(HashMapConfig::new(main)),
        Box::new(HashMapConfig::new(fallback)),
    );

    assert_eq!(config.get("A").unwrap(), "from-main");
    assert_eq!(config.get("B").unwrap(), "only-fallback");
    assert!(config.get("C").is_err());
}

#[test]
fn test_default_config_has_window_bounds() {
    let config = default_config();
    assert_eq!(config.get("WINDOW_START").unwrap(), "06:00");
    assert_eq!(config.get("WINDOW_END").unwrap(), "24:00");
    assert!(config.get("STORE_URL").is_err());
}
