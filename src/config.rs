//! Server configuration from environment variables

use crate::types::GameConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory with the client bundle, served for any non-API path
    pub static_dir: PathBuf,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            static_dir: PathBuf::from("static"),
            game: GameConfig::default(),
        }
    }
}

/// Read and parse an env var, warning and falling back on garbage
fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}, using default", name, raw);
            None
        }
    }
}

fn positive(name: &str, value: Option<f32>) -> Option<f32> {
    value.filter(|v| {
        let ok = v.is_finite() && *v > 0.0;
        if !ok {
            tracing::warn!("{} must be positive, using default", name);
        }
        ok
    })
}

impl ServerConfig {
    /// Load config from environment variables
    ///
    /// - `BIND_ADDR` (default `0.0.0.0:3000`)
    /// - `STATIC_DIR` (default `static`)
    /// - `TASK_PHASE_SECONDS` (default 180)
    /// - `MAP_WIDTH` / `MAP_HEIGHT` (default 2000 x 1500)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = parse_var::<SocketAddr>("BIND_ADDR").unwrap_or(defaults.bind_addr);

        let static_dir = std::env::var("STATIC_DIR")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        let task_phase = parse_var::<u64>("TASK_PHASE_SECONDS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.game.task_phase);

        let map_width = positive("MAP_WIDTH", parse_var("MAP_WIDTH"))
            .unwrap_or(defaults.game.map_width);
        let map_height = positive("MAP_HEIGHT", parse_var("MAP_HEIGHT"))
            .unwrap_or(defaults.game.map_height);

        let config = Self {
            bind_addr,
            static_dir,
            game: GameConfig {
                task_phase,
                map_width,
                map_height,
            },
        };
        tracing::info!(
            "Config: bind={}, static={}, task phase={}s, map={}x{}",
            config.bind_addr,
            config.static_dir.display(),
            config.game.task_phase.as_secs(),
            config.game.map_width,
            config.game.map_height
        );
        config
    }
}
