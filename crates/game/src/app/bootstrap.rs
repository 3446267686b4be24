use std::env;
use std::path::PathBuf;

use emoji_engine::LoopConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const LEVEL_ENV_VAR: &str = "EMOJI_RPG_LEVEL";
const SEED_ENV_VAR: &str = "EMOJI_RPG_SEED";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "=== Emoji RPG Startup ===");

    let config = LoopConfig {
        startup_level: parse_level_path(env::var(LEVEL_ENV_VAR).ok()),
        rng_seed: parse_seed(env::var(SEED_ENV_VAR).ok()),
        ..LoopConfig::default()
    };
    if let Some(level) = &config.startup_level {
        info!(level = %level.display(), "startup_level_configured");
    }

    AppWiring { config }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_level_path(raw: Option<String>) -> Option<PathBuf> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn parse_seed(raw: Option<String>) -> Option<u64> {
    let raw = raw?;
    match raw.trim().parse::<u64>() {
        Ok(seed) => Some(seed),
        Err(_) => {
            warn!(
                env_var = SEED_ENV_VAR,
                value = raw.as_str(),
                "invalid seed env var value; using entropy"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_level_path_is_ignored() {
        assert_eq!(parse_level_path(None), None);
        assert_eq!(parse_level_path(Some("   ".to_string())), None);
        assert_eq!(
            parse_level_path(Some(" levels/one.json ".to_string())),
            Some(PathBuf::from("levels/one.json"))
        );
    }

    #[test]
    fn seed_must_be_an_unsigned_integer() {
        assert_eq!(parse_seed(Some("42".to_string())), Some(42));
        assert_eq!(parse_seed(Some("-1".to_string())), None);
        assert_eq!(parse_seed(Some("abc".to_string())), None);
        assert_eq!(parse_seed(None), None);
    }
}
