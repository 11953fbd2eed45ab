//! Finds and layers relay.toml files.

use std::path::PathBuf;

use anyhow::Result;

use super::Config;

impl Config {
    /// Read every relay.toml on this machine, nearest one winning:
    /// ./relay.toml (or ./.relay.toml) over ~/relay.toml over
    /// ~/.config/relay/config.toml over built-in defaults. CLI flags and
    /// credential env vars are applied later, during resolve.
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        // Farthest file first, so each closer file lands on top

        if let Some(xdg_config) = Self::find_xdg_config() {
            if let Ok(loaded) = Self::load_from_file(&xdg_config) {
                config = Self::merge(config, loaded);
            }
        }

        if let Some(home_config) = Self::find_home_config() {
            if let Ok(loaded) = Self::load_from_file(&home_config) {
                config = Self::merge(config, loaded);
            }
        }

        if let Some(local_config) = Self::find_local_config() {
            if let Ok(loaded) = Self::load_from_file(&local_config) {
                config = Self::merge(config, loaded);
            }
        }

        Ok(config)
    }

    /// The platform config directory: ~/.config/relay/config.toml on
    /// Linux, Application Support on macOS, AppData\Roaming on Windows.
    fn find_xdg_config() -> Option<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("relay").join("config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // macOS users coming from Linux often keep ~/.config anyway
        #[cfg(target_os = "macos")]
        {
            if let Some(home) = dirs::home_dir() {
                let path = home.join(".config").join("relay").join("config.toml");
                if path.exists() {
                    return Some(path);
                }
            }
        }

        None
    }

    /// ~/relay.toml
    fn find_home_config() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        let path = home.join("relay.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// ./relay.toml, or the hidden ./.relay.toml variant
    fn find_local_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;

        let path = cwd.join("relay.toml");
        if path.exists() {
            return Some(path);
        }

        let path = cwd.join(".relay.toml");
        if path.exists() {
            return Some(path);
        }

        None
    }

    fn load_from_file(path: &PathBuf) -> Result<Config> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Merge two configs (overlay takes precedence).
    /// A section present in the overlay replaces the same section from
    /// the base wholesale; absent sections fall through.
    fn merge(base: Config, overlay: Config) -> Config {
        Config {
            connection: overlay.connection.or(base.connection),
            auth: overlay.auth.or(base.auth),
            output: overlay.output.or(base.output),
        }
    }
}

impl Config {
    /// Parse a config straight from a TOML string. Test seam.
    #[cfg(test)]
    pub fn from_toml(content: &str) -> Result<Config> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
