use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use menu_kit::MenuOptions;
use serde::{Deserialize, Serialize};
use toml::map::Entry;
use tracing::warn;

pub const LOCAL_CONFIG_FILE: &str = "menu_primitive.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// tracing filter used when `RUST_LOG` is not set
    pub log_filter: String,
    #[serde(default)]
    pub menu: MenuConfig,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            menu: MenuConfig::default(),
        }
    }
}

impl Config {
    pub fn with<R>(f: impl FnOnce(&Config) -> R) -> R {
        let config = CONFIG.get_or_init(Config::init);
        f(config)
    }

    fn init() -> Self {
        let mut sources = Vec::new();
        // Load config files in order of priority (lowest to highest)
        // 1. System config
        sources.extend(get_system_config_path());
        // 2. User config (XDG)
        sources.extend(get_user_config_path());
        // 3. Current directory (dev override)
        sources.push(PathBuf::from(LOCAL_CONFIG_FILE));

        let config = Self::load_layered(&sources);
        tracing::debug!("Config initialized: {:?}", config);
        config
    }

    /// Merge every readable file over the defaults, later files winning
    /// key by key.
    pub fn load_layered(paths: &[PathBuf]) -> Self {
        let mut merged = match toml::Value::try_from(Self::default()) {
            Ok(value) => value,
            Err(err) => {
                warn!("Default config is not representable as toml: {err}");
                return Self::default();
            }
        };

        let mut found_any_config = false;
        for path in paths {
            if let Some(value) = read_toml(path) {
                merge_value(&mut merged, value);
                found_any_config = true;
                tracing::info!("Loaded config from {}", path.display());
            }
        }

        if !found_any_config {
            tracing::debug!("No configuration file found, using default config");
        }

        merged.try_into().unwrap_or_else(|err| {
            warn!("Falling back to default config due to invalid overrides: {err}");
            Self::default()
        })
    }

    pub fn menu_options(&self) -> MenuOptions {
        self.menu.to_options()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuConfig {
    /// Window in which typed characters build one typeahead query
    #[serde(default = "default_typeahead_timeout_ms")]
    pub typeahead_timeout_ms: u64,
    /// Whether clicking outside an open menu focuses its trigger again
    #[serde(default = "default_restore_focus_on_outside_click")]
    pub restore_focus_on_outside_click: bool,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            typeahead_timeout_ms: default_typeahead_timeout_ms(),
            restore_focus_on_outside_click: default_restore_focus_on_outside_click(),
        }
    }
}

impl MenuConfig {
    pub fn to_options(&self) -> MenuOptions {
        MenuOptions {
            typeahead_timeout: Duration::from_millis(self.typeahead_timeout_ms),
            restore_focus_on_outside_click: self.restore_focus_on_outside_click,
        }
    }
}

fn default_typeahead_timeout_ms() -> u64 {
    500
}

fn default_restore_focus_on_outside_click() -> bool {
    true
}

fn read_toml(path: &Path) -> Option<toml::Value> {
    let content = std::fs::read_to_string(path).ok()?;
    match content.parse::<toml::Value>() {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Failed to parse {}: {err}", path.display());
            None
        }
    }
}

fn merge_value(base: &mut toml::Value, overrides: toml::Value) {
    match (base, overrides) {
        (toml::Value::Table(base_map), toml::Value::Table(override_map)) => {
            for (key, override_value) in override_map {
                match base_map.entry(key) {
                    Entry::Occupied(mut entry) => merge_value(entry.get_mut(), override_value),
                    Entry::Vacant(entry) => {
                        entry.insert(override_value);
                    }
                }
            }
        }
        (base_value, override_value) => {
            *base_value = override_value;
        }
    }
}

fn get_system_config_path() -> Option<PathBuf> {
    let path = PathBuf::from("/etc/menu-primitive/config.toml");
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

fn get_user_config_path() -> Option<PathBuf> {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".config"))
        })?;

    let path = config_dir.join("menu-primitive").join("config.toml");
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;

    #[test]
    fn menu_defaults() {
        let config = Config::default();
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.menu.typeahead_timeout_ms, 500);
        assert!(config.menu.restore_focus_on_outside_click);

        let options = config.menu_options();
        assert_eq!(options.typeahead_timeout, Duration::from_millis(500));
        assert_eq!(options, MenuOptions::default());
    }

    #[test]
    fn menu_section_overrides_in_toml() {
        let overrides = r#"
            [menu]
            typeahead_timeout_ms = 750
        "#;

        let config: Config = toml::from_str(overrides).expect("Config should deserialize");
        assert_eq!(config.menu.typeahead_timeout_ms, 750);
        assert!(config.menu.restore_focus_on_outside_click);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    #[serial]
    fn test_get_user_config_path_with_xdg_config_home() {
        let temp_dir = tempfile::tempdir().unwrap();

        let old_xdg = env::var("XDG_CONFIG_HOME").ok();
        env::set_var("XDG_CONFIG_HOME", temp_dir.path());

        let config_dir = temp_dir.path().join("menu-primitive");
        fs::create_dir_all(&config_dir).unwrap();
        let config_file = config_dir.join("config.toml");
        fs::write(&config_file, "# test config").unwrap();

        let path = get_user_config_path();
        assert_eq!(path, Some(config_file));

        if let Some(old) = old_xdg {
            env::set_var("XDG_CONFIG_HOME", old);
        } else {
            env::remove_var("XDG_CONFIG_HOME");
        }
    }

    #[test]
    #[serial]
    fn test_get_user_config_path_without_file() {
        let temp_dir = tempfile::tempdir().unwrap();

        let old_xdg = env::var("XDG_CONFIG_HOME").ok();
        env::set_var("XDG_CONFIG_HOME", temp_dir.path());

        assert!(get_user_config_path().is_none());

        if let Some(old) = old_xdg {
            env::set_var("XDG_CONFIG_HOME", old);
        } else {
            env::remove_var("XDG_CONFIG_HOME");
        }
    }

    #[test]
    fn test_config_merge_priority() {
        let mut base =
            toml::Value::try_from(Config::default()).expect("default config is valid toml");

        let override_value: toml::Value = r#"
            log_filter = "debug"
            [menu]
            restore_focus_on_outside_click = false
        "#
        .parse()
        .unwrap();

        merge_value(&mut base, override_value);

        let config: Config = base.try_into().unwrap();
        assert_eq!(config.log_filter, "debug");
        assert!(!config.menu.restore_focus_on_outside_click);
        // Untouched keys in the same table keep their defaults
        assert_eq!(config.menu.typeahead_timeout_ms, 500);
    }

    #[test]
    fn test_load_layered_later_files_win() {
        let temp_dir = tempfile::tempdir().unwrap();
        let system = temp_dir.path().join("system.toml");
        let user = temp_dir.path().join("user.toml");
        fs::write(&system, "[menu]\ntypeahead_timeout_ms = 300\n").unwrap();
        fs::write(&user, "[menu]\ntypeahead_timeout_ms = 900\n").unwrap();

        let config = Config::load_layered(&[system, temp_dir.path().join("missing.toml"), user]);
        assert_eq!(config.menu.typeahead_timeout_ms, 900);
    }

    #[test]
    fn test_load_layered_skips_unparsable_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let broken = temp_dir.path().join("broken.toml");
        fs::write(&broken, "menu = [").unwrap();

        let config = Config::load_layered(&[broken]);
        assert_eq!(config.menu.typeahead_timeout_ms, 500);
    }

    #[test]
    fn test_invalid_override_falls_back_to_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wrong_type = temp_dir.path().join("wrong.toml");
        fs::write(&wrong_type, "[menu]\ntypeahead_timeout_ms = \"soon\"\n").unwrap();

        let config = Config::load_layered(&[wrong_type]);
        assert_eq!(config.menu.typeahead_timeout_ms, 500);
    }
}
