use crate::navigation::DEFAULT_ROOT_LABEL;
use color_eyre::eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::{
    env, fs, io,
    path::{Path, PathBuf},
    sync::{OnceLock, RwLock},
};

/// Globally accessible application configuration values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory or `http(s)://` base URL that catalog and table files are resolved against.
    #[serde(default = "default_content_root")]
    pub content_root: String,
    #[serde(default = "default_catalog_file")]
    pub catalog_file: String,
    #[serde(default = "default_root_label")]
    pub root_label: String,
    #[serde(default)]
    pub shuffle_options: bool,
    #[serde(default = "default_warning_bell_value")]
    pub warning_bell: bool,
}

impl AppConfig {
    fn normalize(&mut self) {
        if self.content_root.trim().is_empty() {
            self.content_root = default_content_root();
        }
        if self.catalog_file.trim().is_empty() {
            self.catalog_file = default_catalog_file();
        }
        if self.root_label.trim().is_empty() {
            self.root_label = default_root_label();
        }
        self.content_root = self.content_root.trim().to_string();
        self.catalog_file = self.catalog_file.trim().to_string();
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            content_root: default_content_root(),
            catalog_file: default_catalog_file(),
            root_label: default_root_label(),
            shuffle_options: false,
            warning_bell: default_warning_bell_value(),
        }
    }
}

const DEFAULT_CONTENT_ROOT: &str = "content";
const DEFAULT_CATALOG_FILE: &str = "grammar_categories_tree.json";
const CONFIG_FILE_PATH: &str = "config/app_config.toml";
/// Overrides `content_root` without touching the saved file.
pub const CONTENT_ROOT_ENV: &str = "GRAMMAR_CONTENT_ROOT";

fn default_content_root() -> String {
    DEFAULT_CONTENT_ROOT.to_string()
}
fn default_catalog_file() -> String {
    DEFAULT_CATALOG_FILE.to_string()
}
fn default_root_label() -> String {
    DEFAULT_ROOT_LABEL.to_string()
}
const fn default_warning_bell_value() -> bool {
    true
}

static APP_CONFIG: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn config_lock() -> &'static RwLock<AppConfig> {
    APP_CONFIG.get_or_init(|| RwLock::new(AppConfig::default()))
}

/// Attempt to load configuration from disk. If loading fails, the in-memory config will be reset to defaults
/// and the error will be returned for the caller to surface if desired.
pub fn initialize() -> Result<()> {
    match load_config_from_path(&config_file_path()) {
        Ok(config) => {
            let lock = config_lock();
            *lock.write().expect("config lock poisoned") = config;
            Ok(())
        }
        Err(err) => {
            let lock = config_lock();
            *lock.write().expect("config lock poisoned") = AppConfig::default();
            Err(err)
        }
    }
}

/// Retrieve a clone of the current configuration.
pub fn current() -> AppConfig {
    config_lock().read().expect("config lock poisoned").clone()
}

/// Content root in effect: the environment override when set, else the configured value.
pub fn content_root() -> String {
    match env::var(CONTENT_ROOT_ENV) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => current().content_root,
    }
}

/// Apply the provided mutation to the in-memory configuration and persist the result to disk.
pub fn update<F>(mutator: F) -> Result<AppConfig>
where
    F: FnOnce(&mut AppConfig),
{
    let lock = config_lock();
    let mut config = lock.write().expect("config lock poisoned");
    mutator(&mut config);
    config.normalize();
    save_config_to_path(&config, &config_file_path())?;
    Ok(config.clone())
}

/// Path to the configuration file used for persistence, relative to the working directory.
pub fn config_file_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_PATH)
}

pub(crate) fn load_config_from_path(path: &Path) -> Result<AppConfig> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let mut config: AppConfig = toml::from_str(&contents)
                .wrap_err_with(|| format!("failed to parse configuration at {}", path.display()))?;
            config.normalize();
            Ok(config)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(err) => Err(eyre!(format!(
            "failed to read configuration at {}: {}",
            path.display(),
            err
        ))),
    }
}

pub(crate) fn save_config_to_path(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).wrap_err_with(|| {
            format!(
                "failed to create configuration directory {}",
                parent.display()
            )
        })?;
    }
    let serialized =
        toml::to_string_pretty(config).wrap_err("failed to serialize configuration to TOML")?;
    fs::write(path, serialized)
        .wrap_err_with(|| format!("failed to write configuration to {}", path.display()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigField {
    ContentRoot,
    CatalogFile,
    ShuffleOptions,
    WarningBell,
}

impl ConfigField {
    fn index(self) -> usize {
        match self {
            Self::ContentRoot => 0,
            Self::CatalogFile => 1,
            Self::ShuffleOptions => 2,
            Self::WarningBell => 3,
        }
    }

    fn next(self) -> Self {
        match self {
            Self::ContentRoot => Self::CatalogFile,
            Self::CatalogFile => Self::ShuffleOptions,
            Self::ShuffleOptions => Self::WarningBell,
            Self::WarningBell => Self::ContentRoot,
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::ContentRoot => Self::WarningBell,
            Self::CatalogFile => Self::ContentRoot,
            Self::ShuffleOptions => Self::CatalogFile,
            Self::WarningBell => Self::ShuffleOptions,
        }
    }

    fn is_text(self) -> bool {
        matches!(self, Self::ContentRoot | Self::CatalogFile)
    }
}

/// Editable copy of the configuration backing the config view.
#[derive(Debug, Clone)]
pub struct ConfigForm {
    pub(crate) content_root: String,
    pub(crate) catalog_file: String,
    pub(crate) shuffle_options: bool,
    pub(crate) warning_bell: bool,
    editing: bool,
    edit_buffer: String,
    field: ConfigField,
    pub(crate) dirty: bool,
    pub(crate) status: Option<String>,
}

impl ConfigForm {
    pub(crate) fn from_config(config: AppConfig) -> Self {
        Self {
            content_root: config.content_root,
            catalog_file: config.catalog_file,
            shuffle_options: config.shuffle_options,
            warning_bell: config.warning_bell,
            editing: false,
            edit_buffer: String::new(),
            field: ConfigField::ContentRoot,
            dirty: false,
            status: None,
        }
    }

    pub(crate) fn selected_index(&self) -> usize {
        self.field.index()
    }

    pub(crate) fn select_next(&mut self) {
        self.field = self.field.next();
    }

    pub(crate) fn select_previous(&mut self) {
        self.field = self.field.previous();
    }

    /// Flip the selected toggle. Text fields are changed through the edit buffer instead.
    pub(crate) fn toggle_current(&mut self) {
        let value = match self.field {
            ConfigField::ShuffleOptions => &mut self.shuffle_options,
            ConfigField::WarningBell => &mut self.warning_bell,
            ConfigField::ContentRoot | ConfigField::CatalogFile => return,
        };
        *value = !*value;
        self.dirty = true;
        self.status = None;
    }

    pub(crate) fn apply_to(&self, config: &mut AppConfig) {
        config.content_root = self.content_root.clone();
        config.catalog_file = self.catalog_file.clone();
        config.shuffle_options = self.shuffle_options;
        config.warning_bell = self.warning_bell;
    }

    pub(crate) fn apply_saved(&mut self, config: AppConfig) {
        *self = Self {
            field: self.field,
            ..Self::from_config(config)
        };
    }

    pub(crate) fn set_status<S: Into<String>>(&mut self, status: S) {
        self.status = Some(status.into());
    }

    pub(crate) fn is_text_field_selected(&self) -> bool {
        self.field.is_text()
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    pub(crate) fn edit_buffer(&self) -> &str {
        &self.edit_buffer
    }

    pub(crate) fn start_editing(&mut self) {
        let Some(current) = self.text_value_mut() else {
            return;
        };
        let current = current.clone();
        self.editing = true;
        self.edit_buffer = current;
        self.status = Some("Editing (Enter to keep, Esc to cancel)".to_string());
    }

    pub(crate) fn cancel_edit(&mut self) {
        self.editing = false;
        self.edit_buffer.clear();
        self.status = Some("Edit cancelled.".to_string());
    }

    pub(crate) fn apply_edit(&mut self) {
        let new_value = self.edit_buffer.trim().to_string();
        self.editing = false;
        self.edit_buffer.clear();
        let Some(value) = self.text_value_mut() else {
            return;
        };
        if new_value.is_empty() || *value == new_value {
            self.status = Some("Value unchanged.".to_string());
            return;
        }
        *value = new_value;
        self.dirty = true;
        self.status = Some("Value updated, press s to save.".to_string());
    }

    pub(crate) fn backspace(&mut self) {
        self.edit_buffer.pop();
    }

    pub(crate) fn push_char(&mut self, ch: char) {
        self.edit_buffer.push(ch);
    }

    fn text_value_mut(&mut self) -> Option<&mut String> {
        match self.field {
            ConfigField::ContentRoot => Some(&mut self.content_root),
            ConfigField::CatalogFile => Some(&mut self.catalog_file),
            ConfigField::ShuffleOptions | ConfigField::WarningBell => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn temp_config_path(label: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir()
            .join(format!("grammar-trail-{label}-{unique}"))
            .join("app_config.toml")
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = temp_config_path("missing");
        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.root_label, DEFAULT_ROOT_LABEL);
    }

    #[test]
    fn blank_values_are_normalized_on_load() {
        let path = temp_config_path("blank");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "content_root = \"  \"\nshuffle_options = true\n").unwrap();

        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.content_root, DEFAULT_CONTENT_ROOT);
        assert_eq!(config.catalog_file, DEFAULT_CATALOG_FILE);
        assert!(config.shuffle_options);
        assert!(config.warning_bell);

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn saved_configuration_round_trips() {
        let path = temp_config_path("save");
        let config = AppConfig {
            content_root: "https://example.org/grammar".to_string(),
            warning_bell: false,
            ..AppConfig::default()
        };
        save_config_to_path(&config, &path).unwrap();
        assert_eq!(load_config_from_path(&path).unwrap(), config);
        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn invalid_toml_is_reported() {
        let path = temp_config_path("invalid");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "shuffle_options = maybe").unwrap();
        assert!(load_config_from_path(&path).is_err());
        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn form_edits_text_fields_and_toggles() {
        let mut form = ConfigForm::from_config(AppConfig::default());
        assert!(form.is_text_field_selected());
        form.start_editing();
        assert!(form.is_editing());
        for _ in 0.."content".len() {
            form.backspace();
        }
        for ch in "lessons".chars() {
            form.push_char(ch);
        }
        form.apply_edit();
        assert_eq!(form.content_root, "lessons");
        assert!(form.dirty);

        form.select_next();
        form.select_next();
        assert!(!form.is_text_field_selected());
        form.toggle_current();
        assert!(form.shuffle_options);

        let mut config = AppConfig::default();
        form.apply_to(&mut config);
        assert_eq!(config.content_root, "lessons");
        assert!(config.shuffle_options);
    }

    #[test]
    fn empty_edit_keeps_previous_value() {
        let mut form = ConfigForm::from_config(AppConfig::default());
        form.start_editing();
        for _ in 0..20 {
            form.backspace();
        }
        form.apply_edit();
        assert_eq!(form.content_root, DEFAULT_CONTENT_ROOT);
        assert!(!form.dirty);
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut form = ConfigForm::from_config(AppConfig::default());
        form.select_previous();
        assert_eq!(form.selected_index(), 3);
        form.select_next();
        assert_eq!(form.selected_index(), 0);
    }
}
