use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::state::selection::SelectAllMode;

/// Members endpoint the admin table was built against
pub const DEFAULT_SOURCE_URL: &str =
    "https://geektrust.s3-ap-southeast-1.amazonaws.com/adminui-problem/members.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
    pub keybindings: KeybindingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// URL returning a JSON array of member records
    pub url: String,

    /// Request timeout in seconds; unset waits indefinitely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs for checkboxes and the pagination strip
    pub use_glyphs: bool,

    /// Show the record id as the first column
    pub show_row_numbers: bool,

    pub icons: IconConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub checked: String,
    pub unchecked: String,
    pub trash: String,
    pub first: String,
    pub prev: String,
    pub next: String,
    pub last: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Rows per page
    pub page_size: usize,

    /// Restore the row as it was before Edit when an inline edit is cancelled
    pub revert_on_cancel: bool,

    /// "by_count" or "by_ids": how select-all decides to clear
    pub select_all_mode: SelectAllMode,

    /// Ask before deleting all selected rows
    pub confirm_bulk_delete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    /// Accept h/j/k/l and g/G alongside the arrow keys
    pub vim_mode: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            show_row_numbers: false,
            icons: IconConfig::default(),
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            checked: "☑".to_string(),
            unchecked: "☐".to_string(),
            trash: "🗑".to_string(),
            first: "«".to_string(),
            prev: "‹".to_string(),
            next: "›".to_string(),
            last: "»".to_string(),
        }
    }
}

impl IconConfig {
    /// ASCII alternatives for terminals without glyph support
    pub fn simple() -> Self {
        Self {
            checked: "[x]".to_string(),
            unchecked: "[ ]".to_string(),
            trash: "[DEL]".to_string(),
            first: "<<".to_string(),
            prev: "<".to_string(),
            next: ">".to_string(),
            last: ">>".to_string(),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            page_size: crate::data::pager::DEFAULT_PAGE_SIZE,
            revert_on_cancel: false,
            select_all_mode: SelectAllMode::ByCount,
            confirm_bulk_delete: false,
        }
    }
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self { vim_mode: true }
    }
}

impl Config {
    /// Load config from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            if let Err(e) = default_config.save_to(&config_path) {
                warn!(target: "config", "Could not write default config: {}", e);
            }
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load and normalize a config file at `path`
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.normalize();
        info!(target: "config", "Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("member-admin").join("config.toml"))
    }

    fn normalize(&mut self) {
        if self.behavior.page_size == 0 {
            warn!(target: "config", "page_size = 0 is not usable, using 1");
            self.behavior.page_size = 1;
        }
        if !self.display.use_glyphs {
            self.display.icons = IconConfig::simple();
        }
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        format!(
            r#"# member-admin configuration
# Location: ~/.config/member-admin/config.toml (Linux)
#           ~/Library/Application Support/member-admin/config.toml (macOS)
#           %APPDATA%\member-admin\config.toml (Windows)

[source]
# JSON array of member records, fetched once at startup
url = "{url}"

# Give up on the request after this many seconds (default: wait forever)
# timeout_secs = 30

[display]
# Set to false for ASCII-only checkboxes and pagination arrows
use_glyphs = true

# Show the record id as the first column
show_row_numbers = false

[behavior]
# Rows per page
page_size = 10

# When false, edits are applied as you type and Cancel keeps them.
# When true, Cancel restores the row as it was before Edit.
revert_on_cancel = false

# "by_count": the header checkbox clears the selection whenever as many rows
#             are selected as the page shows
# "by_ids":   it clears only when every row on the page is selected
select_all_mode = "by_count"

# Ask before deleting all selected rows (single deletes always ask)
confirm_bulk_delete = false

[keybindings]
# Accept h/j/k/l and g/G alongside the arrow keys
vim_mode = true
"#,
            url = DEFAULT_SOURCE_URL
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source.url, DEFAULT_SOURCE_URL);
        assert_eq!(config.behavior.page_size, 10);
        assert!(!config.behavior.revert_on_cancel);
        assert_eq!(config.behavior.select_all_mode, SelectAllMode::ByCount);
    }

    #[test]
    fn test_commented_default_parses_to_defaults() {
        let parsed: Config = toml::from_str(&Config::create_default_with_comments()).unwrap();
        let defaults = Config::default();
        assert_eq!(parsed.source.url, defaults.source.url);
        assert_eq!(parsed.behavior.page_size, defaults.behavior.page_size);
        assert_eq!(parsed.keybindings.vim_mode, defaults.keybindings.vim_mode);
    }

    #[test]
    fn test_partial_file_and_normalize() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "[behavior]\npage_size = 0\nselect_all_mode = \"by_ids\"\n\n[display]\nuse_glyphs = false\n"
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.behavior.page_size, 1);
        assert_eq!(config.behavior.select_all_mode, SelectAllMode::ByIds);
        assert_eq!(config.display.icons.checked, "[x]");
        assert_eq!(config.source.url, DEFAULT_SOURCE_URL);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.display.use_glyphs, parsed.display.use_glyphs);
        assert_eq!(parsed.source.timeout_secs, None);
    }
}
