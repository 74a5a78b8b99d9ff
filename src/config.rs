use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::session::Role;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub role: Option<Role>,
    pub export_dir: Option<PathBuf>,
    pub no_picker: bool,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: booleans accumulate, options from `other`
    /// win when set.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            role: other.role.or(self.role),
            export_dir: other
                .export_dir
                .clone()
                .or_else(|| self.export_dir.clone()),
            no_picker: self.no_picker || other.no_picker,
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("stencil").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("stencil")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("stencil").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("stencil")
                .join("config");
        }
    }

    PathBuf::from(".stencilrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".stencilrc")
}

/// Read saved flags. A missing file means no saved flags.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// Write `flags` as one flag per line.
///
/// # Errors
///
/// Returns an error if the config directory or file cannot be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# stencil defaults (saved with --save)".to_string());
    if let Some(role) = flags.role {
        lines.push(format!("--role {}", role.as_str()));
    }
    if let Some(dir) = &flags.export_dir {
        lines.push(format!("--export-dir {}", dir.display()));
    }
    if flags.no_picker {
        lines.push("--no-picker".to_string());
    }
    if let Some(path) = &flags.log_file {
        lines.push(format!("--log-file {}", path.display()));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// Remove saved flags.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the flags stencil knows about out of a token list, accepting both
/// `--flag value` and `--flag=value`. Unknown tokens are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--no-picker" {
            flags.no_picker = true;
        } else if token == "--role" {
            if let Some(next) = tokens.get(i + 1) {
                flags.role = Role::parse(next);
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--role=") {
            flags.role = Role::parse(value);
        } else if token == "--export-dir" {
            if let Some(next) = tokens.get(i + 1) {
                flags.export_dir = Some(PathBuf::from(next));
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--export-dir=") {
            flags.export_dir = Some(PathBuf::from(value));
        } else if token == "--log-file" {
            if let Some(next) = tokens.get(i + 1) {
                flags.log_file = Some(PathBuf::from(next));
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--log-file=") {
            flags.log_file = Some(PathBuf::from(value));
        }
        i += 1;
    }
    flags
}
