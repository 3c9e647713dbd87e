// `pscreen validate` - config parsing and validation

use std::path::{Path, PathBuf};

use permitscreen_engine::ScreenConfig;

use crate::CliError;

/// Read, parse, and validate a screening config. Shared by every
/// subcommand that takes a config path.
pub(crate) fn load_config(path: &Path) -> Result<ScreenConfig, CliError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::args(format!("cannot read {}: {e}", path.display())))?;
    let config = ScreenConfig::from_toml(&content)?;
    config.validate()?;
    Ok(config)
}

/// Resolve a config-referenced file relative to the config's directory.
pub(crate) fn resolve_path(config_path: &Path, file: &str) -> PathBuf {
    let file = Path::new(file);
    if file.is_absolute() {
        return file.to_path_buf();
    }
    match config_path.parent() {
        Some(dir) => dir.join(file),
        None => file.to_path_buf(),
    }
}

pub(crate) fn cmd_validate(path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&path)?;

    println!("config OK: {}", config.name);
    println!("  potw_rule:    {}", config.potw_rule);
    println!("  roster:       {}", config.roster.file);
    println!("  sewer codes:  {}", config.taxonomy.sewer.join(", "));
    println!("  removal set:  {}", config.taxonomy.removal.join(", "));
    match &config.review {
        Some(review) => println!("  review:       {}", review.file),
        None => println!("  review:       (none)"),
    }
    Ok(())
}
