//! Config command implementation.

use anyhow::Result;
use framescope_ops::{Config, CONFIG_KEYS};

/// Show current configuration.
pub fn show(config: &Config) -> Result<()> {
    println!("Framescope Configuration");
    println!("{:-<40}", "");

    for key in CONFIG_KEYS {
        let value = config.get(key).unwrap_or_default();
        println!("{:<18} {}", format!("{key}:"), value);
    }

    if let Some(config_path) = Config::config_file_path() {
        println!("\nConfig file: {}", config_path.display());
    }

    Ok(())
}

/// Set a configuration value and persist it.
pub fn set(config: &mut Config, key: &str, value: &str) -> Result<()> {
    config.set(key, value)?;
    config.save()?;
    println!(
        "Set {} to: {}",
        key,
        config.get(key).unwrap_or_else(|| value.to_string())
    );
    Ok(())
}

/// Get a configuration value.
pub fn get(config: &Config, key: &str) -> Result<()> {
    let Some(value) = config.get(key) else {
        anyhow::bail!(
            "Unknown config key: {}. Valid keys: {}",
            key,
            CONFIG_KEYS.join(", ")
        );
    };
    println!("{}", value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn reset() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults");
    Ok(())
}
