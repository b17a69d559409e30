mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config = parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    prepare_profiles(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./mediahint.toml",
        "~/.config/mediahint/config.toml",
        "/etc/mediahint/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

/// Fill in built-in profiles the file did not override.
fn prepare_profiles(config: &mut Config) {
    for (name, profile) in builtin_profiles() {
        config.profiles.entry(name).or_insert(profile);
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.lookup.request_timeout_secs == 0 {
        anyhow::bail!("lookup.request_timeout_secs cannot be 0");
    }

    if !config.profiles.contains_key(&config.lookup.profile) {
        anyhow::bail!(
            "lookup.profile '{}' does not name a configured profile",
            config.lookup.profile
        );
    }

    for (name, profile) in &config.profiles {
        if profile.max_results == 0 {
            anyhow::bail!("Profile '{}' has max_results = 0", name);
        }

        for (category, chain) in &profile.fallbacks {
            for source in chain {
                if source.category() != *category {
                    anyhow::bail!(
                        "Profile '{}' lists {} in the {} fallback chain; it only serves {}",
                        name,
                        source,
                        category,
                        source.category()
                    );
                }
            }
        }
    }

    for (name, endpoint) in [
        ("omdb", &config.providers.omdb),
        ("tmdb", &config.providers.tmdb),
    ] {
        if endpoint.enabled && endpoint.api_key().is_none() {
            tracing::warn!("{} is enabled but has no API key; it will be skipped", name);
        }
    }

    Ok(())
}
