//! `config show`: print where configuration is read from and its effective values.

use owo_colors::OwoColorize;

use crate::config::Config;
use crate::error::Result;

pub fn cmd_config_show(config: &Config) -> Result<()> {
    let mut text = String::new();
    text.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    let path = match Config::config_path() {
        Some(path) if path.exists() => path.display().to_string(),
        Some(path) => format!("{} {}", path.display(), "(not created)".dimmed()),
        None => "(no config directory)".dimmed().to_string(),
    };
    text.push_str(&format!("{}: {path}\n", "config_file".cyan()));
    text.push_str(&format!(
        "{}: {}\n\n",
        "wallet".cyan(),
        config
            .wallet_account()?
            .unwrap_or_else(|| "not connected".dimmed().to_string())
    ));
    text.push_str(&config.redacted_yaml()?);

    print!("{text}");
    Ok(())
}
