//! Configuration display command.

use console::style;

use crate::config::Config;

/// Print the effective configuration (or the built-in defaults) as TOML.
pub fn cmd_config(config: &Config, defaults: bool) -> anyhow::Result<()> {
    let shown = if defaults {
        Config::default()
    } else {
        config.clone()
    };

    if !defaults {
        match &config.source_path {
            Some(path) => eprintln!("{} Loaded from {}", style("→").dim(), path.display()),
            None => eprintln!(
                "{} No config file found, using defaults and environment",
                style("!").yellow()
            ),
        }
    }

    print!("{}", shown.to_toml()?);
    Ok(())
}
