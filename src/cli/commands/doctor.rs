//! Installation diagnostics command.

use console::style;

use crate::config::Config;
use crate::ocr::{probe, EngineStatus};

/// Report whether Tesseract is installed and usable.
pub async fn cmd_doctor(config: &Config) -> anyhow::Result<()> {
    let command = config.tesseract_cmd.clone();
    let report = tokio::task::spawn_blocking(move || probe(&command)).await?;

    let marker = match report.status {
        EngineStatus::Ready { .. } => style("✓").green(),
        EngineStatus::FoundButUnusable { .. } => style("!").yellow(),
        EngineStatus::NotFound => style("✗").red(),
    };
    println!("{} {}", marker, report.status.summary());
    println!();

    println!("{}", style("Debug information").bold());
    println!("  {:<18} {}", "Command:", report.command);
    match &report.resolved_path {
        Some(path) => println!("  {:<18} {}", "Resolved to:", path.display()),
        None => println!("  {:<18} {}", "Resolved to:", style("not on PATH").dim()),
    }
    println!("  {:<18} {}/{}", "Platform:", report.os, report.arch);

    if report.known_locations.is_empty() {
        println!("  {:<18} {}", "Known locations:", style("none found").dim());
    } else {
        println!("  Known locations:");
        for path in &report.known_locations {
            println!("    {} {}", style("→").dim(), path.display());
        }
    }

    match &report.version_output {
        Ok(output) => {
            println!("  Version output:");
            for line in output.lines().filter(|l| !l.trim().is_empty()) {
                println!("    {}", line.trim_end());
            }
        }
        Err(e) => println!("  {:<18} {}", "Version check:", style(e).red()),
    }

    if report.installed_languages.is_empty() {
        println!("  {:<18} {}", "Languages:", style("unknown").dim());
    } else {
        println!(
            "  {:<18} {}",
            "Languages:",
            report.installed_languages.join(", ")
        );
        for language in report.missing_languages() {
            println!(
                "    {} No language pack for {} ({})",
                style("!").yellow(),
                language.display_name(),
                language.code()
            );
        }
    }

    if !report.status.is_ready() {
        println!();
        println!("{}", style("Installation").bold());
        println!("  {}", report.install_hint());
        println!("  Or point imgtext at the binary with --tesseract or IMGTEXT_TESSERACT_CMD.");
    }

    Ok(())
}
