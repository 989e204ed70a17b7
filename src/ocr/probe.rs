//! Tesseract installation diagnostics.
//!
//! Answers "why doesn't OCR work on this machine?": whether the configured
//! command resolves, whether Tesseract sits in one of the usual install
//! locations, which version runs, and which language packs are installed.
//! Nothing here affects recognition itself.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;

use super::options::Language;

/// Places Tesseract installers and package managers usually put the binary.
pub const KNOWN_LOCATIONS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
];

/// Overall engine status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EngineStatus {
    /// The configured command runs and reports a version.
    Ready { version: String },
    /// A Tesseract binary exists, but not where the configured command points.
    FoundButUnusable { path: PathBuf },
    /// No Tesseract anywhere we looked.
    NotFound,
}

impl EngineStatus {
    pub fn from_parts(version: Option<&str>, known_locations: &[PathBuf]) -> Self {
        match (version, known_locations.first()) {
            (Some(version), _) => EngineStatus::Ready {
                version: version.to_string(),
            },
            (None, Some(path)) => EngineStatus::FoundButUnusable { path: path.clone() },
            (None, None) => EngineStatus::NotFound,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, EngineStatus::Ready { .. })
    }

    /// One-line summary for banners and CLI output.
    pub fn summary(&self) -> String {
        match self {
            EngineStatus::Ready { version } => {
                format!("Tesseract is installed (version: {})", version)
            }
            EngineStatus::FoundButUnusable { path } => format!(
                "Tesseract found at {} but it can't be run with the configured command. \
                 Try setting the tesseract path explicitly.",
                path.display()
            ),
            EngineStatus::NotFound => {
                "Tesseract not found in common locations. Please verify your installation."
                    .to_string()
            }
        }
    }
}

/// Result of probing the configured Tesseract command.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    /// Command as configured (bare name or path).
    pub command: String,
    /// Where the command resolved to, if anywhere.
    pub resolved_path: Option<PathBuf>,
    /// Known install locations that exist on this machine.
    pub known_locations: Vec<PathBuf>,
    /// Output of `--version`, or the reason it could not be run.
    pub version_output: Result<String, String>,
    /// Installed language packs, empty if they could not be listed.
    pub installed_languages: Vec<String>,
    pub os: &'static str,
    pub arch: &'static str,
    pub status: EngineStatus,
}

impl ProbeReport {
    /// Whether the language pack for `language` is installed. Unknown when
    /// the pack list could not be read, in which case this returns `None`.
    pub fn has_language(&self, language: Language) -> Option<bool> {
        if self.installed_languages.is_empty() {
            return None;
        }
        Some(
            self.installed_languages
                .iter()
                .any(|installed| installed == language.code()),
        )
    }

    /// Selectable languages whose packs are missing.
    pub fn missing_languages(&self) -> Vec<Language> {
        Language::ALL
            .into_iter()
            .filter(|lang| self.has_language(*lang) == Some(false))
            .collect()
    }

    /// Installation instructions for the current platform.
    pub fn install_hint(&self) -> &'static str {
        install_hint_for(self.os)
    }
}

/// Probe the given Tesseract command.
pub fn probe(command: &str) -> ProbeReport {
    let resolved_path = which::which(command).ok();
    let known_locations: Vec<PathBuf> = KNOWN_LOCATIONS
        .iter()
        .map(PathBuf::from)
        .filter(|p| p.is_file())
        .collect();

    let version_output = run_capture(command, &["--version"]);
    let version = version_output.as_ref().ok().and_then(|out| parse_version(out));

    let installed_languages = run_capture(command, &["--list-langs"])
        .map(|out| parse_language_list(&out))
        .unwrap_or_default();

    let status = EngineStatus::from_parts(version.as_deref(), &known_locations);
    tracing::debug!("Probed {}: {:?}", command, status);

    ProbeReport {
        command: command.to_string(),
        resolved_path,
        known_locations,
        version_output,
        installed_languages,
        os: std::env::consts::OS,
        arch: std::env::consts::ARCH,
        status,
    }
}

/// Run a command and return its combined output. Tesseract prints the
/// version banner on stdout in recent releases and on stderr in older ones.
fn run_capture(command: &str, args: &[&str]) -> Result<String, String> {
    match Command::new(Path::new(command)).args(args).output() {
        Ok(output) if output.status.success() => {
            let mut text = String::from_utf8_lossy(&output.stdout).to_string();
            if text.trim().is_empty() {
                text = String::from_utf8_lossy(&output.stderr).to_string();
            }
            Ok(text)
        }
        Ok(output) => Err(format!(
            "{} {} failed with {}: {}",
            command,
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )),
        Err(e) => Err(format!("failed to run {}: {}", command, e)),
    }
}

/// Extract the version from `tesseract --version` output, e.g. `tesseract 5.3.0` -> `5.3.0`.
pub fn parse_version(output: &str) -> Option<String> {
    let first = output.lines().map(str::trim).find(|l| !l.is_empty())?;
    let version = first
        .strip_prefix("tesseract")
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(first);
    Some(version.trim_start_matches('v').to_string())
}

/// Parse `tesseract --list-langs` output. The first line is a header like
/// `List of available languages in "/usr/share/tessdata/" (3):`.
pub fn parse_language_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("List of available languages"))
        .map(str::to_string)
        .collect()
}

fn install_hint_for(os: &str) -> &'static str {
    match os {
        "windows" => {
            "Download the installer from https://github.com/UB-Mannheim/tesseract/wiki, \
             install it, add it to PATH and restart the application."
        }
        "macos" => "Install with: brew install tesseract",
        _ => "Install with: sudo apt update && sudo apt install tesseract-ocr",
    }
}
