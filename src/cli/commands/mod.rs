//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod config_cmd;
mod doctor;
mod extract;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::export::ExportFormat;
use crate::ocr::{EngineMode, Language, SegmentationMode};

#[derive(Parser)]
#[command(name = "imgtext")]
#[command(about = "Extract text from images with Tesseract OCR")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Tesseract command or full path to the binary (overrides config)
    #[arg(long, global = true, value_name = "PATH")]
    tesseract: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from an image and export it
    Extract {
        /// Image file (jpg, jpeg, png, bmp or tiff)
        image: PathBuf,

        /// Page segmentation mode: 3 auto, 4 single column, 6 single block,
        /// 7 single line, 11 sparse text, 12 dense text, 13 raw line
        #[arg(long)]
        psm: Option<SegmentationMode>,

        /// OCR engine mode: 1 LSTM only, 3 LSTM + legacy
        #[arg(long)]
        oem: Option<EngineMode>,

        /// Language: eng, deu, fra, spa or ita
        #[arg(short, long)]
        lang: Option<Language>,

        /// Keep the raw engine output instead of cleaning it up
        #[arg(long)]
        raw: bool,

        /// Directory to write extracted_text.txt / extracted_text.docx into
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Which files to write
        #[arg(short, long, value_enum, default_value = "both")]
        format: ExportFormat,

        /// Also print the extracted text to stdout
        #[arg(short, long)]
        print: bool,
    },

    /// Check whether Tesseract is installed and usable
    Doctor,

    /// Show the effective configuration
    Config {
        /// Show the built-in defaults instead of the loaded configuration
        #[arg(long)]
        defaults: bool,
    },

    /// Start the web interface
    Serve {
        /// Address to bind: port, host, or host:port (default from config)
        #[arg(short, long)]
        bind: Option<String>,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).await?;
    if let Some(tesseract) = cli.tesseract {
        config.tesseract_cmd = tesseract;
    }

    match cli.command {
        Commands::Extract {
            image,
            psm,
            oem,
            lang,
            raw,
            output_dir,
            format,
            print,
        } => {
            let mut options = config.ocr_options();
            if let Some(psm) = psm {
                options.segmentation_mode = psm;
            }
            if let Some(oem) = oem {
                options.engine_mode = oem;
            }
            if let Some(lang) = lang {
                options.language = lang;
            }
            let args = extract::ExtractArgs {
                image,
                options,
                sanitize: config.sanitize && !raw,
                output_dir,
                format,
                print,
            };
            extract::cmd_extract(&config, args).await
        }
        Commands::Doctor => doctor::cmd_doctor(&config).await,
        Commands::Config { defaults } => config_cmd::cmd_config(&config, defaults),
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            serve::cmd_serve(config, &bind).await
        }
    }
}
