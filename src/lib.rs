//! imgtext - extract text from images with Tesseract OCR.
//!
//! An image goes through [`pipeline::run`]: it is written to a temporary
//! file, handed to the Tesseract command with options built by
//! [`ocr::build_config`], and the output is cleaned by
//! [`sanitize::sanitize`]. Non-empty results can be exported as plain text
//! or as a Word document through [`export`]. [`ocr::probe`] explains what is
//! wrong when the engine cannot be run.
//!
//! The `imgtext` binary wraps this in a CLI ([`cli`]) and a small web
//! interface ([`server`]).

pub mod cli;
pub mod config;
pub mod export;
pub mod ocr;
pub mod pipeline;
pub mod sanitize;
pub mod server;
