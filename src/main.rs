//! plaque-translator
//!
//! Reads a photographed museum plaque, splits the OCR text into plaque fields
//! and translates each field.
//!
//! ```bash
//! plaque-translator --image photos/monet.jpg --input-lang en --target-lang fr --cli --pdf
//! ```

mod config;
mod error;
mod model;
mod parsers;
mod render;
mod services;

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::error::PlaqueError;
use crate::parsers::plaque::PlaqueParser;
use crate::render::{OutputPlan, OutputTarget};
use crate::services::language;
use crate::services::ocr::TesseractEngine;
use crate::services::pipeline::{Pipeline, PipelineRequest};
use crate::services::translate::HttpTranslator;

/// Art museum plaque translator
#[derive(Parser, Debug)]
#[command(name = "plaque-translator")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Translate a photographed museum plaque into structured text")]
struct Args {
    /// Path to the plaque photograph
    #[arg(long)]
    image: PathBuf,

    /// Language printed on the plaque (name or code)
    #[arg(long = "input-lang")]
    input_lang: String,

    /// Language to translate into (name or code)
    #[arg(long = "target-lang", default_value = "fr")]
    target_lang: String,

    /// Print the translated plaque to the terminal (default when no output is chosen)
    #[arg(long)]
    cli: bool,

    /// Write the translated plaque as a PDF
    #[arg(long)]
    pdf: bool,

    /// PDF destination, defaults to <output_dir>/<image>_<target>.pdf
    #[arg(long = "pdf-path", value_name = "PATH")]
    pdf_path: Option<PathBuf>,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging, raw OCR text and the preprocessed image
    #[arg(long)]
    debug: bool,

    /// Report the average OCR confidence
    #[arg(long = "ret-conf")]
    ret_conf: bool,

    /// Tesseract page segmentation mode
    #[arg(long, value_parser = clap::value_parser!(u8).range(3..=13))]
    psm: Option<u8>,

    /// Spoken translation (not implemented)
    #[arg(long = "audio-output")]
    audio_output: bool,

    /// Config file (TOML)
    #[arg(long, env = "PLAQUE_CONFIG")]
    config: Option<PathBuf>,
}

impl Args {
    fn output_targets(&self) -> Vec<OutputTarget> {
        let mut targets = Vec::new();
        if self.cli {
            targets.push(OutputTarget::Cli);
        }
        if self.pdf {
            targets.push(OutputTarget::Pdf);
        }
        if self.json {
            targets.push(OutputTarget::Json);
        }
        if targets.is_empty() {
            targets.push(OutputTarget::Cli);
        }
        if self.audio_output {
            targets.push(OutputTarget::Audio);
        }
        targets
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);

    let config = config::resolve_config(args.config.as_deref())?;

    let target = language::resolve(&args.target_lang).inspect_err(report)?;
    let pdf_path = args.pdf_path.clone().unwrap_or_else(|| {
        render::default_pdf_path(&config.output.output_dir, &args.image, target.translation_code)
    });
    let plan = OutputPlan {
        targets: args.output_targets(),
        pdf_path,
    };

    let mut engine = TesseractEngine::new(&config.ocr);
    if let Some(psm) = args.psm {
        engine = engine.with_psm(psm);
    }
    if args.debug {
        engine = engine.with_debug_dir(&config.ocr.debug_dir);
    }

    let translator = HttpTranslator::from_settings(&config.translation)
        .context("failed to set up translation backend")?;
    let parser = PlaqueParser::new(&config.parser);
    let pipeline = Pipeline::new(&engine, &translator, &parser);

    let req = PipelineRequest {
        image: &args.image,
        input_lang: &args.input_lang,
        target_lang: &args.target_lang,
        want_confidence: args.ret_conf,
        show_extracted: args.ret_conf || args.debug,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    pipeline.run(&req, &plan, &mut out).inspect_err(report)?;

    Ok(())
}

/// The error itself is printed once by `main`'s return; this only adds hints.
fn report(e: &PlaqueError) {
    if let Some(hint) = hint(e) {
        error!("{hint}");
    }
}

fn hint(e: &PlaqueError) -> Option<String> {
    match e {
        PlaqueError::UnsupportedLanguage(_) => Some(format!(
            "supported languages: {}",
            language::supported_names().join(", ")
        )),
        _ => None,
    }
}
