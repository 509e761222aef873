//! Text extraction through the tesseract command-line tool.

use crate::config::{OcrSettings, PreprocessSettings};
use crate::error::PlaqueError;
use crate::model::ocr::RawOcrResult;
use crate::services::preprocess;

use image::{DynamicImage, ImageFormat};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

const DEBUG_IMAGE: &str = "debug_preprocessed.png";

pub trait OcrEngine {
    fn extract_text(
        &self,
        image: &Path,
        ocr_code: &str,
        want_confidence: bool,
    ) -> Result<RawOcrResult, PlaqueError>;
}

pub struct TesseractEngine {
    binary: PathBuf,
    psm: u8,
    preprocess: PreprocessSettings,
    debug_dir: Option<PathBuf>,
}

impl TesseractEngine {
    pub fn new(settings: &OcrSettings) -> Self {
        Self {
            binary: settings.tesseract_path.clone(),
            psm: settings.psm,
            preprocess: settings.preprocess.clone(),
            debug_dir: None,
        }
    }

    pub fn with_psm(mut self, psm: u8) -> Self {
        self.psm = psm;
        self
    }

    /// Keep the preprocessed image in `dir` for inspection.
    pub fn with_debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    fn save_debug_image(&self, gray: &image::GrayImage) {
        let Some(dir) = &self.debug_dir else {
            return;
        };

        let path = dir.join(DEBUG_IMAGE);
        let saved = std::fs::create_dir_all(dir)
            .map_err(|e| e.to_string())
            .and_then(|_| gray.save(&path).map_err(|e| e.to_string()));

        match saved {
            Ok(()) => info!("saved {} for inspection", path.display()),
            Err(e) => warn!("could not save debug image {}: {e}", path.display()),
        }
    }

    fn run(&self, staged: &Path, ocr_code: &str, tsv: bool) -> Result<String, PlaqueError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(staged)
            .arg("stdout")
            .arg("-l")
            .arg(ocr_code)
            .arg("--psm")
            .arg(self.psm.to_string());
        if tsv {
            cmd.arg("tsv");
        }

        debug!("running {:?}", cmd);
        let output = cmd.output().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                PlaqueError::OcrEngineUnavailable(format!(
                    "tesseract not found at {}",
                    self.binary.display()
                ))
            } else {
                PlaqueError::OcrEngineUnavailable(format!("failed to execute tesseract: {e}"))
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PlaqueError::OcrEngineUnavailable(format!(
                "tesseract failed ({}): {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OcrEngine for TesseractEngine {
    fn extract_text(
        &self,
        image: &Path,
        ocr_code: &str,
        want_confidence: bool,
    ) -> Result<RawOcrResult, PlaqueError> {
        let img = load_image(image)?;
        info!("loaded {} ({}x{})", image.display(), img.width(), img.height());

        let gray = preprocess::preprocess(&img, &self.preprocess);
        self.save_debug_image(&gray);

        let staged = tempfile::Builder::new()
            .prefix("plaque-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| PlaqueError::OcrEngineUnavailable(format!("cannot stage image: {e}")))?;
        gray.save_with_format(staged.path(), ImageFormat::Png)
            .map_err(|e| PlaqueError::OcrEngineUnavailable(format!("cannot stage image: {e}")))?;

        info!("running OCR (lang={ocr_code}, psm={})", self.psm);
        let stdout = self.run(staged.path(), ocr_code, want_confidence)?;

        if want_confidence {
            let (text, confidence) = parse_tsv(&stdout);
            Ok(RawOcrResult::new(text, Some(confidence)))
        } else {
            Ok(RawOcrResult::new(stdout.trim(), None))
        }
    }
}

pub fn load_image(path: &Path) -> Result<DynamicImage, PlaqueError> {
    if !path.exists() {
        return Err(PlaqueError::ImageUnreadable(format!(
            "image file not found: {}",
            path.display()
        )));
    }

    image::open(path)
        .map_err(|e| PlaqueError::ImageUnreadable(format!("{}: {e}", path.display())))
}

/// Rebuilds line-broken text and the mean word confidence from tesseract TSV.
///
/// Only word rows (level 5) with a real confidence and non-blank text count.
pub fn parse_tsv(tsv: &str) -> (String, f32) {
    let mut lines: Vec<String> = Vec::new();
    let mut current_key: Option<(&str, &str, &str, &str)> = None;
    let mut confidences: Vec<f32> = Vec::new();

    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.splitn(12, '\t').collect();
        if cols.len() < 12 || cols[0] != "5" {
            continue;
        }

        let word = cols[11].trim();
        let conf = match cols[10].trim().parse::<f32>() {
            Ok(c) if c >= 0.0 => c,
            _ => continue,
        };
        if word.is_empty() {
            continue;
        }

        let key = (cols[1], cols[2], cols[3], cols[4]);
        match lines.last_mut() {
            Some(line) if current_key == Some(key) => {
                line.push(' ');
                line.push_str(word);
            }
            _ => {
                lines.push(word.to_string());
                current_key = Some(key);
            }
        }
        confidences.push(conf);
    }

    let avg = if confidences.is_empty() {
        0.0
    } else {
        confidences.iter().sum::<f32>() / confidences.len() as f32
    };

    (lines.join("\n"), avg)
}
