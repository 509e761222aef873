pub mod cli;
pub mod pdf;

use crate::error::PlaqueError;
use crate::model::ocr::RawOcrResult;
use crate::services::pipeline::PipelineOutcome;

use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTarget {
    Cli,
    Pdf,
    Json,
    Audio,
}

#[derive(Debug, Clone)]
pub struct OutputPlan {
    pub targets: Vec<OutputTarget>,
    pub pdf_path: PathBuf,
}

impl OutputPlan {
    /// Audio narration has no renderer; asking for it is an error, not a no-op.
    pub fn validate(&self) -> Result<(), PlaqueError> {
        if self.targets.contains(&OutputTarget::Audio) {
            return Err(PlaqueError::NotImplemented("audio output".into()));
        }
        Ok(())
    }

    pub fn wants(&self, target: OutputTarget) -> bool {
        self.targets.contains(&target)
    }
}

/// `<output_dir>/<image stem>_<target>.pdf`
pub fn default_pdf_path(output_dir: &Path, image: &Path, target_code: &str) -> PathBuf {
    let stem = image
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("plaque");
    output_dir.join(format!("{stem}_{target_code}.pdf"))
}

pub fn render_extracted<W: Write>(ocr: &RawOcrResult, out: &mut W) -> Result<(), PlaqueError> {
    let write = |out: &mut W| -> std::io::Result<()> {
        writeln!(out, "----- Extracted Text -----")?;
        writeln!(out, "{}", ocr.text)?;
        if let Some(conf) = ocr.confidence {
            writeln!(out, "----- Average Confidence Level -----")?;
            writeln!(out, "{conf:.2}%")?;
        }
        Ok(())
    };
    write(out).map_err(|e| PlaqueError::Render(e.to_string()))
}

pub fn dispatch<W: Write>(
    outcome: &PipelineOutcome,
    plan: &OutputPlan,
    out: &mut W,
) -> Result<(), PlaqueError> {
    plan.validate()?;

    for target in &plan.targets {
        match target {
            OutputTarget::Cli => {
                cli::render_cli(&outcome.translated, out)
                    .map_err(|e| PlaqueError::Render(e.to_string()))?;
            }
            OutputTarget::Pdf => pdf::render_pdf(&outcome.translated, &plan.pdf_path)?,
            OutputTarget::Json => {
                let json = serde_json::to_string_pretty(outcome)
                    .map_err(|e| PlaqueError::Render(e.to_string()))?;
                writeln!(out, "{json}").map_err(|e| PlaqueError::Render(e.to_string()))?;
            }
            OutputTarget::Audio => {
                return Err(PlaqueError::NotImplemented("audio output".into()));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_is_rejected() {
        let plan = OutputPlan {
            targets: vec![OutputTarget::Cli, OutputTarget::Audio],
            pdf_path: PathBuf::from("out.pdf"),
        };
        assert_eq!(
            plan.validate(),
            Err(PlaqueError::NotImplemented("audio output".into()))
        );
    }

    #[test]
    fn test_default_pdf_path() {
        let path = default_pdf_path(Path::new("Output"), Path::new("/photos/monet.jpg"), "fr");
        assert_eq!(path, PathBuf::from("Output/monet_fr.pdf"));

        let path = default_pdf_path(Path::new("Output"), Path::new("/"), "de");
        assert_eq!(path, PathBuf::from("Output/plaque_de.pdf"));
    }

    #[test]
    fn test_render_extracted_with_confidence() {
        let mut buf = Vec::new();
        render_extracted(&RawOcrResult::new("Claude Monet", Some(91.256)), &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(
            out,
            "----- Extracted Text -----\nClaude Monet\n----- Average Confidence Level -----\n91.26%\n"
        );
    }
}
