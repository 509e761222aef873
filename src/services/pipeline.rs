use crate::error::PlaqueError;
use crate::model::language::LanguageSpec;
use crate::model::ocr::RawOcrResult;
use crate::model::record::{FieldTranslation, PlaqueRecord, TranslatedPlaqueRecord};
use crate::parsers::plaque::PlaqueParser;
use crate::render::{self, OutputPlan, OutputTarget};
use crate::services::{
    language,
    ocr::OcrEngine,
    qa::{self, QaIssue},
    report::TranslationReport,
    translate::Translator,
};

use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error, info, warn};

pub struct PipelineRequest<'a> {
    pub image: &'a Path,
    pub input_lang: &'a str,
    pub target_lang: &'a str,
    pub want_confidence: bool,
    /// Print the raw OCR text ahead of the rendered record.
    pub show_extracted: bool,
}

#[derive(Debug, Serialize)]
pub struct PipelineOutcome {
    pub source: LanguageSpec,
    pub target: LanguageSpec,
    pub ocr: RawOcrResult,
    pub record: PlaqueRecord,
    pub translated: TranslatedPlaqueRecord,
    pub report: TranslationReport,
    pub issues: Vec<QaIssue>,
}

pub struct Pipeline<'a> {
    ocr: &'a dyn OcrEngine,
    translator: &'a dyn Translator,
    parser: &'a PlaqueParser,
}

impl<'a> Pipeline<'a> {
    pub fn new(ocr: &'a dyn OcrEngine, translator: &'a dyn Translator, parser: &'a PlaqueParser) -> Self {
        Self {
            ocr,
            translator,
            parser,
        }
    }

    /// Languages and outputs are checked before the image is touched.
    pub fn run<W: Write>(
        &self,
        req: &PipelineRequest,
        plan: &OutputPlan,
        out: &mut W,
    ) -> Result<PipelineOutcome, PlaqueError> {
        let (source, target) = resolve_languages(req)?;
        plan.validate()?;

        let outcome = self.process(req, source, target)?;

        if req.show_extracted && !plan.wants(OutputTarget::Json) {
            render::render_extracted(&outcome.ocr, out)?;
        }
        render::dispatch(&outcome, plan, out)?;

        Ok(outcome)
    }

    pub fn process(
        &self,
        req: &PipelineRequest,
        source: LanguageSpec,
        target: LanguageSpec,
    ) -> Result<PipelineOutcome, PlaqueError> {
        info!(
            "translating plaque {} ({} -> {})",
            req.image.display(),
            source.display_name,
            target.display_name
        );

        let ocr = self
            .ocr
            .extract_text(req.image, source.ocr_code, req.want_confidence)?;
        debug!("extracted {} chars of text", ocr.text.len());

        let record = self.parser.parse(&ocr.text);
        if record.is_empty() {
            warn!("no plaque fields recognized in OCR text");
        } else if record.is_complete() {
            info!("parsed plaque text, all fields collected");
        } else {
            info!("parsed plaque text, fields found: {:?}", record.present_fields());
        }

        let (translated, report) = translate_record(
            &record,
            self.translator,
            source.translation_code,
            target.translation_code,
        );
        info!(
            "translated {} field(s), {} failed",
            report.succeeded, report.failed
        );
        debug!("translated fields: {:?}", translated.present_fields());

        let issues = qa::run(&record, &translated);
        for issue in &issues {
            warn!("[{}] {}", issue.code, issue.message);
        }

        Ok(PipelineOutcome {
            source,
            target,
            ocr,
            record,
            translated,
            report,
            issues,
        })
    }
}

pub fn resolve_languages(req: &PipelineRequest) -> Result<(LanguageSpec, LanguageSpec), PlaqueError> {
    let source = language::resolve(req.input_lang)?;
    let target = language::resolve(req.target_lang)?;
    Ok((source, target))
}

/// Translates each present field in plaque order. A failed field keeps its
/// original text and the error; the remaining fields still go through.
pub fn translate_record(
    record: &PlaqueRecord,
    translator: &dyn Translator,
    source: &str,
    target: &str,
) -> (TranslatedPlaqueRecord, TranslationReport) {
    let mut translated = TranslatedPlaqueRecord::new(source, target);
    let mut report = TranslationReport::default();

    for (field, text) in record.fields() {
        let outcome = match translator.translate(text, source, target) {
            Ok(t) => {
                report.record_success(field);
                FieldTranslation::Translated { text: t }
            }
            Err(e) => {
                if e.is_field_scoped() {
                    warn!("could not translate {}: {e}", field.label());
                } else {
                    error!("translator failed on {}: {e}", field.label());
                }
                report.record_failure(field, e.to_string());
                FieldTranslation::Failed {
                    original: text.to_string(),
                    error: e.to_string(),
                }
            }
        };
        *translated.slot_mut(field) = Some(outcome);
    }

    (translated, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::Field;
    use std::cell::Cell;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const MONET: &str = "Claude Monet\n(1840–1926)\nWater Lilies\n1916\nOil on canvas\nGift of the artist's estate\nA study of light on water.";

    struct FakeOcr {
        result: Result<RawOcrResult, PlaqueError>,
        calls: Cell<usize>,
        last_code: Cell<Option<&'static str>>,
    }

    impl FakeOcr {
        fn returning(text: &str) -> Self {
            Self {
                result: Ok(RawOcrResult::new(text, Some(88.5))),
                calls: Cell::new(0),
                last_code: Cell::new(None),
            }
        }

        fn failing(err: PlaqueError) -> Self {
            Self {
                result: Err(err),
                calls: Cell::new(0),
                last_code: Cell::new(None),
            }
        }
    }

    impl OcrEngine for FakeOcr {
        fn extract_text(
            &self,
            _image: &Path,
            ocr_code: &str,
            _want_confidence: bool,
        ) -> Result<RawOcrResult, PlaqueError> {
            self.calls.set(self.calls.get() + 1);
            self.last_code.set(match ocr_code {
                "eng" => Some("eng"),
                "deu" => Some("deu"),
                _ => Some("other"),
            });
            self.result.clone()
        }
    }

    fn bracket(text: &str, _: &str, target: &str) -> Result<String, PlaqueError> {
        Ok(format!("[{target}] {text}"))
    }

    fn request<'a>(input: &'a str, target: &'a str) -> PipelineRequest<'a> {
        PipelineRequest {
            image: Path::new("monet.jpg"),
            input_lang: input,
            target_lang: target,
            want_confidence: false,
            show_extracted: false,
        }
    }

    fn cli_plan() -> OutputPlan {
        OutputPlan {
            targets: vec![OutputTarget::Cli],
            pdf_path: PathBuf::from("unused.pdf"),
        }
    }

    #[test]
    fn test_end_to_end_cli() {
        let ocr = FakeOcr::returning(MONET);
        let parser = PlaqueParser::default();
        let pipeline = Pipeline::new(&ocr, &bracket, &parser);

        let mut out = Vec::new();
        let outcome = pipeline
            .run(&request("English", "fr"), &cli_plan(), &mut out)
            .unwrap();

        assert_eq!(ocr.last_code.get(), Some("eng"));
        assert!(outcome.record.is_complete());
        assert_eq!(outcome.report.succeeded, 7);
        assert_eq!(outcome.report.failed, 0);
        assert_eq!(
            outcome.translated.get(Field::Title),
            Some(&FieldTranslation::Translated {
                text: "[fr] Water Lilies".into()
            })
        );

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("----- Translated Plaque (en -> fr) -----\n"));
        assert!(text.contains("Medium:       [fr] Oil on canvas\n"));
    }

    #[test]
    fn test_unsupported_language_fails_before_ocr() {
        let ocr = FakeOcr::returning(MONET);
        let parser = PlaqueParser::default();
        let pipeline = Pipeline::new(&ocr, &bracket, &parser);

        let err = pipeline
            .run(&request("klingon", "fr"), &cli_plan(), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err, PlaqueError::UnsupportedLanguage("klingon".into()));

        let err = pipeline
            .run(&request("en", "elvish"), &cli_plan(), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err, PlaqueError::UnsupportedLanguage("elvish".into()));
        assert_eq!(ocr.calls.get(), 0);
    }

    #[test]
    fn test_audio_output_fails_before_ocr() {
        let ocr = FakeOcr::returning(MONET);
        let parser = PlaqueParser::default();
        let pipeline = Pipeline::new(&ocr, &bracket, &parser);
        let plan = OutputPlan {
            targets: vec![OutputTarget::Audio],
            pdf_path: PathBuf::from("unused.pdf"),
        };

        let err = pipeline
            .run(&request("en", "fr"), &plan, &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, PlaqueError::NotImplemented(_)));
        assert_eq!(ocr.calls.get(), 0);
    }

    #[test]
    fn test_ocr_failure_aborts_run() {
        let ocr = FakeOcr::failing(PlaqueError::ImageUnreadable("monet.jpg".into()));
        let parser = PlaqueParser::default();
        let pipeline = Pipeline::new(&ocr, &bracket, &parser);

        let mut out = Vec::new();
        let err = pipeline
            .run(&request("de", "fr"), &cli_plan(), &mut out)
            .unwrap_err();
        assert_eq!(err, PlaqueError::ImageUnreadable("monet.jpg".into()));
        assert_eq!(ocr.last_code.get(), Some("deu"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_failed_field_does_not_block_others() {
        let flaky = |text: &str, source: &str, target: &str| {
            if text == "Water Lilies" {
                Err(PlaqueError::UnsupportedLanguagePair {
                    source_code: source.to_string(),
                    target_code: target.to_string(),
                    reason: "no model".into(),
                })
            } else {
                Ok(text.to_uppercase())
            }
        };

        let record = PlaqueParser::default().parse(MONET);
        let (translated, report) = translate_record(&record, &flaky, "en", "fr");

        assert_eq!(report.succeeded, 6);
        assert_eq!(report.failed, 1);
        assert_eq!(report.items[2].field, Field::Title);
        assert!(!report.items[2].ok);
        assert_eq!(
            translated.author,
            Some(FieldTranslation::Translated {
                text: "CLAUDE MONET".into()
            })
        );
        assert!(matches!(
            translated.title,
            Some(FieldTranslation::Failed { ref original, .. }) if original == "Water Lilies"
        ));
        assert_eq!(
            translated.get(Field::Description).map(|t| t.display_text()),
            Some("A STUDY OF LIGHT ON WATER.")
        );
    }

    #[test]
    fn test_translation_preserves_present_fields() {
        let always_fails =
            |_: &str, _: &str, _: &str| Err::<String, _>(PlaqueError::ModelUnavailable("offline".into()));

        for text in [MONET, "", "Claude Monet", "1916\nBronze", "A\nB\nC\nD"] {
            let record = PlaqueParser::default().parse(text);

            let (ok, _) = translate_record(&record, &bracket, "en", "fr");
            assert_eq!(ok.present_fields(), record.present_fields());

            let (failed, report) = translate_record(&record, &always_fails, "en", "fr");
            assert_eq!(failed.present_fields(), record.present_fields());
            assert_eq!(report.failed, record.present_fields().len());
        }
    }

    #[test]
    fn test_translation_follows_field_order() {
        let record = PlaqueParser::default().parse("A study of light on water.\n1916\nClaude Monet");
        let (_, report) = translate_record(&record, &bracket, "en", "fr");
        let order: Vec<Field> = report.items.iter().map(|i| i.field).collect();
        assert_eq!(order, vec![Field::Author, Field::Title, Field::Year]);
    }

    #[test]
    fn test_empty_ocr_text_renders_empty_record() {
        let ocr = FakeOcr::returning("   \n");
        let parser = PlaqueParser::default();
        let pipeline = Pipeline::new(&ocr, &bracket, &parser);

        let mut out = Vec::new();
        let outcome = pipeline
            .run(&request("en", "fr"), &cli_plan(), &mut out)
            .unwrap();
        assert!(outcome.record.is_empty());
        assert!(outcome.translated.present_fields().is_empty());
        assert!(String::from_utf8(out).unwrap().contains("No plaque fields recognized."));
    }

    #[test]
    fn test_show_extracted_and_json_output() {
        let ocr = FakeOcr::returning("Claude Monet\nWater Lilies");
        let parser = PlaqueParser::default();
        let pipeline = Pipeline::new(&ocr, &bracket, &parser);

        let mut req = request("en", "fr");
        req.show_extracted = true;

        let mut out = Vec::new();
        pipeline.run(&req, &cli_plan(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("----- Extracted Text -----\nClaude Monet\nWater Lilies\n"));
        assert!(text.contains("88.50%"));

        let json_plan = OutputPlan {
            targets: vec![OutputTarget::Json],
            pdf_path: PathBuf::from("unused.pdf"),
        };
        let mut out = Vec::new();
        pipeline.run(&req, &json_plan, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["record"]["author"], "Claude Monet");
        assert_eq!(value["translated"]["title"]["text"], "[fr] Water Lilies");
        assert_eq!(value["report"]["succeeded"], 2);
        assert_eq!(value["source"]["ocr_code"], "eng");
    }

    #[test]
    fn test_pdf_output() {
        let ocr = FakeOcr::returning(MONET);
        let parser = PlaqueParser::default();
        let pipeline = Pipeline::new(&ocr, &bracket, &parser);

        let dir = tempdir().unwrap();
        let plan = OutputPlan {
            targets: vec![OutputTarget::Pdf],
            pdf_path: dir.path().join("Output").join("monet_fr.pdf"),
        };

        let mut out = Vec::new();
        pipeline.run(&request("en", "fr"), &plan, &mut out).unwrap();
        assert!(plan.pdf_path.exists());
        assert!(out.is_empty());
    }
}
