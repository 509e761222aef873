use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaqueError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("OCR engine unavailable: {0}")]
    OcrEngineUnavailable(String),

    #[error("image unreadable: {0}")]
    ImageUnreadable(String),

    #[error("translation model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("unsupported language pair {source_code} -> {target_code}: {reason}")]
    UnsupportedLanguagePair {
        source_code: String,
        target_code: String,
        reason: String,
    },

    #[error("{0} is not implemented")]
    NotImplemented(String),

    #[error("failed to render output: {0}")]
    Render(String),
}

impl PlaqueError {
    /// Translation failures only affect the field being translated.
    pub fn is_field_scoped(&self) -> bool {
        matches!(
            self,
            PlaqueError::ModelUnavailable(_) | PlaqueError::UnsupportedLanguagePair { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_errors_are_field_scoped() {
        assert!(PlaqueError::ModelUnavailable("down".into()).is_field_scoped());
        assert!(PlaqueError::UnsupportedLanguagePair {
            source_code: "en".into(),
            target_code: "en".into(),
            reason: "same language".into(),
        }
        .is_field_scoped());
    }

    #[test]
    fn test_fatal_errors_are_not_field_scoped() {
        assert!(!PlaqueError::UnsupportedLanguage("klingon".into()).is_field_scoped());
        assert!(!PlaqueError::OcrEngineUnavailable("missing".into()).is_field_scoped());
        assert!(!PlaqueError::ImageUnreadable("bad".into()).is_field_scoped());
        assert!(!PlaqueError::NotImplemented("audio output".into()).is_field_scoped());
    }

    #[test]
    fn test_error_messages_carry_reason() {
        let e = PlaqueError::UnsupportedLanguagePair {
            source_code: "en".into(),
            target_code: "xx".into(),
            reason: "HTTP 400".into(),
        };
        assert_eq!(e.to_string(), "unsupported language pair en -> xx: HTTP 400");
        assert_eq!(
            PlaqueError::NotImplemented("audio output".into()).to_string(),
            "audio output is not implemented"
        );
    }
}
