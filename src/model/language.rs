use serde::Serialize;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct LanguageSpec {
    pub display_name: &'static str,

    /// Tesseract traineddata name.
    pub ocr_code: &'static str,

    /// ISO 639-1 code understood by the translation backends.
    pub translation_code: &'static str,

    #[serde(skip)]
    pub aliases: &'static [&'static str],
}

impl LanguageSpec {
    pub fn matches(&self, input: &str) -> bool {
        self.display_name.eq_ignore_ascii_case(input)
            || self.ocr_code.eq_ignore_ascii_case(input)
            || self.translation_code.eq_ignore_ascii_case(input)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(input))
    }
}
