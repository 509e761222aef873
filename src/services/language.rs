use crate::error::PlaqueError;
use crate::model::language::LanguageSpec;

pub static LANGUAGES: &[LanguageSpec] = &[
    LanguageSpec {
        display_name: "English",
        ocr_code: "eng",
        translation_code: "en",
        aliases: &[],
    },
    LanguageSpec {
        display_name: "French",
        ocr_code: "fra",
        translation_code: "fr",
        aliases: &["fre"],
    },
    LanguageSpec {
        display_name: "German",
        ocr_code: "deu",
        translation_code: "de",
        aliases: &["ger"],
    },
    LanguageSpec {
        display_name: "Spanish",
        ocr_code: "spa",
        translation_code: "es",
        aliases: &[],
    },
    LanguageSpec {
        display_name: "Italian",
        ocr_code: "ita",
        translation_code: "it",
        aliases: &[],
    },
    LanguageSpec {
        display_name: "Chinese",
        ocr_code: "chi_sim",
        translation_code: "zh",
        aliases: &["chi", "zho"],
    },
    LanguageSpec {
        display_name: "Japanese",
        ocr_code: "jpn",
        translation_code: "ja",
        aliases: &[],
    },
    LanguageSpec {
        display_name: "Russian",
        ocr_code: "rus",
        translation_code: "ru",
        aliases: &[],
    },
];

/// Looks up a language by display name, translation code, OCR code or alias.
pub fn resolve(input: &str) -> Result<LanguageSpec, PlaqueError> {
    let needle = input.trim();

    LANGUAGES
        .iter()
        .find(|l| l.matches(needle))
        .copied()
        .ok_or_else(|| PlaqueError::UnsupportedLanguage(input.to_string()))
}

pub fn supported_names() -> Vec<&'static str> {
    LANGUAGES.iter().map(|l| l.display_name).collect()
}
