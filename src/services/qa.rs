use crate::model::record::{Field, FieldTranslation, PlaqueRecord, TranslatedPlaqueRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QaIssue {
    pub field: Field,
    pub code: String,
    pub message: String,
}

pub fn run(source: &PlaqueRecord, translated: &TranslatedPlaqueRecord) -> Vec<QaIssue> {
    let mut issues: Vec<QaIssue> = Vec::new();

    for (field, outcome) in translated.fields() {
        match outcome {
            FieldTranslation::Failed { error, .. } => {
                issues.push(QaIssue {
                    field,
                    code: "TRANSLATION_FAILED".to_string(),
                    message: format!("{} left untranslated: {error}", field.label()),
                });
            }
            FieldTranslation::Translated { text } => {
                let translation_trim = text.trim();
                let original_trim = source.get(field).unwrap_or("").trim();

                if translation_trim.is_empty() {
                    issues.push(QaIssue {
                        field,
                        code: "EMPTY_TRANSLATION".to_string(),
                        message: format!("{} translated to empty text", field.label()),
                    });
                    continue;
                }

                // Names, dates and years legitimately come back unchanged
                if translation_trim == original_trim && has_words(original_trim) && !is_proper_name(field) {
                    issues.push(QaIssue {
                        field,
                        code: "SAME_AS_ORIGINAL".to_string(),
                        message: format!("{} translation is identical to the original", field.label()),
                    });
                }
            }
        }
    }

    issues
}

fn has_words(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
}

fn is_proper_name(field: Field) -> bool {
    matches!(field, Field::Author)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> PlaqueRecord {
        PlaqueRecord {
            author: Some("Claude Monet".into()),
            year: Some("1916".into()),
            title: Some("Water Lilies".into()),
            description: Some("A study of light on water.".into()),
            ..PlaqueRecord::default()
        }
    }

    fn translated(text: &str) -> FieldTranslation {
        FieldTranslation::Translated { text: text.into() }
    }

    #[test]
    fn test_clean_translation_has_no_issues() {
        let mut t = TranslatedPlaqueRecord::new("en", "fr");
        t.author = Some(translated("Claude Monet"));
        t.year = Some(translated("1916"));
        t.title = Some(translated("Nymphéas"));
        t.description = Some(translated("Une étude de la lumière sur l'eau."));

        assert!(run(&source(), &t).is_empty());
    }

    #[test]
    fn test_flags_failed_empty_and_unchanged_fields() {
        let mut t = TranslatedPlaqueRecord::new("en", "fr");
        t.author = Some(translated("Claude Monet"));
        t.year = Some(translated("1916"));
        t.title = Some(translated("Water Lilies"));
        t.description = Some(FieldTranslation::Failed {
            original: "A study of light on water.".into(),
            error: "model down".into(),
        });

        let issues = run(&source(), &t);
        let codes: Vec<(Field, &str)> = issues.iter().map(|i| (i.field, i.code.as_str())).collect();
        assert_eq!(
            codes,
            vec![
                (Field::Title, "SAME_AS_ORIGINAL"),
                (Field::Description, "TRANSLATION_FAILED"),
            ]
        );

        t.title = Some(translated("  "));
        let issues = run(&source(), &t);
        assert_eq!(issues[0].code, "EMPTY_TRANSLATION");
    }
}
