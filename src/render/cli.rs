use crate::model::record::{FieldTranslation, TranslatedPlaqueRecord};
use std::io::{self, Write};

const LABEL_WIDTH: usize = 14;

pub fn render_cli<W: Write>(record: &TranslatedPlaqueRecord, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "----- Translated Plaque ({} -> {}) -----",
        record.source_lang, record.target_lang
    )?;

    let mut any = false;
    for (field, outcome) in record.fields() {
        any = true;
        let label = format!("{}:", field.label());
        match outcome {
            FieldTranslation::Translated { text } => {
                writeln!(out, "{label:<LABEL_WIDTH$}{text}")?;
            }
            FieldTranslation::Failed { original, .. } => {
                writeln!(out, "{label:<LABEL_WIDTH$}{original} [untranslated]")?;
            }
        }
    }

    if !any {
        writeln!(out, "No plaque fields recognized.")?;
    }

    Ok(())
}
