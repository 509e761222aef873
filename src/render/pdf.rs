//! Single-column A4 layout of a translated plaque.
//!
//! Uses the standard Type1 Helvetica fonts with WinAnsi encoding, so scripts
//! outside Latin-1 (Chinese, Japanese, Cyrillic) come out as `?`.

use crate::error::PlaqueError;
use crate::model::record::{FieldTranslation, TranslatedPlaqueRecord};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use std::path::Path;
use tracing::info;

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 56;
const LINE_HEIGHT: i64 = 15;
const BODY_SIZE: i64 = 11;
const HEADING_SIZE: i64 = 16;
const WRAP_CHARS: usize = 88;

struct Layout {
    done: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: i64,
}

impl Layout {
    fn new() -> Self {
        Self {
            done: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn line(&mut self, font: &str, size: i64, text: &str) {
        if self.y < MARGIN {
            self.done.push(std::mem::take(&mut self.current));
            self.y = PAGE_HEIGHT - MARGIN;
        }

        let ops = &mut self.current;
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font.as_bytes().to_vec()), Object::Integer(size)],
        ));
        ops.push(Operation::new(
            "Td",
            vec![Object::Integer(MARGIN), Object::Integer(self.y)],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));

        self.y -= LINE_HEIGHT.max(size + 4);
    }

    fn gap(&mut self) {
        self.y -= LINE_HEIGHT / 2;
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.done.push(self.current);
        self.done
    }
}

pub fn render_pdf(record: &TranslatedPlaqueRecord, path: &Path) -> Result<(), PlaqueError> {
    let mut layout = Layout::new();

    layout.line(
        "F2",
        HEADING_SIZE,
        &format!("Plaque translation ({} -> {})", record.source_lang, record.target_lang),
    );
    layout.gap();

    for (field, outcome) in record.fields() {
        let heading = match outcome {
            FieldTranslation::Translated { .. } => field.label().to_string(),
            FieldTranslation::Failed { .. } => format!("{} (untranslated)", field.label()),
        };
        layout.line("F2", BODY_SIZE, &heading);
        for chunk in wrap(outcome.display_text(), WRAP_CHARS) {
            layout.line("F1", BODY_SIZE, &chunk);
        }
        layout.gap();
    }

    let mut doc = build_document(layout.finish())?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| PlaqueError::Render(format!("{}: {e}", parent.display())))?;
    }
    doc.save(path)
        .map_err(|e| PlaqueError::Render(format!("{}: {e}", path.display())))?;

    info!("wrote {}", path.display());
    Ok(())
}

fn build_document(pages: Vec<Vec<Operation>>) -> Result<Document, PlaqueError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| PlaqueError::Render(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(PAGE_WIDTH),
            Object::Integer(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    Ok(doc)
}

/// Greedy word wrap; words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            c if (' '..='~').contains(&c) || ('\u{A0}'..='\u{FF}').contains(&c) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record() -> TranslatedPlaqueRecord {
        let mut record = TranslatedPlaqueRecord::new("en", "fr");
        record.author = Some(FieldTranslation::Translated {
            text: "Claude Monet".into(),
        });
        record.life_dates = Some(FieldTranslation::Translated {
            text: "1840–1926".into(),
        });
        record.description = Some(FieldTranslation::Failed {
            original: "A study of light on water.".into(),
            error: "model down".into(),
        });
        record
    }

    #[test]
    fn test_writes_loadable_pdf() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Output").join("monet_fr.pdf");

        render_pdf(&record(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_long_description_spills_onto_more_pages() {
        let mut record = TranslatedPlaqueRecord::new("en", "fr");
        record.description = Some(FieldTranslation::Translated {
            text: "lumière ".repeat(8000),
        });

        let dir = tempdir().unwrap();
        let path = dir.path().join("long.pdf");
        render_pdf(&record, &path).unwrap();

        let doc = Document::load(&path).unwrap();
        assert!(doc.get_pages().len() > 1);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("a bb ccc dddd", 6), vec!["a bb", "ccc", "dddd"]);
        assert_eq!(wrap("averyveryverylongword x", 5), vec!["averyveryverylongword", "x"]);
        assert!(wrap("   ", 10).is_empty());
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Nymphéas"), b"Nymph\xe9as".to_vec());
        assert_eq!(encode_win_ansi("1840–1926"), b"1840\x961926".to_vec());
        assert_eq!(encode_win_ansi("睡蓮"), b"??".to_vec());
    }
}
