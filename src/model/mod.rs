pub mod language;
pub mod ocr;
pub mod record;
