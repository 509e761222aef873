pub mod language;
pub mod ocr;
pub mod pipeline;
pub mod preprocess;
pub mod qa;
pub mod report;
pub mod translate;
