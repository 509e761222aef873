use crate::model::record::Field;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FieldResult {
    pub field: Field,
    pub ok: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct TranslationReport {
    pub succeeded: usize,
    pub failed: usize,
    pub items: Vec<FieldResult>,
}

impl TranslationReport {
    pub fn record_success(&mut self, field: Field) {
        self.succeeded += 1;
        self.items.push(FieldResult {
            field,
            ok: true,
            error: None,
        });
    }

    pub fn record_failure(&mut self, field: Field, error: String) {
        self.failed += 1;
        self.items.push(FieldResult {
            field,
            ok: false,
            error: Some(error),
        });
    }
}
