use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Author,
    LifeDates,
    Title,
    Year,
    Medium,
    CreditLine,
    Description,
}

impl Field {
    /// Plaque reading order. Translation and rendering both walk this.
    pub const ALL: [Field; 7] = [
        Field::Author,
        Field::LifeDates,
        Field::Title,
        Field::Year,
        Field::Medium,
        Field::CreditLine,
        Field::Description,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Author => "Author",
            Field::LifeDates => "Life dates",
            Field::Title => "Title",
            Field::Year => "Year",
            Field::Medium => "Medium",
            Field::CreditLine => "Credit line",
            Field::Description => "Description",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct PlaqueRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_dates: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_line: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PlaqueRecord {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Author => self.author.as_deref(),
            Field::LifeDates => self.life_dates.as_deref(),
            Field::Title => self.title.as_deref(),
            Field::Year => self.year.as_deref(),
            Field::Medium => self.medium.as_deref(),
            Field::CreditLine => self.credit_line.as_deref(),
            Field::Description => self.description.as_deref(),
        }
    }

    pub(crate) fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Author => &mut self.author,
            Field::LifeDates => &mut self.life_dates,
            Field::Title => &mut self.title,
            Field::Year => &mut self.year,
            Field::Medium => &mut self.medium,
            Field::CreditLine => &mut self.credit_line,
            Field::Description => &mut self.description,
        }
    }

    /// Present fields with their text, in plaque order.
    pub fn fields(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Field::ALL
            .into_iter()
            .filter_map(move |f| self.get(f).map(|text| (f, text)))
    }

    pub fn present_fields(&self) -> Vec<Field> {
        self.fields().map(|(f, _)| f).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }

    pub fn is_complete(&self) -> bool {
        Field::ALL.iter().all(|&f| self.get(f).is_some())
    }
}

/// Outcome of translating one present field.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldTranslation {
    Translated { text: String },
    Failed { original: String, error: String },
}

impl FieldTranslation {
    /// Text to show for this field. Failed fields fall back to the source text.
    pub fn display_text(&self) -> &str {
        match self {
            FieldTranslation::Translated { text } => text,
            FieldTranslation::Failed { original, .. } => original,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct TranslatedPlaqueRecord {
    pub source_lang: String,
    pub target_lang: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<FieldTranslation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_dates: Option<FieldTranslation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<FieldTranslation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<FieldTranslation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<FieldTranslation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_line: Option<FieldTranslation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<FieldTranslation>,
}

impl TranslatedPlaqueRecord {
    pub fn new(source_lang: &str, target_lang: &str) -> Self {
        Self {
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            ..Self::default()
        }
    }

    pub fn get(&self, field: Field) -> Option<&FieldTranslation> {
        match field {
            Field::Author => self.author.as_ref(),
            Field::LifeDates => self.life_dates.as_ref(),
            Field::Title => self.title.as_ref(),
            Field::Year => self.year.as_ref(),
            Field::Medium => self.medium.as_ref(),
            Field::CreditLine => self.credit_line.as_ref(),
            Field::Description => self.description.as_ref(),
        }
    }

    pub(crate) fn slot_mut(&mut self, field: Field) -> &mut Option<FieldTranslation> {
        match field {
            Field::Author => &mut self.author,
            Field::LifeDates => &mut self.life_dates,
            Field::Title => &mut self.title,
            Field::Year => &mut self.year,
            Field::Medium => &mut self.medium,
            Field::CreditLine => &mut self.credit_line,
            Field::Description => &mut self.description,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (Field, &FieldTranslation)> + '_ {
        Field::ALL
            .into_iter()
            .filter_map(move |f| self.get(f).map(|t| (f, t)))
    }

    pub fn present_fields(&self) -> Vec<Field> {
        self.fields().map(|(f, _)| f).collect()
    }
}
