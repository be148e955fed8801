use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Remote-assigned document ID.
pub type DocId = i64;

/// A document record as served by the list and upload endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub selected: bool,
    /// URL/path of the stored PDF; set once at upload.
    #[serde(default)]
    pub file: Option<String>,
}

impl Document {
    pub fn has_file(&self) -> bool {
        self.file.as_deref().is_some_and(|f| !f.trim().is_empty())
    }

    /// Apply a field edit in place.
    pub fn apply(&mut self, edit: &FieldEdit) {
        match edit {
            FieldEdit::Name(name) => self.name = name.clone(),
            FieldEdit::Selected(flag) => self.selected = *flag,
        }
    }
}

/// Editable document fields. `file` is immutable after upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocField {
    Name,
    Selected,
}

impl DocField {
    pub fn as_str(self) -> &'static str {
        match self {
            DocField::Name => "name",
            DocField::Selected => "selected",
        }
    }
}

impl fmt::Display for DocField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A new value for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Name(String),
    Selected(bool),
}

impl FieldEdit {
    pub fn field(&self) -> DocField {
        match self {
            FieldEdit::Name(_) => DocField::Name,
            FieldEdit::Selected(_) => DocField::Selected,
        }
    }

    /// Partial-update body: `{"name": "..."}` or `{"selected": true}`.
    pub fn to_payload(&self) -> serde_json::Value {
        let value = match self {
            FieldEdit::Name(name) => serde_json::Value::from(name.as_str()),
            FieldEdit::Selected(flag) => serde_json::Value::from(*flag),
        };
        let mut body = serde_json::Map::new();
        body.insert(self.field().as_str().to_string(), value);
        serde_json::Value::Object(body)
    }
}

/// Raw upload payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl FileBlob {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn content_type(&self) -> &'static str {
        let is_pdf = Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf {
            "application/pdf"
        } else {
            "application/octet-stream"
        }
    }
}

/// A citation returned alongside an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub page: Option<u32>,
    pub snippet: String,
}

/// Answer to a question about one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}
