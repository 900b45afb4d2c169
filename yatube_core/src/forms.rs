// Forms carry raw user input. Text rules are checked here; checks that need
// the store (does the group exist?) happen in the owning service, which
// appends to the same `FormErrors`.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::Serialize;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice.";
pub const INVALID_IMAGE: &str = "invalid file format";

/// Field name -> messages, in field order so rendering is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// An uploaded file as received from the client, before any decoding.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct PostForm {
    pub text: String,
    /// Group id as submitted; empty means "no group".
    pub group: Option<String>,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

/// Trims and rejects blank text.
pub fn clean_text(text: &str, field: &str, errors: &mut FormErrors) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        errors.add(field, REQUIRED);
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl CommentForm {
    pub fn clean(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::new();
        match clean_text(&self.text, "text", &mut errors) {
            Some(text) => Ok(text),
            None => Err(errors),
        }
    }
}
