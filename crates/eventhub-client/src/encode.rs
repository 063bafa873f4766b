use chrono::{DateTime, SecondsFormat, Utc};
use eventhub_models::{EventField, SelectedFile, ValidatedEvent};

use crate::error::SubmitError;

/// Multipart field name the image is attached under.
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text { name: &'static str, value: String },
    File { name: &'static str, file: SelectedFile },
}

impl Part {
    pub fn name(&self) -> &'static str {
        match self {
            Part::Text { name, .. } | Part::File { name, .. } => name,
        }
    }
}

/// Ordered, transport-ready form parts for one submission.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EncodedPayload {
    parts: Vec<Part>,
}

impl EncodedPayload {
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn text_fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.parts.iter().filter_map(|part| match part {
            Part::Text { name, value } => Some((*name, value.as_str())),
            Part::File { .. } => None,
        })
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.text_fields()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.parts.iter().find_map(|part| match part {
            Part::File { file, .. } => Some(file),
            Part::Text { .. } => None,
        })
    }

    fn push_text(&mut self, field: EventField, value: String) {
        self.parts.push(Part::Text {
            name: field.as_str(),
            value,
        });
    }

    /// Convert into a reqwest multipart form.
    pub fn into_form(self) -> Result<reqwest::multipart::Form, SubmitError> {
        let mut form = reqwest::multipart::Form::new();
        for part in self.parts {
            form = match part {
                Part::Text { name, value } => form.text(name, value),
                Part::File { name, file } => {
                    let body = reqwest::multipart::Part::bytes(file.bytes)
                        .file_name(file.file_name)
                        .mime_str(&file.content_type)
                        .map_err(|e| {
                            tracing::warn!("unusable image content type: {e}");
                            SubmitError::unexpected()
                        })?;
                    form.part(name, body)
                }
            };
        }
        Ok(form)
    }
}

fn format_date(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serialize a validated event into form parts.
///
/// `url` is left out when blank and otherwise sent as entered. `price` is
/// left out when the event is free; the service ignores it there.
pub fn encode(event: &ValidatedEvent) -> EncodedPayload {
    let mut payload = EncodedPayload::default();
    payload.push_text(EventField::Title, event.title.clone());
    payload.push_text(EventField::Description, event.description.clone());
    payload.push_text(EventField::Location, event.location.clone());
    if let Some(url) = &event.url {
        payload.push_text(EventField::Url, url.clone());
    }
    payload.push_text(EventField::StartDate, format_date(&event.start_date));
    payload.push_text(EventField::EndDate, format_date(&event.end_date));
    payload.push_text(EventField::CategoryId, event.category_id.clone());
    if !event.is_free {
        payload.push_text(EventField::Price, event.price.to_string());
    }
    payload.push_text(EventField::IsFree, event.is_free.to_string());

    if let Some(file) = &event.image {
        payload.parts.push(Part::File {
            name: IMAGE_FIELD,
            file: file.clone(),
        });
    }
    payload
}
