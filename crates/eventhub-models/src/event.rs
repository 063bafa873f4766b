use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::file::SelectedFile;

/// Server-assigned identifier of an event record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id can stand as a single URL path segment. Blank ids and
    /// the dot segments `.` and `..` cannot.
    pub fn is_routable(&self) -> bool {
        !matches!(self.0.trim(), "" | "." | "..")
    }

    /// The id percent-encoded for use as one path segment.
    pub fn path_segment(&self) -> String {
        url::form_urlencoded::byte_serialize(self.0.as_bytes())
            .collect::<String>()
            .replace('+', "%20")
    }

    /// Path of the detail view for this event.
    pub fn detail_path(&self) -> String {
        format!("/events/{}", self.path_segment())
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a submission creates a new event or replaces an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitMode {
    #[default]
    Create,
    Update(EventId),
}

/// Names of the fields making up an event form. The string forms are the
/// multipart field names the events API expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventField {
    Title,
    Description,
    Location,
    Url,
    StartDate,
    EndDate,
    CategoryId,
    Price,
    IsFree,
    Image,
}

impl EventField {
    pub const ALL: [EventField; 10] = [
        EventField::Title,
        EventField::Description,
        EventField::Location,
        EventField::Url,
        EventField::StartDate,
        EventField::EndDate,
        EventField::CategoryId,
        EventField::Price,
        EventField::IsFree,
        EventField::Image,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventField::Title => "title",
            EventField::Description => "description",
            EventField::Location => "location",
            EventField::Url => "url",
            EventField::StartDate => "startDate",
            EventField::EndDate => "endDate",
            EventField::CategoryId => "categoryId",
            EventField::Price => "price",
            EventField::IsFree => "isFree",
            EventField::Image => "image",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == raw)
    }
}

impl std::fmt::Display for EventField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value written into a single form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Date(Option<DateTime<Utc>>),
    Flag(bool),
    File(Option<SelectedFile>),
}

impl FieldValue {
    fn kind(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Date(_) => "date",
            FieldValue::Flag(_) => "flag",
            FieldValue::File(_) => "file",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Date(Some(value))
    }
}

impl From<SelectedFile> for FieldValue {
    fn from(value: SelectedFile) -> Self {
        FieldValue::File(Some(value))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldValueError {
    #[error("field `{field}` does not accept a {given} value")]
    Mismatch {
        field: EventField,
        given: &'static str,
    },
}

/// The in-memory event record being edited. Everything that is submitted,
/// including the selected image, is owned here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub url: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub category_id: String,
    /// Raw price input; parsed during validation.
    #[serde(deserialize_with = "deserialize_price")]
    pub price: String,
    pub is_free: bool,
    #[serde(skip)]
    pub image: Option<SelectedFile>,
}

impl EventDraft {
    /// Default values shown when the form mounts, with both dates at `now`.
    pub fn defaults_at(now: DateTime<Utc>) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            location: String::new(),
            url: String::new(),
            start_date: Some(now),
            end_date: Some(now),
            category_id: String::new(),
            price: String::new(),
            is_free: false,
            image: None,
        }
    }

    /// Pre-fill a draft from an existing event (update page).
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            url: event.url.clone().unwrap_or_default(),
            start_date: Some(event.start_date),
            end_date: Some(event.end_date),
            category_id: event.category_id.clone(),
            price: event.price.to_string(),
            is_free: event.is_free,
            image: None,
        }
    }

    pub fn set(&mut self, field: EventField, value: FieldValue) -> Result<(), FieldValueError> {
        let given = value.kind();
        match (field, value) {
            (EventField::Title, FieldValue::Text(v)) => self.title = v,
            (EventField::Description, FieldValue::Text(v)) => self.description = v,
            (EventField::Location, FieldValue::Text(v)) => self.location = v,
            (EventField::Url, FieldValue::Text(v)) => self.url = v,
            (EventField::CategoryId, FieldValue::Text(v)) => self.category_id = v,
            (EventField::Price, FieldValue::Text(v)) => self.price = v,
            (EventField::StartDate, FieldValue::Date(v)) => self.start_date = v,
            (EventField::EndDate, FieldValue::Date(v)) => self.end_date = v,
            (EventField::IsFree, FieldValue::Flag(v)) => self.is_free = v,
            (EventField::Image, FieldValue::File(v)) => self.image = v,
            (field, _) => return Err(FieldValueError::Mismatch { field, given }),
        }
        Ok(())
    }
}

impl Default for EventDraft {
    fn default() -> Self {
        Self::defaults_at(Utc::now())
    }
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match RawPrice::deserialize(deserializer)? {
        RawPrice::Int(v) => v.to_string(),
        RawPrice::Float(v) => v.to_string(),
        RawPrice::Text(v) => v,
    })
}

/// A draft that passed validation, with texts trimmed and inputs parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    /// Checked to be an absolute URL; kept as entered, minus surrounding
    /// whitespace.
    pub url: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub category_id: String,
    pub price: f64,
    pub is_free: bool,
    pub image: Option<SelectedFile>,
}

/// An event as returned by the events API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub url: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub category_id: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}
