use eventhub_models::{EventDraft, EventField, ValidatedEvent};
use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const MAX_LOCATION_LEN: usize = 200;
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Field name -> violation messages. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", self.summary())]
pub struct ValidationErrors {
    fields: BTreeMap<EventField, Vec<String>>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: EventField) -> &[String] {
        self.fields.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, field: EventField) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (EventField, &[String])> {
        self.fields.iter().map(|(field, msgs)| (*field, msgs.as_slice()))
    }

    /// Replace the messages for one field; an empty list clears it.
    pub fn set(&mut self, field: EventField, messages: Vec<String>) {
        if messages.is_empty() {
            self.fields.remove(&field);
        } else {
            self.fields.insert(field, messages);
        }
    }

    fn summary(&self) -> String {
        self.fields
            .iter()
            .map(|(field, msgs)| format!("{field}: {}", msgs.join(", ")))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Rules for an event record. Validation is pure: the same draft always
/// yields the same result.
#[derive(Debug, Clone)]
pub struct EventSchema {
    pub max_image_bytes: Option<u64>,
}

impl Default for EventSchema {
    fn default() -> Self {
        Self {
            max_image_bytes: Some(DEFAULT_MAX_IMAGE_BYTES),
        }
    }
}

impl EventSchema {
    /// Fields whose rules read `field`, including itself.
    pub fn dependents(field: EventField) -> &'static [EventField] {
        match field {
            EventField::StartDate | EventField::EndDate => {
                &[EventField::StartDate, EventField::EndDate]
            }
            EventField::IsFree | EventField::Price => &[EventField::Price],
            EventField::Title => &[EventField::Title],
            EventField::Description => &[EventField::Description],
            EventField::Location => &[EventField::Location],
            EventField::Url => &[EventField::Url],
            EventField::CategoryId => &[EventField::CategoryId],
            EventField::Image => &[EventField::Image],
        }
    }

    pub fn validate_field(&self, draft: &EventDraft, field: EventField) -> Vec<String> {
        let mut messages = Vec::new();
        match field {
            EventField::Title => required_text(&mut messages, &draft.title, "Title", MAX_TITLE_LEN),
            EventField::Description => required_text(
                &mut messages,
                &draft.description,
                "Description",
                MAX_DESCRIPTION_LEN,
            ),
            EventField::Location => {
                required_text(&mut messages, &draft.location, "Location", MAX_LOCATION_LEN)
            }
            EventField::CategoryId => {
                if draft.category_id.trim().is_empty() {
                    messages.push("Category is required".to_string());
                }
            }
            EventField::Url => {
                if let Err(msg) = parse_url(&draft.url) {
                    messages.push(msg.to_string());
                }
            }
            EventField::StartDate => {
                if draft.start_date.is_none() {
                    messages.push("Start date is required".to_string());
                }
            }
            EventField::EndDate => match (draft.start_date, draft.end_date) {
                (_, None) => messages.push("End date is required".to_string()),
                (Some(start), Some(end)) if end < start => {
                    messages.push("End date must not be before the start date".to_string())
                }
                _ => {}
            },
            EventField::Price => {
                if let Err(msg) = parse_price(&draft.price, draft.is_free) {
                    messages.push(msg.to_string());
                }
            }
            EventField::IsFree => {}
            EventField::Image => {
                if let (Some(image), Some(limit)) = (&draft.image, self.max_image_bytes) {
                    if image.len() > limit {
                        messages.push(format!("Image must be at most {limit} bytes"));
                    }
                }
            }
        }
        messages
    }

    pub fn validate(&self, draft: &EventDraft) -> Result<ValidatedEvent, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        for field in EventField::ALL {
            errors.set(field, self.validate_field(draft, field));
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        // Every rule passed, so the parses and unwraps below cannot fail.
        let (Some(start_date), Some(end_date), Ok(url), Ok(price)) = (
            draft.start_date,
            draft.end_date,
            parse_url(&draft.url),
            parse_price(&draft.price, draft.is_free),
        ) else {
            return Err(errors);
        };

        Ok(ValidatedEvent {
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            location: draft.location.trim().to_string(),
            url,
            start_date,
            end_date,
            category_id: draft.category_id.trim().to_string(),
            price,
            is_free: draft.is_free,
            image: draft.image.clone(),
        })
    }
}

fn required_text(messages: &mut Vec<String>, value: &str, label: &str, max_len: usize) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        messages.push(format!("{label} is required"));
    } else if trimmed.chars().count() > max_len {
        messages.push(format!("{label} must be at most {max_len} characters"));
    }
}

fn parse_url(raw: &str) -> Result<Option<String>, &'static str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match Url::parse(trimmed) {
        Ok(url) if url.has_host() => Ok(Some(trimmed.to_string())),
        _ => Err("URL must be a valid URL"),
    }
}

/// A blank price is only acceptable on free events, where it means zero.
fn parse_price(raw: &str, is_free: bool) -> Result<f64, &'static str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return if is_free {
            Ok(0.0)
        } else {
            Err("Price is required")
        };
    }
    let price: f64 = trimmed.parse().map_err(|_| "Price must be a number")?;
    if !price.is_finite() {
        return Err("Price must be a number");
    }
    if price < 0.0 {
        return Err("Price must not be negative");
    }
    Ok(price)
}
