//! Contact form validation
//!
//! Validation stops at the first failing field and reports a single
//! human-readable message. Unknown service names are dropped silently.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MAX_EMAIL_CHARS: usize = 254;
pub const MAX_BAND_NAME_CHARS: usize = 200;
pub const MAX_SONG_COUNT_CHARS: usize = 50;
pub const MAX_LINKS_CHARS: usize = 2000;
pub const MAX_MESSAGE_CHARS: usize = 5000;

/// Services a visitor can tick on the form
pub const ALLOWED_SERVICES: [&str; 5] = ["mixing", "mastering", "production", "recording", "editing"];

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

/// Raw JSON body of `POST /api/contact`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactRequest {
    pub email: Option<String>,
    pub band_name: Option<String>,
    /// Free text or a number; browsers send either
    pub number_of_songs: Option<Value>,
    pub links: Option<String>,
    /// A list of names, or a single name; non-string entries are ignored
    pub services: Option<Value>,
    pub message: Option<String>,
}

/// A submission that passed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub email: String,
    pub band_name: Option<String>,
    pub number_of_songs: Option<String>,
    pub links: Option<String>,
    pub services: Vec<String>,
    pub message: String,
}

fn optional_text(value: Option<String>, max: usize, field: &str) -> Result<Option<String>, String> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if value.chars().count() > max {
        return Err(format!("{} must be at most {} characters", field, max));
    }
    Ok(Some(value.to_string()))
}

fn song_count_text(value: Option<Value>) -> Result<Option<String>, String> {
    let text = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => return Err("Invalid number of songs".to_string()),
    };
    optional_text(Some(text), MAX_SONG_COUNT_CHARS, "Number of songs")
}

/// Allow-listed, lowercased, de-duplicated service names
fn service_names(value: Option<Value>) -> Vec<String> {
    let raw = match value {
        Some(Value::String(s)) => vec![s],
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    let mut services: Vec<String> = Vec::new();
    for service in raw {
        let service = service.trim().to_ascii_lowercase();
        if ALLOWED_SERVICES.contains(&service.as_str()) && !services.contains(&service) {
            services.push(service);
        }
    }
    services
}

impl ContactRequest {
    /// Validate the submission, returning the first failure message
    pub fn validate(self) -> Result<ContactSubmission, String> {
        let email = self.email.as_deref().map(str::trim).unwrap_or_default();
        if email.is_empty() {
            return Err("Email is required".to_string());
        }
        if email.chars().count() > MAX_EMAIL_CHARS {
            return Err(format!("Email must be at most {} characters", MAX_EMAIL_CHARS));
        }
        if !EMAIL_RE.is_match(email) {
            return Err("Please provide a valid email address".to_string());
        }
        let email = email.to_string();

        let band_name = optional_text(self.band_name, MAX_BAND_NAME_CHARS, "Band name")?;
        let number_of_songs = song_count_text(self.number_of_songs)?;
        let links = optional_text(self.links, MAX_LINKS_CHARS, "Links")?;

        let services = service_names(self.services);

        let message = self.message.as_deref().map(str::trim).unwrap_or_default();
        if message.is_empty() {
            return Err("Message is required".to_string());
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(format!(
                "Message must be at most {} characters",
                MAX_MESSAGE_CHARS
            ));
        }

        Ok(ContactSubmission {
            email,
            band_name,
            number_of_songs,
            links,
            services,
            message: message.to_string(),
        })
    }
}

impl ContactSubmission {
    /// Plain-text body of the relayed email
    pub fn to_plain_text(&self) -> String {
        let none = "-";
        let services = if self.services.is_empty() {
            none.to_string()
        } else {
            self.services.join(", ")
        };
        format!(
            "New contact form submission\n\n\
             Email: {}\n\
             Band name: {}\n\
             Number of songs: {}\n\
             Links: {}\n\
             Services: {}\n\n\
             Message:\n{}\n",
            self.email,
            self.band_name.as_deref().unwrap_or(none),
            self.number_of_songs.as_deref().unwrap_or(none),
            self.links.as_deref().unwrap_or(none),
            services,
            self.message,
        )
    }

    pub fn subject(&self) -> String {
        match &self.band_name {
            Some(band) => format!("Contact form: {} ({})", band, self.email),
            None => format!("Contact form: {}", self.email),
        }
    }
}
