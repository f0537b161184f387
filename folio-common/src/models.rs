//! Document models persisted under the data directory

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Supported site languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    En,
    Fr,
}

impl Lang {
    /// All supported languages, default first
    pub const ALL: [Lang; 2] = [Lang::En, Lang::Fr];

    /// ISO 639-1 code used in paths and file names
    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Fr => "fr",
        }
    }

    /// The language the switcher links to
    pub fn other(self) -> Lang {
        match self {
            Lang::En => Lang::Fr,
            Lang::Fr => Lang::En,
        }
    }
}

impl Default for Lang {
    fn default() -> Self {
        Lang::En
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Lang {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Lang::En),
            "fr" => Ok(Lang::Fr),
            other => Err(Error::InvalidInput(format!("Unsupported language: {}", other))),
        }
    }
}

/// Bio text per language (`data/bio.json`)
///
/// Rewritten wholesale on every save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BioDocument {
    pub en: String,
    pub fr: String,
}

impl BioDocument {
    pub fn get(&self, lang: Lang) -> &str {
        match lang {
            Lang::En => &self.en,
            Lang::Fr => &self.fr,
        }
    }
}

/// One audio track of the portfolio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    /// Sanitized file name inside the work directory
    pub filename: String,
    pub title: String,
}

impl TrackRecord {
    pub fn new(filename: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            title: title.into(),
        }
    }

    /// Public URL the audio file is served from
    pub fn url(&self) -> String {
        format!("/work/{}", self.filename)
    }
}

/// Ordered track list (`data/tracks.json`); order is display order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracksDocument {
    pub tracks: Vec<TrackRecord>,
}

/// Raw translation tree for one language (`data/locales/<lang>.json`)
///
/// No schema: any JSON object is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleDocument(pub Value);

impl Default for LocaleDocument {
    fn default() -> Self {
        LocaleDocument(Value::Object(Default::default()))
    }
}

impl LocaleDocument {
    /// Parse operator-supplied JSON text
    ///
    /// Only checks that the text is JSON with an object at the top level.
    pub fn parse(text: &str) -> crate::Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::InvalidInput(format!("Invalid JSON: {}", e)))?;
        if !value.is_object() {
            return Err(Error::InvalidInput(
                "Invalid JSON: translations must be a JSON object".to_string(),
            ));
        }
        Ok(LocaleDocument(value))
    }

    /// Pretty-printed form shown in the admin editor
    pub fn to_pretty_string(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lang_parse() {
        assert_eq!("en".parse::<Lang>().unwrap(), Lang::En);
        assert_eq!(" FR ".parse::<Lang>().unwrap(), Lang::Fr);
        assert!("de".parse::<Lang>().is_err());
    }

    #[test]
    fn test_tracks_document_wire_format() {
        let doc: TracksDocument =
            serde_json::from_str(r#"{"tracks":[{"filename":"a.mp3","title":"A"}]}"#).unwrap();
        assert_eq!(doc.tracks[0], TrackRecord::new("a.mp3", "A"));
        assert_eq!(doc.tracks[0].url(), "/work/a.mp3");

        let empty: TracksDocument = serde_json::from_str("{}").unwrap();
        assert!(empty.tracks.is_empty());
    }

    #[test]
    fn test_bio_missing_language_defaults_to_empty() {
        let bio: BioDocument = serde_json::from_str(r#"{"en":"Hello"}"#).unwrap();
        assert_eq!(bio.get(Lang::En), "Hello");
        assert_eq!(bio.get(Lang::Fr), "");
    }

    #[test]
    fn test_locale_parse_rejects_non_objects() {
        assert!(LocaleDocument::parse(r#"{"a":{"b":"c"}}"#).is_ok());
        assert!(LocaleDocument::parse("[1,2]").is_err());
        assert!(LocaleDocument::parse("{not json").is_err());
    }
}
