//! # Folio Common Library
//!
//! Shared code for the Folio portfolio site including:
//! - Document models (bio, track list, locale dictionaries)
//! - JSON document store backed by the data directory
//! - Track registry operations and filename sanitation
//! - Basic-Auth credential parsing and constant-time verification
//! - Language negotiation and translation lookup
//! - Contact form validation
//!
//! Nothing in here depends on the HTTP framework; `folio-web` wraps these
//! with axum handlers and middleware.

pub mod auth;
pub mod contact;
pub mod error;
pub mod filename;
pub mod i18n;
pub mod models;
pub mod store;
pub mod tracks;

pub use error::{Error, Result};
pub use models::{BioDocument, Lang, LocaleDocument, TrackRecord, TracksDocument};
pub use store::JsonStore;
