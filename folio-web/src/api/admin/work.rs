//! Admin: track upload, delete, rename and reorder

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    response::{Html, Redirect},
    Form,
};
use folio_common::tracks::Registration;
use serde::Deserialize;
use tracing::warn;

use super::{redirect_with, FlashQuery, Notice};
use crate::render::{self, Flash};
use crate::upload::{save_field, UploadError, AUDIO_UPLOAD};
use crate::AppState;

const WORK_PATH: &str = "/admin/work";
const TRACK_FIELD: &str = "track";
const TITLE_FIELD: &str = "title";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FilenameForm {
    pub filename: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateForm {
    pub filename: String,
    pub title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReorderForm {
    pub filename: String,
    pub direction: String,
}

/// GET /admin/work
///
/// An unreadable `tracks.json` renders an empty list with an error rather
/// than failing the page.
pub async fn work_page(
    State(state): State<AppState>,
    Query(flash): Query<FlashQuery>,
) -> Html<String> {
    let mut flash: Flash = flash.into();
    let tracks = match state.catalog.list().await {
        Ok(document) => document.tracks,
        Err(e) => {
            warn!("Could not load track registry: {}", e);
            flash.push_error(format!("tracks.json could not be loaded ({}).", e));
            Vec::new()
        }
    };
    Html(render::admin_work(&tracks, &flash))
}

/// Why an upload did not produce a registry entry
enum UploadFailure {
    File(UploadError),
    Registry(folio_common::Error),
}

impl UploadFailure {
    fn into_notice(self) -> Notice {
        match self {
            UploadFailure::File(e) => {
                warn!("Track upload failed: {}", e);
                Notice::Error(e.to_string())
            }
            UploadFailure::Registry(e) => Notice::from_error("Track upload", &e),
        }
    }
}

/// Store the `track` part, remembering an optional `title` part
///
/// Parts may arrive in any order, so registration waits until the body has
/// been read completely.
async fn store_track(state: &AppState, mut multipart: Multipart) -> Result<String, UploadFailure> {
    let mut stored: Option<String> = None;
    let mut title: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadFailure::File(AUDIO_UPLOAD.multipart_error(e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(TITLE_FIELD) => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| UploadFailure::File(AUDIO_UPLOAD.multipart_error(e)))?;
                title = Some(text);
            }
            Some(TRACK_FIELD) if stored.is_none() => {
                let original = field.file_name().unwrap_or_default().to_string();
                if original.is_empty() {
                    return Err(UploadFailure::File(UploadError::NoFile));
                }
                let target = state
                    .catalog
                    .upload_target(&original)
                    .map_err(UploadFailure::Registry)?;
                save_field(&mut field, &AUDIO_UPLOAD, &target.path)
                    .await
                    .map_err(UploadFailure::File)?;
                stored = Some(target.filename);
            }
            _ => {}
        }
    }

    let filename = stored.ok_or(UploadFailure::File(UploadError::NoFile))?;
    let registration = state
        .catalog
        .register_upload(&filename, title.as_deref())
        .await
        .map_err(UploadFailure::Registry)?;

    Ok(match registration {
        Registration::Appended => format!("Track {} uploaded successfully", filename),
        Registration::Replaced => format!("Track {} replaced successfully", filename),
    })
}

/// POST /admin/work/upload
pub async fn upload_track(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Redirect {
    let notice = match multipart {
        Err(e) => {
            warn!("Track upload rejected: {}", e);
            Notice::Error(UploadError::NoFile.to_string())
        }
        Ok(multipart) => match store_track(&state, multipart).await {
            Ok(message) => Notice::Message(message),
            Err(failure) => failure.into_notice(),
        },
    };
    redirect_with(WORK_PATH, notice)
}

/// POST /admin/work/delete
pub async fn delete_track(State(state): State<AppState>, Form(form): Form<FilenameForm>) -> Redirect {
    let result = state
        .catalog
        .delete(&form.filename)
        .await
        .map(|removed| format!("Track \"{}\" deleted", removed.title));
    redirect_with(WORK_PATH, Notice::from_result("Track delete", result))
}

/// POST /admin/work/update
pub async fn update_track(State(state): State<AppState>, Form(form): Form<UpdateForm>) -> Redirect {
    let result = state
        .catalog
        .rename(&form.filename, &form.title)
        .await
        .map(|()| "Track title updated".to_string());
    redirect_with(WORK_PATH, Notice::from_result("Track update", result))
}

/// POST /admin/work/reorder
pub async fn reorder_track(State(state): State<AppState>, Form(form): Form<ReorderForm>) -> Redirect {
    let result = state
        .catalog
        .reorder(&form.filename, &form.direction)
        .await
        .map(|moved| {
            if moved {
                "Track order updated".to_string()
            } else {
                "Track is already at that end of the list".to_string()
            }
        });
    redirect_with(WORK_PATH, Notice::from_result("Track reorder", result))
}
