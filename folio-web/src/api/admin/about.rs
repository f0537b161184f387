//! Admin: bio text and profile photo

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    response::{Html, Redirect},
    Form,
};
use folio_common::BioDocument;
use serde::Deserialize;
use tracing::{info, warn};

use super::{redirect_with, FlashQuery, Notice};
use crate::error::ApiResult;
use crate::render;
use crate::upload::{save_field, UploadError, IMAGE_UPLOAD};
use crate::AppState;

const ABOUT_PATH: &str = "/admin/about";
const PHOTO_FIELD: &str = "photo";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BioForm {
    pub en: String,
    pub fr: String,
}

/// GET /admin/about
pub async fn about_page(
    State(state): State<AppState>,
    Query(flash): Query<FlashQuery>,
) -> ApiResult<Html<String>> {
    let bio = state.store.load_bio().await?;
    let has_photo = tokio::fs::try_exists(state.store.profile_image_path())
        .await
        .unwrap_or(false);
    Ok(Html(render::admin_about(&bio, has_photo, &flash.into())))
}

/// POST /admin/about/bio
///
/// Both languages are replaced together, exactly as submitted.
pub async fn save_bio(State(state): State<AppState>, Form(form): Form<BioForm>) -> Redirect {
    let bio = BioDocument {
        en: form.en,
        fr: form.fr,
    };
    let result = state.store.save_bio(&bio).await.map(|()| {
        info!("Bio updated");
        "Bio updated successfully".to_string()
    });
    redirect_with(ABOUT_PATH, Notice::from_result("Bio update", result))
}

async fn store_photo(state: &AppState, mut multipart: Multipart) -> Result<u64, UploadError> {
    let dest = state.store.profile_image_path();
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| IMAGE_UPLOAD.multipart_error(e))?
    {
        if field.name() == Some(PHOTO_FIELD) {
            return save_field(&mut field, &IMAGE_UPLOAD, &dest).await;
        }
    }
    Err(UploadError::NoFile)
}

/// POST /admin/about/photo
///
/// The image always lands at `images/profile.webp`, replacing the previous one.
pub async fn upload_photo(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Redirect {
    let notice = match multipart {
        Err(e) => {
            warn!("Photo upload rejected: {}", e);
            Notice::Error(UploadError::NoFile.to_string())
        }
        Ok(multipart) => match store_photo(&state, multipart).await {
            Ok(bytes) => {
                info!("Profile photo replaced ({} bytes)", bytes);
                Notice::Message("Profile photo updated successfully".to_string())
            }
            Err(e) => {
                warn!("Photo upload failed: {}", e);
                Notice::Error(e.to_string())
            }
        },
    };
    redirect_with(ABOUT_PATH, notice)
}
