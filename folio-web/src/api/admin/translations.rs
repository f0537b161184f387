//! Admin: raw translation dictionaries

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    Form,
};
use folio_common::Lang;
use serde::Deserialize;
use tracing::{info, warn};

use super::{redirect_with, FlashQuery, Notice};
use crate::render::{self, Flash};
use crate::AppState;

const TRANSLATIONS_PATH: &str = "/admin/translations";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TranslationForm {
    pub lang: String,
    pub content: String,
}

/// Editor text for one dictionary
///
/// A file that does not parse is shown as stored so it can be repaired,
/// together with an error for the page.
async fn editor_text(state: &AppState, lang: Lang) -> (String, Option<String>) {
    match state.store.load_locale(lang).await {
        Ok(locale) => (locale.to_pretty_string(), None),
        Err(e) => {
            let path = state.store.locale_path(lang);
            warn!("Could not load {}: {}", path.display(), e);
            let raw = tokio::fs::read_to_string(&path).await.unwrap_or_default();
            let problem = format!("{}.json could not be loaded ({}). Fix it below and save.", lang, e);
            (raw, Some(problem))
        }
    }
}

/// GET /admin/translations
pub async fn translations_page(
    State(state): State<AppState>,
    Query(flash): Query<FlashQuery>,
) -> Html<String> {
    let mut flash: Flash = flash.into();
    let (en, en_problem) = editor_text(&state, Lang::En).await;
    let (fr, fr_problem) = editor_text(&state, Lang::Fr).await;
    for problem in [en_problem, fr_problem].into_iter().flatten() {
        flash.push_error(problem);
    }
    Html(render::admin_translations(&en, &fr, &flash))
}

/// POST /admin/translations
///
/// The submitted text must parse as a JSON object; otherwise the file on
/// disk is left untouched.
pub async fn save_translations(
    State(state): State<AppState>,
    Form(form): Form<TranslationForm>,
) -> Redirect {
    let lang: Lang = match form.lang.parse() {
        Ok(lang) => lang,
        Err(e) => return redirect_with(TRANSLATIONS_PATH, Notice::from_error("Translation update", &e)),
    };

    let notice = match state.store.save_locale_text(lang, &form.content).await {
        Ok(_) => {
            info!("{} translations updated", lang);
            if let Err(e) = state.content.reload().await {
                warn!("Content reload after translation update failed: {}", e);
            }
            Notice::Message(format!("Translations saved ({})", lang))
        }
        Err(e) => Notice::from_error("Translation update", &e),
    };
    redirect_with(TRANSLATIONS_PATH, notice)
}
