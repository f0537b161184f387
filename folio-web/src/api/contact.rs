//! Contact form endpoint

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use folio_common::contact::ContactRequest;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::mail::{relay_in_background, MailMessage};
use crate::AppState;

pub const CONTACT_SUCCESS_MESSAGE: &str = "Thank you! Your message has been sent.";

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/contact
///
/// Validates the submission and answers immediately. Delivery happens on a
/// background task; when no mail relay is configured the message is only
/// logged and the visitor still sees success.
pub async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> ApiResult<Json<ContactResponse>> {
    let Json(request) = payload.map_err(|e| {
        debug!("Rejected contact body: {}", e);
        ApiError::BadRequest("Invalid request body".to_string())
    })?;

    let submission = request.validate().map_err(ApiError::BadRequest)?;

    match state.mailer.envelope() {
        Some((from, to)) => {
            let message = MailMessage {
                from: from.to_string(),
                to: to.to_string(),
                reply_to: submission.email.clone(),
                subject: submission.subject(),
                text: submission.to_plain_text(),
            };
            relay_in_background(state.mailer.clone(), message);
        }
        None => info!(
            "Contact message from {} accepted; mail relay not configured",
            submission.email
        ),
    }

    Ok(Json(ContactResponse {
        success: true,
        message: CONTACT_SUCCESS_MESSAGE.to_string(),
    }))
}
