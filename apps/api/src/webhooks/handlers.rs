use axum::{extract::State, http::HeaderMap, Json};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::profile::queries::{delete_user, upsert_identity, IdentityFields};
use crate::state::AppState;
use crate::webhooks::identity::{IdentityEvent, IdentityUser, WebhookAck, WebhookEnvelope};

pub const SECRET_HEADER: &str = "x-webhook-secret";

fn check_secret(expected: Option<&str>, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
    if provided == Some(expected) {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

async fn sync_user(state: &AppState, user: &IdentityUser) -> Result<(), AppError> {
    let email = user
        .primary_email()
        .ok_or_else(|| AppError::Validation(format!("user {} has no email address", user.id)))?;
    let name = user.name();
    upsert_identity(
        &state.db,
        IdentityFields {
            id: &user.id,
            name: &name,
            email,
            image_url: user.image_url.as_deref(),
        },
    )
    .await?;
    Ok(())
}

/// POST /api/v1/webhooks/identity
pub async fn handle_identity_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(envelope): Json<WebhookEnvelope>,
) -> Result<Json<WebhookAck>, AppError> {
    check_secret(state.config.webhook_secret.as_deref(), &headers)?;

    let event = IdentityEvent::try_from(envelope)
        .map_err(|e| AppError::Validation(format!("malformed identity event: {e}")))?;

    let status = match event {
        IdentityEvent::UserCreated(user) => {
            sync_user(&state, &user).await?;
            "user_created"
        }
        IdentityEvent::UserUpdated(user) => {
            sync_user(&state, &user).await?;
            "user_updated"
        }
        IdentityEvent::UserDeleted(user) => {
            delete_user(&state.db, &user.id).await?;
            "user_deleted"
        }
        IdentityEvent::Ignored(kind) => {
            warn!("Ignoring identity event of type '{kind}'");
            "ignored"
        }
    };

    info!("Identity webhook processed: {status}");
    Ok(Json(WebhookAck { status }))
}
