use axum::{Json, Router, routing::get};
use server::AuthenticatedProfile;

/// The application routes served by the binary.
pub(crate) fn routes() -> Router {
    Router::new().route("/", get(index)).route("/whoami", get(whoami))
}

async fn index() -> &'static str {
    "Trellis is running"
}

/// Describes the profile the request is authenticated as.
async fn whoami(AuthenticatedProfile(profile): AuthenticatedProfile) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "id": profile.id(),
        "type": profile.profile_type(),
        "client": profile.client_name(),
        "attributes": profile.attributes(),
    }))
}
