// ViewerContext Middleware - resolves the bearer session into a request-scoped viewer
// Handlers only ever see ViewerContext, never raw headers or tokens

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::infrastructure::{identity::IdentityProvider, viewer::ViewerContext};

/// Trait for application state that can resolve sessions
pub trait HasIdentity {
    fn identity(&self) -> &Arc<IdentityProvider>;
}

/// Creates the request's ViewerContext and injects it into request extensions.
/// Unknown or expired tokens degrade to an anonymous viewer; routes that
/// need a user reject it themselves.
pub async fn viewer_context_middleware<T>(
    State(app_state): State<T>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode>
where
    T: HasIdentity + Clone + Send + Sync + 'static,
{
    let token = extract_bearer_token(request.headers())?;
    let request_id = format!("req-{}", Uuid::new_v4());

    let viewer_context = match token {
        Some(token) => match app_state.identity().resolve(&token).await {
            Ok(user) => ViewerContext::authenticated(user, token, request_id),
            Err(e) => {
                debug!("Treating request as anonymous: {}", e);
                ViewerContext::anonymous(request_id)
            }
        },
        None => ViewerContext::anonymous(request_id),
    };

    request.extensions_mut().insert(Arc::new(viewer_context));
    Ok(next.run(request).await)
}

/// Extract the bearer token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<String>, StatusCode> {
    let Some(auth_header) = headers.get("authorization") else {
        return Ok(None);
    };
    let auth_str = auth_header.to_str().map_err(|_| StatusCode::BAD_REQUEST)?;

    Ok(auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string))
}
