use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// A signed-in user as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub uid: String,
    pub email: String,
}

/// Request-scoped view of who is acting.
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub request_id: String,
    pub user: Option<AuthenticatedUser>,
    pub session_token: Option<String>,
}

impl ViewerContext {
    pub fn anonymous(request_id: String) -> Self {
        Self {
            request_id,
            user: None,
            session_token: None,
        }
    }

    pub fn authenticated(user: AuthenticatedUser, session_token: String, request_id: String) -> Self {
        Self {
            request_id,
            user: Some(user),
            session_token: Some(session_token),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.uid.as_str())
    }

    pub fn require_user(&self) -> AppResult<&AuthenticatedUser> {
        self.user
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("Sign in required".to_string()))
    }
}
