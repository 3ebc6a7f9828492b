// Identity provider - email/password sessions for the site's admin account

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::{watch, RwLock};
use tracing::{info, instrument, warn};

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};
use crate::infrastructure::viewer::AuthenticatedUser;

#[derive(Debug, Clone)]
struct Session {
    user: AuthenticatedUser,
    expires_at: DateTime<Utc>,
}

/// Returned to the client on successful sign-in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedInSession {
    pub token: String,
    pub user: AuthenticatedUser,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug)]
struct AdminAccount {
    user: AuthenticatedUser,
    /// `None` when no password is configured; every sign-in is refused.
    password_hash: Option<String>,
}

/// Issues and resolves sessions, and publishes current-user changes.
pub struct IdentityProvider {
    admin: AdminAccount,
    sessions: RwLock<HashMap<String, Session>>,
    current_user: watch::Sender<Option<AuthenticatedUser>>,
    session_timeout: ChronoDuration,
}

impl IdentityProvider {
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        let email = config.admin_email.trim().to_lowercase();
        let password_hash = if config.admin_password.is_empty() {
            warn!("ADMIN_PASSWORD is not set; sign-in is disabled");
            None
        } else {
            Some(hash_password(&config.admin_password)?)
        };

        let (current_user, _) = watch::channel(None);
        Ok(Self {
            admin: AdminAccount {
                user: AuthenticatedUser {
                    uid: uid_for(&email),
                    email,
                },
                password_hash,
            },
            sessions: RwLock::new(HashMap::new()),
            current_user,
            session_timeout: ChronoDuration::seconds(config.session_timeout_secs as i64),
        })
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<SignedInSession> {
        let email_matches = email.trim().eq_ignore_ascii_case(&self.admin.user.email);
        let password_ok = match &self.admin.password_hash {
            Some(hash) => verify_password(password, hash)?,
            None => false,
        };
        if !email_matches || !password_ok {
            warn!("Rejected sign-in for {}", email);
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let token = uuid::Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + self.session_timeout;
        let user = self.admin.user.clone();
        {
            let mut sessions = self.sessions.write().await;
            sessions.insert(
                token.clone(),
                Session {
                    user: user.clone(),
                    expires_at,
                },
            );
        }

        self.current_user.send_replace(Some(user.clone()));
        info!("User {} signed in", user.email);
        Ok(SignedInSession {
            token,
            user,
            expires_at,
        })
    }

    /// Resolve a bearer token to its user. Expired sessions are dropped.
    pub async fn resolve(&self, token: &str) -> AppResult<AuthenticatedUser> {
        let session = {
            let sessions = self.sessions.read().await;
            sessions
                .get(token)
                .cloned()
                .ok_or_else(|| AppError::Unauthorized("Session not found".to_string()))?
        };

        if Utc::now() > session.expires_at {
            self.sessions.write().await.remove(token);
            return Err(AppError::Unauthorized("Session expired".to_string()));
        }
        Ok(session.user)
    }

    #[instrument(skip(self, token))]
    pub async fn sign_out(&self, token: &str) -> AppResult<()> {
        let removed = self.sessions.write().await.remove(token);
        if let Some(session) = removed {
            info!("User {} signed out", session.user.email);
            // Other tokens stay valid until they expire or sign out themselves.
            self.current_user.send_replace(None);
        }
        Ok(())
    }

    /// Subscribe to current-user changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthenticatedUser>> {
        self.current_user.subscribe()
    }

    pub fn current_user(&self) -> Option<AuthenticatedUser> {
        self.current_user.borrow().clone()
    }

    pub async fn cleanup_expired_sessions(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        before - sessions.len()
    }
}

/// Stable uid for an email address.
fn uid_for(email: &str) -> String {
    URL_SAFE_NO_PAD.encode(email.as_bytes())
}

fn hash_password(password: &str) -> AppResult<String> {
    let mut salt_bytes = [0u8; 16];
    rand::rng().fill(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("Failed to encode salt: {}", e)))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
