use serde::{Deserialize, Serialize};

/// Credential bundle issued by the identity provider.
///
/// The application only ever holds a read-only copy: the provider creates it on
/// login/signup, replaces it on token refresh and clears it on sign-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub user: SessionUser,
}

/// Identity attributes embedded in a [`Session`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Free-form attributes recorded at signup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Token pair accepted by `AuthProvider::set_session`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl Session {
    /// Creates a session with no refresh token, expiry or metadata.
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: String::new(),
            expires_at: None,
            user: SessionUser {
                id: user_id.into(),
                email: email.into(),
                user_metadata: UserMetadata::default(),
            },
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.user.user_metadata.role = Some(role.into());
        self
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.user.user_metadata.full_name = Some(full_name.into());
        self
    }

    /// The identity id this session belongs to.
    pub fn identity(&self) -> &str {
        &self.user.id
    }
}
