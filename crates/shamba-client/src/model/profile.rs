use crate::model::Session;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marketplace role of a user. Written upper-case, read case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Role {
    Supplier,
    Buyer,
    Transporter,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Supplier => "SUPPLIER",
            Role::Buyer => "BUYER",
            Role::Transporter => "TRANSPORTER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUPPLIER" => Ok(Role::Supplier),
            "BUYER" => Ok(Role::Buyer),
            "TRANSPORTER" => Ok(Role::Transporter),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(role: String) -> Result<Self, Self::Error> {
        role.parse()
    }
}

/// Application-level user record returned by `GET /users/me`.
///
/// A profile with `fallback == true` was synthesized from session attributes alone
/// because the backend could not be reached in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_user_id: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub profile: ProfileDetails,
    #[serde(default)]
    pub transaction_volume: f64,
    #[serde(default)]
    pub verified_reserve_value: f64,
    #[serde(rename = "_fallback", default, skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileDetails {
    #[serde(default)]
    pub name: String,
}

impl UserProfile {
    /// Builds the degraded profile used when the backend is unreachable.
    ///
    /// The identity id doubles as the profile id. Role comes from the session metadata,
    /// defaulting to [`Role::Buyer`]; the display name is the metadata full name or, failing
    /// that, the local part of the email. Volume and reserve are zero.
    pub fn fallback_for(session: &Session) -> Self {
        let user = &session.user;
        let role = user
            .user_metadata
            .role
            .as_deref()
            .and_then(|role| role.parse().ok())
            .unwrap_or(Role::Buyer);
        let name = user
            .user_metadata
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| user.email.split('@').next().unwrap_or_default())
            .to_string();

        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            supabase_user_id: Some(user.id.clone()),
            role,
            profile: ProfileDetails { name },
            transaction_volume: 0.0,
            verified_reserve_value: 0.0,
            fallback: true,
        }
    }

    /// The identity-provider id this profile belongs to.
    pub fn identity(&self) -> &str {
        self.supabase_user_id.as_deref().unwrap_or(&self.id)
    }

    pub fn display_name(&self) -> &str {
        &self.profile.name
    }
}

/// Payload for `POST /auth/signup`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub role: Role,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_user_id: Option<String>,
}

/// A transporter available for booking, from `GET /transporters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transporter {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub profile: ProfileDetails,
}
