#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role stored on every user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Employer,
    Candidate,
    Admin,
}

/// The subset of roles a user may assign to themselves at registration or
/// OAuth signup completion. Admin is deliberately unrepresentable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicRole {
    Employer,
    Candidate,
}

impl From<PublicRole> for UserRole {
    fn from(role: PublicRole) -> Self {
        match role {
            PublicRole::Employer => UserRole::Employer,
            PublicRole::Candidate => UserRole::Candidate,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    /// NULL for OAuth-only identities.
    pub hashed_password: Option<String>,
    pub role: UserRole,
    pub oauth_provider: Option<String>,
    pub oauth_provider_id: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_role_accepts_employer_and_candidate() {
        assert_eq!(
            serde_json::from_str::<PublicRole>("\"employer\"").unwrap(),
            PublicRole::Employer
        );
        assert_eq!(
            serde_json::from_str::<PublicRole>("\"candidate\"").unwrap(),
            PublicRole::Candidate
        );
    }

    #[test]
    fn test_public_role_rejects_admin() {
        assert!(serde_json::from_str::<PublicRole>("\"admin\"").is_err());
    }

    #[test]
    fn test_public_role_widens_to_user_role() {
        assert_eq!(UserRole::from(PublicRole::Employer), UserRole::Employer);
        assert_eq!(UserRole::from(PublicRole::Candidate), UserRole::Candidate);
    }
}
