//! User Account Entity

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A registered end user.
///
/// Owned by the user directory; the token factory only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// UUID as string
    #[serde(rename = "_id")]
    pub id: String,

    /// Login name (unique)
    pub user_name: String,

    /// Email address (unique)
    pub email: String,

    /// Argon2 PHC-format password hash
    pub password_hash: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,

    /// Assigned role names, embedded in the access token as role claims
    #[serde(default)]
    pub roles: Vec<String>,

    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn new(
        user_name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_name: user_name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            city: None,
            birth_date: None,
            roles: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn assign_role(&mut self, role: impl Into<String>) {
        let role = role.into();
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Input for creating a user; the directory hashes the password.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub city: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let user = UserAccount::new("jsmith", "jsmith@example.com", "hash");
        assert_eq!(user.user_name, "jsmith");
        assert_eq!(user.email, "jsmith@example.com");
        assert!(user.roles.is_empty());
        assert!(!user.id.is_empty());
    }

    #[test]
    fn test_role_assignment_is_idempotent() {
        let mut user = UserAccount::new("jsmith", "jsmith@example.com", "hash");
        user.assign_role("admin");
        user.assign_role("admin");
        assert_eq!(user.roles.len(), 1);
        assert!(user.has_role("admin"));
        assert!(!user.has_role("manager"));
    }

    #[test]
    fn test_builder_attributes() {
        let user = UserAccount::new("jsmith", "jsmith@example.com", "hash")
            .with_city("Ankara")
            .with_birth_date(NaiveDate::from_ymd_opt(1990, 5, 1).unwrap())
            .with_roles(["admin", "manager"]);
        assert_eq!(user.city.as_deref(), Some("Ankara"));
        assert!(user.birth_date.is_some());
        assert_eq!(user.roles, vec!["admin", "manager"]);
    }
}
