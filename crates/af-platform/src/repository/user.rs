//! User Directory
//!
//! Identity-provider port: lookup, password verification, role queries,
//! and user management. The authentication orchestrator only consumes the
//! lookup/verify/roles surface; the user API uses the management half.

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::{Collection, Database, IndexModel};
use std::sync::Arc;
use tracing::info;

use crate::domain::{NewUser, UserAccount};
use crate::error::{AuthError, Result};
use crate::service::PasswordService;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<UserAccount>>;

    async fn find_by_name(&self, user_name: &str) -> Result<Option<UserAccount>>;

    async fn verify_password(&self, user: &UserAccount, password: &str) -> Result<bool>;

    async fn roles(&self, user: &UserAccount) -> Result<Vec<String>>;

    /// Create a user with a hashed password. Duplicate email or user name
    /// is rejected.
    async fn create_user(&self, new_user: NewUser) -> Result<UserAccount>;

    /// Add roles to an existing user; unknown user name is an error.
    async fn assign_roles(&self, user_name: &str, roles: &[String]) -> Result<UserAccount>;
}

/// MongoDB-backed directory over the `users` collection.
pub struct MongoUserDirectory {
    collection: Collection<UserAccount>,
    passwords: Arc<PasswordService>,
}

impl MongoUserDirectory {
    pub fn new(db: &Database, passwords: Arc<PasswordService>) -> Self {
        Self {
            collection: db.collection("users"),
            passwords,
        }
    }

    pub async fn ensure_indexes(&self) -> Result<()> {
        for field in ["email", "userName"] {
            let index = IndexModel::builder()
                .keys(doc! { field: 1 })
                .options(
                    mongodb::options::IndexOptions::builder()
                        .unique(true)
                        .build(),
                )
                .build();
            self.collection.create_index(index).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for MongoUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserAccount>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_name(&self, user_name: &str) -> Result<Option<UserAccount>> {
        Ok(self
            .collection
            .find_one(doc! { "userName": user_name })
            .await?)
    }

    async fn verify_password(&self, user: &UserAccount, password: &str) -> Result<bool> {
        Ok(self.passwords.verify_password(password, &user.password_hash))
    }

    async fn roles(&self, user: &UserAccount) -> Result<Vec<String>> {
        Ok(user.roles.clone())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserAccount> {
        if self.find_by_email(&new_user.email).await?.is_some() {
            return Err(AuthError::duplicate_user("email", &new_user.email));
        }
        if self.find_by_name(&new_user.user_name).await?.is_some() {
            return Err(AuthError::duplicate_user("userName", &new_user.user_name));
        }

        let password_hash = self.passwords.hash_password(&new_user.password)?;
        let mut user = UserAccount::new(new_user.user_name, new_user.email, password_hash);
        user.city = new_user.city;
        user.birth_date = new_user.birth_date;

        self.collection.insert_one(&user).await?;
        info!(user_id = %user.id, user_name = %user.user_name, "User created");
        Ok(user)
    }

    async fn assign_roles(&self, user_name: &str, roles: &[String]) -> Result<UserAccount> {
        let mut user = self
            .find_by_name(user_name)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        for role in roles {
            user.assign_role(role.clone());
        }

        self.collection
            .replace_one(doc! { "_id": &user.id }, &user)
            .await?;
        info!(user_id = %user.id, roles = ?user.roles, "Roles assigned");
        Ok(user)
    }
}
