//! Repository over the JSON data files.
//!
//! Every operation loads the relevant file(s), filters or mutates the records in
//! memory and writes the whole file back. Resource-specific operations live in
//! the sibling modules; this file holds the shared state, users and site config.

use std::path::Path;

use chrono::Utc;

use super::JsonFile;
use crate::errors::AppError;
use crate::models::{
    Album, Category, CreateUserRequest, Order, Participant, Permission, Product, Ride, SiteConfig,
    UpdateSiteConfigRequest, UpdateUserRequest, User,
};

/// Repository for all data operations.
pub struct Repository {
    pub(super) orders: JsonFile<Vec<Order>>,
    pub(super) rides: JsonFile<Vec<Ride>>,
    pub(super) participants: JsonFile<Vec<Participant>>,
    pub(super) albums: JsonFile<Vec<Album>>,
    pub(super) products: JsonFile<Vec<Product>>,
    pub(super) categories: JsonFile<Vec<Category>>,
    users: JsonFile<Vec<User>>,
    site_config: JsonFile<SiteConfig>,
    bcrypt_cost: u32,
}

pub(super) fn now() -> String {
    Utc::now().to_rfc3339()
}

pub(super) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Trim a required text field, rejecting blanks.
pub(super) fn required(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Normalize an optional text field: blank strings become `None`.
pub(super) fn optional(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Repository {
    pub fn new(data_dir: &Path, bcrypt_cost: u32) -> Self {
        Self {
            orders: JsonFile::new(data_dir.join("orders.json")),
            rides: JsonFile::new(data_dir.join("rides.json")),
            participants: JsonFile::new(data_dir.join("participants.json")),
            albums: JsonFile::new(data_dir.join("albums.json")),
            products: JsonFile::new(data_dir.join("products.json")),
            categories: JsonFile::new(data_dir.join("categories.json")),
            users: JsonFile::new(data_dir.join("users.json")),
            site_config: JsonFile::new(data_dir.join("site-config.json")),
            bcrypt_cost,
        }
    }

    // ==================== SITE CONFIG ====================

    /// Read the site config fresh from disk.
    pub async fn get_site_config(&self) -> Result<SiteConfig, AppError> {
        self.site_config.load().await
    }

    pub async fn update_site_config(
        &self,
        request: &UpdateSiteConfigRequest,
    ) -> Result<SiteConfig, AppError> {
        let mut config = self.site_config.lock().await?;

        if let Some(maintenance_mode) = request.maintenance_mode {
            config.maintenance_mode = maintenance_mode;
        }
        if let Some(shop_closed) = request.shop_closed {
            config.shop_closed = shop_closed;
        }
        if let Some(password) = &request.maintenance_password {
            config.maintenance_password = password.clone();
        }

        let updated = config.clone();
        config.commit().await?;

        tracing::info!(
            "Site config updated: maintenance_mode={}, shop_closed={}",
            updated.maintenance_mode,
            updated.shop_closed
        );
        Ok(updated)
    }

    // ==================== USER OPERATIONS ====================

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let mut users = self.users.load().await?;
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let users = self.users.load().await?;
        Ok(users.into_iter().find(|u| u.username == username))
    }

    /// Check a username/password pair against the stored bcrypt hash.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let Some(user) = self.get_user_by_username(username).await? else {
            return Ok(None);
        };

        let password = password.to_string();
        let hash = user.password_hash.clone();
        let valid =
            tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;

        Ok(valid.then_some(user))
    }

    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User, AppError> {
        let username = required(&request.username, "Username")?;
        if request.password.is_empty() {
            return Err(AppError::Validation("Password is required".to_string()));
        }

        let password_hash = self.hash_password(&request.password).await?;

        let mut users = self.users.lock().await?;
        if users
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(&username))
        {
            return Err(AppError::Validation(format!(
                "Username {} is already taken",
                username
            )));
        }

        let user = User {
            id: new_id(),
            username,
            password_hash,
            permissions: dedup_permissions(&request.permissions),
            created_at: now(),
        };
        users.push(user.clone());
        users.commit().await?;

        tracing::info!("Created user {} ({})", user.username, user.id);
        Ok(user)
    }

    pub async fn update_user(&self, id: &str, request: &UpdateUserRequest) -> Result<User, AppError> {
        let password_hash = match request.password.as_deref() {
            Some("") => {
                return Err(AppError::Validation("Password must not be empty".to_string()))
            }
            Some(password) => Some(self.hash_password(password).await?),
            None => None,
        };

        let mut users = self.users.lock().await?;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
        if let Some(permissions) = &request.permissions {
            user.permissions = dedup_permissions(permissions);
        }

        let updated = user.clone();
        users.commit().await?;

        tracing::info!("Updated user {}", updated.username);
        Ok(updated)
    }

    /// Delete a user. The last remaining user cannot be deleted.
    pub async fn delete_user(&self, id: &str) -> Result<(), AppError> {
        let mut users = self.users.lock().await?;
        if !users.iter().any(|u| u.id == id) {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        if users.len() == 1 {
            return Err(AppError::Validation(
                "Cannot delete the last remaining user".to_string(),
            ));
        }

        users.retain(|u| u.id != id);
        users.commit().await?;

        tracing::info!("Deleted user {}", id);
        Ok(())
    }

    /// Create an admin with every permission when no users exist yet.
    pub async fn ensure_bootstrap_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, AppError> {
        if !self.users.load().await?.is_empty() {
            return Ok(false);
        }

        self.create_user(&CreateUserRequest {
            username: username.to_string(),
            password: password.to_string(),
            permissions: Permission::ALL.to_vec(),
        })
        .await?;
        Ok(true)
    }

    async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??)
    }
}

fn dedup_permissions(permissions: &[Permission]) -> Vec<Permission> {
    let mut unique = Vec::with_capacity(permissions.len());
    for permission in permissions {
        if !unique.contains(permission) {
            unique.push(*permission);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo(dir: &TempDir) -> Repository {
        Repository::new(dir.path(), 4)
    }

    #[tokio::test]
    async fn test_site_config_defaults_when_missing() {
        let dir = TempDir::new().unwrap();
        let config = repo(&dir).get_site_config().await.unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[tokio::test]
    async fn test_site_config_partial_update() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);

        repo.update_site_config(&UpdateSiteConfigRequest {
            maintenance_password: Some("letmein".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
        let config = repo
            .update_site_config(&UpdateSiteConfigRequest {
                shop_closed: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(config.shop_closed);
        assert!(!config.maintenance_mode);
        assert_eq!(config.maintenance_password, "letmein");
        assert_eq!(repo.get_site_config().await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_usernames_are_unique() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        let request = CreateUserRequest {
            username: "Bart".to_string(),
            password: "secret".to_string(),
            permissions: vec![Permission::Rides, Permission::Rides],
        };

        let user = repo.create_user(&request).await.unwrap();
        assert_eq!(user.permissions, vec![Permission::Rides]);

        let duplicate = CreateUserRequest {
            username: "bart".to_string(),
            ..request
        };
        assert!(matches!(
            repo.create_user(&duplicate).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        repo.create_user(&CreateUserRequest {
            username: "admin".to_string(),
            password: "correct horse".to_string(),
            permissions: vec![],
        })
        .await
        .unwrap();

        assert!(repo
            .verify_credentials("admin", "correct horse")
            .await
            .unwrap()
            .is_some());
        assert!(repo
            .verify_credentials("admin", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .verify_credentials("nobody", "correct horse")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_admin_only_when_empty() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);

        assert!(repo.ensure_bootstrap_admin("root", "pw").await.unwrap());
        assert!(!repo.ensure_bootstrap_admin("other", "pw").await.unwrap());

        let users = repo.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].permissions.len(), Permission::ALL.len());
    }

    #[tokio::test]
    async fn test_last_user_cannot_be_deleted() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        repo.ensure_bootstrap_admin("root", "pw").await.unwrap();
        let root = repo.get_user_by_username("root").await.unwrap().unwrap();

        assert!(matches!(
            repo.delete_user(&root.id).await,
            Err(AppError::Validation(_))
        ));
    }
}
