//! Admin user model.

use serde::{Deserialize, Serialize};

/// Back-office area an admin user may manage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Rides,
    Albums,
    Orders,
    Products,
    Users,
    Settings,
}

impl Permission {
    pub const ALL: [Permission; 6] = [
        Permission::Rides,
        Permission::Albums,
        Permission::Orders,
        Permission::Products,
        Permission::Users,
        Permission::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Rides => "rides",
            Permission::Albums => "albums",
            Permission::Orders => "orders",
            Permission::Products => "products",
            Permission::Users => "users",
            Permission::Settings => "settings",
        }
    }
}

/// Stored user record, including the bcrypt hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    pub created_at: String,
}

impl User {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// User as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub permissions: Vec<Permission>,
    pub created_at: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            permissions: user.permissions,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub permissions: Option<Vec<Permission>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}
