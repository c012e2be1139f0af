use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::auth_user;

/// Registration input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub college: String,
}

/// Login input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Session token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// AuthUser id
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// Subset of the account returned to the browser after register/login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub team_name: Option<String>,
    pub college: String,
}

impl From<&auth_user::Model> for PublicUser {
    fn from(u: &auth_user::Model) -> Self {
        Self { id: u.id, name: u.name.clone(), email: u.email.clone(), team_name: u.team_name.clone(), college: u.college.clone() }
    }
}

/// Login result (session)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: auth_user::Model,
    pub token: String,
}

/// Outcome of the administrator bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminBootstrap {
    Created,
    Restored,
}
