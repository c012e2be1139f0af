use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::profile;
use models::types::StringList;
use models::validation::{normalize_email, validate_email};

use crate::errors::ServiceError;
use crate::identity::Identity;
use crate::repository::Repositories;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub college: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Dashboard summary of the caller's registrations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStatus {
    pub registered_events: Vec<String>,
    pub paid_events: Vec<String>,
    pub onboarding_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<Uuid>,
}

fn trimmed(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub struct ProfileService {
    repos: Repositories,
}

impl ProfileService {
    pub fn new(repos: Repositories) -> Self { Self { repos } }

    /// Create the caller's profile, or update it when it already exists.
    #[instrument(skip(self, input), fields(clerk_id = %identity.clerk_id))]
    pub async fn onboard(&self, identity: &Identity, input: OnboardInput) -> Result<profile::Model, ServiceError> {
        let username = input.username.trim().to_string();
        let email = normalize_email(&input.email);
        if username.is_empty() || email.is_empty() {
            return Err(ServiceError::validation("MISSING_FIELDS", "username and email are required"));
        }
        validate_email(&email).map_err(|_| ServiceError::validation("INVALID_EMAIL", "Email address is not valid"))?;

        let existing = self.repos.profiles.find_by_clerk_id(&identity.clerk_id).await?;
        if let Some(other) = self.repos.profiles.find_by_email(&email).await? {
            if existing.as_ref().map(|p| p.id) != Some(other.id) {
                return Err(ServiceError::conflict("EMAIL_IN_USE", "Email already used by another profile"));
            }
        }

        let now = Utc::now().into();
        let saved = match existing {
            Some(mut p) => {
                p.username = username;
                p.email = email;
                p.college = trimmed(input.college).or(p.college);
                p.phone = trimmed(input.phone).or(p.phone);
                p.avatar_url = trimmed(input.avatar_url).or(p.avatar_url);
                p.onboarding_completed = true;
                p.updated_at = now;
                self.repos.profiles.update(p).await?
            }
            None => {
                let p = profile::Model {
                    id: Uuid::new_v4(),
                    clerk_id: identity.clerk_id.clone(),
                    email,
                    username,
                    college: trimmed(input.college),
                    phone: trimmed(input.phone),
                    avatar_url: trimmed(input.avatar_url),
                    registered_events: StringList::default(),
                    paid_events: StringList::default(),
                    onboarding_completed: true,
                    team_id: None,
                    created_at: now,
                    updated_at: now,
                };
                self.repos.profiles.insert(p).await?
            }
        };
        info!(profile_id = %saved.id, "profile_onboarded");
        Ok(saved)
    }

    pub async fn status(&self, identity: &Identity) -> Result<ProfileStatus, ServiceError> {
        let status = match self.repos.profiles.find_by_clerk_id(&identity.clerk_id).await? {
            None => ProfileStatus {
                registered_events: Vec::new(),
                paid_events: Vec::new(),
                onboarding_completed: false,
                username: None,
                team_id: None,
            },
            Some(p) => ProfileStatus {
                registered_events: p.registered_events.0,
                paid_events: p.paid_events.0,
                onboarding_completed: p.onboarding_completed,
                username: Some(p.username),
                team_id: p.team_id,
            },
        };
        Ok(status)
    }
}
