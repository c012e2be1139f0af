use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::event::{self, generate_slug, parse_team_size};
use models::types::StringList;

use crate::errors::ServiceError;
use crate::identity::Identity;
use crate::repository::Repositories;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub team_size: String,
    #[serde(default)]
    pub prize: String,
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub fees: i64,
    #[serde(default)]
    pub min_team_size: Option<i32>,
    #[serde(default)]
    pub max_team_size: Option<i32>,
    #[serde(default)]
    pub max_registrations: Option<i32>,
    #[serde(default)]
    pub registration_deadline: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub is_live: Option<bool>,
}

/// Partial update; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub team_size: Option<String>,
    pub prize: Option<String>,
    pub rules: Option<Vec<String>>,
    pub image: Option<String>,
    pub fees: Option<i64>,
    pub min_team_size: Option<i32>,
    pub max_team_size: Option<i32>,
    pub max_registrations: Option<i32>,
    pub registration_deadline: Option<DateTime<FixedOffset>>,
    pub is_live: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRegistration {
    pub message: String,
    pub event_id: String,
    pub event_title: String,
    pub fees: i64,
    #[serde(skip)]
    pub already_registered: bool,
}

fn check_event(e: &event::Model) -> Result<(), ServiceError> {
    let required = [
        ("eventId", &e.event_id),
        ("title", &e.title),
        ("category", &e.category),
        ("description", &e.description),
        ("teamSize", &e.team_size),
        ("prize", &e.prize),
    ];
    if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
        return Err(ServiceError::validation("MISSING_FIELDS", format!("{field} is required")));
    }
    if e.slug.is_empty() {
        return Err(ServiceError::validation("INVALID_SLUG", "slug must contain letters or digits"));
    }
    if e.fees < 0 {
        return Err(ServiceError::validation("INVALID_FEES", "fees must be >= 0"));
    }
    if e.min_team_size < 1 || e.min_team_size > e.max_team_size {
        return Err(ServiceError::validation("INVALID_TEAM_SIZE", "minTeamSize must be >= 1 and <= maxTeamSize"));
    }
    if matches!(e.max_registrations, Some(max) if max < 1) {
        return Err(ServiceError::validation("INVALID_CAPACITY", "maxRegistrations must be >= 1"));
    }
    Ok(())
}

pub struct EventService {
    repos: Repositories,
}

impl EventService {
    pub fn new(repos: Repositories) -> Self { Self { repos } }

    pub async fn list_live(&self) -> Result<Vec<event::Model>, ServiceError> {
        self.repos.events.list_live().await
    }

    pub async fn list_all(&self) -> Result<Vec<event::Model>, ServiceError> {
        self.repos.events.list_all().await
    }

    pub async fn get(&self, event_id: &str) -> Result<event::Model, ServiceError> {
        self.repos
            .events
            .find_by_event_id(event_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Event"))
    }

    async fn ensure_unique(&self, e: &event::Model) -> Result<(), ServiceError> {
        if matches!(self.repos.events.find_by_event_id(&e.event_id).await?, Some(o) if o.id != e.id) {
            return Err(ServiceError::conflict("EVENT_ID_TAKEN", format!("eventId {} already exists", e.event_id)));
        }
        if matches!(self.repos.events.find_by_slug(&e.slug).await?, Some(o) if o.id != e.id) {
            return Err(ServiceError::conflict("SLUG_TAKEN", format!("slug {} already exists", e.slug)));
        }
        Ok(())
    }

    #[instrument(skip(self, input), fields(event_id = %input.event_id))]
    pub async fn create(&self, created_by: Option<Uuid>, input: CreateEventInput) -> Result<event::Model, ServiceError> {
        let (parsed_min, parsed_max) = parse_team_size(&input.team_size);
        let slug = input
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(generate_slug)
            .unwrap_or_else(|| generate_slug(&input.title));
        let now = Utc::now().into();
        let ev = event::Model {
            id: Uuid::new_v4(),
            event_id: input.event_id.trim().to_string(),
            title: input.title.trim().to_string(),
            slug,
            category: input.category.trim().to_string(),
            description: input.description,
            team_size: input.team_size.trim().to_string(),
            prize: input.prize.trim().to_string(),
            rules: StringList(input.rules),
            image: input.image.filter(|s| !s.trim().is_empty()),
            fees: input.fees,
            min_team_size: input.min_team_size.unwrap_or(parsed_min),
            max_team_size: input.max_team_size.unwrap_or(parsed_max),
            max_registrations: input.max_registrations,
            current_registrations: 0,
            registration_deadline: input.registration_deadline,
            is_live: input.is_live.unwrap_or(true),
            created_by,
            created_at: now,
            updated_at: now,
        };
        check_event(&ev)?;
        self.ensure_unique(&ev).await?;
        let ev = self.repos.events.insert(ev).await?;
        info!(id = %ev.id, event_id = %ev.event_id, "event_created");
        Ok(ev)
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, event_id: &str, input: UpdateEventInput) -> Result<event::Model, ServiceError> {
        let mut ev = self.get(event_id).await?;
        if let Some(v) = input.title { ev.title = v.trim().to_string(); }
        if let Some(v) = input.slug { ev.slug = generate_slug(&v); }
        if let Some(v) = input.category { ev.category = v.trim().to_string(); }
        if let Some(v) = input.description { ev.description = v; }
        if let Some(v) = input.team_size {
            ev.team_size = v.trim().to_string();
            // Re-derive bounds unless given explicitly below.
            let (min, max) = parse_team_size(&ev.team_size);
            ev.min_team_size = min;
            ev.max_team_size = max;
        }
        if let Some(v) = input.prize { ev.prize = v.trim().to_string(); }
        if let Some(v) = input.rules { ev.rules = StringList(v); }
        if let Some(v) = input.image { ev.image = Some(v).filter(|s| !s.trim().is_empty()); }
        if let Some(v) = input.fees { ev.fees = v; }
        if let Some(v) = input.min_team_size { ev.min_team_size = v; }
        if let Some(v) = input.max_team_size { ev.max_team_size = v; }
        if let Some(v) = input.max_registrations { ev.max_registrations = Some(v); }
        if let Some(v) = input.registration_deadline { ev.registration_deadline = Some(v); }
        if let Some(v) = input.is_live { ev.is_live = v; }
        ev.updated_at = Utc::now().into();
        check_event(&ev)?;
        self.ensure_unique(&ev).await?;
        let ev = self.repos.events.update(ev).await?;
        info!(id = %ev.id, event_id = %ev.event_id, "event_updated");
        Ok(ev)
    }

    /// Add an event to the caller's registered list; free events count as paid immediately.
    #[instrument(skip(self), fields(clerk_id = %identity.clerk_id))]
    pub async fn register(&self, identity: &Identity, event_id: &str) -> Result<EventRegistration, ServiceError> {
        if event_id.trim().is_empty() {
            return Err(ServiceError::validation("EVENT_ID_REQUIRED", "Event ID required"));
        }
        let mut ev = match self.repos.events.find_by_event_id(event_id).await? {
            Some(e) if e.is_live => e,
            _ => return Err(ServiceError::validation("EVENT_NOT_AVAILABLE", "Event not found or not available")),
        };
        let mut profile = self
            .repos
            .profiles
            .find_by_clerk_id(&identity.clerk_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound {
                code: "PROFILE_NOT_FOUND",
                message: "Profile not found. Complete onboarding first.".into(),
            })?;

        if profile.registered_events.contains(&ev.event_id) {
            return Ok(EventRegistration {
                message: "Already registered for this event".into(),
                event_id: ev.event_id,
                event_title: ev.title,
                fees: ev.fees,
                already_registered: true,
            });
        }
        let now = Utc::now().into();
        if ev.deadline_passed(now) {
            return Err(ServiceError::validation("REGISTRATION_CLOSED", "Registration deadline has passed"));
        }
        if ev.is_full() {
            return Err(ServiceError::validation("EVENT_FULL", "Event is fully booked"));
        }

        profile.registered_events.insert(&ev.event_id);
        if ev.is_free() {
            profile.paid_events.insert(&ev.event_id);
        }
        profile.updated_at = now;
        let profile = self.repos.profiles.update(profile).await?;

        if ev.is_free() {
            ev.current_registrations += 1;
            ev.updated_at = now;
            ev = self.repos.events.update(ev).await?;
        }
        info!(profile_id = %profile.id, event_id = %ev.event_id, free = ev.is_free(), "event_registered");
        Ok(EventRegistration {
            message: "Successfully registered!".into(),
            event_id: ev.event_id,
            event_title: ev.title,
            fees: ev.fees,
            already_registered: false,
        })
    }
}
