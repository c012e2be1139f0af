#![cfg(test)]
//! Seed helpers shared by unit tests; they write through the in-memory repositories.
use chrono::Utc;
use uuid::Uuid;

use models::auth_user::{self, LegacyPaymentStatus, Role};
use models::types::{IdList, StringList};
use models::{event, profile, team};

use crate::repository::Repositories;

pub async fn seed_auth_user(repos: &Repositories, email: &str) -> auth_user::Model {
    let now = Utc::now().into();
    let user = auth_user::Model {
        id: Uuid::new_v4(),
        name: "Pilot".into(),
        email: email.into(),
        password_hash: String::new(),
        college: "CSJMU".into(),
        events: StringList::default(),
        team_members: StringList::default(),
        payment_status: LegacyPaymentStatus::Pending,
        role: Role::User,
        team_name: Some("Sparks".into()),
        paid_events: StringList::default(),
        transaction_id: None,
        screenshot_url: None,
        declared_amount: None,
        created_at: now,
        updated_at: now,
    };
    repos.auth_users.insert(user).await.expect("seed auth user")
}

pub async fn seed_event(repos: &Repositories, event_id: &str, fees: i64, team_size: &str) -> event::Model {
    let now = Utc::now().into();
    let (min, max) = event::parse_team_size(team_size);
    let ev = event::Model {
        id: Uuid::new_v4(),
        event_id: event_id.into(),
        title: format!("Title {event_id}"),
        slug: event::generate_slug(event_id),
        category: "robotics".into(),
        description: "desc".into(),
        team_size: team_size.into(),
        prize: "10000".into(),
        rules: StringList::default(),
        image: None,
        fees,
        min_team_size: min,
        max_team_size: max,
        max_registrations: None,
        current_registrations: 0,
        registration_deadline: None,
        is_live: true,
        created_by: None,
        created_at: now,
        updated_at: now,
    };
    repos.events.insert(ev).await.expect("seed event")
}

pub async fn seed_profile(repos: &Repositories, clerk_id: &str) -> profile::Model {
    let now = Utc::now().into();
    let p = profile::Model {
        id: Uuid::new_v4(),
        clerk_id: clerk_id.into(),
        email: format!("{clerk_id}@example.com"),
        username: clerk_id.into(),
        college: Some("CSJMU".into()),
        phone: None,
        avatar_url: None,
        registered_events: StringList::default(),
        paid_events: StringList::default(),
        onboarding_completed: true,
        team_id: None,
        created_at: now,
        updated_at: now,
    };
    repos.profiles.insert(p).await.expect("seed profile")
}

/// Team led by `leader` with `others` as members; profiles get their `team_id` set.
pub async fn seed_team(repos: &Repositories, name: &str, leader: &profile::Model, others: &[&profile::Model]) -> team::Model {
    let now = Utc::now().into();
    let mut members = IdList(vec![leader.id]);
    for p in others {
        members.insert(p.id);
    }
    let t = team::Model {
        id: Uuid::new_v4(),
        name: name.into(),
        leader_id: leader.id,
        members,
        join_requests: IdList::default(),
        invites: IdList::default(),
        is_locked: false,
        created_at: now,
        updated_at: now,
    };
    let t = repos.teams.insert(t).await.expect("seed team");
    for p in std::iter::once(leader).chain(others.iter().copied()) {
        let mut p = repos.profiles.find_by_id(p.id).await.expect("load").expect("profile");
        p.team_id = Some(t.id);
        repos.profiles.update(p).await.expect("set team");
    }
    t
}
