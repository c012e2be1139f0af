use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::StringList;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Human-chosen identifier such as `robo-wars`.
    #[sea_orm(unique)]
    pub event_id: String,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub category: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Display text, e.g. "3-5 Members".
    pub team_size: String,
    pub prize: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub rules: StringList,
    pub image: Option<String>,
    /// Rupees.
    pub fees: i64,
    pub min_team_size: i32,
    pub max_team_size: i32,
    pub max_registrations: Option<i32>,
    pub current_registrations: i32,
    pub registration_deadline: Option<DateTimeWithTimeZone>,
    pub is_live: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_free(&self) -> bool {
        self.fees == 0
    }

    pub fn is_team_event(&self) -> bool {
        self.max_team_size > 1
    }

    pub fn is_full(&self) -> bool {
        matches!(self.max_registrations, Some(max) if self.current_registrations >= max)
    }

    pub fn deadline_passed(&self, now: DateTimeWithTimeZone) -> bool {
        matches!(self.registration_deadline, Some(deadline) if now > deadline)
    }
}

pub fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut gap = false;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            gap = false;
            slug.push(c);
        } else {
            gap = true;
        }
    }
    slug
}

/// Derive `(min, max)` team size from the display text.
pub fn parse_team_size(text: &str) -> (i32, i32) {
    let lower = text.to_lowercase();
    let numbers: Vec<i32> = lower
        .split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();

    if lower.contains("individual") {
        if lower.contains("team of") {
            if let Some(max) = numbers.iter().copied().max() {
                return (1, max);
            }
        }
        return (1, 1);
    }
    if lower.contains("open") {
        return (1, 100);
    }
    match (numbers.first(), numbers.last()) {
        (Some(&first), Some(&last)) => {
            let min = if first == 0 { 1 } else { first };
            let max = if numbers.len() > 1 { last } else { min };
            (min, max)
        }
        _ => (1, 1),
    }
}
