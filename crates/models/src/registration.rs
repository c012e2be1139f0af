use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{event, profile, team};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "initiated")]
    Initiated,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "manual_verified")]
    ManualVerified,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

impl PaymentStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "initiated" => Some(Self::Initiated),
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "manual_verified" => Some(Self::ManualVerified),
            "failed" => Some(Self::Failed),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }

    pub fn is_settled(self) -> bool {
        matches!(self, Self::Paid | Self::ManualVerified)
    }

    /// Holds a slot for the team: in flight or settled.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Initiated | Self::Pending | Self::Paid | Self::ManualVerified)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Initiated, Pending | Paid | ManualVerified | Failed)
                | (Pending, Paid | ManualVerified | Failed)
                | (Failed, Initiated | Pending)
                | (Paid | ManualVerified, Refunded)
        )
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "registration")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub event_id: Uuid,
    pub team_id: Option<Uuid>,
    pub profile_id: Uuid,
    pub payment_status: PaymentStatus,
    /// Paise.
    pub amount_paid: Option<i64>,
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Event,
    Profile,
    Team,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Event => Entity::belongs_to(event::Entity).from(Column::EventId).to(event::Column::Id).into(),
            Relation::Profile => Entity::belongs_to(profile::Entity).from(Column::ProfileId).to(profile::Column::Id).into(),
            Relation::Team => Entity::belongs_to(team::Entity).from(Column::TeamId).to(team::Column::Id).into(),
        }
    }
}

impl Related<event::Entity> for Entity {
    fn to() -> RelationDef { Relation::Event.def() }
}

impl Related<team::Entity> for Entity {
    fn to() -> RelationDef { Relation::Team.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::PaymentStatus::{self, *};

    #[test]
    fn transitions_follow_table() {
        assert!(Initiated.can_transition_to(Paid));
        assert!(Pending.can_transition_to(ManualVerified));
        assert!(Failed.can_transition_to(Initiated));
        assert!(Paid.can_transition_to(Refunded));
        assert!(ManualVerified.can_transition_to(Refunded));

        assert!(!Paid.can_transition_to(Failed));
        assert!(!Pending.can_transition_to(Initiated));
        assert!(!Failed.can_transition_to(Paid));
        for next in [Initiated, Pending, Paid, ManualVerified, Failed, Refunded] {
            assert!(!Refunded.can_transition_to(next));
        }
    }

    #[test]
    fn active_and_settled() {
        assert!(Initiated.is_active() && !Initiated.is_settled());
        assert!(Paid.is_active() && Paid.is_settled());
        assert!(!Failed.is_active());
        assert!(!Refunded.is_active());
        assert_eq!(PaymentStatus::parse("manual_verified"), Some(ManualVerified));
        assert_eq!(PaymentStatus::parse("done"), None);
    }
}
