use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::StringList;

/// Manual-payment state of a legacy account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum LegacyPaymentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "verification_pending")]
    VerificationPending,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "approved")]
    Approved,
}

impl LegacyPaymentStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "verification_pending" => Some(Self::VerificationPending),
            "paid" => Some(Self::Paid),
            "failed" => Some(Self::Failed),
            "approved" => Some(Self::Approved),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[sea_orm(string_value = "USER")]
    User,
    #[sea_orm(string_value = "ADMIN")]
    Admin,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "auth_user")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub college: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub events: StringList,
    #[sea_orm(column_type = "JsonBinary")]
    pub team_members: StringList,
    pub payment_status: LegacyPaymentStatus,
    pub role: Role,
    pub team_name: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub paid_events: StringList,
    pub transaction_id: Option<String>,
    pub screenshot_url: Option<String>,
    pub declared_amount: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_status_parse_matches_wire_names() {
        assert_eq!(LegacyPaymentStatus::parse("verification_pending"), Some(LegacyPaymentStatus::VerificationPending));
        assert_eq!(LegacyPaymentStatus::parse("approved"), Some(LegacyPaymentStatus::Approved));
        assert_eq!(LegacyPaymentStatus::parse("PAID"), None);
        let json = serde_json::to_string(&LegacyPaymentStatus::VerificationPending).unwrap();
        assert_eq!(json, "\"verification_pending\"");
    }

    #[test]
    fn role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
    }
}
