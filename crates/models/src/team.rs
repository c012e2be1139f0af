use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile;
use crate::types::IdList;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "team")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub leader_id: Uuid,
    /// Includes the leader.
    #[sea_orm(column_type = "JsonBinary")]
    pub members: IdList,
    #[sea_orm(column_type = "JsonBinary")]
    pub join_requests: IdList,
    #[sea_orm(column_type = "JsonBinary")]
    pub invites: IdList,
    pub is_locked: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Leader,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Leader => Entity::belongs_to(profile::Entity).from(Column::LeaderId).to(profile::Column::Id).into() }
    }
}

impl Related<profile::Entity> for Entity {
    fn to() -> RelationDef { Relation::Leader.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_leader(&self, profile_id: Uuid) -> bool {
        self.leader_id == profile_id
    }

    pub fn is_member(&self, profile_id: Uuid) -> bool {
        self.members.contains(profile_id)
    }
}
