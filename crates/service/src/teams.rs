//! Team formation: create, invite, join requests and their responses.
//!
//! Invariants kept here:
//! - a profile belongs to at most one team (`profile.team_id` mirrors `team.members`);
//! - the leader is always a member;
//! - membership never exceeds the configured cap;
//! - a locked team's membership never changes.
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::types::IdList;
use models::{profile, team};

use crate::errors::ServiceError;
use crate::identity::Identity;
use crate::repository::Repositories;

const SEARCH_LIMIT: u64 = 20;

#[derive(Debug, Clone, Copy)]
pub struct TeamPolicy {
    pub max_members: usize,
}

impl Default for TeamPolicy {
    fn default() -> Self { Self { max_members: 5 } }
}

impl From<&configs::TeamsConfig> for TeamPolicy {
    fn from(cfg: &configs::TeamsConfig) -> Self { Self { max_members: cfg.max_members } }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl From<profile::Model> for MemberView {
    fn from(p: profile::Model) -> Self {
        Self { id: p.id, username: p.username, email: p.email, college: p.college, avatar_url: p.avatar_url }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamView {
    pub id: Uuid,
    pub name: String,
    pub leader_id: Uuid,
    pub leader: Option<MemberView>,
    pub members: Vec<MemberView>,
    pub is_locked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationView {
    pub id: Uuid,
    pub name: String,
    pub leader: Option<MemberView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamOverview {
    pub team: Option<TeamView>,
    pub invitations: Vec<InvitationView>,
    pub profile_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondInput {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub team_id: Option<Uuid>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespondAction {
    AcceptInvitation,
    RejectInvitation,
    AcceptRequest,
    RejectRequest,
}

impl RespondAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "accept_invitation" => Some(Self::AcceptInvitation),
            "reject_invitation" => Some(Self::RejectInvitation),
            "accept_request" => Some(Self::AcceptRequest),
            "reject_request" => Some(Self::RejectRequest),
            _ => None,
        }
    }
}

fn team_locked() -> ServiceError {
    ServiceError::locked("TEAM_LOCKED", "Team is locked after payment was initiated")
}

fn team_full(max: usize) -> ServiceError {
    ServiceError::conflict("TEAM_FULL", format!("Team already has the maximum of {max} members"))
}

fn already_in_team() -> ServiceError {
    ServiceError::conflict("ALREADY_IN_TEAM", "Already a member of a team")
}

fn not_leader() -> ServiceError {
    ServiceError::forbidden("NOT_TEAM_LEADER", "Only the team leader can do this")
}

pub struct TeamService {
    repos: Repositories,
    policy: TeamPolicy,
}

impl TeamService {
    pub fn new(repos: Repositories, policy: TeamPolicy) -> Self { Self { repos, policy } }

    async fn populate(&self, t: team::Model) -> Result<TeamView, ServiceError> {
        let members: Vec<MemberView> = self
            .repos
            .profiles
            .find_many(&t.members.0)
            .await?
            .into_iter()
            .map(MemberView::from)
            .collect();
        let leader = members.iter().find(|m| m.id == t.leader_id).cloned();
        Ok(TeamView { id: t.id, name: t.name, leader_id: t.leader_id, leader, members, is_locked: t.is_locked })
    }

    async fn team_of(&self, me: &profile::Model) -> Result<Option<team::Model>, ServiceError> {
        match me.team_id {
            Some(id) => self.repos.teams.find_by_id(id).await,
            None => Ok(None),
        }
    }

    /// The caller's team, led by the caller.
    async fn led_team(&self, me: &profile::Model) -> Result<team::Model, ServiceError> {
        match self.team_of(me).await? {
            Some(t) if t.is_leader(me.id) => Ok(t),
            _ => Err(not_leader()),
        }
    }

    async fn set_team_id(&self, profile_id: Uuid, team_id: Option<Uuid>) -> Result<(), ServiceError> {
        let mut p = self
            .repos
            .profiles
            .find_by_id(profile_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Profile"))?;
        p.team_id = team_id;
        p.updated_at = Utc::now().into();
        self.repos.profiles.update(p).await?;
        Ok(())
    }

    /// Add `joiner` to `t` after re-checking lock, capacity and the joiner's membership.
    async fn admit(&self, mut t: team::Model, joiner: &profile::Model) -> Result<team::Model, ServiceError> {
        if t.is_locked {
            return Err(team_locked());
        }
        if joiner.team_id.is_some() {
            return Err(already_in_team());
        }
        if t.members.len() >= self.policy.max_members {
            return Err(team_full(self.policy.max_members));
        }
        t.members.insert(joiner.id);
        t.invites.remove(joiner.id);
        t.join_requests.remove(joiner.id);
        t.updated_at = Utc::now().into();
        let t = self.repos.teams.update(t).await?;
        self.set_team_id(joiner.id, Some(t.id)).await?;
        info!(team_id = %t.id, profile_id = %joiner.id, "team_member_added");
        Ok(t)
    }

    #[instrument(skip(self), fields(clerk_id = %identity.clerk_id))]
    pub async fn overview(&self, identity: &Identity) -> Result<TeamOverview, ServiceError> {
        let me = self.repos.require_profile(&identity.clerk_id).await?;
        let team = match self.team_of(&me).await? {
            Some(t) => Some(self.populate(t).await?),
            None => None,
        };
        let mut invitations = Vec::new();
        for t in self.repos.teams.find_inviting(me.id).await? {
            let leader = self.repos.profiles.find_by_id(t.leader_id).await?.map(MemberView::from);
            invitations.push(InvitationView { id: t.id, name: t.name, leader });
        }
        Ok(TeamOverview { team, invitations, profile_id: me.id })
    }

    pub async fn search(&self, identity: &Identity, query: &str) -> Result<Vec<TeamView>, ServiceError> {
        self.repos.require_profile(&identity.clerk_id).await?;
        let mut out = Vec::new();
        for t in self.repos.teams.search(query.trim(), SEARCH_LIMIT).await? {
            out.push(self.populate(t).await?);
        }
        Ok(out)
    }

    #[instrument(skip(self), fields(clerk_id = %identity.clerk_id))]
    pub async fn create(&self, identity: &Identity, name: &str) -> Result<TeamView, ServiceError> {
        let me = self.repos.require_profile(&identity.clerk_id).await?;
        let name = name.trim();
        let len = name.chars().count();
        if !(3..=50).contains(&len) {
            return Err(ServiceError::validation("INVALID_TEAM_NAME", "Team name must be 3-50 characters"));
        }
        if me.team_id.is_some() {
            return Err(already_in_team());
        }
        if self.repos.teams.find_by_name(name).await?.is_some() {
            return Err(ServiceError::conflict("TEAM_NAME_TAKEN", "Team name already taken"));
        }
        let now = Utc::now().into();
        let t = team::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
            leader_id: me.id,
            members: IdList(vec![me.id]),
            join_requests: IdList::default(),
            invites: IdList::default(),
            is_locked: false,
            created_at: now,
            updated_at: now,
        };
        let t = self.repos.teams.insert(t).await.map_err(|e| match e {
            ServiceError::Conflict { .. } => ServiceError::conflict("TEAM_NAME_TAKEN", "Team name already taken"),
            other => other,
        })?;
        self.set_team_id(me.id, Some(t.id)).await?;
        info!(team_id = %t.id, leader_id = %me.id, name = %t.name, "team_created");
        self.populate(t).await
    }

    #[instrument(skip(self), fields(clerk_id = %identity.clerk_id))]
    pub async fn invite(&self, identity: &Identity, email: &str) -> Result<(), ServiceError> {
        let me = self.repos.require_profile(&identity.clerk_id).await?;
        let mut t = self.led_team(&me).await?;
        if t.is_locked {
            return Err(team_locked());
        }
        let email = models::validation::normalize_email(email);
        if email.is_empty() {
            return Err(ServiceError::validation("EMAIL_REQUIRED", "email is required"));
        }
        let invitee = self
            .repos
            .profiles
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ServiceError::not_found("Profile"))?;
        if invitee.team_id.is_some() {
            return Err(ServiceError::conflict("ALREADY_IN_TEAM", "User is already in a team"));
        }
        if t.invites.contains(invitee.id) {
            return Err(ServiceError::conflict("ALREADY_INVITED", "User already invited"));
        }
        if t.members.len() >= self.policy.max_members {
            return Err(team_full(self.policy.max_members));
        }
        t.invites.insert(invitee.id);
        t.updated_at = Utc::now().into();
        let t = self.repos.teams.update(t).await?;
        info!(team_id = %t.id, invitee_id = %invitee.id, "team_invite_sent");
        Ok(())
    }

    #[instrument(skip(self), fields(clerk_id = %identity.clerk_id))]
    pub async fn request_join(&self, identity: &Identity, team_id: Option<Uuid>) -> Result<(), ServiceError> {
        let team_id = team_id.ok_or_else(|| ServiceError::validation("TEAM_ID_REQUIRED", "teamId is required"))?;
        let me = self.repos.require_profile(&identity.clerk_id).await?;
        if me.team_id.is_some() {
            return Err(already_in_team());
        }
        let mut t = self.repos.teams.find_by_id(team_id).await?.ok_or_else(|| ServiceError::not_found("Team"))?;
        if t.is_locked {
            return Err(team_locked());
        }
        if t.members.len() >= self.policy.max_members {
            return Err(team_full(self.policy.max_members));
        }
        if !t.join_requests.insert(me.id) {
            return Err(ServiceError::conflict("ALREADY_REQUESTED", "Join request already sent"));
        }
        t.updated_at = Utc::now().into();
        let t = self.repos.teams.update(t).await?;
        info!(team_id = %t.id, profile_id = %me.id, "team_join_requested");
        Ok(())
    }

    pub async fn join_requests(&self, identity: &Identity) -> Result<Vec<MemberView>, ServiceError> {
        let me = self.repos.require_profile(&identity.clerk_id).await?;
        let t = self.led_team(&me).await?;
        let requesters = self.repos.profiles.find_many(&t.join_requests.0).await?;
        Ok(requesters.into_iter().map(MemberView::from).collect())
    }

    /// Accept or reject an invitation (as invitee) or a join request (as leader).
    #[instrument(skip(self, input), fields(clerk_id = %identity.clerk_id, action = %input.action))]
    pub async fn respond(&self, identity: &Identity, input: RespondInput) -> Result<&'static str, ServiceError> {
        let action = RespondAction::parse(&input.action)
            .ok_or_else(|| ServiceError::validation("INVALID_ACTION", format!("unknown action: {}", input.action)))?;
        let me = self.repos.require_profile(&identity.clerk_id).await?;

        match action {
            RespondAction::AcceptInvitation | RespondAction::RejectInvitation => {
                let team_id = input
                    .team_id
                    .ok_or_else(|| ServiceError::validation("TEAM_ID_REQUIRED", "teamId is required"))?;
                let mut t = self.repos.teams.find_by_id(team_id).await?.ok_or_else(|| ServiceError::not_found("Team"))?;
                if !t.invites.contains(me.id) {
                    return Err(ServiceError::NotFound { code: "INVITATION_NOT_FOUND", message: "No pending invitation from this team".into() });
                }
                if action == RespondAction::AcceptInvitation {
                    self.admit(t, &me).await?;
                    Ok("Joined team")
                } else {
                    t.invites.remove(me.id);
                    t.updated_at = Utc::now().into();
                    self.repos.teams.update(t).await?;
                    info!(team_id = %team_id, profile_id = %me.id, "team_invite_rejected");
                    Ok("Invitation declined")
                }
            }
            RespondAction::AcceptRequest | RespondAction::RejectRequest => {
                let user_id = input
                    .user_id
                    .ok_or_else(|| ServiceError::validation("USER_ID_REQUIRED", "userId is required"))?;
                let mut t = self.led_team(&me).await?;
                if !t.join_requests.contains(user_id) {
                    return Err(ServiceError::NotFound { code: "REQUEST_NOT_FOUND", message: "No pending join request from this user".into() });
                }
                if action == RespondAction::AcceptRequest {
                    let joiner = self
                        .repos
                        .profiles
                        .find_by_id(user_id)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("Profile"))?;
                    self.admit(t, &joiner).await?;
                    Ok("Member added")
                } else {
                    t.join_requests.remove(user_id);
                    t.updated_at = Utc::now().into();
                    let t = self.repos.teams.update(t).await?;
                    info!(team_id = %t.id, profile_id = %user_id, "team_join_rejected");
                    Ok("Request rejected")
                }
            }
        }
    }

    /// Leave the caller's team. A leader may only leave as the last member, which disbands the team.
    #[instrument(skip(self), fields(clerk_id = %identity.clerk_id))]
    pub async fn leave(&self, identity: &Identity) -> Result<&'static str, ServiceError> {
        let me = self.repos.require_profile(&identity.clerk_id).await?;
        let mut t = self.team_of(&me).await?.ok_or_else(|| ServiceError::not_found("Team"))?;
        if t.is_locked {
            return Err(team_locked());
        }
        if t.is_leader(me.id) {
            if t.members.len() > 1 {
                return Err(ServiceError::conflict("LEADER_CANNOT_LEAVE", "Leader must be the last member to leave"));
            }
            self.repos.teams.delete(t.id).await?;
            self.set_team_id(me.id, None).await?;
            info!(team_id = %t.id, "team_disbanded");
            return Ok("Team disbanded");
        }
        t.members.remove(me.id);
        t.updated_at = Utc::now().into();
        let t = self.repos.teams.update(t).await?;
        self.set_team_id(me.id, None).await?;
        info!(team_id = %t.id, profile_id = %me.id, "team_member_left");
        Ok("Left team")
    }
}
