use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    TransactionTrait,
};
use serde::Serialize;

use crate::{
    EngineError, Group, InvitePolicy, NewMember, ResultEngine, is_valid_invite_code,
    store::{self, Fields},
};

use super::{Engine, with_tx};

const MAX_INVITE_ATTEMPTS: usize = 8;

/// Outcome of [`Engine::backfill_invite_codes`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub updated: usize,
    pub skipped: usize,
}

impl Engine {
    /// Find the group an invite code belongs to.
    pub async fn group_by_invite(&self, code: &str) -> ResultEngine<Group> {
        if !is_valid_invite_code(code) {
            return Err(EngineError::InvalidInvite(code.to_string()));
        }
        let model = store::Entity::find()
            .filter(store::Column::InviteCode.eq(code))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("invite code".to_string()))?;
        Group::try_from(model)
    }

    /// Join the group behind `code`, if it accepts invites and has room.
    pub async fn join_by_invite(&self, code: &str, new_member: NewMember) -> ResultEngine<Group> {
        let target = self.group_by_invite(code).await?;
        let group = self
            .mutate_group(&target.id, Fields::MEMBERS, |group| {
                let invite = group
                    .invite
                    .as_ref()
                    .filter(|invite| invite.code == code)
                    .ok_or_else(|| EngineError::KeyNotFound("invite code".to_string()))?;
                invite.ensure_can_join(group.members.len())?;
                group.add_member(new_member, Utc::now())
            })
            .await?;
        tracing::info!(group_id = %group.id, members = group.members.len(), "member joined by invite");
        Ok(group)
    }

    /// Toggle invites and change the member cap.
    pub async fn update_invite(
        &self,
        group_id: &str,
        allow_invites: Option<bool>,
        max_members: Option<u32>,
    ) -> ResultEngine<Group> {
        self.mutate_group(group_id, Fields::INVITE, |group| {
            group.update_invite(allow_invites, max_members)
        })
        .await
    }

    /// Give every stored group without an invite code a fresh one, with
    /// invites enabled and the default member cap.
    pub async fn backfill_invite_codes(&self) -> ResultEngine<BackfillReport> {
        with_tx!(self, |db_tx| {
            let mut report = BackfillReport::default();
            let rows = store::Entity::find().all(&db_tx).await?;
            for row in rows {
                if row.invite_code.is_some() {
                    report.skipped += 1;
                    continue;
                }
                let invite = self.unused_invite(&db_tx).await?;
                let max_members = i32::try_from(invite.max_members).map_err(|_| {
                    EngineError::InvalidGroup("max_members is too large".to_string())
                })?;
                store::ActiveModel {
                    id: ActiveValue::Unchanged(row.id.clone()),
                    invite_code: ActiveValue::Set(Some(invite.code.clone())),
                    invite_link: ActiveValue::Set(Some(invite.link.clone())),
                    allow_invites: ActiveValue::Set(invite.allow_invites),
                    max_members: ActiveValue::Set(max_members),
                    last_updated: ActiveValue::Set(Utc::now()),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;
                tracing::info!(group_id = %row.id, link = %invite.link, "invite code assigned");
                report.updated += 1;
            }
            Ok::<_, EngineError>(report)
        })
    }

    /// Generate an invite policy whose code is not used by any group.
    pub(super) async fn unused_invite<C: ConnectionTrait>(&self, db: &C) -> ResultEngine<InvitePolicy> {
        for _ in 0..MAX_INVITE_ATTEMPTS {
            let invite = InvitePolicy::generate(&self.public_url);
            let taken = store::Entity::find()
                .filter(store::Column::InviteCode.eq(invite.code.as_str()))
                .one(db)
                .await?
                .is_some();
            if !taken {
                return Ok(invite);
            }
        }
        Err(EngineError::InvalidGroup(
            "could not allocate an unused invite code".to_string(),
        ))
    }
}
