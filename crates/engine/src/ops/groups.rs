use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, TransactionTrait};
use uuid::Uuid;

use crate::{
    EngineError, Group, NewMember, ResultEngine, Settlement, SettlementReport,
    compute_settlement, store,
};

use super::{Engine, load_group, with_tx};

impl Engine {
    /// Create a group with its initial members and a fresh invite code.
    pub async fn create_group(
        &self,
        name: &str,
        description: &str,
        members: Vec<NewMember>,
    ) -> ResultEngine<Group> {
        let now = Utc::now();
        let group = with_tx!(self, |db_tx| {
            let invite = self.unused_invite(&db_tx).await?;
            let group = Group::new(
                Uuid::new_v4().to_string(),
                name,
                description,
                members,
                invite,
                now,
            )?;
            store::ActiveModel::try_from(&group)?
                .insert(&db_tx)
                .await?;
            Ok::<_, EngineError>(group)
        })?;

        tracing::info!(
            group_id = %group.id,
            members = group.members.len(),
            "group created"
        );
        Ok(group)
    }

    /// Latest snapshot of a group.
    pub async fn group(&self, group_id: &str) -> ResultEngine<Group> {
        load_group(&self.database, group_id).await
    }

    /// Delete a group and close its change stream.
    pub async fn delete_group(&self, group_id: &str) -> ResultEngine<()> {
        let result = store::Entity::delete_by_id(group_id.to_string())
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(format!("group {group_id}")));
        }
        self.watchers.close(group_id);
        tracing::info!(group_id, "group deleted");
        Ok(())
    }

    /// Pairwise transfers that settle the group.
    pub async fn settlement(&self, group_id: &str) -> ResultEngine<Vec<Settlement>> {
        let group = self.group(group_id).await?;
        Ok(compute_settlement(&group.expenses))
    }

    /// Settlement report resolved to member names and contacts.
    pub async fn report(&self, group_id: &str) -> ResultEngine<SettlementReport> {
        let group = self.group(group_id).await?;
        Ok(SettlementReport::build(&group))
    }
}
