use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, TransactionTrait,
};
use tokio::sync::broadcast;

use crate::{
    EngineError, Group, ResultEngine,
    store::{self, Fields},
    watch::Watchers,
};

mod expenses;
mod groups;
mod invites;
mod members;

pub use invites::BackfillReport;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";

/// Persistent group store.
///
/// Every mutation reads the latest stored snapshot, applies a pure group
/// operation and writes the affected fields back inside one DB transaction.
/// There is no version check: a client acting on a stale view overwrites
/// whatever was written in between (last write wins).
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    public_url: String,
    watchers: Watchers,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Base URL used to build invite links.
    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    /// Subscribe to every committed change of a group.
    ///
    /// Drop the receiver to unsubscribe. The channel is closed when the group
    /// is deleted.
    pub async fn subscribe(&self, group_id: &str) -> ResultEngine<broadcast::Receiver<Group>> {
        load_group(&self.database, group_id).await?;
        Ok(self.watchers.subscribe(group_id))
    }

    /// Read-modify-write a group, overwriting `fields` with the result of
    /// `mutate` and notifying subscribers after commit.
    async fn mutate_group<F>(&self, group_id: &str, fields: Fields, mutate: F) -> ResultEngine<Group>
    where
        F: FnOnce(&Group) -> ResultEngine<Group>,
    {
        let group = with_tx!(self, |db_tx| {
            let current = load_group(&db_tx, group_id).await?;
            let mut next = mutate(&current)?;
            next.last_updated = Utc::now();
            store::patch(&next, fields)?.update(&db_tx).await?;
            Ok::<_, EngineError>(next)
        })?;

        self.watchers.publish(&group);
        Ok(group)
    }
}

/// Load and validate a stored group.
async fn load_group<C: ConnectionTrait>(db: &C, group_id: &str) -> ResultEngine<Group> {
    let model = store::Entity::find_by_id(group_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("group {group_id}")))?;
    Group::try_from(model)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    public_url: Option<String>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Base URL for invite links, e.g. `https://split.example.org`.
    pub fn public_url(mut self, url: &str) -> EngineBuilder {
        self.public_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            public_url: self
                .public_url
                .unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string()),
            watchers: Watchers::default(),
        })
    }
}
