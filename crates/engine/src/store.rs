//! Group documents table.
//!
//! A group is stored as one row: scalar fields map to columns while the
//! member and expense lists are stored as JSON text. Rows are decoded through
//! explicit types and validated, so a malformed document is rejected instead
//! of leaking into the engine.

use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{EngineError, Expense, Group, InvitePolicy, Member, ResultEngine};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub members: String,
    #[sea_orm(column_type = "Text")]
    pub expenses: String,
    pub invite_code: Option<String>,
    pub invite_link: Option<String>,
    pub allow_invites: bool,
    pub max_members: i32,
    pub created_at: DateTimeUtc,
    pub last_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Which fields a write replaces. `last_updated` is always written.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Fields {
    pub members: bool,
    pub expenses: bool,
    pub invite: bool,
}

impl Fields {
    pub const MEMBERS: Fields = Fields {
        members: true,
        expenses: false,
        invite: false,
    };
    pub const EXPENSES: Fields = Fields {
        members: false,
        expenses: true,
        invite: false,
    };
    pub const ROSTER: Fields = Fields {
        members: true,
        expenses: true,
        invite: false,
    };
    pub const INVITE: Fields = Fields {
        members: false,
        expenses: false,
        invite: true,
    };
}

impl TryFrom<&Group> for ActiveModel {
    type Error = EngineError;

    fn try_from(group: &Group) -> Result<Self, Self::Error> {
        let mut model = patch(group, Fields::ROSTER)?;
        model.id = ActiveValue::Set(group.id.clone());
        model.name = ActiveValue::Set(group.name.clone());
        model.description = ActiveValue::Set(group.description.clone());
        model.created_at = ActiveValue::Set(group.created_at);
        set_invite(&mut model, group.invite.as_ref())?;
        Ok(model)
    }
}

/// Build an update that overwrites `fields` of the stored group.
pub(crate) fn patch(group: &Group, fields: Fields) -> ResultEngine<ActiveModel> {
    let mut model = ActiveModel {
        id: ActiveValue::Unchanged(group.id.clone()),
        last_updated: ActiveValue::Set(group.last_updated),
        ..Default::default()
    };
    if fields.members {
        model.members = ActiveValue::Set(encode(&group.members, "members")?);
    }
    if fields.expenses {
        model.expenses = ActiveValue::Set(encode(&group.expenses, "expenses")?);
    }
    if fields.invite {
        set_invite(&mut model, group.invite.as_ref())?;
    }
    Ok(model)
}

fn set_invite(model: &mut ActiveModel, invite: Option<&InvitePolicy>) -> ResultEngine<()> {
    match invite {
        Some(invite) => {
            let max_members = i32::try_from(invite.max_members).map_err(|_| {
                EngineError::InvalidGroup("max_members is too large".to_string())
            })?;
            model.invite_code = ActiveValue::Set(Some(invite.code.clone()));
            model.invite_link = ActiveValue::Set(Some(invite.link.clone()));
            model.allow_invites = ActiveValue::Set(invite.allow_invites);
            model.max_members = ActiveValue::Set(max_members);
        }
        None => {
            model.invite_code = ActiveValue::Set(None);
            model.invite_link = ActiveValue::Set(None);
            model.allow_invites = ActiveValue::Set(false);
            model.max_members = ActiveValue::Set(0);
        }
    }
    Ok(())
}

fn encode<T: serde::Serialize>(value: &T, label: &str) -> ResultEngine<String> {
    serde_json::to_string(value)
        .map_err(|err| EngineError::InvalidDocument(format!("cannot encode {label}: {err}")))
}

impl TryFrom<Model> for Group {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let invalid = |what: &str, err: String| {
            EngineError::InvalidDocument(format!("group {}: {what}: {err}", model.id))
        };

        let members: Vec<Member> = serde_json::from_str(&model.members)
            .map_err(|err| invalid("members", err.to_string()))?;
        let expenses: Vec<Expense> = serde_json::from_str(&model.expenses)
            .map_err(|err| invalid("expenses", err.to_string()))?;

        let invite = match (model.invite_code.clone(), model.invite_link.clone()) {
            (None, _) => None,
            (Some(code), Some(link)) => Some(InvitePolicy {
                code,
                link,
                allow_invites: model.allow_invites,
                max_members: u32::try_from(model.max_members)
                    .map_err(|err| invalid("max_members", err.to_string()))?,
            }),
            (Some(_), None) => {
                return Err(invalid("invite_link", "missing".to_string()));
            }
        };

        let group = Group {
            id: model.id.clone(),
            name: model.name.clone(),
            description: model.description.clone(),
            members,
            expenses,
            invite,
            created_at: model.created_at,
            last_updated: model.last_updated,
        };
        group
            .validate()
            .map_err(|err| invalid("invariant", err.to_string()))?;
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::ActiveValue;

    use super::*;
    use crate::group::tests::{group_with, new_expense};

    fn stored(group: &Group) -> Model {
        Model {
            id: group.id.clone(),
            name: group.name.clone(),
            description: group.description.clone(),
            members: serde_json::to_string(&group.members).unwrap(),
            expenses: serde_json::to_string(&group.expenses).unwrap(),
            invite_code: group.invite.as_ref().map(|i| i.code.clone()),
            invite_link: group.invite.as_ref().map(|i| i.link.clone()),
            allow_invites: true,
            max_members: 20,
            created_at: group.created_at,
            last_updated: group.last_updated,
        }
    }

    #[test]
    fn stored_document_decodes_back() {
        let group = group_with(&["A", "B"])
            .add_expense(new_expense(100, 0, vec![0, 1]))
            .unwrap();
        assert_eq!(Group::try_from(stored(&group)).unwrap(), group);
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let group = group_with(&["A", "B"]);
        let mut model = stored(&group);
        model.members = r##"[{"id":0,"name":"A","phone":"1","color":"#fff","joined_at":"2024-01-01T00:00:00Z"}]"##.to_string();
        let err = Group::try_from(model).unwrap_err();
        assert!(matches!(err, EngineError::InvalidDocument(msg) if msg.contains("account")));
    }

    #[test]
    fn invariant_breaking_document_is_rejected() {
        let mut group = group_with(&["A", "B"])
            .add_expense(new_expense(100, 0, vec![0, 1]))
            .unwrap();
        group.expenses[0].participants = vec![0, 4];
        let err = Group::try_from(stored(&group)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidDocument(_)));

        let mut model = stored(&group_with(&["A", "B"]));
        model.members = "[]".to_string();
        assert!(matches!(
            Group::try_from(model),
            Err(EngineError::InvalidDocument(_))
        ));
    }

    #[test]
    fn legacy_document_without_invite_decodes() {
        let group = group_with(&["A", "B"]);
        let mut model = stored(&group);
        model.invite_code = None;
        model.invite_link = None;
        assert!(Group::try_from(model).unwrap().invite.is_none());
    }

    #[test]
    fn patch_only_sets_requested_fields() {
        let group = group_with(&["A", "B"]);
        let model = patch(&group, Fields::EXPENSES).unwrap();
        assert!(matches!(model.members, ActiveValue::NotSet));
        assert!(matches!(model.expenses, ActiveValue::Set(_)));
        assert!(matches!(model.invite_code, ActiveValue::NotSet));
        assert!(matches!(model.last_updated, ActiveValue::Set(_)));
    }
}
