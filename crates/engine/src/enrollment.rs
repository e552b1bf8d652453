//! Membership enrollment.
//!
//! Enrollment appends a member at the next dense id. Policy checks (invites
//! allowed, member cap) belong to the caller, see
//! [`InvitePolicy::ensure_can_join`](crate::InvitePolicy::ensure_can_join).

use chrono::{DateTime, Utc};

use crate::{EngineError, Member, MemberId, NewMember, ResultEngine, member::color_for};

/// Append `new_member` to `members`, returning the new list.
///
/// Fails with [`EngineError::DuplicateMember`] if a member with the same name
/// (case-insensitive) or the same phone already exists.
pub fn enroll(
    members: &[Member],
    new_member: NewMember,
    joined_at: DateTime<Utc>,
) -> ResultEngine<Vec<Member>> {
    let new_member = new_member.normalized()?;
    ensure_unique(members, None, &new_member)?;

    let id = members.len();
    let mut next = members.to_vec();
    next.push(Member {
        id,
        name: new_member.name,
        phone: new_member.phone,
        account: new_member.account,
        color: color_for(id).to_string(),
        joined_at,
    });
    Ok(next)
}

/// Replace the contact details of member `id`.
///
/// Id, colour and join date are kept. The uniqueness check ignores the
/// edited member itself.
pub fn update_member(
    members: &[Member],
    id: MemberId,
    patch: NewMember,
) -> ResultEngine<Vec<Member>> {
    if id >= members.len() {
        return Err(EngineError::KeyNotFound(format!("member {id}")));
    }
    let patch = patch.normalized()?;
    ensure_unique(members, Some(id), &patch)?;

    let mut next = members.to_vec();
    let member = &mut next[id];
    member.name = patch.name;
    member.phone = patch.phone;
    member.account = patch.account;
    Ok(next)
}

fn ensure_unique(
    members: &[Member],
    except: Option<MemberId>,
    candidate: &NewMember,
) -> ResultEngine<()> {
    let duplicate = members
        .iter()
        .filter(|m| Some(m.id) != except)
        .find(|m| m.collides_with(&candidate.name, &candidate.phone));
    match duplicate {
        Some(existing) => Err(EngineError::DuplicateMember(existing.name.clone())),
        None => Ok(()),
    }
}
