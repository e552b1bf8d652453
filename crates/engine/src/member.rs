//! Group members.
//!
//! A member id is **not** a stable identifier: it is the member position in
//! [`Group::members`](crate::Group::members) and it is reassigned every time a
//! member is removed from the group.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Dense member id (position in the member list).
pub type MemberId = usize;

/// Display colours handed out by enrollment order.
pub const PALETTE: [&str; 12] = [
    "#ff9a9e", "#fecfef", "#ffecd2", "#fcb69f", "#ff8a80", "#f8bbd9", "#ffcccb", "#ffd1dc",
    "#ffe4e1", "#ffb3ba", "#ffdfba", "#ffffba",
];

/// Returns the colour assigned to the member enrolled at position `id`.
#[must_use]
pub fn color_for(id: MemberId) -> &'static str {
    PALETTE[id % PALETTE.len()]
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub phone: String,
    pub account: String,
    pub color: String,
    pub joined_at: DateTime<Utc>,
}

impl Member {
    /// Returns `true` if `name` or `phone` collide with this member.
    ///
    /// Names are compared case-insensitively after Unicode normalization,
    /// phones are compared exactly.
    pub fn collides_with(&self, name: &str, phone: &str) -> bool {
        name_key(&self.name) == name_key(name) || self.phone.trim() == phone.trim()
    }
}

/// Contact details supplied when a member joins or is edited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
    pub name: String,
    pub phone: String,
    pub account: String,
}

impl NewMember {
    pub fn new(name: &str, phone: &str, account: &str) -> Self {
        Self {
            name: name.to_string(),
            phone: phone.to_string(),
            account: account.to_string(),
        }
    }

    /// Trim every field and reject empty ones.
    pub(crate) fn normalized(&self) -> ResultEngine<NewMember> {
        Ok(NewMember {
            name: required_field(&self.name, "name")?,
            phone: required_field(&self.phone, "phone")?,
            account: required_field(&self.account, "account")?,
        })
    }
}

fn required_field(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidMember(format!(
            "member {label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Comparison key for member names.
fn name_key(name: &str) -> String {
    name.trim().nfkc().collect::<String>().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str, phone: &str) -> Member {
        Member {
            id: 0,
            name: name.to_string(),
            phone: phone.to_string(),
            account: "1234".to_string(),
            color: color_for(0).to_string(),
            joined_at: Utc::now(),
        }
    }

    #[test]
    fn palette_wraps_around() {
        assert_eq!(color_for(0), "#ff9a9e");
        assert_eq!(color_for(11), "#ffffba");
        assert_eq!(color_for(12), "#ff9a9e");
        assert_eq!(color_for(13), "#fecfef");
    }

    #[test]
    fn names_collide_case_insensitively() {
        let alice = member("Alice", "010-1111");
        assert!(alice.collides_with("alice", "010-2222"));
        assert!(alice.collides_with("  ALICE ", "010-2222"));
        assert!(!alice.collides_with("Alicia", "010-2222"));
    }

    #[test]
    fn phones_collide_exactly() {
        let alice = member("Alice", "010-1111");
        assert!(alice.collides_with("Bob", " 010-1111 "));
        assert!(!alice.collides_with("Bob", "0101111"));
    }

    #[test]
    fn fullwidth_names_are_normalized() {
        let alice = member("Alice", "010-1111");
        assert!(alice.collides_with("ＡＬＩＣＥ", "010-2222"));
    }

    #[test]
    fn normalized_rejects_blank_fields() {
        let err = NewMember::new("  ", "1", "2").normalized().unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidMember("member name must not be empty".to_string())
        );
        let ok = NewMember::new(" Bob ", " 010 ", " 99 ").normalized().unwrap();
        assert_eq!(ok, NewMember::new("Bob", "010", "99"));
    }
}
