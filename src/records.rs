//! User Records
//!
//! The fixed in-memory record set the matchmaking agent filters over.
//! Defined at process start, read-only, never mutated.

use crate::types::UserRecord;

/// The static record set, in registration order.
pub fn user_records() -> Vec<UserRecord> {
    vec![
        UserRecord {
            name: "Muneeb".to_string(),
            age: 2,
        },
        UserRecord {
            name: "Zainscity".to_string(),
            age: 25,
        },
        UserRecord {
            name: "Azan".to_string(),
            age: 19,
        },
    ]
}

/// Records whose age is at least `min_age`, original order preserved.
/// No matches yields an empty vec, never an error.
pub fn filter_records(records: &[UserRecord], min_age: u32) -> Vec<UserRecord> {
    records
        .iter()
        .filter(|r| r.age >= min_age)
        .cloned()
        .collect()
}
