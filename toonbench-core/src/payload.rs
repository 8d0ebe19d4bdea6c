// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Canonical payload model and deterministic generator.
//!
//! Every codec encodes and decodes these same types: `serde` derives feed
//! JSON, `prost` derives feed the binary format and the line codec walks the
//! structs directly. Only the encode/decode path varies between formats.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::PayloadSize;

/// Roles assigned round-robin to generated users.
pub const ROLES: [&str; 4] = ["admin", "user", "moderator", "superuser"];

const TAGS: [&str; 5] = ["alpha", "beta", "gamma", "delta", "epsilon"];
const COUNTRIES: [&str; 5] = ["BR", "US", "DE", "JP", "IN"];

/// Root benchmark payload: a sequence of user records.
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
pub struct Payload {
    #[prost(message, repeated, tag = "1")]
    pub users: Vec<User>,
}

/// A user-like record.
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
pub struct User {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub email: String,
    #[prost(string, tag = "4")]
    pub role: String,
    #[prost(string, repeated, tag = "5")]
    pub tags: Vec<String>,
    #[prost(message, optional, tag = "6")]
    pub profile: Option<Profile>,
}

/// Nested profile data attached to a user.
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
pub struct Profile {
    #[prost(uint32, tag = "1")]
    pub age: u32,
    #[prost(string, tag = "2")]
    pub country: String,
    #[prost(double, tag = "3")]
    pub score: f64,
    #[prost(bool, tag = "4")]
    pub verified: bool,
}

impl Payload {
    /// Number of top-level user records.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

/// Source of benchmark payloads.
///
/// Implementations must be deterministic: the same size always yields a
/// structurally identical payload so that every codec sees the same data.
pub trait PayloadGenerator: Send + Sync {
    fn generate(&self, size: PayloadSize) -> Payload;
}

/// The default generator producing user records with fixed, index-derived values.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserGenerator;

impl UserGenerator {
    fn user(i: usize) -> User {
        let tag_count = i % 4;
        let tags = (0..tag_count)
            .map(|t| TAGS[(i + t) % TAGS.len()].to_string())
            .collect();

        // Every seventh user carries no profile so optional data is exercised.
        let profile = (i % 7 != 6).then(|| Profile {
            age: 18 + (i % 60) as u32,
            country: COUNTRIES[i % COUNTRIES.len()].to_string(),
            score: (i % 1000) as f64 * 0.25,
            verified: i % 3 == 0,
        });

        User {
            id: i as u64 + 1,
            name: format!("User_{}", i),
            email: format!("user{}@example.com", i),
            role: ROLES[i % ROLES.len()].to_string(),
            tags,
            profile,
        }
    }
}

impl PayloadGenerator for UserGenerator {
    fn generate(&self, size: PayloadSize) -> Payload {
        Payload {
            users: (0..size.users()).map(Self::user).collect(),
        }
    }
}

/// Generate the canonical payload with `n` users.
///
/// Fails with [`ValidationError::OutOfRange`] for negative or oversized `n`.
pub fn generate(n: i64) -> Result<Payload, ValidationError> {
    let size = PayloadSize::new(n)?;
    Ok(UserGenerator.generate(size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_exact_count() {
        for n in [0, 1, 3, 100] {
            let payload = generate(n).unwrap();
            assert_eq!(payload.user_count(), n as usize);
        }
    }

    #[test]
    fn test_generate_deterministic() {
        assert_eq!(generate(250).unwrap(), generate(250).unwrap());
    }

    #[test]
    fn test_generate_negative_rejected() {
        let err = generate(-5).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { value: -5, .. }));
    }

    #[test]
    fn test_deterministic_names() {
        let payload = generate(3).unwrap();
        let names: Vec<_> = payload.users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["User_0", "User_1", "User_2"]);
        assert_eq!(payload.users[0].id, 1);
        assert_eq!(payload.users[1].role, "user");
    }

    #[test]
    fn test_optional_profile_present_and_absent() {
        let payload = generate(14).unwrap();
        assert!(payload.users[0].profile.is_some());
        assert!(payload.users[6].profile.is_none());
        assert!(payload.users[13].profile.is_none());
    }
}
