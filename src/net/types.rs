//! Wire types for the backend JSON API.
//!
//! Field names follow the backend's mixed conventions (`user_id`, camelCase
//! timestamps, Mongo-style `_id`) via serde renames so the Rust side stays
//! snake_case throughout.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

// =============================================================================
// AUTH
// =============================================================================

/// The backend's user record, cached client-side while a session is live.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "user_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Envelope returned by `/auth/google` and `/me`.
///
/// The backend signals failure both through HTTP status and through
/// `success: false` in a 2xx body; absence of the flag reads as failure.
#[derive(Clone, Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    pub token: Option<String>,
    pub user: Option<User>,
    pub message: Option<String>,
}

// =============================================================================
// SERENDIPITY MOMENTS
// =============================================================================

/// A logged serendipity moment (a place + feeling the user recorded).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerendipityMoment {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub moment_description: String,
    pub emotional_state: String,
}

/// Payload for creating a serendipity moment.
#[derive(Clone, Debug, Serialize)]
pub struct NewSerendipityMoment {
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub moment_description: String,
    pub emotional_state: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MomentsResponse {
    #[serde(default)]
    pub moments: Vec<SerendipityMoment>,
}

// =============================================================================
// FATE FLASHBACKS
// =============================================================================

/// A weekly "fate flashback" story card generated by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FateFlashback {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    pub story_content: String,
    pub week_start_date: String,
    pub week_end_date: String,
    #[serde(default)]
    pub crossings_count: u32,
    #[serde(default)]
    pub shared_locations: Vec<String>,
    #[serde(default)]
    pub is_viewed: bool,
    #[serde(default)]
    pub is_shared: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FlashbacksResponse {
    #[serde(default)]
    pub flashbacks: Vec<FateFlashback>,
}
