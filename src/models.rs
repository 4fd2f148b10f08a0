use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::slug;

// --- Identity ---

/// Role
///
/// The RBAC marker carried by every user. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl From<&str> for Role {
    /// Anything other than `admin` is a plain user.
    fn from(value: &str) -> Self {
        match value {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

/// User
///
/// The identity record referenced by songs. Token issuance lives elsewhere;
/// this service only reads the role and maintains the `songsCreated` list.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    /// Ids of the songs this user created, in creation order.
    pub songs_created: Vec<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// NewUser
///
/// Validated input for inserting a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub role: Role,
}

// --- Songs ---

/// Song
///
/// A stored song plus its two derived paths. `location` and `api_location` are
/// never persisted; they are recomputed from the stored fields whenever a song
/// is built or merged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Song {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    /// Globally unique across songs.
    pub url: String,
    /// FK to the creating user.
    pub created_by: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    /// e.g. `/songs/florida-starfucker`
    pub location: String,
    /// e.g. `/api/songs/<id>`
    pub api_location: String,
}

impl Song {
    /// Builds a song from its stored fields, filling in the derived paths.
    pub fn from_stored(
        id: Uuid,
        title: String,
        artist: String,
        url: String,
        created_by: Uuid,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let mut song = Song {
            id,
            title,
            artist,
            url,
            created_by,
            created_at,
            updated_at,
            location: String::new(),
            api_location: String::new(),
        };
        song.refresh_derived();
        song
    }

    pub fn refresh_derived(&mut self) {
        self.location = slug::song_location(&self.title, &self.artist);
        self.api_location = slug::song_api_location(self.id);
    }
}

/// NewSong
///
/// A song draft that has passed schema validation. `created_by` always comes
/// from the authenticated caller, never from the request body.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub url: String,
    pub created_by: Uuid,
}

/// SongPatch
///
/// Partial update payload for PUT /api/songs/{id}. Only the named fields can change;
/// `_id` is stripped and `createdBy` is immutable.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct SongPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SongPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.artist.is_none() && self.url.is_none()
    }
}

// --- Edges ---

/// The free-form body of an edge document.
pub type EdgeFields = BTreeMap<String, serde_json::Value>;

/// Edge
///
/// A generic linked entity with no declared constraints and no owner.
/// Everything except the bookkeeping fields is stored verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default, PartialEq)]
pub struct Edge {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub fields: EdgeFields,
}

/// Keys of an edge document that belong to the store, not the client.
pub const EDGE_RESERVED_KEYS: [&str; 4] = ["_id", "id", "createdAt", "updatedAt"];
