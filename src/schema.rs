//! Field shapes and constraints for each resource type.
//!
//! Required-field checks happen here, before anything reaches a repository.
//! Uniqueness and foreign-key constraints are enforced by the store and surface
//! as `ApiError::Duplicate` / `ApiError::Validation` from the repository layer.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::{ApiError, ApiResult, FieldError};
use crate::models::{EDGE_RESERVED_KEYS, EdgeFields, NewSong, NewUser, Role, SongPatch};

/// Song fields that must be present on create.
pub const SONG_REQUIRED: [&str; 3] = ["title", "artist", "url"];

fn as_object(body: &Value) -> ApiResult<&Map<String, Value>> {
    body.as_object()
        .ok_or_else(|| ApiError::invalid("body", "expected a JSON object"))
}

/// Reads an optional text field, rejecting non-strings and blank strings.
fn text_field(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => {
            errors.push(FieldError::new(field, format!("{} must not be blank", field)));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(FieldError::new(field, format!("{} must be a string", field)));
            None
        }
    }
}

/// song_draft
///
/// Picks `title`, `artist` and `url` out of a create body. Every missing field
/// produces one error; other keys are ignored.
pub fn song_draft(body: &Value, created_by: Uuid) -> ApiResult<NewSong> {
    let object = as_object(body)?;
    let mut errors = Vec::new();

    let mut required = |field: &str| {
        let before = errors.len();
        let value = text_field(object, field, &mut errors);
        if value.is_none() && errors.len() == before {
            errors.push(FieldError::required(field));
        }
        value
    };
    let title = required("title");
    let artist = required("artist");
    let url = required("url");

    match (title, artist, url) {
        (Some(title), Some(artist), Some(url)) if errors.is_empty() => Ok(NewSong {
            title,
            artist,
            url,
            created_by,
        }),
        _ => Err(ApiError::Validation(errors)),
    }
}

/// song_patch
///
/// Builds an explicit partial update. `_id`/`id` are silently dropped; any other
/// key that is not a patchable field is reported.
pub fn song_patch(body: &Value) -> ApiResult<SongPatch> {
    let object = as_object(body)?;
    let mut errors = Vec::new();

    for key in object.keys() {
        if key == "_id" || key == "id" || SONG_REQUIRED.contains(&key.as_str()) {
            continue;
        }
        errors.push(FieldError::new(key.as_str(), format!("{} cannot be updated", key)));
    }

    let patch = SongPatch {
        title: text_field(object, "title", &mut errors),
        artist: text_field(object, "artist", &mut errors),
        url: text_field(object, "url", &mut errors),
    };

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// edge_fields
///
/// Edges accept any JSON object. Store-owned keys are stripped.
pub fn edge_fields(body: Value) -> ApiResult<EdgeFields> {
    match body {
        Value::Object(object) => Ok(object
            .into_iter()
            .filter(|(key, _)| !EDGE_RESERVED_KEYS.contains(&key.as_str()))
            .collect()),
        _ => Err(ApiError::invalid("body", "expected a JSON object")),
    }
}

/// new_user
///
/// Signup input. The role is always `user`; elevation happens out of band.
pub fn new_user(body: &Value) -> ApiResult<NewUser> {
    let object = as_object(body)?;
    let mut errors = Vec::new();

    let email = text_field(object, "email", &mut errors);
    match email {
        Some(email) if email.contains('@') => Ok(NewUser {
            email,
            role: Role::User,
        }),
        Some(_) => Err(ApiError::invalid("email", "email must be an email address")),
        None if errors.is_empty() => Err(ApiError::Validation(vec![FieldError::required("email")])),
        None => Err(ApiError::Validation(errors)),
    }
}
