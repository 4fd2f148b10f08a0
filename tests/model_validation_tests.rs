use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde_json::{Value, json};
use songbook_api::{
    ApiError,
    auth::AuthUser,
    errors::{FieldError, field_from_constraint},
    guard::{self, Access},
    models::{Edge, Role, Song, SongPatch, User},
    schema,
    slug::{slugify, song_api_location, song_location},
};
use std::collections::BTreeMap;
use uuid::Uuid;

// --- Test Utilities ---

async fn body_json(err: ApiError) -> (StatusCode, Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

// --- Slugs ---

#[test]
fn test_song_location_from_title_and_artist() {
    assert_eq!(song_location("Florida", "Starfucker"), "/songs/florida-starfucker");
    assert_eq!(song_location("Don't Stop", "AC/DC"), "/songs/don-t-stop-ac-dc");
}

#[test]
fn test_slugify_alphabet_and_idempotence() {
    let inputs = ["Hello World!", "Ünïcødé Sóng", "  spaced  out  ", "already-a-slug-42"];
    for input in inputs {
        let slug = slugify(input);
        assert!(
            slug.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
            "unexpected character in {:?}",
            slug
        );
        assert_eq!(slugify(&slug), slug);
    }
    assert_eq!(slugify("already-a-slug-42"), "already-a-slug-42");
}

#[test]
fn test_song_api_location() {
    let id = Uuid::new_v4();
    assert_eq!(song_api_location(id), format!("/api/songs/{}", id));
}

// --- Serde shapes ---

#[test]
fn test_song_json_shape() {
    let id = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let now = Utc::now();
    let song = Song::from_stored(
        id,
        "Florida".into(),
        "Starfucker".into(),
        "https://example.com/florida".into(),
        owner,
        now,
        now,
    );

    let json = serde_json::to_value(&song).unwrap();

    assert_eq!(json["_id"], id.to_string());
    assert_eq!(json["createdBy"], owner.to_string());
    assert_eq!(json["location"], "/songs/florida-starfucker");
    assert_eq!(json["apiLocation"], format!("/api/songs/{}", id));
    assert!(json.get("createdAt").is_some());
    assert!(json.get("updatedAt").is_some());
    assert!(json.get("id").is_none());
}

#[test]
fn test_user_json_shape() {
    let user = User {
        id: Uuid::new_v4(),
        email: "someone@example.com".into(),
        role: Role::Admin,
        songs_created: vec![Uuid::new_v4()],
        created_at: Utc::now(),
    };

    let json = serde_json::to_value(&user).unwrap();

    assert_eq!(json["role"], "admin");
    assert_eq!(json["songsCreated"].as_array().unwrap().len(), 1);
}

#[test]
fn test_edge_fields_are_flattened() {
    let mut fields = BTreeMap::new();
    fields.insert("source".to_string(), json!("a"));
    fields.insert("weight".to_string(), json!(2));
    let edge = Edge {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        fields,
    };

    let json = serde_json::to_value(&edge).unwrap();

    assert_eq!(json["source"], "a");
    assert_eq!(json["weight"], 2);
    assert_eq!(json["_id"], edge.id.to_string());
}

#[test]
fn test_role_from_text() {
    assert_eq!(Role::from("admin"), Role::Admin);
    assert_eq!(Role::from("user"), Role::User);
    assert_eq!(Role::from("superuser"), Role::User);
    assert_eq!(Role::Admin.as_str(), "admin");
}

// --- Schema ---

#[test]
fn test_song_draft_keeps_only_known_fields() {
    let owner = Uuid::new_v4();
    let draft = schema::song_draft(
        &json!({"title": "Hours", "artist": "Tycho", "url": "u", "genre": "ambient"}),
        owner,
    )
    .unwrap();

    assert_eq!(draft.title, "Hours");
    assert_eq!(draft.created_by, owner);
}

#[test]
fn test_song_draft_rejects_blank_and_non_string_fields() {
    let err = schema::song_draft(&json!({"title": "  ", "artist": 7, "url": "u"}), Uuid::new_v4())
        .unwrap_err();

    match err {
        ApiError::Validation(errors) => {
            assert_eq!(errors.len(), 2);
            assert_eq!(errors[0].field, "title");
            assert_eq!(errors[1].field, "artist");
        }
        other => panic!("expected validation, got {:?}", other),
    }
}

#[test]
fn test_song_draft_missing_field_message() {
    let err = schema::song_draft(&json!({"title": "Hours", "artist": "Tycho"}), Uuid::new_v4())
        .unwrap_err();

    match err {
        ApiError::Validation(errors) => {
            assert_eq!(errors, vec![FieldError::required("url")]);
            assert_eq!(errors[0].message, "url is required");
        }
        other => panic!("expected validation, got {:?}", other),
    }
}

#[test]
fn test_song_patch_optionality() {
    let patch = schema::song_patch(&json!({"_id": "ignored", "artist": "Tycho"})).unwrap();
    assert_eq!(
        patch,
        SongPatch {
            artist: Some("Tycho".into()),
            ..SongPatch::default()
        }
    );

    let empty = schema::song_patch(&json!({})).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn test_song_patch_rejects_unknown_fields() {
    let err = schema::song_patch(&json!({"createdBy": "x", "location": "/elsewhere"})).unwrap_err();

    match err {
        ApiError::Validation(errors) => {
            let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
            assert_eq!(fields, vec!["createdBy", "location"]);
        }
        other => panic!("expected validation, got {:?}", other),
    }
}

#[test]
fn test_edge_fields_strip_reserved_keys() {
    let fields = schema::edge_fields(json!({
        "_id": "x",
        "id": "y",
        "createdAt": "z",
        "updatedAt": "w",
        "kind": "cover"
    }))
    .unwrap();

    assert_eq!(fields.len(), 1);
    assert_eq!(fields["kind"], "cover");
}

#[test]
fn test_new_user_requires_an_email_address() {
    assert!(matches!(
        schema::new_user(&json!({"email": "not-an-email"})),
        Err(ApiError::Validation(_))
    ));
    let user = schema::new_user(&json!({"email": "a@b.c", "role": "admin"})).unwrap();
    assert_eq!(user.role, Role::User);
}

// --- Guard ---

#[test]
fn test_can_mutate_truth_table() {
    let me = Uuid::new_v4();
    let someone_else = Uuid::new_v4();

    assert!(guard::can_mutate(me, Role::User, Some(me)));
    assert!(!guard::can_mutate(me, Role::User, Some(someone_else)));
    assert!(!guard::can_mutate(me, Role::User, None));
    assert!(guard::can_mutate(me, Role::Admin, Some(someone_else)));
    assert!(guard::can_mutate(me, Role::Admin, None));
}

#[test]
fn test_authorize_caller_policies() {
    let user = AuthUser {
        id: Uuid::new_v4(),
        role: Role::User,
    };
    let admin = AuthUser {
        id: Uuid::new_v4(),
        role: Role::Admin,
    };

    assert!(guard::authorize_caller(Access::Public, None).is_ok());
    assert!(matches!(
        guard::authorize_caller(Access::Authenticated, None),
        Err(ApiError::Unauthorized)
    ));
    assert!(guard::authorize_caller(Access::Authenticated, Some(&user)).is_ok());
    assert!(matches!(
        guard::authorize_caller(Access::Admin, Some(&user)),
        Err(ApiError::Forbidden)
    ));
    assert!(guard::authorize_caller(Access::Admin, Some(&admin)).is_ok());
    // Ownership is decided after the load.
    assert!(guard::authorize_caller(Access::OwnerOrAdmin, Some(&user)).is_ok());
    assert!(matches!(
        guard::authorize_owner(Access::OwnerOrAdmin, Some(&user), Some(Uuid::new_v4())),
        Err(ApiError::Forbidden)
    ));
    assert!(guard::authorize_owner(Access::OwnerOrAdmin, Some(&user), Some(user.id)).is_ok());
}

// --- Error mapping ---

#[tokio::test]
async fn test_validation_renders_field_array() {
    let (status, body) = body_json(ApiError::Validation(vec![
        FieldError::required("title"),
        FieldError::required("url"),
    ]))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!([
            {"field": "title", "message": "title is required"},
            {"field": "url", "message": "url is required"}
        ])
    );
}

#[tokio::test]
async fn test_duplicate_renders_single_entry_array() {
    let (status, body) = body_json(ApiError::duplicate("url")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!([{"field": "url", "message": "url already exists"}]));
}

#[tokio::test]
async fn test_not_found_has_empty_body() {
    let (status, body) = body_json(ApiError::NotFound).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_internal_error_detail_is_not_leaked() {
    let (status, body) = body_json(ApiError::Internal("connection refused at 10.0.0.3".into())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": {"message": "Internal server error"}}));
}

#[tokio::test]
async fn test_auth_errors_use_envelope() {
    let (status, body) = body_json(ApiError::Forbidden).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "Forbidden");

    let (status, body) = body_json(ApiError::Unauthorized).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Unauthorized");
}

#[test]
fn test_field_from_constraint() {
    assert_eq!(field_from_constraint("songs_url_key"), "url");
    assert_eq!(field_from_constraint("songs_created_by_fkey"), "createdBy");
    assert_eq!(field_from_constraint("users_email_key"), "email");
}

#[test]
fn test_row_not_found_maps_to_not_found() {
    assert!(matches!(ApiError::from(sqlx::Error::RowNotFound), ApiError::NotFound));
    assert!(matches!(
        ApiError::from(sqlx::Error::PoolTimedOut),
        ApiError::Internal(_)
    ));
}

#[test]
fn test_edge_schema_is_an_open_object() {
    use utoipa::OpenApi;

    #[derive(OpenApi)]
    #[openapi(components(schemas(Edge)))]
    struct EdgeDoc;

    let doc = serde_json::to_value(EdgeDoc::openapi()).unwrap();
    let edge = &doc["components"]["schemas"]["Edge"];
    assert!(!edge.is_null());
    assert!(edge.to_string().contains("_id"));
}
