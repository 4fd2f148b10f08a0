use crate::errors::{ApiError, ApiResult};
use crate::models::{Edge, EdgeFields, NewSong, NewUser, Role, Song, User};
use crate::resource::Resource;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, types::Json};
use std::sync::Arc;
use uuid::Uuid;

/// ResourceRepository
///
/// Persistence contract for one resource type. Each operation is atomic at the
/// single-document level; there are no cross-document transactions.
///
/// **Send + Sync + async_trait** make `Arc<dyn ResourceRepository<R>>` shareable
/// across Axum's task boundaries.
#[async_trait]
pub trait ResourceRepository<R: Resource>: Send + Sync {
    /// All documents of this type, oldest first. Empty is not an error.
    async fn list(&self) -> ApiResult<Vec<R>>;
    /// `ApiError::NotFound` when no document has this id.
    async fn get_by_id(&self, id: Uuid) -> ApiResult<R>;
    /// Inserts a new document. Store constraints surface as Duplicate/Validation.
    async fn create(&self, draft: R::Draft) -> ApiResult<R>;
    /// Persists the mutable fields of an existing document.
    async fn replace(&self, entity: &R) -> ApiResult<R>;
    async fn remove(&self, id: Uuid) -> ApiResult<()>;

    /// update_merge
    ///
    /// Loads the current document, merges the patch over it and persists the
    /// result. A missing id short-circuits before any merge happens.
    async fn update_merge(&self, id: Uuid, patch: R::Patch) -> ApiResult<R> {
        let mut current = self.get_by_id(id).await?;
        current.merge(patch);
        self.replace(&current).await
    }
}

/// ResourceStore
///
/// The shared handle to one resource type's repository.
pub type ResourceStore<R> = Arc<dyn ResourceRepository<R>>;

/// UserRepository
///
/// Users are referenced, not owned, by this service: it reads them for
/// authentication and maintains each user's `songsCreated` list.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list_users(&self) -> ApiResult<Vec<User>>;
    async fn get_user(&self, id: Uuid) -> ApiResult<User>;
    async fn create_user(&self, user: NewUser) -> ApiResult<User>;
    /// Appends a song id to the user's created list.
    async fn push_created_song(&self, user_id: Uuid, song_id: Uuid) -> ApiResult<()>;
    /// Removes every occurrence of a song id from the user's created list.
    async fn pull_created_song(&self, user_id: Uuid, song_id: Uuid) -> ApiResult<()>;
}

pub type UserRepositoryState = Arc<dyn UserRepository>;

// --- Row types ---

#[derive(FromRow)]
struct SongRow {
    id: Uuid,
    title: String,
    artist: String,
    url: String,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SongRow> for Song {
    fn from(row: SongRow) -> Self {
        Song::from_stored(
            row.id,
            row.title,
            row.artist,
            row.url,
            row.created_by,
            row.created_at,
            row.updated_at,
        )
    }
}

#[derive(FromRow)]
struct EdgeRow {
    id: Uuid,
    doc: Json<EdgeFields>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EdgeRow> for Edge {
    fn from(row: EdgeRow) -> Self {
        Edge {
            id: row.id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            fields: row.doc.0,
        }
    }
}

/// `role` is stored as text; unknown values read as a plain user.
#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    role: String,
    songs_created: Vec<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            role: Role::from(row.role.as_str()),
            songs_created: row.songs_created,
            created_at: row.created_at,
        }
    }
}

const SONG_COLUMNS: &str = "id, title, artist, url, created_by, created_at, updated_at";
const EDGE_COLUMNS: &str = "id, doc, created_at, updated_at";
const USER_COLUMNS: &str = "id, email, role, songs_created, created_at";

/// PostgresRepository
///
/// The PostgreSQL-backed implementation of every repository trait. Driver errors
/// are classified by `From<sqlx::Error> for ApiError`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceRepository<Song> for PostgresRepository {
    async fn list(&self) -> ApiResult<Vec<Song>> {
        let query = format!("SELECT {SONG_COLUMNS} FROM songs ORDER BY created_at ASC");
        let rows = sqlx::query_as::<_, SongRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Song::from).collect())
    }

    async fn get_by_id(&self, id: Uuid) -> ApiResult<Song> {
        let query = format!("SELECT {SONG_COLUMNS} FROM songs WHERE id = $1");
        sqlx::query_as::<_, SongRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Song::from)
            .ok_or(ApiError::NotFound)
    }

    /// The `songs_url_key` unique index and the `created_by` foreign key are the
    /// store-side half of the song schema.
    async fn create(&self, draft: NewSong) -> ApiResult<Song> {
        let query = format!(
            "INSERT INTO songs (id, title, artist, url, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) RETURNING {SONG_COLUMNS}"
        );
        let row = sqlx::query_as::<_, SongRow>(&query)
            .bind(Uuid::new_v4())
            .bind(draft.title)
            .bind(draft.artist)
            .bind(draft.url)
            .bind(draft.created_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn replace(&self, song: &Song) -> ApiResult<Song> {
        let query = format!(
            "UPDATE songs SET title = $2, artist = $3, url = $4, updated_at = $5 \
             WHERE id = $1 RETURNING {SONG_COLUMNS}"
        );
        sqlx::query_as::<_, SongRow>(&query)
            .bind(song.id)
            .bind(&song.title)
            .bind(&song.artist)
            .bind(&song.url)
            .bind(song.updated_at)
            .fetch_optional(&self.pool)
            .await?
            .map(Song::from)
            .ok_or(ApiError::NotFound)
    }

    async fn remove(&self, id: Uuid) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM songs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceRepository<Edge> for PostgresRepository {
    async fn list(&self) -> ApiResult<Vec<Edge>> {
        let query = format!("SELECT {EDGE_COLUMNS} FROM edges ORDER BY created_at ASC");
        let rows = sqlx::query_as::<_, EdgeRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Edge::from).collect())
    }

    async fn get_by_id(&self, id: Uuid) -> ApiResult<Edge> {
        let query = format!("SELECT {EDGE_COLUMNS} FROM edges WHERE id = $1");
        sqlx::query_as::<_, EdgeRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Edge::from)
            .ok_or(ApiError::NotFound)
    }

    async fn create(&self, fields: EdgeFields) -> ApiResult<Edge> {
        let query = format!(
            "INSERT INTO edges (id, doc, created_at, updated_at) \
             VALUES ($1, $2, NOW(), NOW()) RETURNING {EDGE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, EdgeRow>(&query)
            .bind(Uuid::new_v4())
            .bind(Json(fields))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn replace(&self, edge: &Edge) -> ApiResult<Edge> {
        let query = format!(
            "UPDATE edges SET doc = $2, updated_at = $3 WHERE id = $1 RETURNING {EDGE_COLUMNS}"
        );
        sqlx::query_as::<_, EdgeRow>(&query)
            .bind(edge.id)
            .bind(Json(&edge.fields))
            .bind(edge.updated_at)
            .fetch_optional(&self.pool)
            .await?
            .map(Edge::from)
            .ok_or(ApiError::NotFound)
    }

    async fn remove(&self, id: Uuid) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM edges WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn list_users(&self) -> ApiResult<Vec<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC");
        let rows = sqlx::query_as::<_, UserRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn get_user(&self, id: Uuid) -> ApiResult<User> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::from)
            .ok_or(ApiError::NotFound)
    }

    async fn create_user(&self, user: NewUser) -> ApiResult<User> {
        let query = format!(
            "INSERT INTO users (id, email, role, created_at) \
             VALUES ($1, $2, $3, NOW()) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(Uuid::new_v4())
            .bind(user.email)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn push_created_song(&self, user_id: Uuid, song_id: Uuid) -> ApiResult<()> {
        let result = sqlx::query(
            "UPDATE users SET songs_created = array_append(songs_created, $2) WHERE id = $1",
        )
        .bind(user_id)
        .bind(song_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    async fn pull_created_song(&self, user_id: Uuid, song_id: Uuid) -> ApiResult<()> {
        let result = sqlx::query(
            "UPDATE users SET songs_created = array_remove(songs_created, $2) WHERE id = $1",
        )
        .bind(user_id)
        .bind(song_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}
