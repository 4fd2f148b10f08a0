use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::{ApiError, ApiResult};
use crate::models::{Edge, EdgeFields, NewSong, NewUser, Song, User};
use crate::repository::{ResourceRepository, UserRepository};

#[derive(Default)]
struct Tables {
    songs: Vec<Song>,
    edges: Vec<Edge>,
    users: Vec<User>,
}

/// MemoryStore
///
/// A process-local implementation of every repository trait, enforcing the same
/// constraints as the Postgres schema: unique song urls, unique user emails, and
/// `createdBy` referencing an existing user. Used by `APP_STORE=memory` and by tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResourceRepository<Song> for MemoryStore {
    async fn list(&self) -> ApiResult<Vec<Song>> {
        Ok(self.tables.read().await.songs.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> ApiResult<Song> {
        let tables = self.tables.read().await;
        tables
            .songs
            .iter()
            .find(|song| song.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create(&self, draft: NewSong) -> ApiResult<Song> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|user| user.id == draft.created_by) {
            return Err(ApiError::invalid(
                "createdBy",
                "createdBy must reference an existing record",
            ));
        }
        if tables.songs.iter().any(|song| song.url == draft.url) {
            return Err(ApiError::duplicate("url"));
        }
        let now = Utc::now();
        let song = Song::from_stored(
            Uuid::new_v4(),
            draft.title,
            draft.artist,
            draft.url,
            draft.created_by,
            now,
            now,
        );
        tables.songs.push(song.clone());
        Ok(song)
    }

    async fn replace(&self, song: &Song) -> ApiResult<Song> {
        let mut tables = self.tables.write().await;
        if tables
            .songs
            .iter()
            .any(|other| other.id != song.id && other.url == song.url)
        {
            return Err(ApiError::duplicate("url"));
        }
        let stored = tables
            .songs
            .iter_mut()
            .find(|stored| stored.id == song.id)
            .ok_or(ApiError::NotFound)?;
        // id, createdBy and createdAt stay as stored.
        stored.title = song.title.clone();
        stored.artist = song.artist.clone();
        stored.url = song.url.clone();
        stored.updated_at = song.updated_at;
        stored.refresh_derived();
        Ok(stored.clone())
    }

    async fn remove(&self, id: Uuid) -> ApiResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.songs.len();
        tables.songs.retain(|song| song.id != id);
        if tables.songs.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceRepository<Edge> for MemoryStore {
    async fn list(&self) -> ApiResult<Vec<Edge>> {
        Ok(self.tables.read().await.edges.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> ApiResult<Edge> {
        let tables = self.tables.read().await;
        tables
            .edges
            .iter()
            .find(|edge| edge.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create(&self, fields: EdgeFields) -> ApiResult<Edge> {
        let now = Utc::now();
        let edge = Edge {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            fields,
        };
        self.tables.write().await.edges.push(edge.clone());
        Ok(edge)
    }

    async fn replace(&self, edge: &Edge) -> ApiResult<Edge> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .edges
            .iter_mut()
            .find(|stored| stored.id == edge.id)
            .ok_or(ApiError::NotFound)?;
        stored.fields = edge.fields.clone();
        stored.updated_at = edge.updated_at;
        Ok(stored.clone())
    }

    async fn remove(&self, id: Uuid) -> ApiResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.edges.len();
        tables.edges.retain(|edge| edge.id != id);
        if tables.edges.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn list_users(&self) -> ApiResult<Vec<User>> {
        Ok(self.tables.read().await.users.clone())
    }

    async fn get_user(&self, id: Uuid) -> ApiResult<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create_user(&self, new_user: NewUser) -> ApiResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|user| user.email == new_user.email) {
            return Err(ApiError::duplicate("email"));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            role: new_user.role,
            songs_created: Vec::new(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn push_created_song(&self, user_id: Uuid, song_id: Uuid) -> ApiResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or(ApiError::NotFound)?;
        user.songs_created.push(song_id);
        Ok(())
    }

    async fn pull_created_song(&self, user_id: Uuid, song_id: Uuid) -> ApiResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or(ApiError::NotFound)?;
        user.songs_created.retain(|id| *id != song_id);
        Ok(())
    }
}
