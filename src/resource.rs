use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    errors::{ApiError, ApiResult},
    guard::Access,
    models::{Edge, EdgeFields, NewSong, Song, SongPatch},
    repository::ResourceStore,
    schema,
};

/// Resource
///
/// The capability descriptor of one CRUD-managed entity type. The generic handlers
/// in `handlers::crud` are written once against this trait; each entity only
/// declares its access policy, how request bodies become drafts and patches, how a
/// patch is merged, and which store holds it.
#[async_trait]
pub trait Resource: Serialize + Clone + Send + Sync + 'static {
    /// A validated create payload, ready for insertion.
    type Draft: Send + 'static;
    /// A validated partial update.
    type Patch: Send + 'static;

    /// Singular name used in logs.
    const NAME: &'static str;

    const LIST: Access;
    const SHOW: Access;
    const CREATE: Access;
    const UPDATE: Access;
    const DELETE: Access;

    fn id(&self) -> Uuid;

    /// The user that owns this resource, if the type has ownership at all.
    fn owner(&self) -> Option<Uuid> {
        None
    }

    fn draft(body: Value, caller: Option<&AuthUser>) -> ApiResult<Self::Draft>;

    fn patch(body: Value) -> ApiResult<Self::Patch>;

    /// Shallow merge of `patch` over `self`. Never touches the id.
    fn merge(&mut self, patch: Self::Patch);

    /// Value of the `Location` header sent with a 201, if any.
    fn location(&self) -> Option<String> {
        None
    }

    fn store(state: &AppState) -> ResourceStore<Self>;

    /// Runs after a successful insert. Failures here must not undo the insert.
    async fn after_insert(&self, _state: &AppState) {}

    /// Runs after a successful delete.
    async fn after_remove(&self, _state: &AppState) {}
}

#[async_trait]
impl Resource for Song {
    type Draft = NewSong;
    type Patch = SongPatch;

    const NAME: &'static str = "song";

    const LIST: Access = Access::Admin;
    const SHOW: Access = Access::Public;
    const CREATE: Access = Access::Authenticated;
    const UPDATE: Access = Access::Admin;
    const DELETE: Access = Access::OwnerOrAdmin;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner(&self) -> Option<Uuid> {
        Some(self.created_by)
    }

    fn draft(body: Value, caller: Option<&AuthUser>) -> ApiResult<NewSong> {
        let caller = caller.ok_or(ApiError::Unauthorized)?;
        schema::song_draft(&body, caller.id)
    }

    fn patch(body: Value) -> ApiResult<SongPatch> {
        schema::song_patch(&body)
    }

    fn merge(&mut self, patch: SongPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(artist) = patch.artist {
            self.artist = artist;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
        self.updated_at = Utc::now();
        self.refresh_derived();
    }

    fn location(&self) -> Option<String> {
        Some(self.api_location.clone())
    }

    fn store(state: &AppState) -> ResourceStore<Self> {
        state.songs.clone()
    }

    /// Records the song on its creator. Not transactional with the insert: a
    /// failure is logged and the song stays.
    async fn after_insert(&self, state: &AppState) {
        if let Err(e) = state.users.push_created_song(self.created_by, self.id).await {
            tracing::warn!(
                song_id = %self.id,
                user_id = %self.created_by,
                error = %e,
                "failed to record created song on its creator"
            );
        }
    }

    async fn after_remove(&self, state: &AppState) {
        if let Err(e) = state.users.pull_created_song(self.created_by, self.id).await {
            tracing::warn!(
                song_id = %self.id,
                user_id = %self.created_by,
                error = %e,
                "failed to remove deleted song from its creator"
            );
        }
    }
}

#[async_trait]
impl Resource for Edge {
    type Draft = EdgeFields;
    type Patch = EdgeFields;

    const NAME: &'static str = "edge";

    const LIST: Access = Access::Public;
    const SHOW: Access = Access::Public;
    const CREATE: Access = Access::Authenticated;
    const UPDATE: Access = Access::Admin;
    const DELETE: Access = Access::Authenticated;

    fn id(&self) -> Uuid {
        self.id
    }

    fn draft(body: Value, _caller: Option<&AuthUser>) -> ApiResult<EdgeFields> {
        schema::edge_fields(body)
    }

    fn patch(body: Value) -> ApiResult<EdgeFields> {
        schema::edge_fields(body)
    }

    fn merge(&mut self, patch: EdgeFields) {
        self.fields.extend(patch);
        self.updated_at = Utc::now();
    }

    fn store(state: &AppState) -> ResourceStore<Self> {
        state.edges.clone()
    }
}
