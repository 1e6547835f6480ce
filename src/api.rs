use anyhow::Result;

/// One page of a paginated remote listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ChannelInfo {
    pub title: String,
    pub subscriber_count: String,
    pub video_count: String,
    /// Id of the channel's uploads playlist, used when no playlist filter
    /// is selected.
    pub uploads_playlist: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PlaylistRef {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct VideoRef {
    pub video_id: String,
    pub title: String,
    pub published_at: String,
}

#[derive(Debug, Clone)]
pub struct VideoInfo {
    pub title: String,
    pub published_at: String,
    pub description: String,
}

/// Capability-scoped view of the remote video store. Every call can fail
/// independently; callers decide whether a failure aborts or is recorded.
pub trait VideoStore {
    fn channel_info(&self) -> Result<ChannelInfo>;
    fn playlists_page(&self, page_token: Option<&str>) -> Result<Page<PlaylistRef>>;
    fn playlist_items_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<Page<VideoRef>>;
    fn video(&self, id: &str) -> Result<VideoInfo>;
    fn update_description(&self, id: &str, description: &str) -> Result<()>;
}
