use anyhow::{Context, Result};

use crate::api::{Page, PlaylistRef, VideoRef, VideoStore};

/// Walks a paged listing to completion, preserving server order. Every item
/// the source reports appears exactly once; a failing page fetch aborts the
/// walk rather than returning a partial list.
pub fn collect_pages<T, F>(mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(Option<&str>) -> Result<Page<T>>,
{
    let mut items = Vec::new();
    let mut token: Option<String> = None;
    loop {
        let page = fetch_page(token.as_deref())?;
        items.extend(page.items);
        match page.next_page_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }
    Ok(items)
}

pub fn owned_playlists(store: &dyn VideoStore) -> Result<Vec<PlaylistRef>> {
    collect_pages(|token| store.playlists_page(token)).context("listing playlists")
}

pub fn playlist_videos(store: &dyn VideoStore, playlist_id: &str) -> Result<Vec<VideoRef>> {
    collect_pages(|token| store.playlist_items_page(playlist_id, token))
        .with_context(|| format!("listing items of playlist {playlist_id}"))
}

/// Resolves the videos to operate on: a selected playlist, or the channel's
/// uploads playlist when no filter is given.
pub fn video_ids(store: &dyn VideoStore, playlist_id: Option<&str>) -> Result<Vec<String>> {
    let playlist = match playlist_id {
        Some(id) => id.to_string(),
        None => {
            store
                .channel_info()
                .context("resolving the channel's uploads playlist")?
                .uploads_playlist
        }
    };
    let videos = playlist_videos(store, &playlist)?;
    Ok(videos.into_iter().map(|video| video.video_id).collect())
}
