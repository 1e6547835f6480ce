use anyhow::{Context, Result, anyhow, bail};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value as JsonValue, json};

use crate::api::{ChannelInfo, Page, PlaylistRef, VideoInfo, VideoRef, VideoStore};
use crate::auth::AccessToken;

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const PAGE_SIZE: &str = "50";

/// Blocking client for the YouTube Data API v3, authenticated with an opaque
/// bearer token. Calls are sequential; there is no retry policy.
pub struct YouTubeClient {
    http: Client,
    token: AccessToken,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(token: AccessToken, base_url: impl Into<String>) -> Self {
        YouTubeClient {
            http: Client::new(),
            token,
            base_url: base_url.into(),
        }
    }

    fn get<T: DeserializeOwned>(&self, resource: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{resource}", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.token.secret())
            .query(query)
            .send()
            .with_context(|| format!("calling {resource}"))?;
        let status = response.status();
        let body = response
            .text()
            .with_context(|| format!("reading {resource} response"))?;
        if !status.is_success() {
            bail!("{resource} request failed with {status}: {body}");
        }
        serde_json::from_str(&body).with_context(|| format!("decoding {resource} response"))
    }

    fn put(&self, resource: &str, query: &[(&str, &str)], body: &JsonValue) -> Result<()> {
        let url = format!("{}/{resource}", self.base_url);
        let response = self
            .http
            .put(&url)
            .bearer_auth(self.token.secret())
            .query(query)
            .json(body)
            .send()
            .with_context(|| format!("calling {resource}"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("{resource} update failed with {status}: {body}");
        }
        Ok(())
    }
}

fn paged_query<'a>(
    base: &[(&'a str, &'a str)],
    page_token: Option<&'a str>,
) -> Vec<(&'a str, &'a str)> {
    let mut query = base.to_vec();
    if let Some(token) = page_token {
        query.push(("pageToken", token));
    }
    query
}

impl VideoStore for YouTubeClient {
    fn channel_info(&self) -> Result<ChannelInfo> {
        let response = self.get(
            "channels",
            &[("part", "snippet,contentDetails,statistics"), ("mine", "true")],
        )?;
        channel_from_response(response)
    }

    fn playlists_page(&self, page_token: Option<&str>) -> Result<Page<PlaylistRef>> {
        let query = paged_query(
            &[("part", "snippet"), ("mine", "true"), ("maxResults", PAGE_SIZE)],
            page_token,
        );
        Ok(playlists_from_response(self.get("playlists", &query)?))
    }

    fn playlist_items_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<Page<VideoRef>> {
        let query = paged_query(
            &[
                ("part", "snippet"),
                ("playlistId", playlist_id),
                ("maxResults", PAGE_SIZE),
            ],
            page_token,
        );
        Ok(playlist_items_from_response(
            self.get("playlistItems", &query)?,
        ))
    }

    fn video(&self, id: &str) -> Result<VideoInfo> {
        let response = self.get("videos", &[("part", "snippet"), ("id", id)])?;
        video_from_response(response, id)
    }

    fn update_description(&self, id: &str, description: &str) -> Result<()> {
        // The update endpoint replaces the whole snippet, so the current one
        // is fetched and carried back with only the description swapped.
        let current: JsonValue = self.get("videos", &[("part", "snippet"), ("id", id)])?;
        let snippet = current
            .get("items")
            .and_then(|items| items.get(0))
            .and_then(|item| item.get("snippet"))
            .cloned()
            .ok_or_else(|| anyhow!("video {id} not found"))?;
        let JsonValue::Object(mut snippet) = snippet else {
            bail!("video {id} returned an unexpected snippet shape");
        };
        snippet.insert(
            "description".to_string(),
            JsonValue::String(description.to_string()),
        );
        let body = json!({ "id": id, "snippet": snippet });
        self.put("videos", &[("part", "snippet")], &body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    snippet: TitleSnippet,
    content_details: ChannelContentDetails,
    statistics: ChannelStatistics,
}

#[derive(Debug, Deserialize)]
struct TitleSnippet {
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    #[serde(default)]
    subscriber_count: String,
    #[serde(default)]
    video_count: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    id: String,
    snippet: TitleSnippet,
}

#[derive(Debug, Deserialize)]
struct PlaylistVideoItem {
    snippet: PlaylistVideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistVideoSnippet {
    title: String,
    published_at: String,
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    published_at: String,
    #[serde(default)]
    description: String,
}

fn channel_from_response(response: ListResponse<ChannelItem>) -> Result<ChannelInfo> {
    let item = response
        .items
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("channel listing returned no items"))?;
    Ok(ChannelInfo {
        title: item.snippet.title,
        subscriber_count: item.statistics.subscriber_count,
        video_count: item.statistics.video_count,
        uploads_playlist: item.content_details.related_playlists.uploads,
    })
}

fn playlists_from_response(response: ListResponse<PlaylistItem>) -> Page<PlaylistRef> {
    Page {
        items: response
            .items
            .into_iter()
            .map(|item| PlaylistRef {
                id: item.id,
                title: item.snippet.title,
            })
            .collect(),
        next_page_token: response.next_page_token,
    }
}

fn playlist_items_from_response(response: ListResponse<PlaylistVideoItem>) -> Page<VideoRef> {
    Page {
        items: response
            .items
            .into_iter()
            .map(|item| VideoRef {
                video_id: item.snippet.resource_id.video_id,
                title: item.snippet.title,
                published_at: item.snippet.published_at,
            })
            .collect(),
        next_page_token: response.next_page_token,
    }
}

fn video_from_response(response: ListResponse<VideoItem>, id: &str) -> Result<VideoInfo> {
    let item = response
        .items
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("video {id} not found"))?;
    Ok(VideoInfo {
        title: item.snippet.title,
        published_at: item.snippet.published_at,
        description: item.snippet.description,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn channel_response_decodes_into_channel_info() {
        let raw = json!({
            "items": [{
                "snippet": { "title": "My Channel" },
                "contentDetails": { "relatedPlaylists": { "uploads": "UUabc" } },
                "statistics": { "subscriberCount": "1234", "videoCount": "56" }
            }]
        });
        let response: ListResponse<ChannelItem> =
            serde_json::from_value(raw).expect("channel decodes");
        let info = channel_from_response(response).expect("channel info");
        assert_eq!(info.title, "My Channel");
        assert_eq!(info.subscriber_count, "1234");
        assert_eq!(info.uploads_playlist, "UUabc");
    }

    #[test]
    fn empty_channel_listing_is_an_error() {
        let response: ListResponse<ChannelItem> =
            serde_json::from_value(json!({ "items": [] })).expect("empty decodes");
        assert!(channel_from_response(response).is_err());
    }

    #[test]
    fn playlist_items_carry_the_video_id_and_the_page_token() {
        let raw = json!({
            "items": [{
                "snippet": {
                    "title": "Episode 1",
                    "publishedAt": "2024-03-01T10:00:00Z",
                    "resourceId": { "videoId": "vid123" }
                }
            }],
            "nextPageToken": "CAUQAA"
        });
        let response: ListResponse<PlaylistVideoItem> =
            serde_json::from_value(raw).expect("items decode");
        let page = playlist_items_from_response(response);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].video_id, "vid123");
        assert_eq!(page.next_page_token.as_deref(), Some("CAUQAA"));
    }

    #[test]
    fn final_page_has_no_token() {
        let response: ListResponse<PlaylistVideoItem> =
            serde_json::from_value(json!({ "items": [] })).expect("empty decodes");
        let page = playlist_items_from_response(response);
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn video_response_decodes_with_a_missing_description() {
        let raw = json!({
            "items": [{
                "snippet": {
                    "title": "Untitled",
                    "publishedAt": "2024-03-01T10:00:00Z"
                }
            }]
        });
        let response: ListResponse<VideoItem> = serde_json::from_value(raw).expect("decodes");
        let video = video_from_response(response, "vid123").expect("video info");
        assert_eq!(video.title, "Untitled");
        assert_eq!(video.description, "");
    }

    #[test]
    fn missing_video_names_the_id() {
        let response: ListResponse<VideoItem> =
            serde_json::from_value(json!({ "items": [] })).expect("decodes");
        let err = video_from_response(response, "vid123").unwrap_err();
        assert!(err.to_string().contains("vid123"));
    }
}
