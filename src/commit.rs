use anyhow::{Context, Result};
use serde::Serialize;

use crate::api::VideoStore;
use crate::replace::ReplacementSet;

#[derive(Debug, Clone, Serialize)]
pub struct CommitError {
    pub video_id: String,
    pub message: String,
}

#[derive(Debug, Default, Serialize)]
pub struct CommitResult {
    pub updated_count: usize,
    pub errors: Vec<CommitError>,
}

/// Applies the replacement set against fresh descriptions, issuing one update
/// call per video that still changes. A failure on one video is recorded and
/// the batch moves on; it never aborts the remaining videos.
pub fn commit_batch(
    store: &dyn VideoStore,
    video_ids: &[String],
    rules: &ReplacementSet,
) -> CommitResult {
    let mut result = CommitResult::default();
    for video_id in video_ids {
        match commit_one(store, video_id, rules) {
            Ok(true) => result.updated_count += 1,
            Ok(false) => {}
            Err(err) => result.errors.push(CommitError {
                video_id: video_id.clone(),
                message: format!("{err:#}"),
            }),
        }
    }
    result
}

fn commit_one(store: &dyn VideoStore, video_id: &str, rules: &ReplacementSet) -> Result<bool> {
    // Fresh fetch rather than the preview snapshot: an edit made remotely
    // between preview and commit is respected, not clobbered.
    let video = store
        .video(video_id)
        .with_context(|| format!("fetching video {video_id}"))?;
    let (new_description, changed) = rules.apply(&video.description);
    if !changed {
        return Ok(false);
    }
    store
        .update_description(video_id, &new_description)
        .with_context(|| format!("updating video {video_id}"))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeStore;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn updates_every_changed_video() {
        let store = FakeStore::new()
            .with_video("v1", "old one")
            .with_video("v2", "old two");
        let rules = ReplacementSet::single("old", "new").expect("valid pair");

        let result = commit_batch(&store, &ids(&["v1", "v2"]), &rules);

        assert_eq!(result.updated_count, 2);
        assert!(result.errors.is_empty());
        assert_eq!(store.description_of("v1").as_deref(), Some("new one"));
        assert_eq!(store.description_of("v2").as_deref(), Some("new two"));
    }

    #[test]
    fn one_failing_update_does_not_abort_the_batch() {
        let store = FakeStore::new()
            .with_video("v1", "old")
            .with_video("v2", "old")
            .with_video("v3", "old")
            .failing_update("v2");
        let rules = ReplacementSet::single("old", "new").expect("valid pair");

        let result = commit_batch(&store, &ids(&["v1", "v2", "v3"]), &rules);

        assert_eq!(result.updated_count, 2);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].video_id, "v2");
        assert_eq!(store.description_of("v3").as_deref(), Some("new"));
    }

    #[test]
    fn unreadable_video_is_recorded_and_skipped() {
        let store = FakeStore::new()
            .with_video("v1", "old")
            .with_video("v2", "old")
            .failing_fetch("v1");
        let rules = ReplacementSet::single("old", "new").expect("valid pair");

        let result = commit_batch(&store, &ids(&["v1", "v2"]), &rules);

        assert_eq!(result.updated_count, 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].video_id, "v1");
    }

    #[test]
    fn unchanged_video_gets_no_update_call() {
        let store = FakeStore::new()
            .with_video("v1", "already fine")
            .with_video("v2", "old");
        let rules = ReplacementSet::single("old", "new").expect("valid pair");

        let result = commit_batch(&store, &ids(&["v1", "v2"]), &rules);

        assert_eq!(result.updated_count, 1);
        let calls = store.update_calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "v2");
    }

    #[test]
    fn second_commit_is_a_no_op_once_saturated() {
        let store = FakeStore::new().with_video("v1", "old text");
        let rules = ReplacementSet::single("old", "new").expect("valid pair");

        let first = commit_batch(&store, &ids(&["v1"]), &rules);
        assert_eq!(first.updated_count, 1);

        // The find-string no longer occurs, so the second pass issues no
        // redundant update call.
        let second = commit_batch(&store, &ids(&["v1"]), &rules);
        assert_eq!(second.updated_count, 0);
        assert!(second.errors.is_empty());
        assert_eq!(store.update_calls.borrow().len(), 1);
    }
}
