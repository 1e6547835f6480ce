use serde::Serialize;

use crate::api::VideoStore;
use crate::diff;
use crate::replace::ReplacementSet;

/// A proposed, not-yet-applied description change for one video.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewEntry {
    pub video_id: String,
    pub title: String,
    pub published_at: String,
    pub original_description: String,
    pub new_description: String,
    pub rendered_diff: String,
}

/// A video that could not be read during preview. Reported alongside the
/// entries so no skipped video goes unmentioned.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewNotice {
    pub video_id: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct PreviewReport {
    pub entries: Vec<PreviewEntry>,
    pub notices: Vec<PreviewNotice>,
}

/// Read-only pass over the given videos: fetches each description, applies
/// the replacement set, and keeps only the videos whose description actually
/// changes, in input order. An unreadable video becomes a notice; it never
/// stops the rest of the batch. Nothing is mutated remotely.
pub fn build_preview(
    store: &dyn VideoStore,
    video_ids: &[String],
    rules: &ReplacementSet,
) -> PreviewReport {
    let mut report = PreviewReport::default();
    for video_id in video_ids {
        let video = match store.video(video_id) {
            Ok(video) => video,
            Err(err) => {
                report.notices.push(PreviewNotice {
                    video_id: video_id.clone(),
                    message: format!("{err:#}"),
                });
                continue;
            }
        };
        let (new_description, changed) = rules.apply(&video.description);
        if !changed {
            continue;
        }
        let rendered_diff = diff::render(&video.description, &new_description);
        report.entries.push(PreviewEntry {
            video_id: video_id.clone(),
            title: video.title,
            published_at: video.published_at,
            original_description: video.description,
            new_description,
            rendered_diff,
        });
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeStore;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn keeps_only_videos_whose_description_changes() {
        let store = FakeStore::new()
            .with_video("v1", "old text here")
            .with_video("v2", "nothing relevant")
            .with_video("v3", "more old text");
        let rules = ReplacementSet::single("old", "new").expect("valid pair");

        let report = build_preview(&store, &ids(&["v1", "v2", "v3"]), &rules);

        let changed: Vec<_> = report
            .entries
            .iter()
            .map(|entry| entry.video_id.as_str())
            .collect();
        assert_eq!(changed, ["v1", "v3"]);
        assert_eq!(report.entries[0].new_description, "new text here");
        assert!(report.entries[0].rendered_diff.contains("<del>old text here</del>"));
        assert!(report.notices.is_empty());
    }

    #[test]
    fn output_follows_input_order() {
        let store = FakeStore::new()
            .with_video("v1", "target")
            .with_video("v2", "target")
            .with_video("v3", "target");
        let rules = ReplacementSet::single("target", "hit").expect("valid pair");

        let report = build_preview(&store, &ids(&["v3", "v1", "v2"]), &rules);

        let order: Vec<_> = report
            .entries
            .iter()
            .map(|entry| entry.video_id.as_str())
            .collect();
        assert_eq!(order, ["v3", "v1", "v2"]);
    }

    #[test]
    fn unreadable_video_becomes_a_notice_and_the_rest_continue() {
        let store = FakeStore::new()
            .with_video("v1", "fix me")
            .with_video("v2", "fix me")
            .with_video("v3", "fix me")
            .failing_fetch("v2");
        let rules = ReplacementSet::single("fix", "fixed").expect("valid pair");

        let report = build_preview(&store, &ids(&["v1", "v2", "v3"]), &rules);

        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.notices.len(), 1);
        assert_eq!(report.notices[0].video_id, "v2");
    }

    #[test]
    fn preview_never_issues_an_update_call() {
        let store = FakeStore::new()
            .with_video("v1", "old")
            .with_video("v2", "old")
            .failing_fetch("v2");
        let rules = ReplacementSet::single("old", "new").expect("valid pair");

        build_preview(&store, &ids(&["v1", "v2"]), &rules);
        build_preview(&store, &ids(&["v1"]), &rules);

        assert!(store.update_calls.borrow().is_empty());
    }
}
