use anyhow::{Result, bail};

use crate::api::VideoStore;
use crate::commit::{self, CommitResult};
use crate::preview::{self, PreviewEntry, PreviewNotice};
use crate::replace::ReplacementSet;

/// Holds the one live preview between the preview action and the commit
/// action. A new preview replaces the previous one outright; commit consumes
/// the preview unconditionally, so stale entries can never be committed twice.
#[derive(Default)]
pub struct EditSession {
    previewed: Option<Vec<PreviewEntry>>,
}

#[derive(Debug)]
pub enum CommitOutcome {
    /// No live preview; nothing was fetched or updated.
    NothingToCommit,
    Completed(CommitResult),
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_previewed(&self) -> bool {
        self.previewed.is_some()
    }

    pub fn entries(&self) -> &[PreviewEntry] {
        self.previewed.as_deref().unwrap_or(&[])
    }

    /// Builds and installs a new preview, replacing any previous one.
    /// An empty replacement set is rejected before any remote call is made.
    pub fn preview(
        &mut self,
        store: &dyn VideoStore,
        video_ids: &[String],
        rules: &ReplacementSet,
    ) -> Result<Vec<PreviewNotice>> {
        if rules.is_empty() {
            bail!("nothing to find: the replacement set is empty");
        }
        let report = preview::build_preview(store, video_ids, rules);
        self.previewed = Some(report.entries);
        Ok(report.notices)
    }

    /// Consumes the live preview and applies it. The session returns to idle
    /// whatever the batch outcome, so a repeated commit cannot replay stale
    /// entries.
    pub fn commit(&mut self, store: &dyn VideoStore, rules: &ReplacementSet) -> CommitOutcome {
        let Some(entries) = self.previewed.take() else {
            return CommitOutcome::NothingToCommit;
        };
        let video_ids: Vec<String> = entries.into_iter().map(|entry| entry.video_id).collect();
        CommitOutcome::Completed(commit::commit_batch(store, &video_ids, rules))
    }
}
