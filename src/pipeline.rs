use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::TrackerSettings;
use crate::event::{self, EventError};
use crate::report::{FileOutcome, FileReport, ScenarioOutcome, SyncReport};
use crate::scenario::{SegmentError, SpecificationDocument};
use crate::source::{self, SourceError, SourceHost};
use crate::tracker::{IssueTracker, TrackerError, TrackerSynchronizer};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Malformed specification file {file}: {source}")]
    Segment {
        file: String,
        #[source]
        source: SegmentError,
    },

    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// One run: a pull request event in, Jira test cases out.
pub struct Pipeline<'a> {
    pub source: &'a dyn SourceHost,
    pub tracker: &'a dyn IssueTracker,
    pub settings: &'a TrackerSettings,
    /// Suffix identifying specification files
    pub extension: &'a str,
}

impl<'a> Pipeline<'a> {
    /// Process one webhook payload.
    ///
    /// Returns `Ok(None)` when the event is not a merged pull request, or is
    /// one but lacks the branch, head commit or commits URL. Every
    /// specification file of the commit is synchronized in listing order, and
    /// every scenario in document order. The first failure aborts the run;
    /// test cases synchronized before it stay in Jira.
    pub async fn run(&self, payload: Value) -> Result<Option<SyncReport>, PipelineError> {
        if !event::should_be_handled(&payload) {
            info!("not a merged pull request, nothing to do");
            return Ok(None);
        }

        let event = match event::decode(payload) {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "merged pull request payload is incomplete, nothing to do");
                return Ok(None);
            }
        };
        let pull_request = &event.pull_request;
        let ticket_id = event::resolve_ticket_id(&pull_request.head.branch, &self.settings.project_key)?;
        info!(ticket = %ticket_id, merged_at = ?pull_request.merged_at, "syncing test cases");

        let commit_url = event::commit_url(&event.repository.commits_url, &pull_request.head.sha);
        let changed = self.source.changed_files(&commit_url).await?;
        info!(files = changed.len(), "fetched changed files");

        let synchronizer = TrackerSynchronizer::new(self.tracker, self.settings);
        let mut files = Vec::with_capacity(changed.len());
        for file in changed {
            let span = info_span!("file", name = %file.filename, status = %file.status);
            let outcome = self
                .sync_file(&synchronizer, &ticket_id, &file)
                .instrument(span)
                .await?;
            files.push(FileReport {
                filename: file.filename,
                status: file.status,
                outcome,
            });
        }

        Ok(Some(SyncReport {
            ticket_id,
            pull_request: event.summary(),
            files,
        }))
    }

    async fn sync_file(
        &self,
        synchronizer: &TrackerSynchronizer<'_>,
        ticket_id: &str,
        file: &source::ChangedFile,
    ) -> Result<FileOutcome, PipelineError> {
        if !source::is_specification_file(file, self.extension) {
            debug!("not a specification file");
            return Ok(FileOutcome::NotSpecification);
        }
        if file.is_removed() {
            info!("specification file removed, skipping");
            return Ok(FileOutcome::Removed);
        }

        let text = self.source.file_text(&file.raw_url).await?;
        let document = SpecificationDocument::parse(&text);
        info!(scenarios = document.blocks.len(), "parsed specification file");

        let mut scenarios = Vec::with_capacity(document.blocks.len());
        for block in &document.blocks {
            let record = block
                .to_record(&document.feature_description)
                .map_err(|source| PipelineError::Segment {
                    file: file.filename.clone(),
                    source,
                })?;
            let action = synchronizer.sync(ticket_id, &record).await?;
            scenarios.push(ScenarioOutcome {
                name: record.name,
                action,
            });
        }
        Ok(FileOutcome::Synced(scenarios))
    }
}
