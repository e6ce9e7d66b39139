use media_sync_models::{ProgressDetail, ProgressEvent, ProgressStatus, SyncProcess};
use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

/// Sending half of the progress channel.
///
/// The engine only emits; a closed receiver is ignored.
#[derive(Clone, Default)]
pub struct ProgressReporter {
    tx: Option<UnboundedSender<ProgressEvent>>,
}

impl ProgressReporter {
    pub fn new(tx: UnboundedSender<ProgressEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Reporter that drops every event
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: ProgressEvent) {
        trace!(
            process = %event.process,
            item = %event.item_name,
            status = %event.status,
            "progress"
        );
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }

    pub fn message(&self, process: SyncProcess, text: impl Into<String>) {
        self.emit(ProgressEvent::message(process, text));
    }

    pub fn summary(&self, process: SyncProcess, text: impl Into<String>) {
        let mut event = ProgressEvent::message(process, text);
        event.item_name = "Summary".to_string();
        self.emit(event);
    }
}

#[derive(Debug, Clone)]
enum ItemKind {
    Movie { year: Option<u32> },
    Show { external_id: Option<String> },
}

/// Event builder bound to one catalog item and its position in the run.
pub struct ItemProgress<'a> {
    reporter: &'a ProgressReporter,
    process: SyncProcess,
    item_name: String,
    current: usize,
    total: usize,
    kind: ItemKind,
}

impl<'a> ItemProgress<'a> {
    pub fn movie(
        reporter: &'a ProgressReporter,
        title: &str,
        year: Option<u32>,
        current: usize,
        total: usize,
    ) -> Self {
        Self {
            reporter,
            process: SyncProcess::Movies,
            item_name: title.to_string(),
            current,
            total,
            kind: ItemKind::Movie { year },
        }
    }

    pub fn show(
        reporter: &'a ProgressReporter,
        title: &str,
        external_id: &str,
        current: usize,
        total: usize,
    ) -> Self {
        Self {
            reporter,
            process: SyncProcess::TvShows,
            item_name: title.to_string(),
            current,
            total,
            kind: ItemKind::Show {
                external_id: Some(external_id.to_string()).filter(|id| !id.is_empty()),
            },
        }
    }

    fn build(
        &self,
        status: ProgressStatus,
        message: Option<String>,
        season: Option<u32>,
        episode: Option<u32>,
    ) -> ProgressEvent {
        let detail = match &self.kind {
            ItemKind::Movie { year } => ProgressDetail::Movie { year: *year },
            ItemKind::Show { external_id } => ProgressDetail::Episode {
                external_id: external_id.clone(),
                season,
                episode,
            },
        };
        ProgressEvent {
            process: self.process,
            item_name: self.item_name.clone(),
            current: self.current,
            total: self.total,
            status,
            message,
            detail,
        }
    }

    pub fn report(&self, status: ProgressStatus) {
        self.reporter.emit(self.build(status, None, None, None));
    }

    pub fn report_with(&self, status: ProgressStatus, message: impl Into<String>) {
        self.reporter
            .emit(self.build(status, Some(message.into()), None, None));
    }

    pub fn report_season(&self, status: ProgressStatus, season: u32) {
        self.reporter.emit(self.build(status, None, Some(season), None));
    }

    pub fn report_season_with(&self, status: ProgressStatus, season: u32, message: impl Into<String>) {
        self.reporter
            .emit(self.build(status, Some(message.into()), Some(season), None));
    }

    pub fn report_episode(&self, status: ProgressStatus, season: u32, episode: u32) {
        self.reporter
            .emit(self.build(status, None, Some(season), Some(episode)));
    }

    pub fn report_episode_with(
        &self,
        status: ProgressStatus,
        season: u32,
        episode: u32,
        message: impl Into<String>,
    ) {
        self.reporter
            .emit(self.build(status, Some(message.into()), Some(season), Some(episode)));
    }
}
