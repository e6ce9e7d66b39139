use crate::output::{print_json, OutputFormat};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use media_sync_models::{ProgressDetail, ProgressEvent, ProgressStatus, SyncProcess};
use owo_colors::OwoColorize;
use std::collections::HashMap;
use std::io::IsTerminal;

/// Renders engine progress events: bars on a terminal, JSON lines or
/// structured log records otherwise.
pub struct SyncUI {
    multi: MultiProgress,
    bars: HashMap<SyncProcess, ProgressBar>,
    format: OutputFormat,
    quiet: bool,
    interactive: bool,
}

impl SyncUI {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        let interactive = is_interactive() && !format.is_json() && !quiet;

        if !interactive {
            tracing::info!(
                operation = "ui_init",
                mode = "non_interactive",
                "Running in non-interactive mode - progress bars disabled"
            );
        }

        Self {
            multi: MultiProgress::new(),
            bars: HashMap::new(),
            format,
            quiet,
            interactive,
        }
    }

    fn bar(&mut self, process: SyncProcess) -> ProgressBar {
        if let Some(bar) = self.bars.get(&process) {
            return bar.clone();
        }
        let bar = self.multi.add(ProgressBar::new(0));
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {prefix:>8} [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
        }
        bar.set_prefix(process.name());
        self.bars.insert(process, bar.clone());
        bar
    }

    pub fn handle(&mut self, event: &ProgressEvent) {
        if self.format.is_json() {
            if !self.quiet {
                if let Ok(value) = serde_json::to_value(event) {
                    print_json(self.format, &value);
                }
            }
            return;
        }

        if !self.interactive {
            log_event(event);
            return;
        }

        if event.detail == ProgressDetail::Message {
            let text = event.message.as_deref().unwrap_or_default();
            let line = if event.item_name.is_empty() {
                format!("{} {}", "•".bright_blue(), text)
            } else {
                format!("{} {}: {}", "•".bright_blue(), event.item_name.bold(), text)
            };
            let _ = self.multi.println(line);
            return;
        }

        let bar = self.bar(event.process);
        if event.total > 0 {
            bar.set_length(event.total as u64);
            bar.set_position((event.current as u64 + 1).min(event.total as u64));
        }
        bar.set_message(event.item_name.clone());

        if is_notable(event.status) {
            let _ = self.multi.println(describe(event));
        }
    }

    pub fn finish(&self) {
        for bar in self.bars.values() {
            bar.finish_and_clear();
        }
    }
}

/// Statuses that changed something or need attention
fn is_notable(status: ProgressStatus) -> bool {
    matches!(
        status,
        ProgressStatus::Sync
            | ProgressStatus::AddRemote
            | ProgressStatus::WatchedRemote
            | ProgressStatus::Remove
            | ProgressStatus::ShouldRemove
            | ProgressStatus::ErrorAddRemote
            | ProgressStatus::Message
    )
}

fn label(event: &ProgressEvent) -> String {
    match (&event.detail, event.season(), event.episode()) {
        (ProgressDetail::Movie { year: Some(year) }, _, _) => format!("{} ({})", event.item_name, year),
        (_, Some(season), Some(episode)) => format!("{} S{:02}E{:02}", event.item_name, season, episode),
        (_, Some(season), None) => format!("{} S{:02}", event.item_name, season),
        _ => event.item_name.clone(),
    }
}

fn describe(event: &ProgressEvent) -> String {
    let status = match event.status {
        ProgressStatus::ErrorAddRemote => event.status.red().to_string(),
        ProgressStatus::ShouldRemove | ProgressStatus::Remove | ProgressStatus::Message => {
            event.status.yellow().to_string()
        }
        _ => event.status.green().to_string(),
    };
    match &event.message {
        Some(message) => format!("{:>16} {} ({})", status, label(event), message),
        None => format!("{:>16} {}", status, label(event)),
    }
}

fn log_event(event: &ProgressEvent) {
    let detail = event.message.as_deref().unwrap_or_default();
    if is_notable(event.status) {
        tracing::info!(
            operation = "progress",
            process = %event.process,
            item = %label(event),
            status = %event.status,
            current = event.current,
            total = event.total,
            detail,
            "Sync progress update"
        );
    } else {
        tracing::debug!(
            operation = "progress",
            process = %event.process,
            item = %label(event),
            status = %event.status,
            current = event.current,
            total = event.total,
            "Sync progress update"
        );
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
