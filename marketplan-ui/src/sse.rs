//! Server-Sent Events stream, store subscription and file watcher.

use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use notify::{Event as NotifyEvent, EventKind, PollWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use marketplan::project::Project;

use crate::state::{AppState, ChangeEvent};

const BRIDGE_POLL: Duration = Duration::from_secs(1);

#[derive(Serialize)]
struct SsePayload {
    #[serde(rename = "type")]
    event_type: &'static str,
}

impl From<ChangeEvent> for SsePayload {
    fn from(event: ChangeEvent) -> Self {
        let event_type = match event {
            ChangeEvent::PlanChanged => "plan_changed",
            ChangeEvent::StepChanged => "step_changed",
            ChangeEvent::ConfigChanged => "config_changed",
        };
        SsePayload { event_type }
    }
}

/// SSE endpoint handler.
pub async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.event_tx.subscribe();

    let stream = async_stream::stream! {
        yield Ok(Event::default().event("connected").data("{}"));

        loop {
            match rx.recv().await {
                Ok(change_event) => {
                    let payload = SsePayload::from(change_event);
                    if let Ok(json) = serde_json::to_string(&payload) {
                        yield Ok(Event::default().event("change").data(json));
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "SSE client lagged, some events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

/// Forward every store update for the project's current plan as
/// `plan_changed`.
///
/// Call again whenever the plan key changes; the previous bridge stops at
/// its next idle poll.
pub fn bridge_store_updates(state: &AppState, project: &Project) {
    let Some(sync) = project.builder.sync() else {
        return;
    };
    let updates = sync.store().subscribe(sync.key());
    let key = sync.key().clone();
    let generation = state.bridge_generation.fetch_add(1, Ordering::SeqCst) + 1;
    let current = state.bridge_generation.clone();
    let tx = state.event_tx.clone();
    tokio::task::spawn_blocking(move || {
        loop {
            match updates.recv_timeout(BRIDGE_POLL) {
                Ok(_) => {
                    let _ = tx.send(ChangeEvent::PlanChanged);
                }
                Err(RecvTimeoutError::Timeout) if current.load(Ordering::SeqCst) == generation => {}
                Err(_) => break,
            }
        }
        debug!(%key, "store bridge stopped");
    });
}

/// Start the file watcher in a background task.
pub fn start_file_watcher(state: AppState) {
    tokio::spawn(async move {
        if let Err(e) = run_file_watcher(state).await {
            warn!(error = %e, "file watcher failed");
        }
    });
}

/// Files the watcher reacts to.
struct Watched {
    plan_path: Option<PathBuf>,
    config_path: PathBuf,
}

async fn watched_paths(state: &AppState) -> Watched {
    let project = state.project.lock().await;
    let plan_path = project
        .builder
        .sync()
        .and_then(|sync| sync.store().location(sync.key()));
    Watched {
        plan_path,
        config_path: state.config_path.clone(),
    }
}

async fn run_file_watcher(state: AppState) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel::<NotifyEvent>(100);

    let mut watcher = PollWatcher::new(
        move |res: Result<NotifyEvent, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.try_send(event);
            }
        },
        notify::Config::default().with_poll_interval(Duration::from_millis(250)),
    )?;

    for dir in watch_dirs(&watched_paths(&state).await) {
        std::fs::create_dir_all(&dir)?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        info!(path = %dir.display(), "watching directory");
    }

    let mut pending_events: Vec<NotifyEvent> = Vec::new();
    let mut flush_tick = tokio::time::interval(Duration::from_millis(250));
    flush_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            Some(event) = rx.recv() => {
                pending_events.push(event);
            }
            _ = flush_tick.tick() => {
                if pending_events.is_empty() {
                    continue;
                }
                let watched = watched_paths(&state).await;
                let changes = classify(&watched, &pending_events);
                pending_events.clear();
                apply_changes(&state, &changes).await;
            }
        }
    }
}

fn watch_dirs(watched: &Watched) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = [watched.plan_path.as_deref(), Some(watched.config_path.as_path())]
        .into_iter()
        .flatten()
        .filter_map(Path::parent)
        .map(Path::to_path_buf)
        .collect();
    dirs.sort();
    dirs.dedup();
    dirs
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Changes {
    plan: bool,
    config: bool,
}

fn classify(watched: &Watched, events: &[NotifyEvent]) -> Changes {
    let mut changes = Changes::default();
    for event in events {
        if !matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ) {
            continue;
        }
        for path in &event.paths {
            if watched.plan_path.as_ref() == Some(path) {
                changes.plan = true;
            } else if path == &watched.config_path {
                changes.config = true;
            }
        }
    }
    changes
}

/// Reload a plan written by another process (e.g. the CLI) and announce it.
async fn apply_changes(state: &AppState, changes: &Changes) {
    if changes.plan {
        let mut project = state.project.lock().await;
        let stored = project.builder.sync().and_then(|sync| sync.load());
        if let Some(plan) = stored
            && &plan != project.builder.plan()
        {
            debug!("reloading plan changed on disk");
            project.builder.replace_plan(plan);
            state.notify(ChangeEvent::PlanChanged);
        }
    }
    if changes.config {
        debug!("broadcasting config change");
        state.notify(ChangeEvent::ConfigChanged);
    }
}
