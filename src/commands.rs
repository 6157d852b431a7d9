//! Request/response records and the JSON command dispatcher that sits in
//! front of [`ProgressTracker`](crate::tracker::ProgressTracker).
//!
//! Missing, mistyped and non-finite fields are turned away here. Reversed
//! intervals pass through and are handled by the tracker's interval policy.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    models::{Interval, SessionKey},
    tracker::SyncOutcome,
    AppState,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    pub user_id: String,
    pub video_id: String,
    pub from: f64,
    pub to: f64,
    pub current_time: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub user_id: String,
    pub video_id: String,
    pub current_time: f64,
    #[serde(default)]
    pub video_duration: Option<f64>,
    #[serde(default)]
    pub is_ended: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub user_id: String,
    pub video_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_watch_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_time: Option<f64>,
}

impl From<SyncOutcome> for SyncResponse {
    fn from(outcome: SyncOutcome) -> Self {
        let message = outcome.message().to_string();
        match outcome {
            SyncOutcome::NoPendingData { .. } => Self {
                message,
                total_watch_time: None,
                is_completed: None,
                resume_time: None,
            },
            SyncOutcome::Synced(summary) => Self {
                message,
                total_watch_time: Some(summary.total_watch_time),
                is_completed: Some(summary.is_completed),
                resume_time: Some(summary.resume_time),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// One line of input, tagged by its `command` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum Command {
    Track(TrackRequest),
    Sync(SyncRequest),
    Resume(SessionQuery),
    Watchtime(SessionQuery),
    History(SessionQuery),
    Health,
}

/// One line of output: `{"ok": ...}` or `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Reply {
    Ok(Value),
    Error(String),
}

fn session_key(user_id: &str, video_id: &str) -> Result<SessionKey, String> {
    if user_id.trim().is_empty() || video_id.trim().is_empty() {
        return Err("userId and videoId must not be empty".into());
    }
    Ok(SessionKey::new(user_id, video_id))
}

fn ensure_finite(field: &str, value: f64) -> Result<(), String> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(format!("{field} must be a finite number"))
    }
}

pub async fn track_progress(
    state: &AppState,
    request: TrackRequest,
) -> Result<MessageResponse, String> {
    let key = session_key(&request.user_id, &request.video_id)?;
    ensure_finite("from", request.from)?;
    ensure_finite("to", request.to)?;
    ensure_finite("currentTime", request.current_time)?;

    state
        .tracker
        .track(
            &key,
            Interval::new(request.from, request.to),
            request.current_time,
        )
        .await
        .map_err(|e| e.to_string())?;

    Ok(MessageResponse {
        message: "Tracked".into(),
    })
}

pub async fn sync_progress(state: &AppState, request: SyncRequest) -> Result<SyncResponse, String> {
    let key = session_key(&request.user_id, &request.video_id)?;
    ensure_finite("currentTime", request.current_time)?;
    if let Some(duration) = request.video_duration {
        ensure_finite("videoDuration", duration)?;
    }

    if request.is_ended {
        log::info!("[sync] {key} reports playback ended at {}s", request.current_time);
    }

    let outcome = state
        .tracker
        .sync(&key, request.current_time, request.video_duration)
        .await;
    Ok(outcome.into())
}

pub fn get_resume_time(state: &AppState, query: SessionQuery) -> Result<f64, String> {
    let key = session_key(&query.user_id, &query.video_id)?;
    Ok(state.tracker.resume_point(&key))
}

pub fn get_watch_time(state: &AppState, query: SessionQuery) -> Result<f64, String> {
    let key = session_key(&query.user_id, &query.video_id)?;
    Ok(state.tracker.total_watch_time(&key))
}

pub fn get_watch_history(state: &AppState, query: SessionQuery) -> Result<Vec<Interval>, String> {
    let key = session_key(&query.user_id, &query.video_id)?;
    Ok(state.tracker.watch_history(&key))
}

fn to_value<T: Serialize>(value: T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

async fn execute(state: &AppState, command: Command) -> Result<Value, String> {
    match command {
        Command::Track(request) => to_value(track_progress(state, request).await?),
        Command::Sync(request) => to_value(sync_progress(state, request).await?),
        Command::Resume(query) => to_value(get_resume_time(state, query)?),
        Command::Watchtime(query) => to_value(get_watch_time(state, query)?),
        Command::History(query) => to_value(get_watch_history(state, query)?),
        Command::Health => to_value(HealthResponse { status: "OK" }),
    }
}

/// Parse one input line and run it.
pub async fn dispatch(state: &AppState, line: &str) -> Reply {
    let command = match serde_json::from_str::<Command>(line) {
        Ok(command) => command,
        Err(err) => {
            warn!("Rejected malformed command: {err}");
            return Reply::Error(format!("malformed request: {err}"));
        }
    };

    match execute(state, command).await {
        Ok(value) => Reply::Ok(value),
        Err(message) => {
            warn!("Command failed: {message}");
            Reply::Error(message)
        }
    }
}
