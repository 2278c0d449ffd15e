//! Scene-State Probe
//!
//! Narrow read interface onto the externally reported scene snapshot. The
//! core never mutates scene state; the consumer refreshes it every time it
//! posts an execution report.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ProbeError;
use crate::mailbox::{ExecutionReport, ResponseMailbox};

/// Objects currently in the scene and prefabs available to spawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneState {
    pub current_objects: BTreeSet<String>,
    pub available_prefabs: BTreeSet<String>,
}

impl SceneState {
    pub fn new<I, J, S, T>(current_objects: I, available_prefabs: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            current_objects: current_objects.into_iter().map(Into::into).collect(),
            available_prefabs: available_prefabs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_report(report: &ExecutionReport) -> Self {
        Self {
            current_objects: parse_name_list(&report.current_objects),
            available_prefabs: parse_name_list(&report.available_prefabs),
        }
    }

    pub fn has_object(&self, name: &str) -> bool {
        contains_ignore_case(&self.current_objects, name)
    }

    pub fn has_prefab(&self, name: &str) -> bool {
        contains_ignore_case(&self.available_prefabs, name)
    }
}

/// Split a comma-delimited list, trimming entries and dropping blanks.
pub fn parse_name_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Same case folding as `classifier::tokenize`.
fn contains_ignore_case(set: &BTreeSet<String>, name: &str) -> bool {
    let name = name.to_lowercase();
    set.iter().any(|entry| entry.to_lowercase() == name)
}

#[async_trait]
pub trait SceneProbe: Send + Sync {
    async fn fetch_state(&self) -> Result<SceneState, ProbeError>;
}

/// Reads the most recent report from an in-process mailbox.
pub struct MailboxSceneProbe {
    mailbox: Arc<ResponseMailbox>,
}

impl MailboxSceneProbe {
    pub fn new(mailbox: Arc<ResponseMailbox>) -> Self {
        Self { mailbox }
    }
}

#[async_trait]
impl SceneProbe for MailboxSceneProbe {
    async fn fetch_state(&self) -> Result<SceneState, ProbeError> {
        self.mailbox
            .read()
            .await
            .map(|report| SceneState::from_report(&report))
            .ok_or(ProbeError::Absent)
    }
}

/// Reads the report from a remote broker's `GET /response`.
#[derive(Clone)]
pub struct HttpSceneProbe {
    client: reqwest::Client,
    response_url: String,
}

#[derive(Deserialize)]
struct ResponseEnvelope {
    response: Option<ExecutionReport>,
}

impl HttpSceneProbe {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            response_url: format!("{}/response", base_url.trim_end_matches('/')),
        })
    }

    pub fn response_url(&self) -> &str {
        &self.response_url
    }
}

#[async_trait]
impl SceneProbe for HttpSceneProbe {
    async fn fetch_state(&self) -> Result<SceneState, ProbeError> {
        let response = self
            .client
            .get(&self.response_url)
            .send()
            .await
            .map_err(|e| ProbeError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProbeError::Transport(format!(
                "{} returned {}",
                self.response_url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::Transport(e.to_string()))?;
        parse_response_body(&body)
    }
}

/// Decode a `{"response": ...}` body into scene state.
fn parse_response_body(body: &str) -> Result<SceneState, ProbeError> {
    let envelope: ResponseEnvelope =
        serde_json::from_str(body).map_err(|e| ProbeError::Malformed(e.to_string()))?;

    envelope
        .response
        .map(|report| SceneState::from_report(&report))
        .ok_or(ProbeError::Absent)
}

/// Fixed scene state.
pub struct StaticSceneProbe {
    state: SceneState,
}

impl StaticSceneProbe {
    pub fn new(state: SceneState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl SceneProbe for StaticSceneProbe {
    async fn fetch_state(&self) -> Result<SceneState, ProbeError> {
        Ok(self.state.clone())
    }
}
