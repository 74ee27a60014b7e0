//! Typed representation of one startup snapshot.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use bootviz_error::{Error, ErrorKind, Result};

use crate::duration::parse_period;

/// Parent id reserved for top-level steps.
pub const NO_PARENT: u64 = 0;

/// One key/value tag attached to a startup step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One instrumented startup step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupEvent {
    pub id: u64,
    /// [`NO_PARENT`] for top-level steps.
    pub parent_id: u64,
    pub name: String,
    pub duration: Duration,
    /// Insertion order is preserved; duplicate keys are kept.
    pub tags: Vec<Tag>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl StartupEvent {
    pub fn new(id: u64, parent_id: u64, name: impl Into<String>, duration: Duration) -> Self {
        Self {
            id,
            parent_id,
            name: name.into(),
            duration,
            tags: Vec::new(),
            start_time: None,
            end_time: None,
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(key, value));
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id == NO_PARENT
    }
}

/// One complete startup timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub spring_boot_version: Option<String>,
    pub start_time: Option<String>,
    pub events: Vec<StartupEvent>,
}

impl Snapshot {
    /// Decode the JSON body of a startup endpoint response.
    pub fn from_json(payload: &[u8]) -> Result<Self> {
        let wire: WireSnapshot = serde_json::from_slice(payload).map_err(|e| {
            Error::new(
                ErrorKind::DeserializationFailed,
                format!("invalid startup payload: {e}"),
            )
            .with_operation("snapshot::from_json")
            .with_context("line", e.line().to_string())
            .set_source(e)
        })?;

        let events = wire
            .timeline
            .events
            .into_iter()
            .map(WireEvent::into_event)
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.with_operation("snapshot::from_json"))?;

        debug!(
            events = events.len(),
            version = wire.spring_boot_version.as_deref().unwrap_or("unknown"),
            "decoded startup snapshot"
        );

        Ok(Self {
            spring_boot_version: wire.spring_boot_version,
            start_time: wire.timeline.start_time,
            events,
        })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

// Wire format

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSnapshot {
    #[serde(default)]
    spring_boot_version: Option<String>,
    timeline: WireTimeline,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTimeline {
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    events: Vec<WireEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEvent {
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
    duration: String,
    startup_step: WireStep,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStep {
    name: String,
    id: u64,
    #[serde(default, alias = "parentID")]
    parent_id: Option<u64>,
    #[serde(default)]
    tags: Option<Vec<WireTag>>,
}

#[derive(Debug, Deserialize)]
struct WireTag {
    key: String,
    #[serde(default)]
    value: Option<String>,
}

impl WireEvent {
    fn into_event(self) -> Result<StartupEvent> {
        let step = self.startup_step;
        let duration = parse_period(&self.duration)
            .map_err(|e| e.with_context("event_id", step.id.to_string()))?;

        Ok(StartupEvent {
            id: step.id,
            parent_id: step.parent_id.unwrap_or(NO_PARENT),
            name: step.name,
            duration,
            tags: step
                .tags
                .unwrap_or_default()
                .into_iter()
                .map(|t| Tag::new(t.key, t.value.unwrap_or_default()))
                .collect(),
            start_time: self.start_time,
            end_time: self.end_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAYLOAD: &str = r#"{
        "springBootVersion": "3.2.0",
        "timeline": {
            "startTime": "2024-01-01T10:00:00.000Z",
            "events": [
                {
                    "startTime": "2024-01-01T10:00:00.100Z",
                    "endTime": "2024-01-01T10:00:00.600Z",
                    "duration": "PT0.5S",
                    "startupStep": {
                        "name": "spring.beans.instantiate",
                        "id": 2,
                        "parentId": 1,
                        "tags": [
                            { "key": "beanName", "value": "dataSource" },
                            { "key": "beanName", "value": "dataSource2" }
                        ]
                    }
                },
                {
                    "startTime": "2024-01-01T10:00:00.000Z",
                    "endTime": "2024-01-01T10:00:02.000Z",
                    "duration": "PT2S",
                    "startupStep": {
                        "name": "spring.context.refresh",
                        "id": 1,
                        "parentId": null,
                        "tags": []
                    }
                }
            ]
        }
    }"#;

    #[test]
    fn test_decode_snapshot() {
        let snapshot = Snapshot::from_json(PAYLOAD.as_bytes()).unwrap();

        assert_eq!(snapshot.spring_boot_version.as_deref(), Some("3.2.0"));
        assert_eq!(
            snapshot.start_time.as_deref(),
            Some("2024-01-01T10:00:00.000Z")
        );
        assert_eq!(snapshot.len(), 2);

        let bean = &snapshot.events[0];
        assert_eq!(bean.id, 2);
        assert_eq!(bean.parent_id, 1);
        assert_eq!(bean.duration, Duration::from_millis(500));
        assert_eq!(
            bean.tags,
            vec![
                Tag::new("beanName", "dataSource"),
                Tag::new("beanName", "dataSource2"),
            ]
        );

        let refresh = &snapshot.events[1];
        assert!(refresh.is_root());
        assert!(refresh.tags.is_empty());
    }

    #[test]
    fn test_decode_accepts_upper_case_parent_key() {
        let payload = r#"{"timeline":{"events":[
            {"duration":"PT1S","startupStep":{"name":"a","id":3,"parentID":7}}
        ]}}"#;
        let snapshot = Snapshot::from_json(payload.as_bytes()).unwrap();

        assert_eq!(snapshot.events[0].parent_id, 7);
        assert_eq!(snapshot.spring_boot_version, None);
    }

    #[test]
    fn test_decode_missing_parent_is_root() {
        let payload = r#"{"timeline":{"events":[
            {"duration":"PT1S","startupStep":{"name":"a","id":3,"tags":null}}
        ]}}"#;
        let snapshot = Snapshot::from_json(payload.as_bytes()).unwrap();

        assert!(snapshot.events[0].is_root());
    }

    #[test]
    fn test_decode_malformed_duration_aborts() {
        let payload = r#"{"timeline":{"events":[
            {"duration":"PT1S","startupStep":{"name":"a","id":1}},
            {"duration":"P0.5S","startupStep":{"name":"b","id":2,"parentId":1}}
        ]}}"#;
        let err = Snapshot::from_json(payload.as_bytes()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MalformedDuration);
        assert_eq!(err.context_value("event_id"), Some("2"));
        assert_eq!(err.operation(), "snapshot::from_json");
    }

    #[test]
    fn test_decode_invalid_json() {
        let err = Snapshot::from_json(b"{not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeserializationFailed);
        assert!(err.source_ref().is_some());
    }

    #[test]
    fn test_decode_missing_timeline() {
        let err = Snapshot::from_json(br#"{"springBootVersion":"3.2.0"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeserializationFailed);
    }
}
