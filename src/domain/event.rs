use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::{ContextId, CourseId, UserId};

const EVENT_NAMESPACE: &str = "\\core\\event\\";

#[derive(Error, Debug)]
pub enum EventError {
    #[error("no observer registered for {0}")]
    UnknownEvent(String),
    #[error("malformed event payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Events the observer subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    SectionCreated,
    CourseDeleted,
    CourseCompletionUpdated,
    CourseUpdated,
    CourseCompleted,
    ModuleCompletionUpdated,
    ModuleCreated,
    ModuleDeleted,
    ModuleUpdated,
    SectionDeleted,
    SectionUpdated,
}

impl EventKind {
    pub const ALL: [EventKind; 11] = [
        Self::SectionCreated,
        Self::CourseDeleted,
        Self::CourseCompletionUpdated,
        Self::CourseUpdated,
        Self::CourseCompleted,
        Self::ModuleCompletionUpdated,
        Self::ModuleCreated,
        Self::ModuleDeleted,
        Self::ModuleUpdated,
        Self::SectionDeleted,
        Self::SectionUpdated,
    ];

    /// Short name of the event class, without namespace
    pub fn short_name(self) -> &'static str {
        match self {
            Self::SectionCreated => "course_section_created",
            Self::CourseDeleted => "course_deleted",
            Self::CourseCompletionUpdated => "course_completion_updated",
            Self::CourseUpdated => "course_updated",
            Self::CourseCompleted => "course_completed",
            Self::ModuleCompletionUpdated => "course_module_completion_updated",
            Self::ModuleCreated => "course_module_created",
            Self::ModuleDeleted => "course_module_deleted",
            Self::ModuleUpdated => "course_module_updated",
            Self::SectionDeleted => "course_section_deleted",
            Self::SectionUpdated => "course_section_updated",
        }
    }

    /// Resolves a fully qualified event name such as `\core\event\course_updated`.
    /// The leading backslash is optional.
    pub fn from_name(name: &str) -> Result<Self, EventError> {
        let qualified = name.trim();
        let short = qualified
            .strip_prefix(EVENT_NAMESPACE)
            .or_else(|| qualified.strip_prefix(&EVENT_NAMESPACE[1..]))
            .ok_or_else(|| EventError::UnknownEvent(name.to_string()))?;

        Self::ALL
            .into_iter()
            .find(|kind| kind.short_name() == short)
            .ok_or_else(|| EventError::UnknownEvent(name.to_string()))
    }
}

/// Event data as delivered by the host's event bus
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    #[serde(rename = "eventname")]
    pub name: String,
    #[serde(default)]
    pub objectid: Option<i64>,
    pub courseid: CourseId,
    pub contextid: ContextId,
    #[serde(default)]
    pub relateduserid: Option<UserId>,
    #[serde(default, deserialize_with = "other_or_empty")]
    pub other: Map<String, Value>,
}

/// The host sends `null` instead of an empty object when there is nothing extra
fn other_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Event {
    pub fn from_json(raw: &str) -> Result<Self, EventError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn kind(&self) -> Result<EventKind, EventError> {
        EventKind::from_name(&self.name)
    }

    /// Section number carried by section events in `other`
    pub fn section_number(&self) -> Option<i64> {
        self.other.get("sectionnum").and_then(Value::as_i64)
    }
}
