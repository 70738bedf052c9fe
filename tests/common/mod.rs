#![allow(dead_code)]

mod mock_cache;
mod mock_store;

use std::{collections::HashMap, sync::Arc};

use format_observer::{
    domain::{Event, EventKind},
    format::FormatDefaults,
    observer::EventObserver,
};
use serde_json::{Map, Value, json};

pub use mock_cache::RecordingCache;
pub use mock_store::{MockFormats, MockStore, StoreCall};

pub const FORMAT: &str = "designer";

/// Observer wired to mocks, with handles to inspect them
pub struct Harness {
    pub observer: EventObserver,
    pub store: MockStore,
    pub formats: MockFormats,
    pub cache: RecordingCache,
}

impl Harness {
    /// `courses` maps course ids to the format they use
    pub fn new(courses: &[(i64, &str)]) -> Self {
        Self::with_sections(courses, &[], &[])
    }

    pub fn with_sections(
        courses: &[(i64, &str)],
        option_names: &[&str],
        defaults: &[(&str, &str)],
    ) -> Self {
        let store = MockStore::default();
        let formats = MockFormats::new(courses, option_names);
        let cache = RecordingCache::default();
        let defaults = FormatDefaults::new(
            defaults
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect::<HashMap<_, _>>(),
        );

        let observer = EventObserver::new(
            FORMAT,
            Arc::new(formats.clone()),
            Arc::new(store.clone()),
            Arc::new(cache.clone()),
            Arc::new(defaults),
        );

        Self {
            observer,
            store,
            formats,
            cache,
        }
    }
}

pub fn event(kind: EventKind, course: i64, objectid: Option<i64>, user: Option<i64>) -> Event {
    Event {
        name: format!("\\core\\event\\{}", kind.short_name()),
        objectid,
        courseid: course,
        contextid: 1000 + course,
        relateduserid: user,
        other: Map::new(),
    }
}

pub fn section_created(course: i64, section: i64, sectionnum: i64) -> Event {
    let mut event = event(EventKind::SectionCreated, course, Some(section), None);
    event
        .other
        .insert("sectionnum".to_string(), Value::from(sectionnum));
    event
}

/// JSON line as the host's event bus would deliver it
pub fn event_json(kind: EventKind, course: i64, objectid: i64) -> String {
    json!({
        "eventname": format!("\\core\\event\\{}", kind.short_name()),
        "objectid": objectid,
        "courseid": course,
        "contextid": 1,
        "relateduserid": 7,
        "other": null,
    })
    .to_string()
}
