mod cache_key;
mod event;
mod ids;

pub use cache_key::CacheKey;
pub use event::{Event, EventError, EventKind};
pub use ids::{ContextId, CourseId, CourseModule, CourseModuleId, SectionId, UserId};
