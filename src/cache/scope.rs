//! Key sets invalidated for each scope of change.
//!
//! Every scope touches the same seven families of course data; they only
//! differ in which families get narrowed to a section or a user. Module scope
//! adds the joined module options on top of course scope.

use anyhow::Result;

use crate::{
    cache::Cache,
    domain::{CacheKey, CourseId, SectionId, UserId},
};

pub const COURSE_SCOPE_KEYS: usize = 7;

fn scoped_keys(
    course: CourseId,
    section: Option<SectionId>,
    user: Option<UserId>,
) -> [CacheKey; COURSE_SCOPE_KEYS] {
    [
        CacheKey::ValidSectionCompleted { course, section },
        CacheKey::UserSectionCompleted { course, section },
        CacheKey::ProgressUncompletion { course, user },
        CacheKey::DueOverdueActivities { course, user },
        CacheKey::CriteriaProgress { course, user },
        CacheKey::CourseActivities(course),
        CacheKey::CourseSectionsIncomplete(course),
    ]
}

pub fn course_keys(course: CourseId) -> [CacheKey; COURSE_SCOPE_KEYS] {
    scoped_keys(course, None, None)
}

pub fn user_course_keys(course: CourseId, user: UserId) -> [CacheKey; COURSE_SCOPE_KEYS] {
    scoped_keys(course, None, Some(user))
}

pub fn section_keys(course: CourseId, section: SectionId) -> [CacheKey; COURSE_SCOPE_KEYS] {
    scoped_keys(course, Some(section), None)
}

pub fn module_keys(course: CourseId) -> Vec<CacheKey> {
    let mut keys = course_keys(course).to_vec();
    keys.push(CacheKey::ModuleOptionsJoin(course));
    keys
}

/// Invalidate every key in order, stopping at the first failure
pub async fn invalidate_keys(cache: &dyn Cache, keys: &[CacheKey]) -> Result<()> {
    for key in keys {
        cache.invalidate(key).await?;
    }
    tracing::debug!(count = keys.len(), "Invalidated cache keys");
    Ok(())
}
