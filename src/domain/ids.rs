pub type CourseId = i64;
pub type SectionId = i64;
pub type CourseModuleId = i64;
pub type UserId = i64;
pub type ContextId = i64;

/// Row of the host's `course_modules` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseModule {
    id: CourseModuleId,
    course: CourseId,
}

impl CourseModule {
    pub fn new(id: CourseModuleId, course: CourseId) -> Self {
        Self { id, course }
    }

    pub fn id(&self) -> CourseModuleId {
        self.id
    }

    pub fn course(&self) -> CourseId {
        self.course
    }
}
