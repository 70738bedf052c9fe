use std::fmt::Display;

use super::{CourseId, SectionId, UserId};

/// Key of a cached piece of derived course data.
///
/// Every family carries the course it belongs to. Families that can be
/// narrowed further carry an optional section or user; `None` addresses every
/// entry of that family for the course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    ValidSectionCompleted {
        course: CourseId,
        section: Option<SectionId>,
    },
    UserSectionCompleted {
        course: CourseId,
        section: Option<SectionId>,
    },
    ProgressUncompletion {
        course: CourseId,
        user: Option<UserId>,
    },
    DueOverdueActivities {
        course: CourseId,
        user: Option<UserId>,
    },
    CriteriaProgress {
        course: CourseId,
        user: Option<UserId>,
    },
    CourseActivities(CourseId),
    CourseSectionsIncomplete(CourseId),
    ModuleOptionsJoin(CourseId),
    PrerequisiteCourses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyFamily {
    ValidSectionCompleted,
    UserSectionCompleted,
    ProgressUncompletion,
    DueOverdueActivities,
    CriteriaProgress,
    CourseActivities,
    CourseSectionsIncomplete,
    ModuleOptionsJoin,
    PrerequisiteCourses,
}

impl KeyFamily {
    fn prefix(self) -> &'static str {
        match self {
            Self::ValidSectionCompleted => "v_s_c_",
            Self::UserSectionCompleted => "u_s_c_",
            Self::ProgressUncompletion => "c_p_u_c_",
            Self::DueOverdueActivities => "d_o_a_c_",
            Self::CriteriaProgress => "c_p_",
            Self::CourseActivities => "g_c_a",
            Self::CourseSectionsIncomplete => "g_c_s_ic",
            Self::ModuleOptionsJoin => "fdo_cm_j_",
            Self::PrerequisiteCourses => "prerequisites_courses",
        }
    }
}

impl CacheKey {
    fn family(&self) -> KeyFamily {
        match self {
            Self::ValidSectionCompleted { .. } => KeyFamily::ValidSectionCompleted,
            Self::UserSectionCompleted { .. } => KeyFamily::UserSectionCompleted,
            Self::ProgressUncompletion { .. } => KeyFamily::ProgressUncompletion,
            Self::DueOverdueActivities { .. } => KeyFamily::DueOverdueActivities,
            Self::CriteriaProgress { .. } => KeyFamily::CriteriaProgress,
            Self::CourseActivities(_) => KeyFamily::CourseActivities,
            Self::CourseSectionsIncomplete(_) => KeyFamily::CourseSectionsIncomplete,
            Self::ModuleOptionsJoin(_) => KeyFamily::ModuleOptionsJoin,
            Self::PrerequisiteCourses => KeyFamily::PrerequisiteCourses,
        }
    }

    /// Course the key belongs to, `None` for site-wide entries
    pub fn course(&self) -> Option<CourseId> {
        match *self {
            Self::ValidSectionCompleted { course, .. }
            | Self::UserSectionCompleted { course, .. }
            | Self::ProgressUncompletion { course, .. }
            | Self::DueOverdueActivities { course, .. }
            | Self::CriteriaProgress { course, .. }
            | Self::CourseActivities(course)
            | Self::CourseSectionsIncomplete(course)
            | Self::ModuleOptionsJoin(course) => Some(course),
            Self::PrerequisiteCourses => None,
        }
    }

    /// Section or user narrowing the key, if any
    pub fn qualifier(&self) -> Option<i64> {
        match *self {
            Self::ValidSectionCompleted { section, .. }
            | Self::UserSectionCompleted { section, .. } => section,
            Self::ProgressUncompletion { user, .. }
            | Self::DueOverdueActivities { user, .. }
            | Self::CriteriaProgress { user, .. } => user,
            _ => None,
        }
    }

    /// Whether the key can be narrowed but is not, i.e. it stands for a whole family
    pub fn is_course_wide(&self) -> bool {
        matches!(
            self,
            Self::ValidSectionCompleted { section: None, .. }
                | Self::UserSectionCompleted { section: None, .. }
                | Self::ProgressUncompletion { user: None, .. }
                | Self::DueOverdueActivities { user: None, .. }
                | Self::CriteriaProgress { user: None, .. }
        )
    }

    /// Whether invalidating `self` must also drop `other`
    pub fn covers(&self, other: &CacheKey) -> bool {
        if self == other {
            return true;
        }
        self.is_course_wide() && self.family() == other.family() && self.course() == other.course()
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = self.family().prefix();
        match (self.course(), self.qualifier()) {
            (Some(course), Some(qualifier)) => write!(f, "{prefix}{course}_{qualifier}"),
            (Some(course), None) => write!(f, "{prefix}{course}"),
            (None, _) => write!(f, "{prefix}"),
        }
    }
}
