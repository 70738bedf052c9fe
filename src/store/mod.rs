mod postgres;

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{CourseId, CourseModule, CourseModuleId, SectionId};

pub use postgres::{PgStore, connect_to_db};

/// Option name to value, in a stable order
pub type SectionOptions = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Relational store holding the format's option rows
#[async_trait]
pub trait OptionStore: Send + Sync {
    /// Delete every option row of the course, returning the number of rows removed
    async fn delete_course_options(&self, course: CourseId) -> Result<u64>;

    /// Delete the option rows of one course module
    async fn delete_module_options(&self, course: CourseId, cm: CourseModuleId) -> Result<u64>;

    /// Returns Ok(None) if the module does not exist
    async fn course_module(&self, cm: CourseModuleId) -> Result<Option<CourseModule>>;

    /// Insert or overwrite the section's format options
    async fn update_section_options(
        &self,
        course: CourseId,
        section: SectionId,
        options: &SectionOptions,
    ) -> Result<()>;
}
