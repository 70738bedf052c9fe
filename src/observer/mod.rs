mod context;

use std::sync::Arc;

use thiserror::Error;

use crate::{
    cache::{
        Cache,
        scope::{self, invalidate_keys},
    },
    domain::{CacheKey, CourseId, CourseModuleId, Event, EventError, EventKind, SectionId, UserId},
    format::{FormatResolver, OptionDefaults},
    store::{OptionStore, SectionOptions},
};

pub use context::RequestContext;

#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("failed to resolve course format: {0:#}")]
    Format(anyhow::Error),
    #[error("option store failed: {0:#}")]
    Store(anyhow::Error),
    #[error("cache invalidation failed: {0:#}")]
    Cache(anyhow::Error),
    #[error("event has no {0}")]
    MissingField(&'static str),
    #[error(transparent)]
    Event(#[from] EventError),
}

/// Keeps cached course data of one format in step with course events
pub struct EventObserver {
    format: String,
    formats: Arc<dyn FormatResolver>,
    store: Arc<dyn OptionStore>,
    cache: Arc<dyn Cache>,
    defaults: Arc<dyn OptionDefaults>,
}

fn object_id(event: &Event) -> Result<i64, ObserverError> {
    event.objectid.ok_or(ObserverError::MissingField("objectid"))
}

fn related_user(event: &Event) -> Result<UserId, ObserverError> {
    event
        .relateduserid
        .ok_or(ObserverError::MissingField("relateduserid"))
}

impl EventObserver {
    pub fn new(
        format: impl Into<String>,
        formats: Arc<dyn FormatResolver>,
        store: Arc<dyn OptionStore>,
        cache: Arc<dyn Cache>,
        defaults: Arc<dyn OptionDefaults>,
    ) -> Self {
        Self {
            format: format.into(),
            formats,
            store,
            cache,
            defaults,
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Route an event to its handler
    #[tracing::instrument(
        name = "observer::handle",
        skip_all,
        fields(event = %event.name, course = event.courseid)
    )]
    pub async fn handle(&self, event: &Event, ctx: &RequestContext) -> Result<(), ObserverError> {
        match event.kind()? {
            EventKind::SectionCreated => self.section_created(event, ctx).await,
            EventKind::CourseDeleted => self.course_deleted(event).await,
            EventKind::CourseCompletionUpdated => self.course_completion_updated(event).await,
            EventKind::CourseUpdated => self.course_updated(event).await,
            EventKind::CourseCompleted => self.course_completed(event).await,
            EventKind::ModuleCompletionUpdated => self.module_completion_updated(event).await,
            EventKind::ModuleCreated => self.module_created(event).await,
            EventKind::ModuleDeleted => self.module_deleted(event).await,
            EventKind::ModuleUpdated => self.module_updated(event).await,
            EventKind::SectionDeleted => self.section_deleted(event).await,
            EventKind::SectionUpdated => self.section_updated(event).await,
        }
    }

    /// Whether the course is laid out with our format
    async fn is_own_format(&self, course: CourseId) -> Result<bool, ObserverError> {
        let format = self
            .formats
            .course_format(course)
            .await
            .map_err(ObserverError::Format)?;

        if format != self.format {
            tracing::debug!(course, format = %format, "Course uses another format, skipping");
            return Ok(false);
        }

        Ok(true)
    }

    /// Invalidate section caches, then seed the new section with the configured defaults
    #[tracing::instrument(
        name = "observer::section_created",
        skip_all,
        fields(
            section = tracing::field::Empty,
            sectionnum = event.section_number(),
            context = event.contextid
        )
    )]
    pub async fn section_created(
        &self,
        event: &Event,
        ctx: &RequestContext,
    ) -> Result<(), ObserverError> {
        let course = event.courseid;
        if !self.is_own_format(course).await? {
            return Ok(());
        }

        let section = object_id(event)?;
        tracing::Span::current().record("section", section);

        self.invalidate_section(course, section).await?;

        let names = self
            .formats
            .section_option_names(course)
            .await
            .map_err(ObserverError::Format)?;

        let options: SectionOptions = names
            .into_iter()
            .filter_map(|name| {
                let value = self
                    .defaults
                    .default_value(&name)
                    .filter(|value| !value.is_empty())?;
                Some((name, value))
            })
            .collect();

        if !ctx.allows_section_seeding() {
            tracing::debug!(?ctx, "Request context does not allow seeding section options");
            return Ok(());
        }

        if options.is_empty() {
            tracing::debug!("No section option has a default, nothing to seed");
            return Ok(());
        }

        self.store
            .update_section_options(course, section, &options)
            .await
            .map_err(ObserverError::Store)?;

        tracing::info!(course, section, count = options.len(), "Seeded section options");

        Ok(())
    }

    /// Drop every option row and cache entry of a deleted course
    #[tracing::instrument(name = "observer::course_deleted", skip_all)]
    pub async fn course_deleted(&self, event: &Event) -> Result<(), ObserverError> {
        let course = event.courseid;

        let deleted = self
            .store
            .delete_course_options(course)
            .await
            .map_err(ObserverError::Store)?;
        tracing::info!(course, deleted, "Deleted course options");

        self.cache
            .invalidate(&CacheKey::PrerequisiteCourses)
            .await
            .map_err(ObserverError::Cache)?;

        self.invalidate_course(course).await
    }

    #[tracing::instrument(name = "observer::course_completion_updated", skip_all)]
    pub async fn course_completion_updated(&self, event: &Event) -> Result<(), ObserverError> {
        let course = event.courseid;
        if !self.is_own_format(course).await? {
            return Ok(());
        }
        self.invalidate_course(course).await
    }

    #[tracing::instrument(name = "observer::course_updated", skip_all)]
    pub async fn course_updated(&self, event: &Event) -> Result<(), ObserverError> {
        let course = event.courseid;
        if !self.is_own_format(course).await? {
            return Ok(());
        }
        self.invalidate_course(course).await
    }

    #[tracing::instrument(name = "observer::course_completed", skip_all)]
    pub async fn course_completed(&self, event: &Event) -> Result<(), ObserverError> {
        let course = event.courseid;
        if !self.is_own_format(course).await? {
            return Ok(());
        }
        self.invalidate_user_course(course, related_user(event)?).await
    }

    #[tracing::instrument(name = "observer::module_completion_updated", skip_all)]
    pub async fn module_completion_updated(&self, event: &Event) -> Result<(), ObserverError> {
        let course = event.courseid;
        if !self.is_own_format(course).await? {
            return Ok(());
        }
        self.invalidate_user_course(course, related_user(event)?).await
    }

    #[tracing::instrument(name = "observer::module_created", skip_all)]
    pub async fn module_created(&self, event: &Event) -> Result<(), ObserverError> {
        self.invalidate_module(event.courseid, object_id(event)?).await
    }

    /// Drop the option rows of a deleted module and its cached data
    #[tracing::instrument(name = "observer::module_deleted", skip_all)]
    pub async fn module_deleted(&self, event: &Event) -> Result<(), ObserverError> {
        let course = event.courseid;
        if !self.is_own_format(course).await? {
            return Ok(());
        }
        let cm = object_id(event)?;

        let deleted = self
            .store
            .delete_module_options(course, cm)
            .await
            .map_err(ObserverError::Store)?;
        tracing::info!(course, cm, deleted, "Deleted module options");

        self.invalidate_module(course, cm).await
    }

    #[tracing::instrument(name = "observer::module_updated", skip_all)]
    pub async fn module_updated(&self, event: &Event) -> Result<(), ObserverError> {
        self.invalidate_module(event.courseid, object_id(event)?).await
    }

    #[tracing::instrument(name = "observer::section_deleted", skip_all)]
    pub async fn section_deleted(&self, event: &Event) -> Result<(), ObserverError> {
        self.invalidate_section(event.courseid, object_id(event)?).await
    }

    #[tracing::instrument(name = "observer::section_updated", skip_all)]
    pub async fn section_updated(&self, event: &Event) -> Result<(), ObserverError> {
        self.invalidate_section(event.courseid, object_id(event)?).await
    }

    pub async fn invalidate_course(&self, course: CourseId) -> Result<(), ObserverError> {
        invalidate_keys(self.cache.as_ref(), &scope::course_keys(course))
            .await
            .map_err(ObserverError::Cache)
    }

    pub async fn invalidate_user_course(
        &self,
        course: CourseId,
        user: UserId,
    ) -> Result<(), ObserverError> {
        invalidate_keys(self.cache.as_ref(), &scope::user_course_keys(course, user))
            .await
            .map_err(ObserverError::Cache)
    }

    pub async fn invalidate_section(
        &self,
        course: CourseId,
        section: SectionId,
    ) -> Result<(), ObserverError> {
        invalidate_keys(self.cache.as_ref(), &scope::section_keys(course, section))
            .await
            .map_err(ObserverError::Cache)
    }

    /// Course scope plus the joined module options of the course
    pub async fn invalidate_module(
        &self,
        course: CourseId,
        cm: CourseModuleId,
    ) -> Result<(), ObserverError> {
        match self
            .store
            .course_module(cm)
            .await
            .map_err(ObserverError::Store)?
        {
            Some(module) if module.course() != course => {
                tracing::warn!(
                    course,
                    cm,
                    module_course = module.course(),
                    "Module belongs to another course"
                );
            }
            Some(_) => {}
            // modules are gone by the time their deletion is observed
            None => tracing::debug!(course, cm, "Module record not found"),
        }

        invalidate_keys(self.cache.as_ref(), &scope::module_keys(course))
            .await
            .map_err(ObserverError::Cache)
    }
}
