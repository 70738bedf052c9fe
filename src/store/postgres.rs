use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    domain::{CourseId, CourseModule, CourseModuleId, SectionId},
    format::FormatResolver,
    store::{OptionStore, SectionOptions, StoreError},
};

pub async fn connect_to_db(database_url: &str) -> Result<PgPool> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    // Run SQL migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("SQL migrations failed")?;

    Ok(pool)
}

/// Postgres-backed option store and format resolver
///
/// `course`, `course_modules` and `course_format_options` belong to the host
/// application; `format_designer_options` is created by our migrations.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    format: String,
    section_option_names: Vec<String>,
}

impl PgStore {
    pub fn new(pool: PgPool, format: String, section_option_names: Vec<String>) -> Self {
        Self {
            pool,
            format,
            section_option_names,
        }
    }
}

#[async_trait]
impl OptionStore for PgStore {
    #[tracing::instrument(name = "store::delete_course_options", skip(self))]
    async fn delete_course_options(&self, course: CourseId) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM format_designer_options
            WHERE courseid = $1
            "#,
        )
        .bind(course)
        .execute(&self.pool)
        .await
        .map_err(StoreError::DatabaseError)?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(name = "store::delete_module_options", skip(self))]
    async fn delete_module_options(&self, course: CourseId, cm: CourseModuleId) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM format_designer_options
            WHERE courseid = $1
              AND cmid = $2
            "#,
        )
        .bind(course)
        .bind(cm)
        .execute(&self.pool)
        .await
        .map_err(StoreError::DatabaseError)?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(name = "store::course_module", skip(self))]
    async fn course_module(&self, cm: CourseModuleId) -> Result<Option<CourseModule>> {
        let rec_opt: Option<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT id, course
            FROM course_modules
            WHERE id = $1
            "#,
        )
        .bind(cm)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::DatabaseError)?;

        Ok(rec_opt.map(|(id, course)| CourseModule::new(id, course)))
    }

    #[tracing::instrument(name = "store::update_section_options", skip(self, options))]
    async fn update_section_options(
        &self,
        course: CourseId,
        section: SectionId,
        options: &SectionOptions,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(StoreError::DatabaseError)?;

        for (name, value) in options {
            sqlx::query(
                r#"
                INSERT INTO course_format_options (courseid, format, sectionid, name, value)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (courseid, format, sectionid, name)
                DO UPDATE SET value = EXCLUDED.value
                "#,
            )
            .bind(course)
            .bind(&self.format)
            .bind(section)
            .bind(name)
            .bind(value)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::DatabaseError)?;
        }

        tx.commit().await.map_err(StoreError::DatabaseError)?;

        tracing::debug!(count = options.len(), "Stored section format options");

        Ok(())
    }
}

#[async_trait]
impl FormatResolver for PgStore {
    #[tracing::instrument(name = "store::course_format", skip(self))]
    async fn course_format(&self, course: CourseId) -> Result<String> {
        let format: Option<String> = sqlx::query_scalar(r#"SELECT format FROM course WHERE id = $1"#)
            .bind(course)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::DatabaseError)?;

        let format = format
            .with_context(|| format!("Course {course} does not exist"))
            .map_err(StoreError::Other)?;

        Ok(format)
    }

    async fn section_option_names(&self, _course: CourseId) -> Result<Vec<String>> {
        Ok(self.section_option_names.clone())
    }
}
