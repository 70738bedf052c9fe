use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use format_observer::{
    domain::{CourseId, CourseModule, CourseModuleId, SectionId},
    format::FormatResolver,
    store::{OptionStore, SectionOptions},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    DeleteCourseOptions(CourseId),
    DeleteModuleOptions(CourseId, CourseModuleId),
    CourseModule(CourseModuleId),
    UpdateSectionOptions(CourseId, SectionId, SectionOptions),
}

#[derive(Clone, Default)]
pub struct MockStore {
    calls: Arc<Mutex<Vec<StoreCall>>>,
    modules: Arc<Mutex<HashMap<CourseModuleId, CourseModule>>>,
    option_rows: Arc<Mutex<u64>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockStore {
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn add_module(&self, module: CourseModule) {
        self.modules.lock().unwrap().insert(module.id(), module);
    }

    /// Rows reported as deleted by the delete calls
    pub fn set_option_rows(&self, rows: u64) {
        *self.option_rows.lock().unwrap() = rows;
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    fn record(&self, call: StoreCall) -> Result<()> {
        if *self.should_fail.lock().unwrap() {
            return Err(anyhow!("Simulated store failure"));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl OptionStore for MockStore {
    async fn delete_course_options(&self, course: CourseId) -> Result<u64> {
        self.record(StoreCall::DeleteCourseOptions(course))?;
        Ok(*self.option_rows.lock().unwrap())
    }

    async fn delete_module_options(&self, course: CourseId, cm: CourseModuleId) -> Result<u64> {
        self.record(StoreCall::DeleteModuleOptions(course, cm))?;
        Ok(*self.option_rows.lock().unwrap())
    }

    async fn course_module(&self, cm: CourseModuleId) -> Result<Option<CourseModule>> {
        self.record(StoreCall::CourseModule(cm))?;
        Ok(self.modules.lock().unwrap().get(&cm).cloned())
    }

    async fn update_section_options(
        &self,
        course: CourseId,
        section: SectionId,
        options: &SectionOptions,
    ) -> Result<()> {
        self.record(StoreCall::UpdateSectionOptions(
            course,
            section,
            options.clone(),
        ))
    }
}

#[derive(Clone)]
pub struct MockFormats {
    formats: Arc<HashMap<CourseId, String>>,
    option_names: Arc<Vec<String>>,
    lookups: Arc<Mutex<u32>>,
}

impl MockFormats {
    pub fn new(courses: &[(CourseId, &str)], option_names: &[&str]) -> Self {
        Self {
            formats: Arc::new(
                courses
                    .iter()
                    .map(|(course, format)| (*course, format.to_string()))
                    .collect(),
            ),
            option_names: Arc::new(option_names.iter().map(|name| name.to_string()).collect()),
            lookups: Arc::new(Mutex::new(0)),
        }
    }

    pub fn lookups(&self) -> u32 {
        *self.lookups.lock().unwrap()
    }
}

#[async_trait]
impl FormatResolver for MockFormats {
    async fn course_format(&self, course: CourseId) -> Result<String> {
        *self.lookups.lock().unwrap() += 1;
        self.formats
            .get(&course)
            .cloned()
            .ok_or_else(|| anyhow!("Course {course} does not exist"))
    }

    async fn section_option_names(&self, _course: CourseId) -> Result<Vec<String>> {
        Ok(self.option_names.as_ref().clone())
    }
}
