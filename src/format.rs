use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::CourseId;

pub const DEFAULT_FORMAT: &str = "designer";

/// Resolves how a course is laid out
#[async_trait]
pub trait FormatResolver: Send + Sync {
    /// Format the course is configured with
    async fn course_format(&self, course: CourseId) -> Result<String>;

    /// Names of the options the course's format stores per section
    async fn section_option_names(&self, course: CourseId) -> Result<Vec<String>>;
}

/// Site-level default values of the format options
pub trait OptionDefaults: Send + Sync {
    /// Configured default for `name`, `None` when unset, empty or `"0"`
    fn default_value(&self, name: &str) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct FormatDefaults {
    values: HashMap<String, String>,
}

impl FormatDefaults {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl OptionDefaults for FormatDefaults {
    fn default_value(&self, name: &str) -> Option<String> {
        self.values
            .get(name)
            .filter(|value| !value.is_empty() && value.as_str() != "0")
            .cloned()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_defaults_count_as_unset() {
        let defaults = FormatDefaults::new(HashMap::from([
            ("sectiontype".to_string(), "cards".to_string()),
            ("sectioncollapse".to_string(), String::new()),
            ("sectionlayout".to_string(), "0".to_string()),
            ("sectiontextcolor".to_string(), "00".to_string()),
        ]));

        assert_eq!(
            defaults.default_value("sectiontype").as_deref(),
            Some("cards")
        );
        assert_eq!(defaults.default_value("sectioncollapse"), None);
        assert_eq!(defaults.default_value("sectionlayout"), None);
        assert_eq!(
            defaults.default_value("sectiontextcolor").as_deref(),
            Some("00")
        );
        assert_eq!(defaults.default_value("missing"), None);
    }
}
