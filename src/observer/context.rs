/// How the request that raised the event is being answered.
///
/// Only consulted before seeding the options of a new section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// `None` when the host never declared its output buffering mode
    pub no_output_buffering: Option<bool>,
    pub ajax: bool,
}

impl RequestContext {
    pub fn ajax() -> Self {
        Self {
            no_output_buffering: Some(false),
            ajax: true,
        }
    }

    pub fn unbuffered() -> Self {
        Self {
            no_output_buffering: Some(true),
            ajax: false,
        }
    }

    /// Seeding is allowed when buffering was never declared, or when output is
    /// buffered and the request is not AJAX.
    pub fn allows_section_seeding(&self) -> bool {
        match self.no_output_buffering {
            None => true,
            Some(unbuffered) => !unbuffered && !self.ajax,
        }
    }
}
