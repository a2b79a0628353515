#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn css_class(self) -> &'static str {
        match self {
            NoticeLevel::Success => "notice-success",
            NoticeLevel::Warning => "notice-warning",
            NoticeLevel::Error => "notice-error",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            NoticeLevel::Success => "fa-solid fa-circle-check",
            NoticeLevel::Warning => "fa-solid fa-triangle-exclamation",
            NoticeLevel::Error => "fa-solid fa-circle-exclamation",
        }
    }
}

/// A transient message shown to the user. Dismisses itself after
/// `duration_ms` and never blocks the next action.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
    pub duration_ms: u32,
}

pub const ANALYSIS_FALLBACK_MESSAGE: &str =
    "Failed to analyze image. Please make sure the backend is running.";

impl Notice {
    fn new(level: NoticeLevel, title: &str, description: &str, duration_ms: u32) -> Self {
        Self {
            level,
            title: title.to_string(),
            description: description.to_string(),
            duration_ms,
        }
    }

    pub fn invalid_file_type() -> Self {
        Self::new(
            NoticeLevel::Error,
            "Invalid file type",
            "Please select an image file",
            3000,
        )
    }

    pub fn file_unreadable() -> Self {
        Self::new(
            NoticeLevel::Error,
            "Could not read file",
            "The selected file could not be read. Please try another image.",
            3000,
        )
    }

    pub fn no_image_selected() -> Self {
        Self::new(
            NoticeLevel::Warning,
            "No image selected",
            "Please select an image first",
            3000,
        )
    }

    pub fn analysis_failed(message: Option<&str>) -> Self {
        Self::new(
            NoticeLevel::Error,
            "Error",
            message.unwrap_or(ANALYSIS_FALLBACK_MESSAGE),
            5000,
        )
    }

    pub fn analysis_complete() -> Self {
        Self::new(
            NoticeLevel::Success,
            "Analysis Complete",
            "Plant analysis successful!",
            3000,
        )
    }
}
