/// Article state definitions for tracking scrape progress
///
/// Every article URL handed to the scheduler walks through these states.
use std::fmt;

/// Represents the current state of an article in the scrape pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArticleState {
    // ===== Active States =====
    /// Article is waiting for a concurrency permit
    Pending,

    /// Page is being navigated in a browsing context
    Fetching,

    /// A previous attempt failed; waiting out the cooldown
    Retry,

    /// Title, content and images are being extracted
    Extracting,

    /// Content is being rendered to Markdown
    Converting,

    /// Images are being downloaded and references rewritten
    ImageProcessing,

    /// The document is being written below the output root
    Writing,

    // ===== Terminal States =====
    /// Document was written successfully
    Done,

    /// Retry budget exhausted, or the document could not be written
    Failed,
}

impl ArticleState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if the article currently holds a concurrency permit
    pub fn is_in_flight(&self) -> bool {
        !matches!(self, Self::Pending | Self::Done | Self::Failed)
    }

    /// Returns true if moving from this state to `next` is a valid step
    pub fn can_transition_to(&self, next: ArticleState) -> bool {
        use ArticleState::*;

        match self {
            Pending => matches!(next, Fetching),
            Fetching => matches!(next, Extracting | Retry | Failed),
            Extracting => matches!(next, Converting | Retry | Failed),
            Converting => matches!(next, ImageProcessing | Writing | Retry | Failed),
            ImageProcessing => matches!(next, Writing),
            Writing => matches!(next, Done | Failed),
            Retry => matches!(next, Fetching),
            Done | Failed => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Retry => "retry",
            Self::Extracting => "extracting",
            Self::Converting => "converting",
            Self::ImageProcessing => "image_processing",
            Self::Writing => "writing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ArticleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
