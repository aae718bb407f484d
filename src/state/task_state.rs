/// Task state definitions for tracking crawl progress
///
/// Every crawl task moves through
/// `Pending -> Fetching -> Extracting -> Expanding -> Done`, or ends in
/// `Failed` from any of the working states.
use crate::CrawlerError;
use std::fmt;
use url::Url;

/// Represents the current state of a crawl task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// Task has been scheduled but has not started fetching
    Pending,

    /// Task holds a concurrency slot and is fetching its page
    Fetching,

    /// Task is discovering links and extracting content
    Extracting,

    /// Task is scheduling child tasks for discovered links
    Expanding,

    // ===== Terminal States =====
    /// Task completed, with or without expansion
    Done,

    /// Task failed; its branch of the traversal ends here
    Failed,
}

impl TaskState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if this is an active state
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Checks whether moving from `self` to `next` is a legal transition
    ///
    /// Any working state may finish as `Done` (for example a duplicate page is
    /// done after fetching without expansion) or `Failed`.
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        use TaskState::*;
        match (self, next) {
            (Pending, Fetching) => true,
            (Fetching, Extracting) => true,
            (Extracting, Expanding) => true,
            (Pending | Fetching | Extracting | Expanding, Done) => true,
            (Fetching | Extracting | Expanding, Failed) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Expanding => "expanding",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of pending work: a URL to fetch and the link filter to report with
#[derive(Debug, Clone)]
pub struct CrawlTask {
    pub url: Url,
    pub filter: Option<String>,
    state: TaskState,
}

impl CrawlTask {
    pub fn new(url: Url, filter: Option<String>) -> Self {
        Self {
            url,
            filter,
            state: TaskState::Pending,
        }
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Moves the task to `next`, rejecting illegal transitions
    pub fn advance(&mut self, next: TaskState) -> Result<(), CrawlerError> {
        if !self.state.can_transition_to(next) {
            return Err(CrawlerError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::trace!("{}: {} -> {}", self.url, self.state, next);
        self.state = next;
        Ok(())
    }

    /// Marks the task failed if it has not already reached a terminal state
    pub fn fail(&mut self) {
        if self.state.is_active() {
            self.state = TaskState::Failed;
        }
    }
}
