pub mod payload;

pub use payload::Payload;

/// Header carrying the event kind.
pub const EVENT_HEADER: &str = "X-GitHub-Event";
/// Header carrying the unique delivery id.
pub const DELIVERY_HEADER: &str = "X-GitHub-Delivery";

/// Kind of GitHub webhook event, read from the `X-GitHub-Event` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Ping,
    Push,
    PullRequest,
    Issues,
    IssueComment,
    PullRequestReviewComment,
    PullRequestReview,
    Star,
    Fork,
    Create,
    Delete,
    /// Any tag without a dedicated rule, kept verbatim for the title.
    Other(String),
}

impl EventKind {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "ping" => EventKind::Ping,
            "push" => EventKind::Push,
            "pull_request" => EventKind::PullRequest,
            "issues" => EventKind::Issues,
            "issue_comment" => EventKind::IssueComment,
            "pull_request_review_comment" => EventKind::PullRequestReviewComment,
            "pull_request_review" => EventKind::PullRequestReview,
            "star" => EventKind::Star,
            "fork" => EventKind::Fork,
            "create" => EventKind::Create,
            "delete" => EventKind::Delete,
            other => EventKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Ping => "ping",
            EventKind::Push => "push",
            EventKind::PullRequest => "pull_request",
            EventKind::Issues => "issues",
            EventKind::IssueComment => "issue_comment",
            EventKind::PullRequestReviewComment => "pull_request_review_comment",
            EventKind::PullRequestReview => "pull_request_review",
            EventKind::Star => "star",
            EventKind::Fork => "fork",
            EventKind::Create => "create",
            EventKind::Delete => "delete",
            EventKind::Other(tag) => tag,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
