use crate::discord::{Embed, EmbedAuthor, OutboundMessage};
use crate::github::{EventKind, Payload};

pub const COLOR_PUSH: u32 = 0x7289DA;
pub const COLOR_PR_OPEN: u32 = 0x28A745;
pub const COLOR_PR_CLOSED: u32 = 0x6E7681;
pub const COLOR_PR_OTHER: u32 = 0xFF69B4;
pub const COLOR_ISSUE: u32 = 0xDC143C;
pub const COLOR_ISSUE_COMMENT: u32 = 0xFF69B4;
pub const COLOR_REVIEW_COMMENT: u32 = 0xFFFFFF;
pub const COLOR_REVIEW: u32 = 0x90EE90;

/// Commits listed in a push description before the "... and K more" line.
const MAX_COMMITS: usize = 5;
/// Body characters kept in a description before the continuation marker.
const MAX_BODY_CHARS: usize = 200;
const BRANCH_PREFIX: &str = "refs/heads/";

/// Build the Discord message for one event. Never fails: missing fields
/// become empty strings or zero, and exactly one embed is produced.
pub fn translate(kind: &EventKind, payload: Payload<'_>) -> OutboundMessage {
    let embed = match kind {
        EventKind::Push => push(payload),
        EventKind::PullRequest => pull_request(payload),
        EventKind::Issues => issue(payload),
        EventKind::IssueComment => issue_comment(payload),
        EventKind::PullRequestReviewComment => review_comment(payload),
        EventKind::PullRequestReview => review(payload),
        EventKind::Star => star(payload),
        EventKind::Fork => fork(payload),
        EventKind::Create => ref_event(payload, "Created"),
        EventKind::Delete => ref_event(payload, "Deleted"),
        EventKind::Ping | EventKind::Other(_) => fallback(kind, payload),
    };

    OutboundMessage {
        embeds: vec![embed],
        ..Default::default()
    }
}

/// Strip `refs/heads/` from a ref; anything else is already a branch name.
pub fn branch_name(reference: &str) -> &str {
    match reference.strip_prefix(BRANCH_PREFIX) {
        Some(branch) if !branch.is_empty() => branch,
        _ => reference,
    }
}

pub fn short_sha(sha: &str) -> &str {
    match sha.char_indices().nth(7) {
        Some((idx, _)) => &sha[..idx],
        None => sha,
    }
}

/// Cap `body` at 200 characters, appending `...` when cut.
pub fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Author block from an object carrying `login`, `html_url` and `avatar_url`.
fn user_author(user: Payload<'_>) -> EmbedAuthor {
    EmbedAuthor {
        name: user.str(&["login"]).to_string(),
        url: user.str(&["html_url"]).to_string(),
        icon_url: user.str(&["avatar_url"]).to_string(),
    }
}

fn repo_name<'a>(payload: Payload<'a>) -> &'a str {
    payload.str(&["repository", "full_name"])
}

fn push(payload: Payload<'_>) -> Embed {
    let repo = repo_name(payload);
    let branch = branch_name(payload.str(&["ref"]));
    let pusher = payload.str(&["pusher", "name"]);
    let commits = payload.array(&["commits"]);

    let commit_text = match commits.as_ref().map(Vec::len) {
        Some(1) => "1 new commit".to_string(),
        Some(n) => format!("{n} new commits"),
        None => String::new(),
    };

    let description = commits.filter(|c| !c.is_empty()).map(|commits| {
        let mut lines: Vec<String> = commits
            .iter()
            .take(MAX_COMMITS)
            .map(|commit| {
                format!(
                    "`{}` {} - {}",
                    short_sha(commit.str(&["id"])),
                    commit.str(&["message"]),
                    commit.str(&["author", "name"])
                )
            })
            .collect();
        if commits.len() > MAX_COMMITS {
            lines.push(format!(
                "... and {} more commits",
                commits.len() - MAX_COMMITS
            ));
        }
        lines.join("\n")
    });

    Embed {
        title: format!("[{repo}:{branch}] {commit_text}"),
        url: payload.str(&["compare"]).to_string(),
        color: Some(COLOR_PUSH),
        author: EmbedAuthor {
            name: pusher.to_string(),
            url: format!("https://github.com/{pusher}"),
            icon_url: payload.str(&["sender", "avatar_url"]).to_string(),
        },
        description,
    }
}

fn pull_request_color(action: &str) -> u32 {
    match action {
        "opened" | "reopened" => COLOR_PR_OPEN,
        "closed" => COLOR_PR_CLOSED,
        _ => COLOR_PR_OTHER,
    }
}

fn pull_request(payload: Payload<'_>) -> Embed {
    let action = payload.str(&["action"]);
    let pr = payload.at(&["pull_request"]);

    Embed {
        title: format!(
            "[{}] Pull request #{} {}: {}",
            repo_name(payload),
            pr.int(&["number"]),
            action,
            pr.str(&["title"])
        ),
        url: pr.str(&["html_url"]).to_string(),
        color: Some(pull_request_color(action)),
        author: user_author(pr.at(&["user"])),
        description: None,
    }
}

fn issue(payload: Payload<'_>) -> Embed {
    let issue = payload.at(&["issue"]);

    Embed {
        title: format!(
            "[{}] Issue #{} {}: {}",
            repo_name(payload),
            issue.int(&["number"]),
            payload.str(&["action"]),
            issue.str(&["title"])
        ),
        url: issue.str(&["html_url"]).to_string(),
        color: Some(COLOR_ISSUE),
        author: user_author(issue.at(&["user"])),
        description: None,
    }
}

fn issue_comment(payload: Payload<'_>) -> Embed {
    let issue = payload.at(&["issue"]);
    let comment = payload.at(&["comment"]);

    Embed {
        title: format!(
            "[{}] New comment on issue #{}: {}",
            repo_name(payload),
            issue.int(&["number"]),
            issue.str(&["title"])
        ),
        url: comment.str(&["html_url"]).to_string(),
        color: Some(COLOR_ISSUE_COMMENT),
        author: user_author(comment.at(&["user"])),
        description: Some(truncate_body(comment.str(&["body"]))),
    }
}

fn review_comment(payload: Payload<'_>) -> Embed {
    let pr = payload.at(&["pull_request"]);
    let comment = payload.at(&["comment"]);

    Embed {
        title: format!(
            "[{}] New comment on pull request #{}: {}",
            repo_name(payload),
            pr.int(&["number"]),
            pr.str(&["title"])
        ),
        url: comment.str(&["html_url"]).to_string(),
        color: Some(COLOR_REVIEW_COMMENT),
        author: user_author(comment.at(&["user"])),
        description: Some(truncate_body(comment.str(&["body"]))),
    }
}

fn review(payload: Payload<'_>) -> Embed {
    let pr = payload.at(&["pull_request"]);
    let review = payload.at(&["review"]);
    let body = review.str(&["body"]);

    Embed {
        title: format!(
            "[{}] Pull request review {} on #{}: {}",
            repo_name(payload),
            review.str(&["state"]),
            pr.int(&["number"]),
            pr.str(&["title"])
        ),
        url: review.str(&["html_url"]).to_string(),
        color: Some(COLOR_REVIEW),
        author: user_author(review.at(&["user"])),
        description: (!body.is_empty()).then(|| truncate_body(body)),
    }
}

fn star(payload: Payload<'_>) -> Embed {
    let repo = repo_name(payload);
    let title = if payload.str(&["action"]) == "created" {
        format!("[{repo}] New star")
    } else {
        format!("[{repo}] Star removed")
    };

    Embed {
        title,
        url: payload.str(&["repository", "html_url"]).to_string(),
        color: None,
        author: user_author(payload.at(&["sender"])),
        description: None,
    }
}

fn fork(payload: Payload<'_>) -> Embed {
    let fork_url = payload.str(&["forkee", "html_url"]);

    Embed {
        title: format!("[{}] Forked", repo_name(payload)),
        url: fork_url.to_string(),
        color: None,
        author: user_author(payload.at(&["sender"])),
        description: Some(format!("Fork: {fork_url}")),
    }
}

/// `create` and `delete` differ only in the verb.
fn ref_event(payload: Payload<'_>, verb: &str) -> Embed {
    Embed {
        title: format!(
            "[{}] {} {}: {}",
            repo_name(payload),
            verb,
            payload.str(&["ref_type"]),
            payload.str(&["ref"])
        ),
        url: payload.str(&["repository", "html_url"]).to_string(),
        color: None,
        author: user_author(payload.at(&["sender"])),
        description: None,
    }
}

fn fallback(kind: &EventKind, payload: Payload<'_>) -> Embed {
    Embed {
        title: format!("[{}] {} event", repo_name(payload), kind),
        url: payload.str(&["repository", "html_url"]).to_string(),
        color: None,
        author: user_author(payload.at(&["sender"])),
        description: None,
    }
}
