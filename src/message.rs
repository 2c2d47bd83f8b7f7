//! Discord webhook messages (components v2) built from a classified push.

use serde::{Serialize, Serializer};

use crate::classify::{BranchAction, Change, TagAction};
use crate::github::{Commit, PushEvent};

const ACCENT_COLOR: u32 = 0x6e5494;
const GITHUB_ICON_URL: &str = "https://github.githubassets.com/images/modules/logos_page/GitHub-Mark.png";
const USERNAME: &str = "GitHub";
/// `IS_COMPONENTS_V2` message flag.
const FLAG_COMPONENTS_V2: u32 = 1 << 15;
/// Button style that opens a URL.
const BUTTON_STYLE_LINK: u8 = 5;

pub const MAX_LISTED_COMMITS: usize = 10;
pub const MAX_COMMIT_MESSAGE_CHARS: usize = 200;
const SHORT_SHA_LEN: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    ActionRow,
    Button,
    TextDisplay,
    Container,
}

impl Serialize for ComponentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let id = match self {
            ComponentType::ActionRow => 1,
            ComponentType::Button => 2,
            ComponentType::TextDisplay => 10,
            ComponentType::Container => 17,
        };
        serializer.serialize_u8(id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TextDisplay {
    #[serde(rename = "type")]
    pub kind: ComponentType,
    pub content: String,
}

impl TextDisplay {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            kind: ComponentType::TextDisplay,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Container {
    #[serde(rename = "type")]
    pub kind: ComponentType,
    pub accent_color: u32,
    pub components: Vec<TextDisplay>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Button {
    #[serde(rename = "type")]
    pub kind: ComponentType,
    pub style: u8,
    pub url: String,
    pub label: String,
}

impl Button {
    pub fn link(label: &str, url: impl Into<String>) -> Self {
        Self {
            kind: ComponentType::Button,
            style: BUTTON_STYLE_LINK,
            url: url.into(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionRow {
    #[serde(rename = "type")]
    pub kind: ComponentType,
    pub components: Vec<Button>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Component {
    Container(Container),
    ActionRow(ActionRow),
}

/// Body POSTed to a Discord incoming webhook.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookMessage {
    pub flags: u32,
    pub components: Vec<Component>,
    pub username: String,
    pub avatar_url: String,
}

impl WebhookMessage {
    fn new(container: Vec<TextDisplay>, buttons: Vec<Button>) -> Self {
        Self {
            flags: FLAG_COMPONENTS_V2,
            components: vec![
                Component::Container(Container {
                    kind: ComponentType::Container,
                    accent_color: ACCENT_COLOR,
                    components: container,
                }),
                Component::ActionRow(ActionRow {
                    kind: ComponentType::ActionRow,
                    components: buttons,
                }),
            ],
            username: USERNAME.to_string(),
            avatar_url: GITHUB_ICON_URL.to_string(),
        }
    }
}

#[cfg(test)]
impl WebhookMessage {
    /// Text of every text display in the message, in order.
    pub(crate) fn texts(&self) -> Vec<&str> {
        self.components
            .iter()
            .filter_map(|c| match c {
                Component::Container(container) => Some(container),
                Component::ActionRow(_) => None,
            })
            .flat_map(|container| container.components.iter().map(|t| t.content.as_str()))
            .collect()
    }

    pub(crate) fn buttons(&self) -> Vec<&Button> {
        self.components
            .iter()
            .filter_map(|c| match c {
                Component::ActionRow(row) => Some(row),
                Component::Container(_) => None,
            })
            .flat_map(|row| row.components.iter())
            .collect()
    }
}

/// Builds the notification for `change`.
pub fn build_message(change: &Change, event: &PushEvent) -> WebhookMessage {
    match change {
        Change::Branch {
            name,
            action: BranchAction::Updated,
        } => commit_push_message(event, name),
        Change::Branch { name, action } => {
            let created = *action == BranchAction::Created;
            let url = format!("{}/tree/{}", event.repository.html_url, name);
            ref_action_message(event, "branch", name, &url, created, "View Branch")
        }
        Change::Tag { name, action } => {
            let created = *action == TagAction::Created;
            let url = format!("{}/releases/tag/{}", event.repository.html_url, name);
            ref_action_message(event, "tag", name, &url, created, "View Tag")
        }
    }
}

fn header_line(event: &PushEvent) -> String {
    let repo = &event.repository;
    format!(
        "### [{}]({}) - [{}]({})",
        repo.owner.display_name(),
        repo.owner.html_url,
        repo.name,
        repo.html_url
    )
}

fn ref_action_message(
    event: &PushEvent,
    kind: &str,
    name: &str,
    url: &str,
    created: bool,
    view_label: &str,
) -> WebhookMessage {
    let verb = if created { "created" } else { "deleted" };
    let text = format!(
        "{}\n[**{}**]({}) {} {} [`{}`]({}).",
        header_line(event),
        event.sender.display_name(),
        event.sender.html_url,
        verb,
        kind,
        name,
        url
    );

    let mut buttons = vec![Button::link("View Repository", &event.repository.html_url)];
    // A deleted ref has nothing left to link to.
    if created {
        buttons.push(Button::link(view_label, url));
    }

    WebhookMessage::new(vec![TextDisplay::new(text)], buttons)
}

fn commit_push_message(event: &PushEvent, branch: &str) -> WebhookMessage {
    let count = event.commits.len();
    let commit_word = if count == 1 { "commit" } else { "commits" };

    let mut texts = vec![TextDisplay::new(format!(
        "{}\n-# [**{}**]({}) pushed `{}` {} to `{}`.",
        header_line(event),
        event.sender.display_name(),
        event.sender.html_url,
        count,
        commit_word,
        branch
    ))];

    if count == 0 {
        texts.push(TextDisplay::new(
            "_No commits in this push. (How did this happen?)_",
        ));
    } else {
        texts.extend(
            event
                .commits
                .iter()
                .take(MAX_LISTED_COMMITS)
                .map(|commit| TextDisplay::new(commit_line(commit))),
        );
        if count > MAX_LISTED_COMMITS {
            texts.push(TextDisplay::new(format!(
                "and {} more commits...",
                count - MAX_LISTED_COMMITS
            )));
        }
    }

    let buttons = vec![
        Button::link("View Repository", &event.repository.html_url),
        Button::link("View Changes", &event.compare),
    ];

    WebhookMessage::new(texts, buttons)
}

fn commit_line(commit: &Commit) -> String {
    let short_sha: String = commit.id.chars().take(SHORT_SHA_LEN).collect();
    let summary: String = commit
        .message
        .lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(MAX_COMMIT_MESSAGE_CHARS)
        .collect();
    format!(
        "- [`{}`]({}) {}: {}",
        short_sha, commit.url, commit.author.name, summary
    )
}
