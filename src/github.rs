//! The subset of the GitHub `push` payload the relay reads.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(default)]
    pub name: Option<String>,
    pub login: String,
    pub html_url: String,
}

impl User {
    /// The user's display name, or their login when no name is set.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.login,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    pub html_url: String,
    pub owner: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Commit {
    pub id: String,
    pub url: String,
    pub author: CommitAuthor,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushEvent {
    #[serde(rename = "ref")]
    pub reference: String,
    pub before: String,
    pub after: String,
    pub repository: Repository,
    pub sender: User,
    pub compare: String,
    #[serde(default)]
    pub commits: Vec<Commit>,
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn parses_push_payload_ignoring_unknown_fields() {
        let payload = push_payload("refs/heads/main", SHA_A, SHA_B, vec![commit(0, "Fix")]);
        let event: PushEvent = serde_json::from_value(payload).unwrap();

        assert_eq!(event.reference, "refs/heads/main");
        assert_eq!(event.repository.owner.display_name(), "The Octocat");
        assert_eq!(event.sender.display_name(), "monalisa");
        assert_eq!(event.commits.len(), 1);
        assert_eq!(event.commits[0].author.name, "Mona Lisa");
    }

    #[test]
    fn empty_name_falls_back_to_login() {
        let user = User {
            name: Some(String::new()),
            login: "octocat".into(),
            html_url: "https://github.com/octocat".into(),
        };
        assert_eq!(user.display_name(), "octocat");
    }

    #[test]
    fn missing_commits_default_to_empty() {
        let mut payload = push_payload("refs/tags/v1", SHA_A, SHA_B, vec![]);
        payload.as_object_mut().unwrap().remove("commits");
        let event: PushEvent = serde_json::from_value(payload).unwrap();
        assert!(event.commits.is_empty());
    }
}
