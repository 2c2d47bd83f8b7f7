//! Classification of a push into branch/tag creation, deletion or update.

/// The hash GitHub reports for a ref that doesn't exist on one side of a push.
pub const ZERO_SHA: &str = "0000000000000000000000000000000000000000";

const BRANCH_PREFIX: &str = "refs/heads/";
const TAG_PREFIX: &str = "refs/tags/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchAction {
    Created,
    Deleted,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAction {
    Created,
    Deleted,
}

/// What a single push did to a single ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Branch { name: String, action: BranchAction },
    Tag { name: String, action: TagAction },
}

impl Change {
    pub fn name(&self) -> &str {
        match self {
            Change::Branch { name, .. } | Change::Tag { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    #[error("Unrecognized ref '{0}'")]
    UnrecognizedRef(String),

    #[error("Tag '{0}' was moved in place; expected a delete and a create")]
    TagUpdated(String),
}

fn is_zero(hash: &str) -> bool {
    hash == ZERO_SHA
}

/// Classifies `reference` using the before/after hashes of the push.
pub fn classify(reference: &str, before: &str, after: &str) -> Result<Change, ClassifyError> {
    let action = match (is_zero(before), is_zero(after)) {
        (true, false) => BranchAction::Created,
        (false, true) => BranchAction::Deleted,
        _ => BranchAction::Updated,
    };

    if let Some(name) = reference.strip_prefix(BRANCH_PREFIX) {
        return Ok(Change::Branch {
            name: name.to_string(),
            action,
        });
    }

    if let Some(name) = reference.strip_prefix(TAG_PREFIX) {
        let action = match action {
            BranchAction::Created => TagAction::Created,
            BranchAction::Deleted => TagAction::Deleted,
            BranchAction::Updated => return Err(ClassifyError::TagUpdated(name.to_string())),
        };
        return Ok(Change::Tag {
            name: name.to_string(),
            action,
        });
    }

    Err(ClassifyError::UnrecognizedRef(reference.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA: &str = "9049f1265b7d61be4a8904a9a27120d2064dab3b";

    #[test]
    fn new_branch() {
        assert_eq!(
            classify("refs/heads/foo", ZERO_SHA, SHA),
            Ok(Change::Branch {
                name: "foo".into(),
                action: BranchAction::Created
            })
        );
    }

    #[test]
    fn deleted_branch() {
        assert_eq!(
            classify("refs/heads/feature/login", SHA, ZERO_SHA),
            Ok(Change::Branch {
                name: "feature/login".into(),
                action: BranchAction::Deleted
            })
        );
    }

    #[test]
    fn ordinary_push() {
        let other = "6113728f27ae82c7b1a177c8d03f9e96e0adf246";
        assert_eq!(
            classify("refs/heads/main", SHA, other),
            Ok(Change::Branch {
                name: "main".into(),
                action: BranchAction::Updated
            })
        );
    }

    #[test]
    fn new_tag() {
        assert_eq!(
            classify("refs/tags/v1.2.0", ZERO_SHA, SHA),
            Ok(Change::Tag {
                name: "v1.2.0".into(),
                action: TagAction::Created
            })
        );
    }

    #[test]
    fn deleted_tag() {
        assert_eq!(
            classify("refs/tags/v1", SHA, ZERO_SHA),
            Ok(Change::Tag {
                name: "v1".into(),
                action: TagAction::Deleted
            })
        );
    }

    #[test]
    fn moved_tag_is_a_defect() {
        let other = "6113728f27ae82c7b1a177c8d03f9e96e0adf246";
        assert_eq!(
            classify("refs/tags/v1", SHA, other),
            Err(ClassifyError::TagUpdated("v1".into()))
        );
    }

    #[test]
    fn unknown_ref_shapes_are_rejected() {
        for reference in ["refs/pull/1/head", "main", "", "refs/heads", "refs/notes/commits"] {
            assert_eq!(
                classify(reference, ZERO_SHA, SHA),
                Err(ClassifyError::UnrecognizedRef(reference.into()))
            );
        }
    }

    #[test]
    fn both_hashes_zero_is_an_update() {
        let change = classify("refs/heads/main", ZERO_SHA, ZERO_SHA).unwrap();
        assert_eq!(
            change,
            Change::Branch {
                name: "main".into(),
                action: BranchAction::Updated
            }
        );
        assert_eq!(change.name(), "main");
    }
}
