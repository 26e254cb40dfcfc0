//! Git capability.

use git2::{ObjectType, Oid, Repository, Sort};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::trace;

/// Error raised while reading an opened repository.
#[derive(Debug, Error)]
#[error("Git error: {0}")]
pub struct GitError(#[from] git2::Error);

/// A tag reachable from HEAD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitTag {
    /// Tag name without the `refs/tags/` prefix.
    pub name: String,
    /// True for annotated tags, false for lightweight ones.
    pub annotated: bool,
}

/// What is known about a working copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitState {
    /// Tags on HEAD and its ancestors, newest commit first; tags of one
    /// commit are ordered by name.
    pub tags: Vec<GitTag>,
}

impl GitState {
    /// The tag closest to HEAD, if any.
    #[must_use]
    pub fn latest_tag(&self) -> Option<&GitTag> {
        self.tags.first()
    }
}

/// Access to git working copies.
pub trait Git: Send + Sync {
    /// Opens `path` as a repository.
    ///
    /// Returns `Ok(None)` if `path` is not the root of a repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository opens but cannot be read.
    fn open(&self, path: &Path) -> Result<Option<GitState>, GitError>;
}

/// [`Git`] backed by libgit2.
#[derive(Debug, Default, Clone, Copy)]
pub struct Git2;

impl Git for Git2 {
    fn open(&self, path: &Path) -> Result<Option<GitState>, GitError> {
        let repo = match Repository::open(path) {
            Ok(repo) => repo,
            Err(e) => {
                trace!("{} is not a repository: {}", path.display(), e);
                return Ok(None);
            }
        };

        let mut refs = Vec::new();
        repo.tag_foreach(|oid, name| {
            refs.push((oid, String::from_utf8_lossy(name).into_owned()));
            true
        })?;

        let mut by_commit: HashMap<Oid, Vec<GitTag>> = HashMap::new();
        for (oid, name) in refs {
            let object = repo.find_object(oid, None)?;
            let annotated = object.kind() == Some(ObjectType::Tag);
            let Ok(commit) = object.peel_to_commit() else {
                trace!("Tag {} does not point to a commit", name);
                continue;
            };
            let name = name.strip_prefix("refs/tags/").unwrap_or(&name).to_string();
            by_commit
                .entry(commit.id())
                .or_default()
                .push(GitTag { name, annotated });
        }

        let mut walk = repo.revwalk()?;
        if let Err(e) = walk.push_head() {
            trace!("No HEAD commit in {}: {}", path.display(), e);
            return Ok(Some(GitState::default()));
        }
        walk.set_sorting(Sort::TIME)?;

        let mut tags = Vec::new();
        for oid in walk {
            if let Some(mut commit_tags) = by_commit.remove(&oid?) {
                commit_tags.sort_by(|a, b| a.name.cmp(&b.name));
                tags.extend(commit_tags);
            }
        }

        trace!("Found {} tags in {}", tags.len(), path.display());
        Ok(Some(GitState { tags }))
    }
}
