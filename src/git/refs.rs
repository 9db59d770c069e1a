//! Revision lookup for working copies

use git2::Repository;

use crate::error::{self, Result};

/// Full SHA of the commit HEAD points at
pub fn head_revision(repo: &Repository) -> Result<String> {
    let commit = repo
        .head()
        .and_then(|head| head.peel_to_commit())
        .map_err(|e| error::git::ref_resolve_failed("HEAD", e.message()))?;

    Ok(commit.id().to_string())
}

/// Branch name HEAD points at, or None when HEAD is detached
pub fn head_branch(repo: &Repository) -> Result<Option<String>> {
    let head = repo
        .head()
        .map_err(|e| error::git::ref_resolve_failed("HEAD", e.message()))?;

    if head.is_branch() {
        Ok(head.shorthand().map(str::to_string))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PkgError;
    use tempfile::TempDir;

    fn init_with_commit(temp: &TempDir) -> (Repository, git2::Oid) {
        let repo = Repository::init(temp.path()).unwrap();
        let sig = git2::Signature::now("Test", "test@test.com").unwrap();
        let tree_id = {
            let mut index = repo.index().unwrap();
            index.write_tree().unwrap()
        };
        let oid = {
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
                .unwrap()
        };
        (repo, oid)
    }

    #[test]
    fn test_head_revision() {
        let temp = TempDir::new().unwrap();
        let (repo, oid) = init_with_commit(&temp);

        let sha = head_revision(&repo).unwrap();
        assert_eq!(sha.len(), 40);
        assert_eq!(sha, oid.to_string());
    }

    #[test]
    fn test_head_revision_empty_repo() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        assert!(matches!(
            head_revision(&repo),
            Err(PkgError::GitRefResolveFailed { .. })
        ));
    }

    #[test]
    fn test_head_branch() {
        let temp = TempDir::new().unwrap();
        let (repo, _) = init_with_commit(&temp);

        let branch = head_branch(&repo).unwrap();
        assert!(branch == Some("master".to_string()) || branch == Some("main".to_string()));
    }

    #[test]
    fn test_head_branch_detached() {
        let temp = TempDir::new().unwrap();
        let (repo, oid) = init_with_commit(&temp);
        repo.set_head_detached(oid).unwrap();

        assert!(head_branch(&repo).unwrap().is_none());
    }
}
