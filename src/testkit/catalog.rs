use std::fs;
use std::path::Path;

use git2::{Repository, Signature};
use serde_json::{Value, json};
use tempfile::TempDir;

/// A git repository laid out as a package catalog
pub struct CatalogRepo {
    temp: TempDir,
    repo: Repository,
}

impl Default for CatalogRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogRepo {
    /// Create an empty repository with a `packages/` directory
    #[must_use]
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let repo = Repository::init(temp.path()).expect("Failed to init git repository");
        fs::create_dir_all(temp.path().join("packages")).expect("Failed to create packages dir");
        Self { temp, repo }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Location to use as a source path
    pub fn url(&self) -> String {
        self.temp.path().display().to_string()
    }

    /// Write a file relative to the repository root
    pub fn write_file(&self, rel: &str, content: &str) {
        let path = self.temp.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(path, content).expect("Failed to write file");
    }

    /// Add a package revision with a `package.json`, optional `config.json`
    /// and a `marathon.json.mustache`
    pub fn add_package(
        &self,
        name: &str,
        version: &str,
        description: &str,
        config: Option<&Value>,
        template: &str,
    ) {
        let letter = name
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase().to_string())
            .unwrap_or_else(|| "_".to_string());
        let dir = format!("packages/{letter}/{name}/{version}");

        let package = json!({
            "name": name,
            "version": version,
            "description": description,
            "maintainer": "ops@example.com",
        });
        self.write_file(&format!("{dir}/package.json"), &package.to_string());
        if let Some(config) = config {
            self.write_file(&format!("{dir}/config.json"), &config.to_string());
        }
        self.write_file(&format!("{dir}/marathon.json.mustache"), template);
    }

    /// Commit everything in the working tree
    pub fn commit(&self, message: &str) -> git2::Oid {
        let mut index = self.repo.index().expect("Failed to open index");
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .expect("Failed to stage files");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
        let sig = Signature::now("Test", "test@test.com").expect("Failed to create signature");

        let parents = match self.repo.head() {
            Ok(head) => vec![head.peel_to_commit().expect("Failed to resolve HEAD")],
            Err(_) => vec![],
        };
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .expect("Failed to commit")
    }
}
