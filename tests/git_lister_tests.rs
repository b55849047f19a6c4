use codepack::config::{FileSource, OutputTarget, PackConfig};
use codepack::errors::EnumerationError;
use codepack::lister::{ExplicitFileList, FileLister, GitFileLister};
use codepack::pack_project;
use std::path::Path;
use tempfile::tempdir;
use tokio::fs;
use tokio::process::Command;

async fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

async fn init_repo(path: &Path) {
    let status = Command::new("git")
        .arg("init")
        .arg("--quiet")
        .arg(".")
        .current_dir(path)
        .status()
        .await
        .expect("Failed to initialize git repository");
    assert!(status.success(), "Git init failed with status: {:?}", status);
}

#[tokio::test]
async fn test_git_lister_requires_repository() {
    let dir = tempdir().unwrap();
    let result = GitFileLister::new(dir.path()).list().await;
    assert!(
        matches!(result, Err(EnumerationError::NotARepository(_))),
        "got {:?}",
        result
    );
}

#[tokio::test]
async fn test_git_lister_lists_tracked_and_untracked_files() {
    if !git_available().await {
        eprintln!("git not found, skipping");
        return;
    }
    let repo_dir = tempdir().unwrap();
    let repo_path = repo_dir.path();
    init_repo(repo_path).await;

    fs::write(repo_path.join("file1.rs"), "fn main() {}\n").await.unwrap();
    fs::write(repo_path.join("file2.py"), "print('hi')\n").await.unwrap();
    fs::create_dir_all(repo_path.join("sub")).await.unwrap();
    fs::write(repo_path.join("sub/x.rs"), "pub fn x() {}\n").await.unwrap();
    fs::write(repo_path.join("ignored.txt"), "secret\n").await.unwrap();
    fs::write(repo_path.join(".gitignore"), "ignored.txt\n").await.unwrap();

    let mut files = GitFileLister::new(repo_path).list().await.unwrap();
    files.sort();

    assert_eq!(files, vec![".gitignore", "file1.rs", "file2.py", "sub/x.rs"]);
}

#[tokio::test]
async fn test_git_lister_empty_repository_is_an_error() {
    if !git_available().await {
        eprintln!("git not found, skipping");
        return;
    }
    let repo_dir = tempdir().unwrap();
    init_repo(repo_dir.path()).await;

    let result = GitFileLister::new(repo_dir.path()).list().await;
    assert!(matches!(result, Err(EnumerationError::EmptyOutput)), "got {:?}", result);
}

#[tokio::test]
async fn test_pack_from_git_listing() {
    if !git_available().await {
        eprintln!("git not found, skipping");
        return;
    }
    let workspace = tempdir().unwrap();
    let repo_path = workspace.path().join("repo");
    fs::create_dir_all(&repo_path).await.unwrap();
    init_repo(&repo_path).await;

    fs::write(repo_path.join("main.rs"), "fn main() {}\n").await.unwrap();
    fs::write(repo_path.join("notes.log"), "noise\n").await.unwrap();
    fs::write(repo_path.join(".llmignore"), "*.log\n").await.unwrap();

    let mut config = PackConfig::new(&repo_path);
    config.source = FileSource::Git;
    config.output = OutputTarget::File(workspace.path().join("out.md"));

    let outcome = pack_project(config).await.unwrap();
    let included: Vec<String> = outcome.selection.included().map(|p| p.to_string()).collect();

    assert_eq!(included, vec![".llmignore", "main.rs"]);
    assert_eq!(outcome.report.unwrap().file_count, 2);
}

#[tokio::test]
async fn test_explicit_list_returns_paths_in_order() {
    let lister = ExplicitFileList::new(vec!["b.rs".to_owned(), "a.rs".to_owned()]);
    assert_eq!(lister.list().await.unwrap(), vec!["b.rs", "a.rs"]);

    let empty = ExplicitFileList::new(Vec::new());
    assert!(matches!(empty.list().await, Err(EnumerationError::EmptyOutput)));
}
