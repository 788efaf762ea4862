mod helpers;

use gitbridge::git::parser::*;
use gitbridge::git::{ChangeKind, FileChange, RemoteDirection, Repository};
use gitbridge::GitError;
use helpers::{create_commit, create_test_repo, stage_file};
use std::fs;

/// Test parsing completely empty git output
#[test]
fn test_parse_empty_outputs() {
    let status = parse_status_porcelain_v2("");
    assert!(status.is_clean);
    assert!(status.branch.is_none());

    assert!(parse_log("").is_empty());
    assert!(parse_branch_list("").list.is_empty());
    assert!(parse_remote_list("").is_empty());
    assert!(parse_ahead_behind("").is_none());
    assert!(extract_commit_id("").is_unknown());
}

/// Test parsing malformed git status output
#[test]
fn test_parse_malformed_status() {
    // Too few fields to carry a path
    let status = parse_status_porcelain_v2("1 M.\n2\nu UU");
    assert!(status.staged.is_empty());
    assert!(status.unstaged.is_empty());
    assert!(status.is_clean);

    // Unknown codes still land in both lists as modifications
    let status =
        parse_status_porcelain_v2("1 XX N... 100644 100644 100644 abc123 def456 file.txt");
    assert_eq!(
        status.staged,
        vec![FileChange::new("file.txt", ChangeKind::Modified)]
    );
    assert_eq!(status.unstaged.len(), 1);
}

/// Test that unknown record types and ignored entries are skipped
#[test]
fn test_parse_unknown_records() {
    let output = "! target/\nz something new\n? kept.txt";
    let status = parse_status_porcelain_v2(output);

    assert_eq!(
        status.untracked,
        vec![FileChange::new("kept.txt", ChangeKind::Untracked)]
    );
    assert!(!status.is_clean);
}

/// Test parsing file paths with spaces
#[test]
fn test_parse_paths_with_spaces() {
    let output = "1 M. N... 100644 100644 100644 abc123 def456 my file with spaces.txt";
    let status = parse_status_porcelain_v2(output);

    assert_eq!(status.staged.len(), 1);
    assert_eq!(status.staged[0].file, "my file with spaces.txt");
}

/// Test parsing a rename whose paths contain spaces
#[test]
fn test_parse_rename_with_spaces() {
    let output = "2 R. N... 100644 100644 100644 abc123 def456 R100 new name.txt\told name.txt";
    let status = parse_status_porcelain_v2(output);

    assert_eq!(
        status.staged,
        vec![FileChange::new("new name.txt", ChangeKind::Renamed)]
    );
}

/// Test parsing very long file paths
#[test]
fn test_parse_very_long_paths() {
    let long_path = "a/".repeat(100) + "file.txt";
    let output = format!("1 .M N... 100644 100644 100644 abc123 def456 {}", long_path);
    let status = parse_status_porcelain_v2(&output);

    assert_eq!(status.unstaged.len(), 1);
    assert_eq!(status.unstaged[0].file, long_path);
}

/// Test parsing unicode in file paths and branch names
#[test]
fn test_parse_unicode() {
    let status = parse_status_porcelain_v2("# branch.head 機能/ブランチ\n? 文件.txt");
    assert_eq!(status.branch.as_deref(), Some("機能/ブランチ"));
    assert_eq!(status.untracked[0].file, "文件.txt");

    let branches = parse_branch_list("* 機能/ブランチ\n  main");
    assert_eq!(branches.current.as_deref(), Some("機能/ブランチ"));
}

/// Test branch names with special characters
#[test]
fn test_parse_branch_special_chars() {
    let output = "  feature/JIRA-123_fix.v2\n* release/2024.01\n+ wt-branch";
    let branches = parse_branch_list(output);

    assert_eq!(
        branches.list,
        vec!["feature/JIRA-123_fix.v2", "release/2024.01", "wt-branch"]
    );
    assert_eq!(branches.current.as_deref(), Some("release/2024.01"));
}

/// Test detached HEAD in both status and branch output
#[test]
fn test_parse_detached_head() {
    let status = parse_status_porcelain_v2("# branch.oid 1a2b3c\n# branch.head (detached)");
    assert!(status.is_detached());
    assert_eq!(status.head_oid.as_deref(), Some("1a2b3c"));

    let branches = parse_branch_list("* (HEAD detached at 1a2b3c)\n  main");
    assert!(branches.current.is_none());
    assert_eq!(branches.list, vec!["main"]);
}

/// Test log entries missing parts of their header
#[test]
fn test_parse_log_partial_entries() {
    let output = "commit abc123\n\n    No author or date\ncommit def456\nAuthor: A <a@x>\n";
    let commits = parse_log(output);

    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].message, "No author or date");
    assert!(commits[0].author.is_empty());
    assert_eq!(commits[1].author, "A <a@x>");
    assert!(commits[1].message.is_empty());
}

/// Test that text before the first commit header is ignored
#[test]
fn test_parse_log_leading_noise() {
    let output = "warning: something\ncommit abc123\nAuthor: A <a@x>\n\n    Real";
    let commits = parse_log(output);

    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].hash, "abc123");
}

/// Test last-commit output with too few lines
#[test]
fn test_parse_last_commit_truncated() {
    let err = parse_last_commit("abc\nAuthor\n").unwrap_err();
    assert!(matches!(err, GitError::ParseError(_)));
}

/// Test remote lines that do not match the expected shape
#[test]
fn test_parse_remote_malformed() {
    let output = "origin\nupstream https://x (sideways)\nfork https://y (push)";
    let remotes = parse_remote_list(output);

    assert_eq!(remotes.len(), 1);
    assert_eq!(remotes[0].name, "fork");
    assert_eq!(
        remotes[0].urls.get(&RemoteDirection::Push).map(String::as_str),
        Some("https://y")
    );
    assert!(remotes[0].fetch_url().is_none());
}

/// Test ahead/behind output that is not two counts
#[test]
fn test_parse_ahead_behind_malformed() {
    assert!(parse_ahead_behind("3").is_none());
    assert!(parse_ahead_behind("a b").is_none());
    assert!(parse_ahead_behind("1 2 3").is_none());
    assert_eq!(parse_ahead_behind("  4\t0\n"), Some((4, 0)));
}

/// Test root-commit confirmation and noise around the summary line
#[test]
fn test_extract_commit_id_variants() {
    let root = "[main (root-commit) 9f8e7d6] Initial\n 1 file changed";
    assert_eq!(extract_commit_id(root).0, "9f8e7d6");

    let hooked = "hook output\n[feature/x 0a1b2c3] Msg";
    assert_eq!(extract_commit_id(hooked).0, "0a1b2c3");

    assert!(extract_commit_id("[not a summary]").is_unknown());
}

/// Test real file names with spaces and non-ASCII characters under default
/// path quoting, and that the reported names can be staged as given
#[tokio::test]
async fn test_status_with_unusual_file_names() {
    let (_temp, repo_path) = create_test_repo();
    create_commit(&repo_path, "README.md", "hello", "Initial commit");

    fs::create_dir(repo_path.join("docs dir")).unwrap();
    stage_file(&repo_path, "docs dir/read me.txt", "x");
    fs::write(repo_path.join("résumé.txt"), "y").unwrap();
    fs::write(repo_path.join("say \"hi\".txt"), "z").unwrap();

    let repo = Repository::open(&repo_path);
    let status = repo.status().get_status().await.unwrap();

    assert_eq!(
        status.staged,
        vec![FileChange::new("docs dir/read me.txt", ChangeKind::New)]
    );
    assert_eq!(
        status.untracked,
        vec![
            FileChange::new("résumé.txt", ChangeKind::Untracked),
            FileChange::new("say \"hi\".txt", ChangeKind::Untracked),
        ]
    );

    for change in &status.untracked {
        repo.commits().stage(&change.file).await.unwrap();
    }

    let status = repo.status().get_status().await.unwrap();
    assert!(status.untracked.is_empty());
    assert_eq!(status.staged.len(), 3);
    assert!(status
        .staged
        .contains(&FileChange::new("résumé.txt", ChangeKind::New)));
}

/// Test arguments that would be read as options are refused before running
#[tokio::test]
async fn test_option_like_names_rejected() {
    let (_temp, repo_path) = create_test_repo();
    create_commit(&repo_path, "README.md", "hello", "Initial commit");

    let repo = Repository::open(&repo_path);

    let err = repo.branches().create("--force").await.unwrap_err();
    assert!(matches!(err, GitError::InvalidArgument(_)));

    let err = repo.branches().switch("").await.unwrap_err();
    assert!(matches!(err, GitError::InvalidArgument(_)));

    let err = repo.remotes().remove("-v").await.unwrap_err();
    assert!(matches!(err, GitError::InvalidArgument(_)));

    assert_eq!(repo.branches().list().await.unwrap().list, vec!["main"]);
}
