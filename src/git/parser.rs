use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::error::{GitError, GitResult};
use crate::git::types::{
    BranchList, ChangeKind, Commit, CommitId, FileChange, Remote, RemoteDirection,
    RepositoryStatus, StatusCode,
};

/// `1 <XY> <sub> <mH> <mI> <mW> <hH> <hI> <path>`
const ORDINARY_FIELDS: usize = 9;
/// `2 <XY> <sub> <mH> <mI> <mW> <hH> <hI> <X><score> <path><sep><origPath>`
const RENAMED_FIELDS: usize = 10;
/// `u <XY> <sub> <m1> <m2> <m3> <mW> <h1> <h2> <h3> <path>`
const UNMERGED_FIELDS: usize = 11;

static COMMIT_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\[.+?\s([0-9a-f]{4,40})\]").expect("commit summary pattern is valid")
});

static NOTHING_TO_COMMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)nothing (added )?to commit|no changes added to commit")
        .expect("nothing-to-commit pattern is valid")
});

/// How records and paths are laid out in status output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    /// `-z`: NUL-terminated records, verbatim paths, rename source in its own record
    Nul,
    /// Newline-terminated records, C-quoted paths, rename source after a tab
    Line,
}

/// Parse `git status --porcelain=v2 --branch [-z]` output
///
/// NUL-terminated (`-z`) output is detected and preferred; paths in
/// newline-terminated output are unquoted. Unknown record types are skipped.
/// Ahead/behind and the last commit are left at their defaults; they come
/// from separate queries.
pub fn parse_status_porcelain_v2(output: &str) -> RepositoryStatus {
    let mut status = RepositoryStatus::default();
    let framing = if output.contains('\0') {
        Framing::Nul
    } else {
        Framing::Line
    };
    let separator = match framing {
        Framing::Nul => '\0',
        Framing::Line => '\n',
    };

    let mut records = output.split(separator);
    while let Some(record) = records.next() {
        let Some(marker) = record.split_whitespace().next() else {
            continue;
        };

        match marker {
            "#" => parse_header(record, &mut status),
            "1" => parse_tracked(record, ORDINARY_FIELDS, framing, &mut status),
            "2" => {
                parse_tracked(record, RENAMED_FIELDS, framing, &mut status);
                if framing == Framing::Nul {
                    // origPath
                    records.next();
                }
            }
            "u" => parse_unmerged(record, framing, &mut status),
            "?" => {
                if let Some(path) = record.strip_prefix("? ").filter(|p| !p.is_empty()) {
                    let path = decode_path(path, framing);
                    status
                        .untracked
                        .push(FileChange::new(&path, ChangeKind::Untracked));
                }
            }
            // Ignored entries and anything newer
            _ => {}
        }
    }

    status.is_clean =
        status.staged.is_empty() && status.unstaged.is_empty() && status.untracked.is_empty();
    status
}

fn parse_header(line: &str, status: &mut RepositoryStatus) {
    if let Some(head) = line.strip_prefix("# branch.head ") {
        status.branch = (head != "(detached)").then(|| head.to_string());
    } else if let Some(oid) = line.strip_prefix("# branch.oid ") {
        status.head_oid = (oid != "(initial)").then(|| oid.to_string());
    } else if let Some(upstream) = line.strip_prefix("# branch.upstream ") {
        status.upstream = Some(upstream.to_string());
    }
}

/// Path of record is always the final field
fn last_field(line: &str, field_count: usize) -> Option<(&str, &str)> {
    let fields: Vec<&str> = line.splitn(field_count, ' ').collect();
    if fields.len() < 3 {
        return None;
    }
    let path = fields[fields.len() - 1];
    if path.is_empty() {
        return None;
    }
    Some((fields[1], path))
}

fn parse_tracked(line: &str, field_count: usize, framing: Framing, status: &mut RepositoryStatus) {
    let Some((xy, path)) = last_field(line, field_count) else {
        return;
    };
    let path = match framing {
        Framing::Nul => Cow::Borrowed(path),
        // Renamed/copied records append `\t<origPath>`
        Framing::Line => decode_path(path.split('\t').next().unwrap_or(path), framing),
    };

    let mut codes = xy.chars().map(StatusCode::from_char);
    let (Some(x), Some(y)) = (codes.next(), codes.next()) else {
        return;
    };

    if x.is_change() {
        status.staged.push(FileChange::new(&path, x.kind()));
    }
    if y.is_change() {
        status.unstaged.push(FileChange::new(&path, y.kind()));
    }
}

fn parse_unmerged(line: &str, framing: Framing, status: &mut RepositoryStatus) {
    if let Some((_, path)) = last_field(line, UNMERGED_FIELDS) {
        status
            .unstaged
            .push(FileChange::new(&decode_path(path, framing), ChangeKind::Conflict));
    }
}

fn decode_path(path: &str, framing: Framing) -> Cow<'_, str> {
    match framing {
        Framing::Nul => Cow::Borrowed(path),
        Framing::Line => unquote_path(path),
    }
}

/// Undo git's C-style path quoting, e.g. `"r\303\251sum\303\251.txt"`
///
/// Paths without surrounding quotes are returned as they are.
pub fn unquote_path(path: &str) -> Cow<'_, str> {
    let Some(inner) = path
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
    else {
        return Cow::Borrowed(path);
    };

    let raw = inner.as_bytes();
    let mut bytes = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        if raw[i] != b'\\' {
            bytes.push(raw[i]);
            i += 1;
            continue;
        }

        let Some(&escaped) = raw.get(i + 1) else {
            bytes.push(b'\\');
            break;
        };

        // Non-ASCII bytes come as three octal digits
        if let Some(octal) = raw.get(i + 1..i + 4).filter(|d| d.iter().all(u8::is_ascii_digit)) {
            if octal.iter().all(|d| *d <= b'7') {
                let value = octal
                    .iter()
                    .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                if let Ok(byte) = u8::try_from(value) {
                    bytes.push(byte);
                    i += 4;
                    continue;
                }
            }
        }

        bytes.push(match escaped {
            b'a' => 0x07,
            b'b' => 0x08,
            b'f' => 0x0c,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'v' => 0x0b,
            other => other,
        });
        i += 2;
    }

    Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse `git branch` output
pub fn parse_branch_list(output: &str) -> BranchList {
    let mut branches = BranchList::default();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // `*` current, `+` checked out in another worktree
        let is_current = line.starts_with('*');
        let name = line.trim_start_matches(['*', '+']).trim();

        // `(HEAD detached at ...)` is not a branch
        if name.is_empty() || name.starts_with('(') {
            continue;
        }

        if is_current {
            branches.current = Some(name.to_string());
        }
        branches.list.push(name.to_string());
    }

    branches
}

/// Parse default (medium) `git log` output
///
/// Message lines are the indented body; multi-line messages are joined
/// with newlines. `Merge:` and other headers are ignored.
pub fn parse_log(output: &str) -> Vec<Commit> {
    let mut commits = Vec::new();
    let mut current: Option<Commit> = None;

    for line in output.lines() {
        if let Some(rest) = line.strip_prefix("commit ") {
            if let Some(done) = current.take() {
                commits.push(done);
            }
            let hash = rest.split_whitespace().next().unwrap_or_default();
            current = Some(Commit {
                hash: hash.to_string(),
                ..Commit::default()
            });
            continue;
        }

        let Some(commit) = current.as_mut() else {
            continue;
        };

        if let Some(author) = line.strip_prefix("Author:") {
            commit.author = author.trim().to_string();
        } else if let Some(date) = line.strip_prefix("Date:") {
            commit.date = date.trim().to_string();
        } else if line.starts_with(char::is_whitespace) && !line.trim().is_empty() {
            if !commit.message.is_empty() {
                commit.message.push('\n');
            }
            commit.message.push_str(line.trim());
        }
    }

    if let Some(done) = current {
        commits.push(done);
    }

    commits
}

/// Parse `git log -1 --format=%H%n%an%n%ad%n%s` output
pub fn parse_last_commit(output: &str) -> GitResult<Commit> {
    let lines: Vec<&str> = output.lines().collect();
    if lines.len() < 4 {
        return Err(GitError::ParseError(format!(
            "expected 4 lines of commit metadata, got {}",
            lines.len()
        )));
    }

    Ok(Commit {
        hash: lines[0].trim().to_string(),
        author: lines[1].trim().to_string(),
        date: lines[2].trim().to_string(),
        message: lines[3].trim().to_string(),
    })
}

/// Parse `git remote -v` output: `<name>\t<url> (<direction>)`
///
/// Remote names cannot hold whitespace but URLs and local paths can, so the
/// name ends at the first separator and the direction is the last ` (`.
/// Remotes keep the order of their first appearance.
pub fn parse_remote_list(output: &str) -> Vec<Remote> {
    let mut remotes: Vec<Remote> = Vec::new();

    for line in output.lines() {
        let Some((name, rest)) = line.split_once(['\t', ' ']) else {
            continue;
        };
        let Some((url, direction)) = rest.trim_start().rsplit_once(" (") else {
            continue;
        };
        let Some(direction) = direction
            .trim_end()
            .strip_suffix(')')
            .and_then(RemoteDirection::parse)
        else {
            continue;
        };

        let url = url.trim_end();
        if name.is_empty() || url.is_empty() {
            continue;
        }

        match remotes.iter_mut().find(|r| r.name == name) {
            Some(remote) => {
                remote.urls.insert(direction, url.to_string());
            }
            None => remotes.push(Remote {
                name: name.to_string(),
                urls: [(direction, url.to_string())].into_iter().collect(),
            }),
        }
    }

    remotes
}

/// Parse `git rev-list --left-right --count A...B` output into (ahead, behind)
pub fn parse_ahead_behind(output: &str) -> Option<(usize, usize)> {
    let mut counts = output.split_whitespace().map(str::parse::<usize>);
    match (counts.next(), counts.next(), counts.next()) {
        (Some(Ok(ahead)), Some(Ok(behind)), None) => Some((ahead, behind)),
        _ => None,
    }
}

/// Pull the short id out of `git commit` confirmation text, e.g.
/// `[main 1a2b3c4] message`; falls back to [`CommitId::unknown`]
pub fn extract_commit_id(output: &str) -> CommitId {
    COMMIT_SUMMARY
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| CommitId(m.as_str().to_string()))
        .unwrap_or_else(CommitId::unknown)
}

/// Whether commit output says there was nothing staged to record
pub fn is_nothing_to_commit(output: &str) -> bool {
    NOTHING_TO_COMMIT.is_match(output)
}
