use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

/// What happened to a file, as reported in status records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    New,
    Deleted,
    Modified,
    Renamed,
    Copied,
    Untracked,
    Updated,
    Conflict,
}

/// One character of a porcelain XY status pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Unmodified,
    Modified,
    TypeChanged,
    Added,
    Deleted,
    Renamed,
    Copied,
    UpdatedUnmerged,
    Untracked,
    Ignored,
    Unrecognized(char),
}

impl StatusCode {
    pub fn from_char(c: char) -> Self {
        match c {
            '.' | ' ' => StatusCode::Unmodified,
            'M' => StatusCode::Modified,
            'T' => StatusCode::TypeChanged,
            'A' => StatusCode::Added,
            'D' => StatusCode::Deleted,
            'R' => StatusCode::Renamed,
            'C' => StatusCode::Copied,
            'U' => StatusCode::UpdatedUnmerged,
            '?' => StatusCode::Untracked,
            '!' => StatusCode::Ignored,
            other => StatusCode::Unrecognized(other),
        }
    }

    /// Whether this side of the pair records a change worth listing
    pub fn is_change(self) -> bool {
        !matches!(self, StatusCode::Unmodified | StatusCode::Untracked)
    }

    /// Semantic kind; anything without a dedicated kind reads as modified
    pub fn kind(self) -> ChangeKind {
        match self {
            StatusCode::Added => ChangeKind::New,
            StatusCode::Deleted => ChangeKind::Deleted,
            StatusCode::Renamed => ChangeKind::Renamed,
            StatusCode::Copied => ChangeKind::Copied,
            StatusCode::UpdatedUnmerged => ChangeKind::Updated,
            StatusCode::Modified
            | StatusCode::TypeChanged
            | StatusCode::Unmodified
            | StatusCode::Untracked
            | StatusCode::Ignored
            | StatusCode::Unrecognized(_) => ChangeKind::Modified,
        }
    }
}

/// A changed file and how it changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub file: String,
    pub status: ChangeKind,
}

impl FileChange {
    pub fn new(file: &str, status: ChangeKind) -> Self {
        Self {
            file: file.to_string(),
            status,
        }
    }
}

/// Snapshot of the working tree, index and branch position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryStatus {
    /// `None` on a detached HEAD
    pub branch: Option<String>,
    /// `None` before the first commit
    pub head_oid: Option<String>,
    pub upstream: Option<String>,
    pub is_clean: bool,
    pub staged: Vec<FileChange>,
    pub unstaged: Vec<FileChange>,
    pub untracked: Vec<FileChange>,
    pub ahead: usize,
    pub behind: usize,
    pub last_commit: Option<Commit>,
}

impl RepositoryStatus {
    /// Cardinalities of the three change lists
    pub fn counts(&self) -> ChangeCounts {
        ChangeCounts {
            staged: self.staged.len(),
            unstaged: self.unstaged.len(),
            untracked: self.untracked.len(),
            is_clean: self.is_clean,
        }
    }

    pub fn is_detached(&self) -> bool {
        self.branch.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangeCounts {
    pub staged: usize,
    pub unstaged: usize,
    pub untracked: usize,
    pub is_clean: bool,
}

/// Represents a branch from git branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub name: String,
    pub is_current: bool,
}

/// Local branches in listing order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BranchList {
    pub current: Option<String>,
    pub list: Vec<String>,
}

impl BranchList {
    pub fn branches(&self) -> Vec<Branch> {
        self.list
            .iter()
            .map(|name| Branch {
                name: name.clone(),
                is_current: self.current.as_deref() == Some(name.as_str()),
            })
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.list.iter().any(|b| b == name)
    }
}

/// Represents a commit from git log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub hash: String,
    pub author: String,
    pub date: String,
    pub message: String,
}

/// Identifier reported back by a successful commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitId(pub String);

impl CommitId {
    pub const UNKNOWN: &'static str = "unknown";

    pub fn unknown() -> Self {
        CommitId(Self::UNKNOWN.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }
}

impl Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which way a remote URL is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteDirection {
    Fetch,
    Push,
}

impl RemoteDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fetch" => Some(RemoteDirection::Fetch),
            "push" => Some(RemoteDirection::Push),
            _ => None,
        }
    }
}

/// A configured remote and its URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remote {
    pub name: String,
    pub urls: BTreeMap<RemoteDirection, String>,
}

impl Remote {
    pub fn fetch_url(&self) -> Option<&str> {
        self.urls.get(&RemoteDirection::Fetch).map(String::as_str)
    }

    pub fn push_url(&self) -> Option<&str> {
        self.urls.get(&RemoteDirection::Push).map(String::as_str)
    }
}
