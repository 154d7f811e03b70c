//! Report data consumed by the link builders.
//!
//! These mirror the JSON the report generator writes per test file. Only
//! the fields navigation needs are modeled; unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// A single attachment recorded on a test result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestAttachment {
    pub name: String,
    pub content_type: String,
    /// Report-relative location of the attachment file, when stored on disk.
    #[serde(default)]
    pub path: Option<String>,
    /// Inline body, for small text attachments.
    #[serde(default)]
    pub body: Option<String>,
}

impl TestAttachment {
    /// Whether this attachment is a Playwright trace archive.
    #[must_use]
    pub fn is_trace(&self) -> bool {
        self.name == "trace" && self.path.is_some()
    }
}

/// One execution (retry) of a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    #[serde(default)]
    pub retry: u32,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub attachments: Vec<TestAttachment>,
}

impl TestResult {
    /// Trace attachments in recorded order.
    pub fn traces(&self) -> impl Iterator<Item = &TestAttachment> {
        self.attachments.iter().filter(|a| a.is_trace())
    }
}

/// A test case with its results in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub test_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub results: Vec<TestResult>,
}

/// Position of `item` in `items`, compared by reference.
///
/// Two results with equal contents are still distinct results; only the
/// very element borrowed from `items` counts as a member.
pub(crate) fn identity_index<T>(items: &[T], item: &T) -> Option<usize> {
    items.iter().position(|candidate| std::ptr::eq(candidate, item))
}
