//! Canonical links into report sub-resources.
//!
//! Everything here is a pure function of its inputs. Links to a test
//! result are fragments (`#?testId=..&run=..`); trace links are
//! page-relative URLs pointing at the bundled trace viewer, carrying one
//! absolute `trace=` URL per archive.

use tracing::warn;
use url::Url;

use crate::config::LinkConfig;
use crate::model::{TestAttachment, TestCase, TestResult, identity_index};
use crate::params::{FragmentParams, KEY_ANCHOR, KEY_QUERY, KEY_RUN, KEY_TEST_ID};

/// Report-relative location of the bundled trace viewer.
pub const TRACE_VIEWER_PATH: &str = "trace/index.html";

/// Index written when a result is not one of the test's results.
pub const MISSING_INDEX: i64 = -1;

const ATTACHMENT_ANCHOR_PREFIX: &str = "attachment-";

/// Inputs for [`test_result_link`]. Every field is optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestResultLink<'a> {
    pub test: Option<&'a TestCase>,
    /// Must be borrowed from `test.results` to resolve to a run index.
    pub result: Option<&'a TestResult>,
    pub anchor: Option<&'a str>,
    /// Current parameters whose `q` should survive the navigation.
    pub filter: Option<&'a FragmentParams>,
}

fn index_or_missing(found: Option<usize>) -> String {
    found.map_or_else(|| MISSING_INDEX.to_string(), |idx| idx.to_string())
}

/// Build the fragment that opens a test (and optionally one of its runs).
///
/// Parameters appear in the order `testId`, `run`, `anchor`, `q`; absent
/// inputs are simply left out.
#[must_use]
pub fn test_result_link(link: TestResultLink<'_>) -> String {
    let mut params = FragmentParams::new();
    if let Some(test) = link.test {
        params.append(KEY_TEST_ID, test.test_id.as_str());
        if let Some(result) = link.result {
            params.append(KEY_RUN, index_or_missing(identity_index(&test.results, result)));
        }
    }
    if let Some(anchor) = link.anchor {
        params.append(KEY_ANCHOR, anchor);
    }
    if let Some(query) = link
        .filter
        .and_then(|filter| filter.get(KEY_QUERY))
        .filter(|query| !query.is_empty())
    {
        params.append(KEY_QUERY, query);
    }
    params.to_fragment()
}

/// Anchor token identifying `attachment` within `result`.
#[must_use]
pub fn attachment_anchor(result: &TestResult, attachment: &TestAttachment) -> String {
    format!(
        "{ATTACHMENT_ANCHOR_PREFIX}{}",
        index_or_missing(identity_index(&result.attachments, attachment))
    )
}

/// Fragment that opens `result` scrolled to `attachment`.
#[must_use]
pub fn attachment_link(
    test: &TestCase,
    result: &TestResult,
    attachment: &TestAttachment,
    filter: Option<&FragmentParams>,
) -> String {
    let anchor = attachment_anchor(result, attachment);
    test_result_link(TestResultLink {
        test: Some(test),
        result: Some(result),
        anchor: Some(&anchor),
        filter,
    })
}

/// Trace viewer URL for `attachments`, resolved against `base`.
#[must_use]
pub fn trace_viewer_link(base: &Url, attachments: &[TestAttachment]) -> String {
    trace_viewer_link_at(TRACE_VIEWER_PATH, base, attachments)
}

/// Like [`trace_viewer_link`] with an explicit viewer location.
///
/// Attachments without a path are skipped; input order is preserved.
#[must_use]
pub fn trace_viewer_link_at(viewer: &str, base: &Url, attachments: &[TestAttachment]) -> String {
    let traces: Vec<String> = attachments
        .iter()
        .filter_map(|attachment| attachment.path.as_deref())
        .map(|path| {
            let absolute = base.join(path).map_or_else(
                |err| {
                    warn!(path, error = %err, "trace path not resolvable, keeping it relative");
                    path.to_string()
                },
                |url| url.to_string(),
            );
            format!("trace={absolute}")
        })
        .collect();
    format!("{viewer}?{}", traces.join("&"))
}

impl LinkConfig {
    /// [`test_result_link`] honoring `carry_filter`.
    #[must_use]
    pub fn test_result_link(&self, mut link: TestResultLink<'_>) -> String {
        if !self.carry_filter {
            link.filter = None;
        }
        test_result_link(link)
    }

    /// [`trace_viewer_link_at`] using the configured viewer path.
    #[must_use]
    pub fn trace_viewer_link(&self, base: &Url, attachments: &[TestAttachment]) -> String {
        trace_viewer_link_at(&self.trace_viewer_path, base, attachments)
    }
}
