//! Host navigation ports.
//!
//! The store never talks to a browser directly. A host provides the
//! current location, a way to push a new entry, and session traversal.
//! [`MemoryHistory`] is the in-process host: a session history list with
//! `pushState` semantics, used by headless tooling and tests.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};
use url::Url;

use crate::error::NavError;

/// Capabilities the navigation store needs from its host.
pub trait HistoryPort {
    /// The current page location.
    fn location(&self) -> Url;

    /// Push `target` as a new session entry, resolved against the current
    /// location. Hosts do not notify anyone; the caller signals the change.
    ///
    /// # Errors
    ///
    /// Returns whatever the host reports when it refuses the target.
    fn push_location(&mut self, target: &str) -> Result<(), NavError>;

    /// Traverse `delta` entries through the session history.
    ///
    /// Returns `false` when the traversal would leave the history bounds,
    /// in which case the location is unchanged.
    fn go(&mut self, delta: isize) -> bool;
}

#[derive(Debug)]
struct SessionHistory {
    entries: Vec<Url>,
    index: usize,
}

/// In-memory session history.
///
/// Clones share the same history, so a caller can keep a handle for
/// inspection after handing one to the store.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    session: Rc<RefCell<SessionHistory>>,
}

impl MemoryHistory {
    #[must_use]
    pub fn new(initial: Url) -> Self {
        Self {
            session: Rc::new(RefCell::new(SessionHistory {
                entries: vec![initial],
                index: 0,
            })),
        }
    }

    /// Start a history at an absolute `href`.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::InvalidBaseUrl`] if `href` is not absolute.
    pub fn from_href(href: &str) -> Result<Self, NavError> {
        let initial = Url::parse(href).map_err(|err| NavError::InvalidBaseUrl {
            url: href.to_string(),
            reason: err.to_string(),
        })?;
        Ok(Self::new(initial))
    }

    /// Every entry in the session, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<Url> {
        self.session.borrow().entries.clone()
    }

    /// Position of the current entry.
    #[must_use]
    pub fn index(&self) -> usize {
        self.session.borrow().index
    }
}

impl HistoryPort for MemoryHistory {
    fn location(&self) -> Url {
        let session = self.session.borrow();
        session.entries[session.index].clone()
    }

    fn push_location(&mut self, target: &str) -> Result<(), NavError> {
        let mut session = self.session.borrow_mut();
        let next = session.entries[session.index].join(target).map_err(|err| {
            warn!(nav_target = target, error = %err, "host rejected navigation target");
            NavError::LocationRejected {
                target: target.to_string(),
                reason: err.to_string(),
            }
        })?;

        let keep = session.index + 1;
        session.entries.truncate(keep);
        session.entries.push(next);
        session.index = keep;
        debug!(index = session.index, "pushed history entry");
        Ok(())
    }

    fn go(&mut self, delta: isize) -> bool {
        let mut session = self.session.borrow_mut();
        let Some(next) = session.index.checked_add_signed(delta) else {
            return false;
        };
        if next >= session.entries.len() {
            return false;
        }
        session.index = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> MemoryHistory {
        MemoryHistory::from_href("https://x/report/index.html").expect("valid href")
    }

    #[test]
    fn push_resolves_fragment_against_current_page() {
        let mut history = history();
        history.push_location("#?testId=T1").expect("push");
        let location = history.location();
        assert_eq!(location.path(), "/report/index.html");
        assert_eq!(location.fragment(), Some("?testId=T1"));
    }

    #[test]
    fn push_truncates_forward_entries() {
        let mut history = history();
        history.push_location("#?a=1").expect("push");
        history.push_location("#?a=2").expect("push");
        assert!(history.go(-1));
        history.push_location("#?a=3").expect("push");

        let fragments: Vec<Option<String>> = history
            .entries()
            .iter()
            .map(|u| u.fragment().map(str::to_string))
            .collect();
        assert_eq!(
            fragments,
            vec![None, Some("?a=1".to_string()), Some("?a=3".to_string())]
        );
        assert_eq!(history.index(), 2);
    }

    #[test]
    fn go_stays_within_bounds() {
        let mut history = history();
        assert!(!history.go(-1));
        assert!(!history.go(1));
        history.push_location("#?a=1").expect("push");
        assert!(history.go(-1));
        assert_eq!(history.index(), 0);
        assert!(history.go(1));
        assert_eq!(history.index(), 1);
    }

    #[test]
    fn clones_share_the_session() {
        let mut history = history();
        let observer = history.clone();
        history.push_location("#?anchor=x").expect("push");
        assert_eq!(observer.location().fragment(), Some("?anchor=x"));
    }

    #[test]
    fn rejected_target_surfaces_host_error() {
        let mut history = history();
        let err = history
            .push_location("http://[::1")
            .expect_err("malformed authority must be rejected");
        assert!(matches!(err, NavError::LocationRejected { .. }));
        assert_eq!(history.entries().len(), 1);
    }

    #[test]
    fn from_href_requires_absolute_url() {
        let err = MemoryHistory::from_href("report/index.html").expect_err("relative");
        assert!(matches!(err, NavError::InvalidBaseUrl { .. }));
    }
}
