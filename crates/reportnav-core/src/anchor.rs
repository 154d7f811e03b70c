//! Anchor matching and the per-subscriber reveal state machine.
//!
//! A view registers an [`AnchorSpec`] describing which `anchor` values
//! refer to it. Each time the fragment changes, its [`AnchorTracker`]
//! re-evaluates the match:
//!
//! ```text
//!          match holds
//!   Idle ─────────────▶ Anchored     (reveal fires once)
//!    ▲                     │
//!    └─────────────────────┘
//!        match stops holding          (silent)
//! ```
//!
//! Staying Anchored across unrelated parameter churn never re-fires.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::params::{FragmentParams, KEY_ANCHOR};

/// Which anchor values refer to a subscriber.
#[derive(Clone, Default)]
pub enum AnchorSpec {
    /// Never anchored.
    #[default]
    None,
    /// Anchored when the value equals this token.
    Exact(String),
    /// Anchored when the value is any of these tokens.
    AnySet(BTreeSet<String>),
    /// Anchored when the predicate accepts the value.
    Predicate(Rc<dyn Fn(&str) -> bool>),
}

impl AnchorSpec {
    #[must_use]
    pub fn exact(token: impl Into<String>) -> Self {
        Self::Exact(token.into())
    }

    #[must_use]
    pub fn any_of<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AnySet(tokens.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn predicate(f: impl Fn(&str) -> bool + 'static) -> Self {
        Self::Predicate(Rc::new(f))
    }

    /// Whether an `anchor` value refers to this spec.
    #[must_use]
    pub fn matches(&self, anchor: &str) -> bool {
        match self {
            Self::None => false,
            Self::Exact(token) => token == anchor,
            Self::AnySet(tokens) => tokens.contains(anchor),
            Self::Predicate(f) => f(anchor),
        }
    }
}

impl fmt::Debug for AnchorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Exact(token) => f.debug_tuple("Exact").field(token).finish(),
            Self::AnySet(tokens) => f.debug_tuple("AnySet").field(tokens).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for AnchorSpec {
    fn from(token: &str) -> Self {
        Self::exact(token)
    }
}

impl From<String> for AnchorSpec {
    fn from(token: String) -> Self {
        Self::Exact(token)
    }
}

impl From<Option<String>> for AnchorSpec {
    fn from(token: Option<String>) -> Self {
        token.map_or(Self::None, Self::Exact)
    }
}

/// Whether the current parameters anchor `spec`.
///
/// A missing `anchor` key is simply "not anchored".
#[must_use]
pub fn is_anchored(params: &FragmentParams, spec: &AnchorSpec) -> bool {
    params
        .get(KEY_ANCHOR)
        .is_some_and(|anchor| spec.matches(anchor))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorState {
    Idle,
    Anchored,
}

/// Reveal state of one subscriber.
#[derive(Debug, Clone)]
pub struct AnchorTracker {
    spec: AnchorSpec,
    state: AnchorState,
}

impl AnchorTracker {
    #[must_use]
    pub const fn new(spec: AnchorSpec) -> Self {
        Self {
            spec,
            state: AnchorState::Idle,
        }
    }

    #[must_use]
    pub const fn state(&self) -> AnchorState {
        self.state
    }

    #[must_use]
    pub const fn spec(&self) -> &AnchorSpec {
        &self.spec
    }

    /// Feed a new parameter snapshot.
    ///
    /// Returns `true` exactly when this snapshot moves the tracker from
    /// Idle to Anchored, i.e. when the reveal should run.
    pub fn update(&mut self, params: &FragmentParams) -> bool {
        let anchored = is_anchored(params, &self.spec);
        match (self.state, anchored) {
            (AnchorState::Idle, true) => {
                trace!(spec = ?self.spec, "anchor revealed");
                self.state = AnchorState::Anchored;
                true
            }
            (AnchorState::Anchored, false) => {
                trace!(spec = ?self.spec, "anchor released");
                self.state = AnchorState::Idle;
                false
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::parse;

    #[test]
    fn exact_matches_only_equal_token() {
        let spec = AnchorSpec::exact("a");
        assert!(is_anchored(&parse("#?anchor=a"), &spec));
        assert!(!is_anchored(&parse("#?anchor=ab"), &spec));
        assert!(!is_anchored(&parse("#?testId=a"), &spec));
    }

    #[test]
    fn set_matches_members() {
        let spec = AnchorSpec::any_of(["a", "b"]);
        assert!(is_anchored(&parse("#?anchor=a"), &spec));
        assert!(is_anchored(&parse("#?anchor=b"), &spec));
        assert!(!is_anchored(&parse("#?anchor=c"), &spec));
    }

    #[test]
    fn predicate_is_trusted() {
        let spec = AnchorSpec::predicate(|v| v.starts_with("row-"));
        assert!(is_anchored(&parse("#?anchor=row-42"), &spec));
        assert!(!is_anchored(&parse("#?anchor=col-42"), &spec));
    }

    #[test]
    fn none_never_matches() {
        assert!(!is_anchored(&parse("#?anchor="), &AnchorSpec::None));
        assert!(!is_anchored(&parse("#?anchor=x"), &AnchorSpec::from(None)));
    }

    #[test]
    fn first_anchor_value_wins() {
        let spec = AnchorSpec::exact("second");
        assert!(!is_anchored(&parse("#?anchor=first&anchor=second"), &spec));
    }

    #[test]
    fn tracker_fires_once_per_transition() {
        let mut tracker = AnchorTracker::new(AnchorSpec::exact("row-3"));
        assert!(!tracker.update(&parse("#?q=x")));
        assert!(tracker.update(&parse("#?anchor=row-3")));
        assert_eq!(tracker.state(), AnchorState::Anchored);

        assert!(!tracker.update(&parse("#?anchor=row-3&q=other")));
        assert!(!tracker.update(&parse("#?anchor=row-4")));
        assert_eq!(tracker.state(), AnchorState::Idle);

        assert!(tracker.update(&parse("#?anchor=row-3")));
    }

    #[test]
    fn debug_hides_predicate_body() {
        let spec = AnchorSpec::predicate(|_| true);
        assert_eq!(format!("{spec:?}"), "Predicate(..)");
        assert_eq!(format!("{:?}", AnchorSpec::from("a")), r#"Exact("a")"#);
    }
}
