//! Search-query tokens and click destinations.
//!
//! The `q` parameter carries whitespace-separated filter tokens such as
//! `s:failed`, `p:chromium` or `@smoke`. Double-quoted tokens may contain
//! spaces (`p:"mobile safari"`). Clicking a token pill replaces the token
//! of the same category; a modifier-click toggles it in place.

use std::fmt;

use url::form_urlencoded;

use crate::params::{FragmentParams, KEY_QUERY};

/// Token prefixes that partition filter tokens into exclusive categories.
const CATEGORY_PREFIXES: [&str; 3] = ["s:", "p:", "@"];

/// A ready-to-navigate fragment or URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NavigationTarget(String);

impl NavigationTarget {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NavigationTarget {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for NavigationTarget {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NavigationTarget {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Keyboard modifiers held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        meta: false,
    };
    pub const CTRL: Self = Self {
        ctrl: true,
        meta: false,
    };

    #[must_use]
    pub const fn is_additive(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Plain-click and modifier-click destinations for one clickable element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickTarget {
    pub click: NavigationTarget,
    pub ctrl_click: Option<NavigationTarget>,
}

impl ClickTarget {
    #[must_use]
    pub const fn plain(click: NavigationTarget) -> Self {
        Self {
            click,
            ctrl_click: None,
        }
    }

    /// Destination for a click with the given modifiers.
    ///
    /// Falls back to the plain destination when no modifier target exists.
    #[must_use]
    pub fn resolve(&self, modifiers: Modifiers) -> &NavigationTarget {
        if modifiers.is_additive() {
            self.ctrl_click.as_ref().unwrap_or(&self.click)
        } else {
            &self.click
        }
    }
}

/// Split a search query into tokens, keeping quoted runs together.
#[must_use]
pub fn tokenize(query: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for c in query.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => {
                current.push(c);
                escaped = true;
            }
            '"' => {
                current.push(c);
                in_quotes = !in_quotes;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Tokens of the current `q` parameter.
#[must_use]
pub fn search_tokens(params: &FragmentParams) -> Vec<String> {
    params.get(KEY_QUERY).map(tokenize).unwrap_or_default()
}

fn category(token: &str) -> Option<&'static str> {
    CATEGORY_PREFIXES
        .into_iter()
        .find(|prefix| token.starts_with(prefix))
}

fn query_target(tokens: &[String]) -> NavigationTarget {
    let params: FragmentParams = [(KEY_QUERY, tokens.join(" "))].into_iter().collect();
    NavigationTarget(params.to_fragment())
}

/// Compute the destination after clicking `token`.
///
/// With `additive`, the token is removed when already present and appended
/// otherwise. Without it, every token of the same category (and any equal
/// token) is dropped before `token` is appended, so repeating the call is
/// a no-op.
#[must_use]
pub fn toggle_token(params: &FragmentParams, token: &str, additive: bool) -> NavigationTarget {
    let mut tokens = search_tokens(params);

    if additive {
        if tokens.iter().any(|t| t == token) {
            tokens.retain(|t| t != token);
        } else {
            tokens.push(token.to_string());
        }
        return query_target(&tokens);
    }

    let replaced = category(token);
    tokens.retain(|t| t != token && (replaced.is_none() || category(t) != replaced));
    tokens.push(token.to_string());
    query_target(&tokens)
}

/// Both click destinations for a token pill, computed from one call site.
#[must_use]
pub fn token_click_target(params: &FragmentParams, token: &str) -> ClickTarget {
    ClickTarget {
        click: toggle_token(params, token, false),
        ctrl_click: Some(toggle_token(params, token, true)),
    }
}

/// Link that filters the report down to a single project.
///
/// Names that need escaping are quoted so they stay one token.
#[must_use]
pub fn project_filter_link(project_name: &str) -> NavigationTarget {
    let encoded: String = form_urlencoded::byte_serialize(project_name.as_bytes()).collect();
    let value = if encoded == project_name {
        project_name.to_string()
    } else {
        format!("\"{}\"", project_name.replace('"', "\\\""))
    };
    query_target(&[format!("p:{value}")])
}
