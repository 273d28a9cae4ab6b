use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    classifier::RejectReason,
    constant::{CLASS_SIGIL, ID_SIGIL},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    Class,
    Id,
}

impl SelectorKind {
    pub fn from_sigil(ch: char) -> Option<Self> {
        match ch {
            CLASS_SIGIL => Some(Self::Class),
            ID_SIGIL => Some(Self::Id),
            _ => None,
        }
    }

    /// Kind of a sigil-bearing token such as `.btn` or `#root`.
    pub fn of_token(token: &str) -> Option<Self> {
        token.chars().next().and_then(Self::from_sigil)
    }

    pub fn sigil(self) -> char {
        match self {
            Self::Class => CLASS_SIGIL,
            Self::Id => ID_SIGIL,
        }
    }
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Class => "class",
            Self::Id => "id",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEntry {
    pub find: String,
    pub replace: String,
    #[serde(rename = "type")]
    pub kind: SelectorKind,
}

impl MatchEntry {
    pub fn new(find: impl Into<String>, replace: impl Into<String>, kind: SelectorKind) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
            kind,
        }
    }

    /// JS view of a CSS entry: the leading sigil of both sides removed.
    pub fn strip_sigil(&self) -> Self {
        let sigil = self.kind.sigil();

        Self {
            find: strip(&self.find, sigil).to_string(),
            replace: strip(&self.replace, sigil).to_string(),
            kind: self.kind,
        }
    }
}

fn strip(value: &str, sigil: char) -> &str {
    value.strip_prefix(sigil).unwrap_or(value)
}

/// Diagnostic record of a token the classifier turned down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredEntry {
    pub find: String,
    pub kind: SelectorKind,
    pub reason: RejectReason,
}

/// Rename table in both of its persisted views.
///
/// `css` keeps the sigils, `js` is always derived from `css` and never
/// allocated on its own. Both are ordered by descending `find` length so that
/// substring based consumers see the longest selector before its prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTable {
    pub css: Vec<MatchEntry>,
    pub js: Vec<MatchEntry>,
}

impl RenameTable {
    pub fn from_css(mut css: Vec<MatchEntry>) -> Self {
        sort_by_find_len(&mut css);
        let js = css.iter().map(MatchEntry::strip_sigil).collect();

        Self { css, js }
    }

    pub fn is_empty(&self) -> bool {
        self.css.is_empty()
    }

    pub fn len(&self) -> usize {
        self.css.len()
    }
}

/// Stable sort, ties keep their first-seen order.
pub(crate) fn sort_by_find_len(entries: &mut [MatchEntry]) {
    entries.sort_by(|a, b| b.find.len().cmp(&a.find.len()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_token() {
        assert_eq!(SelectorKind::of_token(".btn"), Some(SelectorKind::Class));
        assert_eq!(SelectorKind::of_token("#root"), Some(SelectorKind::Id));
        assert_eq!(SelectorKind::of_token("btn"), None);
        assert_eq!(SelectorKind::of_token(""), None);
    }

    #[test]
    fn js_view_strips_exactly_one_sigil() {
        let entry = MatchEntry::new("..odd", ".a", SelectorKind::Class);

        assert_eq!(
            entry.strip_sigil(),
            MatchEntry::new(".odd", "a", SelectorKind::Class)
        );
    }

    #[test]
    fn sorted_longest_first_with_stable_ties() {
        let table = RenameTable::from_css(vec![
            MatchEntry::new(".btn", ".a", SelectorKind::Class),
            MatchEntry::new(".btn-primary", ".b", SelectorKind::Class),
            MatchEntry::new("#nav", "#c", SelectorKind::Id),
        ]);

        let finds = table.css.iter().map(|e| e.find.as_str()).collect::<Vec<_>>();
        assert_eq!(finds, [".btn-primary", ".btn", "#nav"]);

        let finds = table.js.iter().map(|e| e.find.as_str()).collect::<Vec<_>>();
        assert_eq!(finds, ["btn-primary", "btn", "nav"]);
    }

    #[test]
    fn serializes_type_field() {
        let entry = MatchEntry::new("#nav", "#a", SelectorKind::Id);
        let json = serde_json::to_string(&entry).unwrap();

        assert_eq!(json, r##"{"find":"#nav","replace":"#a","type":"id"}"##);
    }
}
