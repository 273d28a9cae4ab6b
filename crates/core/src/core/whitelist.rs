use super::table::SelectorKind;

/// Names that must never be renamed.
///
/// An entry matches a token it equals or prefixes. Entries written with a
/// sigil (`.active`) are compared with the sigil-bearing token, bare entries
/// (`active`) with the sigil-stripped name, so one list serves both the
/// stylesheet and the rewritten assets.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    entries: Vec<String>,
}

impl Whitelist {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(Into::into)
                .filter(|entry: &String| !entry.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `token` carries its sigil.
    pub fn contains_token(&self, token: &str) -> bool {
        let bare = SelectorKind::of_token(token)
            .map_or(token, |kind| &token[kind.sigil().len_utf8()..]);

        self.entries.iter().any(|entry| {
            let subject = if SelectorKind::of_token(entry).is_some() {
                token
            } else {
                bare
            };

            subject.starts_with(entry.as_str())
        })
    }

    /// `name` is a bare class or id name as found in an attribute value.
    pub fn contains_name(&self, name: &str, kind: SelectorKind) -> bool {
        self.entries.iter().any(|entry| match SelectorKind::of_token(entry) {
            Some(entry_kind) => {
                entry_kind == kind && name.starts_with(&entry[entry_kind.sigil().len_utf8()..])
            }
            None => name.starts_with(entry.as_str()),
        })
    }

    /// Bare names of the entries, used to keep the allocator from handing out
    /// a replacement equal to a name left in place.
    pub fn reserved_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| match SelectorKind::of_token(entry) {
            Some(kind) => &entry[kind.sigil().len_utf8()..],
            None => entry.as_str(),
        })
    }
}
