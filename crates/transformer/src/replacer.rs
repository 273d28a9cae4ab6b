use csm_core::{MatchEntry, SelectorKind};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::{
    filter::{TokenFilterPlugin, TokenItem},
    report::{Outcome, RewriteReport},
};

/// Rename table keyed for lookups by bare name, split per kind.
///
/// Built once per rewrite phase and only ever read afterwards, so it can be
/// shared by every worker.
#[derive(Debug, Default)]
pub struct RenameLookup {
    class: FxHashMap<String, String>,
    id: FxHashMap<String, String>,
}

impl RenameLookup {
    pub fn new(entries: &[MatchEntry]) -> Self {
        let mut lookup = Self::default();

        for entry in entries {
            lookup
                .map_mut(entry.kind)
                .entry(entry.find.clone())
                .or_insert_with(|| entry.replace.clone());
        }

        lookup
    }

    fn map(&self, kind: SelectorKind) -> &FxHashMap<String, String> {
        match kind {
            SelectorKind::Class => &self.class,
            SelectorKind::Id => &self.id,
        }
    }

    fn map_mut(&mut self, kind: SelectorKind) -> &mut FxHashMap<String, String> {
        match kind {
            SelectorKind::Class => &mut self.class,
            SelectorKind::Id => &mut self.id,
        }
    }

    pub fn get(&self, kind: SelectorKind, find: &str) -> Option<&str> {
        self.map(kind).get(find).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.class.is_empty() && self.id.is_empty()
    }
}

/// An attribute whose string values hold class or id names, e.g. the
/// `className:"..."` of compiled JSX.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub kind: SelectorKind,
    marker: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = if name == "id" {
            SelectorKind::Id
        } else {
            SelectorKind::Class
        };

        Self {
            marker: format!("{}:\"", name),
            name,
            kind,
        }
    }
}

/// Characters a rewritable value may contain; anything else ends the value.
fn is_value_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | ' ')
}

/// Scan state of one attribute pass over one asset.
struct RewriteContext<'a> {
    source: &'a str,
    output: String,
    pos: usize,
    attribute: &'a Attribute,
}

impl<'a> RewriteContext<'a> {
    fn new(source: &'a str, attribute: &'a Attribute) -> Self {
        Self {
            source,
            output: String::with_capacity(source.len()),
            pos: 0,
            attribute,
        }
    }

    /// Copy everything up to and including the next marker and return the end
    /// of the fragment that follows it: the next marker or the end of input.
    fn next_fragment(&mut self) -> Option<usize> {
        let marker = self.attribute.marker.as_str();

        let Some(offset) = self.source[self.pos..].find(marker) else {
            self.output.push_str(&self.source[self.pos..]);
            self.pos = self.source.len();
            return None;
        };

        let value_start = self.pos + offset + marker.len();
        self.output.push_str(&self.source[self.pos..value_start]);
        self.pos = value_start;

        let end = self.source[value_start..]
            .find(marker)
            .map_or(self.source.len(), |offset| value_start + offset);

        Some(end)
    }

    fn copy_to(&mut self, end: usize) {
        self.output.push_str(&self.source[self.pos..end]);
        self.pos = end;
    }
}

pub struct AttributeReplacer<'a> {
    lookup: &'a RenameLookup,
    filter: &'a dyn TokenFilterPlugin,
}

impl<'a> AttributeReplacer<'a> {
    pub fn new(lookup: &'a RenameLookup, filter: &'a dyn TokenFilterPlugin) -> Self {
        Self { lookup, filter }
    }

    /// Rewrite every `<attribute>:"value"` occurrence in `source`.
    pub fn replace(
        &self,
        source: &str,
        attribute: &Attribute,
        report: &mut RewriteReport,
    ) -> String {
        let mut cx = RewriteContext::new(source, attribute);

        while let Some(end) = cx.next_fragment() {
            let fragment = &source[cx.pos..end];

            let Some((boundary, _)) = fragment.char_indices().find(|(_, ch)| !is_value_char(*ch))
            else {
                debug!("unterminated {} value, left as is", attribute.name);
                cx.copy_to(end);
                continue;
            };

            let value = &fragment[..boundary];
            if !value.is_empty() {
                let rewritten = self.replace_value(value, attribute.kind, report);
                cx.output.push_str(&rewritten);
                cx.pos += boundary;
            }
        }

        cx.output
    }

    fn replace_value(&self, value: &str, kind: SelectorKind, report: &mut RewriteReport) -> String {
        let mut tokens = Vec::new();

        for name in value.split(' ') {
            if name.is_empty() {
                tokens.push(name);
                continue;
            }

            if self.filter.filter_token(&TokenItem { name, kind }) {
                trace!("keep whitelisted {}", name);
                report.record(name, None, kind, Outcome::Whitelisted);
                tokens.push(name);
                continue;
            }

            match self.lookup.get(kind, name) {
                Some(replace) => {
                    report.record(name, Some(replace), kind, Outcome::Replaced);
                    tokens.push(replace);
                }
                None => {
                    report.record(name, None, kind, Outcome::Unknown);
                    tokens.push(name);
                }
            }
        }

        tokens.join(" ")
    }
}

fn is_force_delimiter(ch: char) -> bool {
    matches!(ch, ' ' | '\'' | '"')
}

/// Replace every `find` directly followed by a space or a quote.
///
/// Blind to the surrounding syntax, so only ever run for names the caller
/// asked for explicitly. Returns the new text and the number of replacements.
pub fn force_replace(content: &str, find: &str, replace: &str) -> (String, usize) {
    if find.is_empty() {
        return (content.to_string(), 0);
    }

    let mut output = String::with_capacity(content.len());
    let mut copied = 0;
    let mut search = 0;
    let mut count = 0;

    while let Some(offset) = content[search..].find(find) {
        let start = search + offset;
        let end = start + find.len();

        match content[end..].chars().next() {
            Some(ch) if is_force_delimiter(ch) => {
                output.push_str(&content[copied..start]);
                output.push_str(replace);
                copied = end;
                search = end;
                count += 1;
            }
            _ => {
                search = start + content[start..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    output.push_str(&content[copied..]);

    (output, count)
}

#[cfg(test)]
mod tests {
    use csm_core::Whitelist;

    use super::*;
    use crate::filter::{TokenFilterPluginAdapter, WhitelistFilter};

    fn lookup() -> RenameLookup {
        RenameLookup::new(&[
            MatchEntry::new("btn-primary", "b", SelectorKind::Class),
            MatchEntry::new("btn", "a", SelectorKind::Class),
            MatchEntry::new("main", "c", SelectorKind::Id),
        ])
    }

    fn rewrite(source: &str, attribute: &str) -> String {
        let lookup = lookup();
        let filter = TokenFilterPluginAdapter::new(vec![Box::new(WhitelistFilter(
            Whitelist::new(["active"]),
        ))]);
        let replacer = AttributeReplacer::new(&lookup, &filter);

        replacer.replace(source, &Attribute::new(attribute), &mut RewriteReport::default())
    }

    mod attribute {
        use super::*;

        #[test]
        fn whitelisted_token_is_kept() {
            assert_eq!(
                rewrite(r#"h("a",{className:"btn active"})"#, "className"),
                r#"h("a",{className:"a active"})"#
            );
        }

        #[test]
        fn longest_names_are_not_corrupted() {
            assert_eq!(
                rewrite(r#"{className:"btn-primary btn"}"#, "className"),
                r#"{className:"b a"}"#
            );
        }

        #[test]
        fn every_occurrence() {
            assert_eq!(
                rewrite(
                    r#"[{className:"btn"},{className:"x btn-primary"},{className:"btn"}]"#,
                    "className"
                ),
                r#"[{className:"a"},{className:"x b"},{className:"a"}]"#
            );
        }

        #[test]
        fn id_attribute_uses_id_entries() {
            assert_eq!(rewrite(r#"{id:"main"}"#, "id"), r#"{id:"c"}"#);
            assert_eq!(rewrite(r#"{id:"btn"}"#, "id"), r#"{id:"btn"}"#);
            assert_eq!(
                rewrite(r#"{className:"main"}"#, "className"),
                r#"{className:"main"}"#
            );
        }

        #[test]
        fn empty_value() {
            assert_eq!(
                rewrite(r#"{className:"",id:""}"#, "className"),
                r#"{className:"",id:""}"#
            );
        }

        #[test]
        fn unterminated_value_is_left_alone() {
            assert_eq!(rewrite(r#"x={className:"btn"#, "className"), r#"x={className:"btn"#);
        }

        #[test]
        fn marker_inside_value_splits_fragments() {
            assert_eq!(
                rewrite(r#"className:"btn className:"btn""#, "className"),
                r#"className:"btn className:"a""#
            );
        }

        #[test]
        fn value_ends_at_first_foreign_character() {
            assert_eq!(
                rewrite(r#"{className:"btn "+p.x}"#, "className"),
                r#"{className:"a "+p.x}"#
            );
            assert_eq!(
                rewrite(r#"{className:"btn\n"}"#, "className"),
                r#"{className:"a\n"}"#
            );
        }

        #[test]
        fn spacing_is_preserved() {
            assert_eq!(
                rewrite(r#"{className:" btn  btn-primary "}"#, "className"),
                r#"{className:" a  b "}"#
            );
        }

        #[test]
        fn no_marker_no_change() {
            let source = r#"const btn = "btn"; el.className = "btn";"#;

            assert_eq!(rewrite(source, "className"), source);
        }

        #[test]
        fn report_lists_each_token() {
            let lookup = lookup();
            let filter = WhitelistFilter(Whitelist::new(["active"]));
            let mut report = RewriteReport::default();

            AttributeReplacer::new(&lookup, &filter).replace(
                r#"{className:"btn active other"}"#,
                &Attribute::new("className"),
                &mut report,
            );

            let outcomes = report.records.iter().map(|r| r.outcome).collect::<Vec<_>>();
            assert_eq!(
                outcomes,
                [Outcome::Replaced, Outcome::Whitelisted, Outcome::Unknown]
            );
            assert_eq!(report.records[0].replace.as_deref(), Some("a"));
        }
    }

    mod force {
        use super::*;

        #[test]
        fn before_quote() {
            assert_eq!(
                force_replace(r#"tpl = '<b class="btn">'"#, "btn", "a"),
                (r#"tpl = '<b class="a">'"#.to_string(), 1)
            );
        }

        #[test]
        fn needs_a_delimiter() {
            assert_eq!(
                force_replace("btn-primary btn'", "btn", "a"),
                ("btn-primary a'".to_string(), 1)
            );
            assert_eq!(force_replace("btn", "btn", "a"), ("btn".to_string(), 0));
        }

        #[test]
        fn overlapping_candidates() {
            assert_eq!(force_replace(r#"aaa""#, "aa", "x"), (r#"ax""#.to_string(), 1));
        }

        #[test]
        fn empty_find_is_noop() {
            assert_eq!(force_replace("a b", "", "x"), ("a b".to_string(), 0));
        }
    }
}
