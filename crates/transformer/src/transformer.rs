use csm_core::{MatchEntry, SelectorKind, Whitelist};
use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    filter::{TokenFilterPluginAdapter, WhitelistFilter},
    replacer::{force_replace, Attribute, AttributeReplacer, RenameLookup},
    report::{Outcome, RewriteReport},
};

type Result<T> = anyhow::Result<T>;

pub const DEFAULT_ATTRIBUTES: [&str; 2] = ["className", "id"];

/// A name that is also rewritten outside attribute values.
///
/// The literal pass runs over the output of the attribute passes. A `find`
/// that equals a short name handed out to another selector therefore renames
/// that selector's new value a second time (`btn` -> `a` -> `b` when `a` is
/// itself in the table). Only force names that cannot be replacements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForceReplace {
    pub find: String,
    #[serde(rename = "type")]
    pub kind: SelectorKind,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformOption {
    /// Sigil-less view of the rename table.
    pub matches: Vec<MatchEntry>,
    /// Attributes rewritten on top of `className` and `id`.
    pub attributes: Vec<String>,
    pub ignore: Vec<String>,
    pub force_replace: Vec<ForceReplace>,
    pub display_result: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    pub content: String,
    pub report: RewriteReport,
}

/// Everything needed to rewrite assets, prepared once and then only read.
pub struct Transformer {
    lookup: RenameLookup,
    filter: TokenFilterPluginAdapter,
    attributes: Vec<Attribute>,
    force: Vec<(SelectorKind, String, String)>,
    display_result: bool,
}

impl Transformer {
    pub fn new(options: &TransformOption) -> Self {
        let lookup = RenameLookup::new(&options.matches);

        let attributes = DEFAULT_ATTRIBUTES
            .iter()
            .map(|name| name.to_string())
            .chain(options.attributes.iter().cloned())
            .filter(|name| !name.is_empty())
            .unique()
            .map(Attribute::new)
            .collect_vec();

        let force = options
            .force_replace
            .iter()
            .unique()
            .filter_map(|rule| {
                let replace = lookup.get(rule.kind, &rule.find)?;
                Some((rule.kind, rule.find.clone(), replace.to_string()))
            })
            .sorted_by(|a, b| b.1.len().cmp(&a.1.len()))
            .collect_vec();

        if force.len() < options.force_replace.len() {
            debug!(
                "{} force replace rules have no table entry",
                options.force_replace.len() - force.len()
            );
        }

        let filter = TokenFilterPluginAdapter::new(vec![])
            .with_plugin(Box::new(WhitelistFilter(Whitelist::new(options.ignore.iter().cloned()))));

        Self {
            lookup,
            filter,
            attributes,
            force,
            display_result: options.display_result,
        }
    }

    pub fn transform(&self, asset_name: &str, content: &str) -> TransformOutput {
        let mut report = RewriteReport::default();

        if self.lookup.is_empty() {
            return TransformOutput {
                content: content.to_string(),
                report,
            };
        }

        // attribute passes
        let replacer = AttributeReplacer::new(&self.lookup, &self.filter);
        let mut content = self
            .attributes
            .iter()
            .fold(content.to_string(), |content, attribute| {
                replacer.replace(&content, attribute, &mut report)
            });

        // opt-in literal pass
        for (kind, find, replace) in &self.force {
            let (replaced, count) = force_replace(&content, find, replace);
            if count > 0 {
                report.record(find, Some(replace), *kind, Outcome::Forced);
                content = replaced;
            }
        }

        debug!(
            "{}: {} replaced, {} forced",
            asset_name,
            report.count(Outcome::Replaced),
            report.count(Outcome::Forced)
        );

        if self.display_result {
            report.display(asset_name);
        }

        TransformOutput { content, report }
    }
}

/// Rewrite one generated asset.
pub fn transform(asset_name: &str, content: &str, options: &TransformOption) -> TransformOutput {
    Transformer::new(options).transform(asset_name, content)
}

/// Rewrite several assets in parallel, results in input order.
pub fn transform_assets<N, C>(assets: &[(N, C)], options: &TransformOption) -> Vec<TransformOutput>
where
    N: AsRef<str> + Sync,
    C: AsRef<str> + Sync,
{
    let transformer = Transformer::new(options);

    let outputs = assets
        .par_iter()
        .map(|(name, content)| transformer.transform(name.as_ref(), content.as_ref()))
        .collect::<Vec<_>>();

    info!(
        "rewrote {} assets, {} names replaced",
        outputs.len(),
        outputs
            .iter()
            .map(|output| output.report.count(Outcome::Replaced))
            .sum::<usize>()
    );

    outputs
}

/// Options from a loosely typed JSON object, as handed over by a build tool.
pub fn options_from_value(value: serde_json::Value) -> Result<TransformOption> {
    Ok(serde_json::from_value(value)?)
}
