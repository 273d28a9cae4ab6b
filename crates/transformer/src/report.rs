use std::fmt;

use csm_core::{render_table, SelectorKind};
use itertools::Itertools;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Replaced,
    Whitelisted,
    Unknown,
    Forced,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Replaced => "replaced",
            Self::Whitelisted => "whitelist",
            Self::Unknown => "not in table",
            Self::Forced => "force replaced",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub find: String,
    pub replace: Option<String>,
    pub kind: SelectorKind,
    pub outcome: Outcome,
}

/// Per-asset diagnostics. Advisory only, nothing reads it back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub records: Vec<TokenRecord>,
}

impl RewriteReport {
    pub(crate) fn record(
        &mut self,
        find: &str,
        replace: Option<&str>,
        kind: SelectorKind,
        outcome: Outcome,
    ) {
        self.records.push(TokenRecord {
            find: find.to_string(),
            replace: replace.map(str::to_string),
            kind,
            outcome,
        });
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.records.iter().filter(|r| r.outcome == outcome).count()
    }

    pub fn display(&self, asset_name: &str) {
        if self.records.is_empty() {
            return;
        }

        let rows = self
            .records
            .iter()
            .map(|r| {
                vec![
                    r.find.clone(),
                    r.replace.clone().unwrap_or_default(),
                    r.kind.to_string(),
                    r.outcome.to_string(),
                ]
            })
            .collect_vec();

        info!(
            "\n{}",
            render_table(asset_name, &["find", "replace", "type", "result"], &rows)
        );
    }
}
