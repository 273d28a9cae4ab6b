#![deny(clippy::all)]

mod filter;
mod replacer;
mod report;
mod transformer;

pub use filter::{TokenFilterPlugin, TokenFilterPluginAdapter, TokenItem, WhitelistFilter};
pub use replacer::{force_replace, Attribute, AttributeReplacer, RenameLookup};
pub use report::{Outcome, RewriteReport, TokenRecord};
pub use transformer::*;

#[cfg(feature = "node")]
#[macro_use]
extern crate napi_derive;

/// Rewrite one asset handed over by the bundler.
#[cfg(feature = "node")]
#[napi]
pub fn rewrite(
    asset_name: String,
    asset_source: String,
    options: serde_json::Value,
) -> anyhow::Result<String> {
    let options = transformer::options_from_value(options)?;
    Ok(transformer::transform(&asset_name, &asset_source, &options).content)
}

/// Extract one stylesheet and persist the rename table; returns both views.
#[cfg(feature = "node")]
#[napi]
pub fn extract(options: serde_json::Value) -> anyhow::Result<serde_json::Value> {
    let options = csm_core::ExtractOption::from_value(options)?;
    let table = csm_core::extract(&options)?;
    Ok(serde_json::to_value(table)?)
}
