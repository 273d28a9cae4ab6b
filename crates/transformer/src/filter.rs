use csm_core::{SelectorKind, Whitelist};

pub struct TokenItem<'a> {
    pub name: &'a str,
    pub kind: SelectorKind,
}

/// Returns `true` for tokens that must be left as they are.
pub trait TokenFilterPlugin: Send + Sync {
    fn filter_token(&self, token: &TokenItem<'_>) -> bool;
}

pub struct TokenFilterPluginAdapter {
    plugin: Vec<Box<dyn TokenFilterPlugin>>,
}

impl TokenFilterPluginAdapter {
    pub fn new(plugin: Vec<Box<dyn TokenFilterPlugin>>) -> Self {
        Self { plugin }
    }

    pub fn with_plugin(mut self, plugin: Box<dyn TokenFilterPlugin>) -> Self {
        self.plugin.push(plugin);
        self
    }
}

impl TokenFilterPlugin for TokenFilterPluginAdapter {
    fn filter_token(&self, token: &TokenItem<'_>) -> bool {
        self.plugin.iter().any(|v| v.filter_token(token))
    }
}

pub struct WhitelistFilter(pub Whitelist);

impl TokenFilterPlugin for WhitelistFilter {
    fn filter_token(&self, token: &TokenItem<'_>) -> bool {
        self.0.contains_name(token.name, token.kind)
    }
}
