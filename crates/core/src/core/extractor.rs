use std::{fs, path::Path};

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, trace, warn};

use super::{
    classifier::{classify, Classification},
    constant::DEFAULT_REST_MODULO,
    display::render_table,
    error::{Error, Result},
    pacer::Pacer,
    persistence::{load_table, save_table},
    progress::{LoggerOption, ProgressKind, ProgressReporter},
    table::{IgnoredEntry, MatchEntry, RenameTable, SelectorKind},
    token_allocator::TokenAllocator,
    whitelist::Whitelist,
};

lazy_static! {
    static ref CLASS_TOKEN: Regex = Regex::new(r"\.[a-zA-Z0-9_-]+").unwrap();
    static ref ID_TOKEN: Regex = Regex::new(r"#[a-zA-Z0-9_-]+").unwrap();
    /// What may trail a token inside a url or path: `.woff?v=2"`, `.org/2000/svg'`.
    static ref TRAILING: Regex = Regex::new(r#"^[a-zA-Z0-9?&=/%._-]*['"]?"#).unwrap();
}

fn default_rest_modulo() -> usize {
    DEFAULT_REST_MODULO
}

/// Shape check for one optional configuration key.
type FieldCheck = fn(&Value) -> bool;

fn is_string_list(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|items| items.iter().all(Value::is_string))
}

fn is_progress_kind(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|kind| kind.parse::<ProgressKind>().is_ok())
}

const OPTIONAL_FIELDS: [(&str, FieldCheck); 6] = [
    ("path", Value::is_string),
    ("restModulo", Value::is_u64),
    ("restTime", Value::is_u64),
    ("ignore", is_string_list),
    ("logger", Value::is_object),
    ("displayResult", Value::is_boolean),
];

const LOGGER_FIELDS: [(&str, FieldCheck); 6] = [
    ("logging", Value::is_boolean),
    ("prefix", Value::is_string),
    ("displayFilename", Value::is_boolean),
    ("displayPercentage", Value::is_boolean),
    ("type", is_progress_kind),
    ("barBg", Value::is_string),
];

/// Drop every key of `object` whose value has the wrong shape, so that
/// deserializing falls back to the default for it.
fn drop_mistyped(object: &mut Map<String, Value>, fields: &[(&str, FieldCheck)], scope: &str) {
    for (field, check) in fields {
        if object.get(*field).is_some_and(|value| !check(value)) {
            warn!("option {}{} has an unexpected type, using the default", scope, field);
            object.remove(*field);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractOption {
    /// Where the stylesheet came from, only used for display.
    #[serde(default)]
    pub path: String,
    pub output_css: String,
    pub output_js: String,
    /// Stylesheet text, or the path of a file holding it.
    pub data: String,
    #[serde(default = "default_rest_modulo")]
    pub rest_modulo: usize,
    /// Milliseconds to sleep at each rest point, otherwise the scan only
    /// yields the thread.
    #[serde(default)]
    pub rest_time: Option<u64>,
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub logger: LoggerOption,
    #[serde(default)]
    pub display_result: bool,
}

impl ExtractOption {
    const REQUIRED: [&'static str; 3] = ["data", "outputCss", "outputJs"];

    pub fn new(
        data: impl Into<String>,
        output_css: impl Into<String>,
        output_js: impl Into<String>,
    ) -> Self {
        Self {
            path: String::new(),
            output_css: output_css.into(),
            output_js: output_js.into(),
            data: data.into(),
            rest_modulo: DEFAULT_REST_MODULO,
            rest_time: None,
            ignore: vec![],
            logger: LoggerOption::default(),
            display_result: false,
        }
    }

    /// Build options from a loosely typed configuration object.
    ///
    /// Only the required fields are checked strictly. An optional field of
    /// the wrong type is logged and replaced by its default.
    pub fn from_value(mut value: Value) -> Result<Self> {
        for field in Self::REQUIRED {
            if !value.get(field).is_some_and(Value::is_string) {
                return Err(Error::Configuration {
                    field,
                    expected: "string",
                });
            }
        }

        if let Some(object) = value.as_object_mut() {
            drop_mistyped(object, &OPTIONAL_FIELDS, "");

            if let Some(logger) = object.get_mut("logger").and_then(Value::as_object_mut) {
                drop_mistyped(logger, &LOGGER_FIELDS, "logger.");
            }
        }

        serde_json::from_value(value).map_err(Error::InvalidOption)
    }

    fn pacer(&self) -> Pacer {
        match self.rest_time {
            Some(rest_time) => Pacer::new(self.rest_modulo, rest_time),
            None => Pacer::yielding(self.rest_modulo),
        }
    }

    /// The stylesheet text: `data` read from disk when it names a file.
    fn stylesheet(&self) -> Result<String> {
        let path = Path::new(&self.data);

        if path.is_file() {
            return fs::read_to_string(path).map_err(|err| Error::io(path, err));
        }

        Ok(self.data.clone())
    }
}

/// Start a new line at every rule-opening brace.
fn normalize(stylesheet: &str) -> String {
    stylesheet.replace('{', "\n{")
}

/// Owns the table while a stylesheet is scanned. Not shareable across
/// threads by construction: allocation order is part of the output.
#[derive(Debug)]
pub struct Extractor {
    whitelist: Whitelist,
    allocator: TokenAllocator,
    matches: Vec<MatchEntry>,
    known: FxHashSet<(SelectorKind, String)>,
    discovered: Vec<MatchEntry>,
    ignored: Vec<IgnoredEntry>,
    pacer: Pacer,
}

impl Extractor {
    pub fn new(persisted: Vec<MatchEntry>, whitelist: Whitelist) -> Self {
        let mut allocator = TokenAllocator::new();
        allocator.extends(whitelist.reserved_names().map(str::to_string));

        let mut extractor = Self {
            whitelist,
            allocator,
            matches: vec![],
            known: FxHashSet::default(),
            discovered: vec![],
            ignored: vec![],
            pacer: Pacer::disabled(),
        };

        for entry in persisted {
            if extractor.known.insert((entry.kind, entry.find.clone())) {
                extractor
                    .allocator
                    .extends([entry.strip_sigil().replace]);
                extractor.matches.push(entry);
            }
        }

        extractor
    }

    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn scan(&mut self, stylesheet: &str) {
        let normalized = normalize(stylesheet);
        let lines = normalized.split('\n').collect_vec();

        self.scan_lines(&lines, &ProgressReporter::hidden());
    }

    pub fn scan_lines(&mut self, lines: &[&str], progress: &ProgressReporter) {
        for (index, line) in lines.iter().enumerate() {
            self.scan_line(line);

            let count = index + 1;
            progress.update(count);
            self.pacer.step(count);
        }

        progress.finish();
        debug!(
            "scanned {} lines, {} new selectors, {} ignored",
            lines.len(),
            self.discovered.len(),
            self.ignored.len()
        );
    }

    fn scan_line(&mut self, line: &str) {
        let line = line.trim();

        let classes = CLASS_TOKEN.find_iter(line);
        let ids = ID_TOKEN.find_iter(line);

        for token in classes.chain(ids) {
            let trailing = TRAILING
                .find(&line[token.end()..])
                .map_or(0, |m| m.end());

            self.push_token(token.as_str(), &line[token.start()..token.end() + trailing]);
        }
    }

    /// `candidate` is `token` followed by whatever url or path text trails it,
    /// the classifier judges the former, the table records the latter.
    fn push_token(&mut self, token: &str, candidate: &str) {
        let token = token.trim();
        let Some(kind) = SelectorKind::of_token(token) else {
            return;
        };

        if token.len() == kind.sigil().len_utf8() {
            return;
        }

        if let Classification::Rejected(reason) = classify(candidate, &self.whitelist) {
            trace!("ignore {} ({})", candidate, reason);
            self.ignored.push(IgnoredEntry {
                find: candidate.to_string(),
                kind,
                reason,
            });
            return;
        }

        if !self.known.insert((kind, token.to_string())) {
            return;
        }

        let replace = format!("{}{}", kind.sigil(), self.allocator.alloc());
        trace!("rename {} -> {}", token, replace);

        let entry = MatchEntry::new(token, replace, kind);
        self.discovered.push(entry.clone());
        self.matches.push(entry);
    }

    pub fn ignored(&self) -> &[IgnoredEntry] {
        &self.ignored
    }

    /// Entries allocated by this extractor, in allocation order.
    pub fn discovered(&self) -> &[MatchEntry] {
        &self.discovered
    }

    pub fn display(&self) {
        if self.discovered.is_empty() {
            return;
        }

        let ignored = self
            .ignored
            .iter()
            .map(|entry| {
                vec![
                    entry.find.clone(),
                    entry.kind.to_string(),
                    entry.reason.to_string(),
                ]
            })
            .collect_vec();

        let matches = self
            .discovered
            .iter()
            .map(|entry| {
                vec![
                    entry.find.clone(),
                    entry.replace.clone(),
                    entry.kind.to_string(),
                ]
            })
            .collect_vec();

        info!(
            "\n{}",
            render_table("IGNORE", &["find", "type", "reason"], &ignored)
        );
        info!(
            "\n{}",
            render_table("MATCHES", &["find", "replace", "type"], &matches)
        );
    }

    pub fn finish(self) -> RenameTable {
        RenameTable::from_css(self.matches)
    }
}

/// Scan one stylesheet against the table persisted at `output_css`, then
/// write both views back.
pub fn extract(option: &ExtractOption) -> Result<RenameTable> {
    let stylesheet = normalize(&option.stylesheet()?);
    let lines = stylesheet.split('\n').collect_vec();

    let persisted = load_table(Path::new(&option.output_css));
    let whitelist = Whitelist::new(option.ignore.iter().cloned());
    let mut extractor = Extractor::new(persisted, whitelist).with_pacer(option.pacer());

    let progress = ProgressReporter::new(&option.logger, &option.path, lines.len());
    extractor.scan_lines(&lines, &progress);

    if option.display_result {
        extractor.display();
    }

    let discovered = extractor.discovered().len();
    let table = extractor.finish();

    save_table(Path::new(&option.output_css), &table.css)?;
    save_table(Path::new(&option.output_js), &table.js)?;

    info!(
        "{}: {} new selectors, {} in table",
        if option.path.is_empty() { "<inline>" } else { option.path.as_str() },
        discovered,
        table.len()
    );

    Ok(table)
}

/// Extract several stylesheets one after another into the same table.
pub fn extract_all<S: AsRef<str>>(option: &ExtractOption, sources: &[S]) -> Result<RenameTable> {
    let mut table = RenameTable::from_css(load_table(Path::new(&option.output_css)));

    for source in sources {
        let source = source.as_ref();
        table = extract(&ExtractOption {
            path: source.to_string(),
            data: source.to_string(),
            ..option.clone()
        })?;
    }

    Ok(table)
}
