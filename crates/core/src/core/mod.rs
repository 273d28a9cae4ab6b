mod classifier;
mod constant;
mod display;
mod error;
mod extractor;
mod pacer;
mod persistence;
mod progress;
mod table;
mod token_allocator;
mod whitelist;

pub use classifier::{classify, Classification, RejectReason};
pub use constant::{CLASS_SIGIL, DEFAULT_REST_MODULO, ID_SIGIL};
pub use display::render_table;
pub use error::{Error, Result};
pub use extractor::{extract, extract_all, ExtractOption, Extractor};
pub use pacer::Pacer;
pub use persistence::{load_table, remove_table, save_table};
pub use progress::{LoggerOption, ProgressKind, ProgressReporter};
pub use table::{IgnoredEntry, MatchEntry, RenameTable, SelectorKind};
pub use token_allocator::TokenAllocator;
pub use whitelist::Whitelist;
