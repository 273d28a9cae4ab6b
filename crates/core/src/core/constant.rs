/// Letters available to the allocator, `a` through `z`.
pub const COMPRESS_CHARACTER_WIDTH: usize = 26;

pub const CLASS_SIGIL: char = '.';
pub const ID_SIGIL: char = '#';

/// Lines scanned between two cooperative pauses.
pub const DEFAULT_REST_MODULO: usize = 1000;
