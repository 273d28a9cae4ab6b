use rustc_hash::FxHashSet;

use super::constant::COMPRESS_CHARACTER_WIDTH;

/// Hands out short names: `a`..`z`, then `aa`..`az`, `ba`..`bz`, ... `zz`,
/// `aaa` and so on.
///
/// Every round of 26 shares a prefix, the bijective base-26 numeral of the
/// round number, so no two positions ever produce the same name.
#[derive(Debug, Default)]
pub struct TokenAllocator {
    pos: usize,
    used_allocator: FxHashSet<String>,
}

impl TokenAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names that are already taken and must be skipped.
    pub fn extends<I>(&mut self, set: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.used_allocator.extend(set);
    }

    fn ident(&self) -> String {
        let push_ch = |r: &mut Vec<u8>, ch: usize| r.push(b'a' + ch as u8);

        let mut round = self.pos / COMPRESS_CHARACTER_WIDTH;
        let mut r = vec![];

        while round > 0 {
            round -= 1;
            push_ch(&mut r, round % COMPRESS_CHARACTER_WIDTH);
            round /= COMPRESS_CHARACTER_WIDTH;
        }

        r.reverse();
        push_ch(&mut r, self.pos % COMPRESS_CHARACTER_WIDTH);

        String::from_utf8_lossy(&r).to_string()
    }

    pub fn alloc(&mut self) -> String {
        loop {
            let s = self.ident();
            self.pos += 1;

            if !self.used_allocator.contains(&s) {
                self.used_allocator.insert(s.clone());
                return s;
            }
        }
    }
}
