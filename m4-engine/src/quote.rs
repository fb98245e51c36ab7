/// Current quote depth and the active pair of quote bytes.
///
/// Quoting is active iff `depth > 0`. `changequote` may only change `left`
/// and `right`; it never resets `depth`, since doing so mid-quote would
/// desynchronize the engine from input already consumed under the old pair.
#[derive(Debug, Clone, Copy)]
pub struct QuoteState {
    pub depth: u32,
    pub left: u8,
    pub right: u8,
}

impl QuoteState {
    pub fn new() -> Self {
        Self {
            depth: 0,
            left: b'`',
            right: b'\'',
        }
    }

    pub fn is_quoting(&self) -> bool {
        self.depth > 0
    }
}

impl Default for QuoteState {
    fn default() -> Self {
        Self::new()
    }
}
