/// Position within a product's media carousel.
///
/// Navigation wraps around in both directions. An empty carousel has no
/// current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaCursor {
    index: usize,
    len: usize,
}

impl MediaCursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn current(&self) -> Option<usize> {
        (self.len > 0).then_some(self.index)
    }

    pub fn next(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.index = (self.index + 1) % self.len;
        Some(self.index)
    }

    pub fn previous(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.index = if self.index == 0 {
            self.len - 1
        } else {
            self.index - 1
        };
        Some(self.index)
    }

    /// Jump to `index`. Out-of-range indexes leave the cursor where it is.
    pub fn jump_to(&mut self, index: usize) -> Option<usize> {
        if index < self.len {
            self.index = index;
        }
        self.current()
    }

    /// Resize after the media list changed, clamping the position.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.index >= len {
            self.index = 0;
        }
    }

    /// "i / n" counter, shown only when there is more than one item.
    pub fn label(&self) -> Option<String> {
        (self.len > 1).then(|| format!("{} / {}", self.index + 1, self.len))
    }
}
