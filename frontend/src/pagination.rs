pub const PAGE_SIZE: usize = 3;

/// Incremental reveal of a route list, one page of three at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    visible: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { visible: PAGE_SIZE }
    }
}

impl Pagination {
    pub fn reset(&mut self) {
        self.visible = PAGE_SIZE;
    }

    /// Number of items shown out of `total`.
    pub fn visible_count(&self, total: usize) -> usize {
        self.visible.min(total)
    }

    pub fn reveal_more(&mut self, total: usize) {
        if self.visible < total {
            self.visible = (self.visible + PAGE_SIZE).min(total);
        }
    }

    pub fn has_more(&self, total: usize) -> bool {
        self.visible < total
    }

    /// How many items the next `reveal_more` would add.
    pub fn next_increment(&self, total: usize) -> usize {
        PAGE_SIZE.min(total.saturating_sub(self.visible))
    }

    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.visible_count(items.len())]
    }
}
