//! Positional lookup for sequence pages.

use super::types::{PageView, STreePage};

impl<V, I, U> STreePage<V, I, U> {
    /// `(id, value)` slot at position `index`.
    pub fn get_entry(&self, mut index: usize) -> Option<(&I, &V)> {
        let mut page = self;
        loop {
            match page.view() {
                PageView::Leaf(slots) => return slots.get(index).map(|(id, value)| (id, value)),
                PageView::Node(node) => {
                    if index >= node.size {
                        return None;
                    }
                    let (x, offset) = node.locate(index);
                    page = &node.pages[x];
                    index = offset;
                }
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<&V> {
        self.get_entry(index).map(|(_, value)| value)
    }

    pub fn get_id(&self, index: usize) -> Option<&I> {
        self.get_entry(index).map(|(id, _)| id)
    }

    pub fn first_entry(&self) -> Option<(&I, &V)> {
        let mut page = self;
        loop {
            match page.view() {
                PageView::Leaf(slots) => return slots.first().map(|(id, value)| (id, value)),
                PageView::Node(node) => page = &node.pages[0],
            }
        }
    }

    pub fn last_entry(&self) -> Option<(&I, &V)> {
        let mut page = self;
        loop {
            match page.view() {
                PageView::Leaf(slots) => return slots.last().map(|(id, value)| (id, value)),
                PageView::Node(node) => page = &node.pages[node.pages.len() - 1],
            }
        }
    }

    /// Position of the first slot in `[lower, upper)` whose id satisfies `f`.
    ///
    /// Children entirely outside the range are skipped by size.
    pub(super) fn position_in<F>(&self, lower: usize, upper: usize, f: &mut F) -> Option<usize>
    where
        F: FnMut(&I) -> bool,
    {
        match self.view() {
            PageView::Leaf(slots) => {
                let upper = upper.min(slots.len());
                let lower = lower.min(upper);
                slots[lower..upper]
                    .iter()
                    .position(|(id, _)| f(id))
                    .map(|found| found + lower)
            }
            PageView::Node(node) => {
                let mut offset = 0;
                for page in &node.pages {
                    if offset >= upper {
                        break;
                    }
                    let size = page.size();
                    if offset + size > lower {
                        let found = page.position_in(lower.saturating_sub(offset), upper - offset, f);
                        if let Some(found) = found {
                            return Some(offset + found);
                        }
                    }
                    offset += size;
                }
                None
            }
        }
    }
}
