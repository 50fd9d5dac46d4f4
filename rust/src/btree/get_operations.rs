//! Lookup operations for ordered map pages.

use super::types::{BTreePage, PageView};
use crate::context::BTreeContext;
use crate::search::{child_index, locate, predecessor_index, search_knots, search_slots, successor_index};

fn entry<K, V>(slot: &(K, V)) -> (&K, &V) {
    (&slot.0, &slot.1)
}

impl<K, V, U> BTreePage<K, V, U> {
    /// Leaf that would hold `key`.
    fn leaf_for<C>(&self, key: &K, ctx: &C) -> &[(K, V)]
    where
        C: BTreeContext<K> + ?Sized,
    {
        let mut page = self;
        loop {
            match page.view() {
                PageView::Leaf(slots) => return slots,
                PageView::Node(node) => {
                    page = &node.pages[child_index(search_knots(&node.knots, key, ctx))];
                }
            }
        }
    }

    pub fn contains_key<C>(&self, key: &K, ctx: &C) -> bool
    where
        C: BTreeContext<K> + ?Sized,
    {
        search_slots(self.leaf_for(key, ctx), key, ctx).is_ok()
    }

    pub fn get<C>(&self, key: &K, ctx: &C) -> Option<&V>
    where
        C: BTreeContext<K> + ?Sized,
    {
        let slots = self.leaf_for(key, ctx);
        search_slots(slots, key, ctx).ok().map(|i| &slots[i].1)
    }

    /// Entry at position `index` in key order.
    pub fn get_entry(&self, mut index: usize) -> Option<(&K, &V)> {
        let mut page = self;
        loop {
            match page.view() {
                PageView::Leaf(slots) => return slots.get(index).map(entry),
                PageView::Node(node) => {
                    if index >= node.size {
                        return None;
                    }
                    let (x, offset) = locate(&node.pages, index, BTreePage::size);
                    page = &node.pages[x];
                    index = offset;
                }
            }
        }
    }

    pub fn first_entry(&self) -> Option<(&K, &V)> {
        let mut page = self;
        loop {
            match page.view() {
                PageView::Leaf(slots) => return slots.first().map(entry),
                PageView::Node(node) => page = &node.pages[0],
            }
        }
    }

    pub fn last_entry(&self) -> Option<(&K, &V)> {
        let mut page = self;
        loop {
            match page.view() {
                PageView::Leaf(slots) => return slots.last().map(entry),
                PageView::Node(node) => page = &node.pages[node.pages.len() - 1],
            }
        }
    }

    /// Smallest entry with a key strictly greater than `key`.
    pub fn next_entry<C>(&self, key: &K, ctx: &C) -> Option<(&K, &V)>
    where
        C: BTreeContext<K> + ?Sized,
    {
        match self.view() {
            PageView::Leaf(slots) => slots
                .get(successor_index(search_slots(slots, key, ctx)))
                .map(entry),
            PageView::Node(node) => {
                let x = child_index(search_knots(&node.knots, key, ctx));
                node.pages[x]
                    .next_entry(key, ctx)
                    .or_else(|| node.pages.get(x + 1).and_then(BTreePage::first_entry))
            }
        }
    }

    /// Largest entry with a key strictly less than `key`.
    pub fn previous_entry<C>(&self, key: &K, ctx: &C) -> Option<(&K, &V)>
    where
        C: BTreeContext<K> + ?Sized,
    {
        match self.view() {
            PageView::Leaf(slots) => {
                predecessor_index(search_slots(slots, key, ctx)).map(|i| entry(&slots[i]))
            }
            PageView::Node(node) => {
                let x = child_index(search_knots(&node.knots, key, ctx));
                node.pages[x].previous_entry(key, ctx).or_else(|| {
                    x.checked_sub(1)
                        .and_then(|left| node.pages[left].last_entry())
                })
            }
        }
    }
}
