//! Group stage: wrap visible diagnostics with synthetic group headers.
//!
//! Cell groups keep first-encounter order, type groups follow the canonical
//! category order. Whether a group is collapsed is looked up, never decided
//! here.

use crate::models::options::ViewMode;
use crate::models::{Category, CellRef, Diagnostic, Entry, GroupHeader, GroupKey};
use std::collections::BTreeSet;

/// Collapse state supplied by the host.
pub trait CollapseLookup {
    fn is_collapsed(&self, key: &GroupKey) -> bool;
}

/// Every group expanded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCollapse;

impl CollapseLookup for NoCollapse {
    fn is_collapsed(&self, _key: &GroupKey) -> bool {
        false
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Collapsed groups recorded in notebook metadata.
pub struct CollapsedGroups {
    pub title: bool,
    pub cells: BTreeSet<usize>,
    pub categories: BTreeSet<Category>,
}

impl CollapseLookup for CollapsedGroups {
    fn is_collapsed(&self, key: &GroupKey) -> bool {
        match key {
            GroupKey::Cell(CellRef::Title) => self.title,
            GroupKey::Cell(CellRef::Cell(i)) => self.cells.contains(i),
            GroupKey::Type(c) => self.categories.contains(c),
        }
    }
}

/// Header text of a group.
pub fn group_title(key: &GroupKey) -> String {
    match key {
        GroupKey::Cell(CellRef::Title) => "Title".to_string(),
        GroupKey::Cell(CellRef::Cell(i)) => format!("Cell {}", i),
        GroupKey::Type(c) => c.label().to_string(),
    }
}

fn emit<C: CollapseLookup + ?Sized>(
    out: &mut Vec<Entry>,
    key: GroupKey,
    members: Vec<Diagnostic>,
    collapse: &C,
) {
    let collapsed = collapse.is_collapsed(&key);
    out.push(Entry::Group(GroupHeader {
        title: group_title(&key),
        group_key: key,
        collapsed,
        member_count: members.len(),
    }));
    out.extend(members.into_iter().map(|mut d| {
        d.visible = !collapsed;
        d.has_parent = true;
        Entry::Diagnostic(d)
    }));
}

/// Group by anchor cell, in the order cells are first seen.
pub fn group_by_cell<C: CollapseLookup + ?Sized>(diags: Vec<Diagnostic>, collapse: &C) -> Vec<Entry> {
    let mut groups: Vec<(CellRef, Vec<Diagnostic>)> = Vec::new();
    for d in diags {
        match groups.iter_mut().find(|(k, _)| *k == d.cell_id) {
            Some((_, members)) => members.push(d),
            None => groups.push((d.cell_id, vec![d])),
        }
    }
    let mut out = Vec::new();
    for (cell, members) in groups {
        emit(&mut out, GroupKey::Cell(cell), members, collapse);
    }
    out
}

/// Group by category, in canonical category order.
pub fn group_by_type<C: CollapseLookup + ?Sized>(diags: Vec<Diagnostic>, collapse: &C) -> Vec<Entry> {
    let mut buckets: Vec<Vec<Diagnostic>> = Category::ALL.iter().map(|_| Vec::new()).collect();
    for d in diags {
        if let Some(pos) = Category::ALL.iter().position(|c| *c == d.category) {
            buckets[pos].push(d);
        }
    }
    let mut out = Vec::new();
    for (category, members) in Category::ALL.into_iter().zip(buckets) {
        if !members.is_empty() {
            emit(&mut out, GroupKey::Type(category), members, collapse);
        }
    }
    out
}

/// Re-shape the visible bucket for `mode`. List mode returns it unchanged.
pub fn apply_grouping<C: CollapseLookup + ?Sized>(
    visible: Vec<Entry>,
    mode: ViewMode,
    collapse: &C,
) -> Vec<Entry> {
    if mode == ViewMode::List {
        return visible;
    }
    let mut diags = Vec::with_capacity(visible.len());
    for e in visible {
        // headers from an earlier pass are dropped and rebuilt
        if let Entry::Diagnostic(d) = e {
            diags.push(d);
        }
    }
    match mode {
        ViewMode::Cell => group_by_cell(diags, collapse),
        ViewMode::Type => group_by_type(diags, collapse),
        ViewMode::List => diags.into_iter().map(Entry::Diagnostic).collect(),
    }
}
