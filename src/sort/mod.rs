// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Grouping indexes for cheap single-field sorts.
//!
//! A [`SortIndex`] keeps, for every field in [`SortField::ALL`], a map from
//! field value to the items sharing that value. Items within a group stay in
//! the order they were added. Sorting a field is then a walk over the ordered
//! values, concatenating their groups.
//!
//! Items whose value for a field is `None` are not indexed for that field and
//! so never appear in that field's sort output.

use std::{cmp::Ordering, collections::BTreeMap, rc::Rc};

use crate::{
    error::PlaylistError,
    model::{Song, SortDirection, SortField},
};

/// Something that can be stored in a [`SortIndex`].
pub trait Sortable {
    /// The grouping value for `field`, or `None` to leave the item out.
    fn field_value(&self, field: SortField) -> Option<String>;

    /// Secondary order applied within artist and album groups.
    fn tie_break(&self, other: &Self) -> Ordering;

    /// Identity used when removing an item from its groups.
    fn is_same(&self, other: &Self) -> bool;
}

impl Sortable for Song {
    fn field_value(&self, field: SortField) -> Option<String> {
        Song::field_value(self, field)
    }

    fn tie_break(&self, other: &Self) -> Ordering {
        self.cmp_disc_track(other)
    }

    fn is_same(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl<T: Sortable> Sortable for Rc<T> {
    fn field_value(&self, field: SortField) -> Option<String> {
        (**self).field_value(field)
    }

    fn tie_break(&self, other: &Self) -> Ordering {
        (**self).tie_break(other)
    }

    fn is_same(&self, other: &Self) -> bool {
        (**self).is_same(other)
    }
}

type Groups<T> = BTreeMap<String, Vec<T>>;

/// One grouping index per sortable field.
#[derive(Debug, Clone)]
pub struct SortIndex<T> {
    fields: [Groups<T>; SortField::ALL.len()],
}

impl<T> Default for SortIndex<T> {
    fn default() -> Self {
        Self {
            fields: std::array::from_fn(|_| BTreeMap::new()),
        }
    }
}

impl<T: Sortable + Clone> SortIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index over `items`.
    pub fn build(items: &[T]) -> Self {
        let mut index = Self::new();
        index.rebuild(items);
        index
    }

    /// Clears every group and re-indexes `items` in order.
    pub fn rebuild(&mut self, items: &[T]) {
        for groups in &mut self.fields {
            groups.clear();
        }

        for item in items {
            self.add_item(item);
        }
    }

    /// Appends `item` to the end of its group in every field it has a value
    /// for. Existing groups are not re-sorted.
    pub fn add_item(&mut self, item: &T) {
        for field in SortField::ALL {
            if let Some(value) = item.field_value(field) {
                self.fields[field.index()]
                    .entry(value)
                    .or_default()
                    .push(item.clone());
            }
        }
    }

    /// Removes the first occurrence of `item` from its group in every field.
    ///
    /// Emptied groups are dropped. Fields the item was never indexed under are
    /// skipped.
    pub fn remove_item(&mut self, item: &T) {
        for field in SortField::ALL {
            let Some(value) = item.field_value(field) else {
                continue;
            };

            let groups = &mut self.fields[field.index()];
            let Some(group) = groups.get_mut(&value) else {
                continue;
            };

            if let Some(pos) = group.iter().position(|other| other.is_same(item)) {
                group.remove(pos);
            }

            if group.is_empty() {
                groups.remove(&value);
            }
        }
    }

    /// Sorts by a field named in the catalog, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`PlaylistError::UnknownField`] if `field` is not a catalog
    /// name.
    pub fn sort(&self, field: &str, direction: SortDirection) -> Result<Vec<T>, PlaylistError> {
        let field = field.parse::<SortField>()?;
        Ok(self.sorted(field, direction))
    }

    /// Returns every item indexed under `field`, ordered by value.
    ///
    /// Values are compared as strings. Artist and album groups are ordered by
    /// disc and track number, always ascending regardless of `direction`.
    pub fn sorted(&self, field: SortField, direction: SortDirection) -> Vec<T> {
        let groups = &self.fields[field.index()];

        let mut values: Vec<&Vec<T>> = groups.values().collect();
        if direction == SortDirection::Descending {
            values.reverse();
        }

        let mut sorted = Vec::with_capacity(self.indexed_len(field));
        for group in values {
            if field.uses_tie_break() {
                let mut group = group.clone();
                group.sort_by(|a, b| a.tie_break(b));
                sorted.extend(group);
            } else {
                sorted.extend(group.iter().cloned());
            }
        }

        sorted
    }

    /// Number of items indexed under `field`.
    pub fn indexed_len(&self, field: SortField) -> usize {
        self.fields[field.index()].values().map(Vec::len).sum()
    }

    /// Number of distinct values indexed under `field`.
    pub fn group_count(&self, field: SortField) -> usize {
        self.fields[field.index()].len()
    }

    /// The items sharing `value` for `field`, in insertion order.
    pub fn group(&self, field: SortField, value: &str) -> Option<&[T]> {
        self.fields[field.index()].get(value).map(Vec::as_slice)
    }
}
