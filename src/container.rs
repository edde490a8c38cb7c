use std::{cell::RefMut, cmp::Ordering, fmt, iter::FromIterator, mem};

use itertools::Itertools;

use crate::{
    error::{Error, Result},
    lazy_sequence::{LazySequence, State},
};

/// Resolves a possibly negative index against `len`, clamping to `0..=len`.
fn relative_index(index: isize, len: usize) -> usize {
    if index < 0 {
        len.saturating_sub(index.unsigned_abs())
    } else {
        (index as usize).min(len)
    }
}

// Everything below needs random access or the full contents, so each
// operation materializes first and then works on the stored elements.
impl<T: Clone + 'static> LazySequence<T> {
    fn storage(&self) -> Result<RefMut<'_, Vec<T>>> {
        self.materialize()?;
        Ok(RefMut::map(self.state.borrow_mut(), |state| match state {
            State::Materialized(vec) => vec,
            State::Lazy(_) => unreachable!("materialize() leaves stored elements behind"),
        }))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.storage()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.storage()?.is_empty())
    }

    pub fn get(&self, index: usize) -> Result<Option<T>> {
        Ok(self.storage()?.get(index).cloned())
    }

    pub fn to_vec(&self) -> Result<Vec<T>> {
        Ok(self.storage()?.clone())
    }

    pub fn push(&self, value: T) -> Result<usize> {
        let mut vec = self.storage()?;
        vec.push(value);
        Ok(vec.len())
    }

    pub fn pop(&self) -> Result<Option<T>> {
        Ok(self.storage()?.pop())
    }

    pub fn shift(&self) -> Result<Option<T>> {
        let mut vec = self.storage()?;
        if vec.is_empty() {
            Ok(None)
        } else {
            Ok(Some(vec.remove(0)))
        }
    }

    /// Prepends `values` keeping their order, returning the new length.
    pub fn unshift<I: IntoIterator<Item = T>>(&self, values: I) -> Result<usize> {
        let mut vec = self.storage()?;
        let rest = mem::take(&mut *vec);
        vec.extend(values);
        vec.extend(rest);
        Ok(vec.len())
    }

    /// Removes `delete_count` elements starting at `start` (everything up to
    /// the end when `None`) and inserts `items` in their place. Returns the
    /// removed elements.
    ///
    /// A negative `start` counts from the end; out of range values clamp.
    pub fn splice<I: IntoIterator<Item = T>>(
        &self,
        start: isize,
        delete_count: Option<usize>,
        items: I,
    ) -> Result<Vec<T>> {
        let mut vec = self.storage()?;
        let start = relative_index(start, vec.len());
        let end = match delete_count {
            Some(count) => start.saturating_add(count).min(vec.len()),
            None => vec.len(),
        };
        Ok(vec.splice(start..end, items).collect())
    }

    pub fn sort(&self) -> Result<()>
    where
        T: Ord,
    {
        self.storage()?.sort();
        Ok(())
    }

    /// Stable sort by `compare`. `compare` must not touch this sequence.
    pub fn sort_by<F>(&self, compare: F) -> Result<()>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.storage()?.sort_by(compare);
        Ok(())
    }

    pub fn reverse(&self) -> Result<()> {
        self.storage()?.reverse();
        Ok(())
    }

    /// A new materialized sequence holding these elements followed by
    /// `values`.
    pub fn concat<I: IntoIterator<Item = T>>(&self, values: I) -> Result<Self> {
        let mut joined = self.to_vec()?;
        joined.extend(values);
        Ok(Self::from_vec(joined))
    }

    /// `join(",")` is the string form of the sequence.
    pub fn join(&self, separator: &str) -> Result<String>
    where
        T: fmt::Display,
    {
        Ok(self.storage()?.iter().join(separator))
    }

    /// A new materialized sequence with the elements in `start..end`.
    /// Negative bounds count from the end; `None` means up to the end.
    pub fn slice(&self, start: isize, end: Option<isize>) -> Result<Self> {
        let vec = self.storage()?;
        let start = relative_index(start, vec.len());
        let end = end.map_or(vec.len(), |end| relative_index(end, vec.len()));
        let part = if start < end {
            vec[start..end].to_vec()
        } else {
            Vec::new()
        };
        Ok(Self::from_vec(part))
    }

    pub fn index_of(&self, value: &T) -> Result<Option<usize>>
    where
        T: PartialEq,
    {
        Ok(self.storage()?.iter().position(|elem| elem == value))
    }

    pub fn last_index_of(&self, value: &T) -> Result<Option<usize>>
    where
        T: PartialEq,
    {
        Ok(self.storage()?.iter().rposition(|elem| elem == value))
    }

    /// Right fold seeded with the last element. `combine` gets the index of
    /// the element it folds in.
    pub fn reduce_right<F>(&self, mut combine: F) -> Result<T>
    where
        F: FnMut(T, T, usize, &Self) -> T,
    {
        let mut acc = None;
        for index in (0..self.len()?).rev() {
            // `combine` may have shrunk the sequence.
            let value = match self.get(index)? {
                Some(value) => value,
                None => continue,
            };
            acc = Some(match acc {
                None => value,
                Some(prev) => combine(prev, value, index, self),
            });
        }
        acc.ok_or(Error::EmptySequence)
    }

    pub fn fold_right<A, F>(&self, init: A, mut combine: F) -> Result<A>
    where
        F: FnMut(A, T, usize, &Self) -> A,
    {
        let mut acc = init;
        for index in (0..self.len()?).rev() {
            if let Some(value) = self.get(index)? {
                acc = combine(acc, value, index, self);
            }
        }
        Ok(acc)
    }
}

impl<T: Clone + 'static> From<Vec<T>> for LazySequence<T> {
    fn from(vec: Vec<T>) -> Self {
        Self::from_vec(vec)
    }
}

impl<T: Clone + 'static> FromIterator<T> for LazySequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}
