use std::{cell::RefCell, fmt, rc::Rc};

use itertools::Itertools;
use log::{debug, trace};

use crate::{
    emitter::{Emitter, Producer},
    error::{Error, Result},
};

pub(crate) enum State<T> {
    Lazy(Producer<T>),
    Materialized(Vec<T>),
}

/// An ordered sequence whose elements come from a producer function and are
/// only produced when a terminal operation drives it.
///
/// Cloning gives another handle to the same sequence: materializing through
/// one handle is visible through all of them.
pub struct LazySequence<T> {
    pub(crate) state: Rc<RefCell<State<T>>>,
}

/// Iterator over the stored elements of a materialized sequence.
pub struct Iter<T> {
    seq: Rc<RefCell<State<T>>>,
    next_idx: usize,
}

impl<T> Clone for LazySequence<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T: Clone + 'static> LazySequence<T> {
    pub fn new<P>(producer: P) -> Self
    where
        P: Fn(&mut Emitter<'_, T>) -> Result<()> + 'static,
    {
        Self {
            state: Rc::new(RefCell::new(State::Lazy(Rc::new(producer)))),
        }
    }

    pub(crate) fn from_vec(vec: Vec<T>) -> Self {
        Self {
            state: Rc::new(RefCell::new(State::Materialized(vec))),
        }
    }

    pub fn is_lazy(&self) -> bool {
        matches!(*self.state.borrow(), State::Lazy(_))
    }

    /// Drains the producer into ordered storage. A no-op once materialized.
    ///
    /// If the producer fails, nothing is stored and the sequence stays lazy.
    pub fn materialize(&self) -> Result<&Self> {
        let producer = match &*self.state.borrow() {
            State::Lazy(producer) => producer.clone(),
            State::Materialized(_) => return Ok(self),
        };
        let mut elems = Vec::new();
        let produced = producer(&mut Emitter::new(&mut |value: T| {
            elems.push(value);
            true
        }));
        if let Err(err) = produced {
            debug!(
                "producer failed after {} elements, sequence stays lazy",
                elems.len()
            );
            return Err(err);
        }
        let mut state = self.state.borrow_mut();
        // The producer may have materialized us re-entrantly.
        if let State::Lazy(_) = *state {
            trace!("materialized {} elements", elems.len());
            *state = State::Materialized(elems);
        }
        Ok(self)
    }

    /// Feeds every element to `sink` until it answers `false` or the elements
    /// run out.
    fn drive(&self, sink: &mut dyn FnMut(T) -> bool) -> Result<()> {
        let producer = match &*self.state.borrow() {
            State::Lazy(producer) => Some(producer.clone()),
            State::Materialized(_) => None,
        };
        match producer {
            Some(producer) => {
                trace!("driving producer");
                producer(&mut Emitter::new(sink))
            }
            None => {
                self.visit_stored(sink);
                Ok(())
            }
        }
    }

    /// Walks the elements stored when the walk starts, re-borrowing per
    /// element so `sink` may touch the sequence. Elements appended meanwhile
    /// are not visited.
    fn visit_stored(&self, sink: &mut dyn FnMut(T) -> bool) {
        let len = match &*self.state.borrow() {
            State::Materialized(vec) => vec.len(),
            State::Lazy(_) => 0,
        };
        let mut idx = 0;
        while idx < len {
            let value = match &*self.state.borrow() {
                State::Materialized(vec) => vec.get(idx).cloned(),
                State::Lazy(_) => None,
            };
            match value {
                Some(value) => {
                    if !sink(value) {
                        return;
                    }
                }
                None => return,
            }
            idx += 1;
        }
    }

    /// Never asks the producer to stop early.
    pub fn for_each<F>(&self, mut callback: F) -> Result<()>
    where
        F: FnMut(T, usize, &Self),
    {
        let mut index = 0;
        self.drive(&mut |value: T| {
            callback(value, index, self);
            index += 1;
            true
        })
    }

    /// Keeps the elements for which `predicate` holds.
    ///
    /// On a lazy sequence nothing runs until the returned sequence is driven,
    /// and every drive of it drives this one again. On a materialized sequence
    /// the stored elements are filtered right away.
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T, usize, &Self) -> bool + 'static,
    {
        if !self.is_lazy() {
            let mut kept = Vec::new();
            let mut index = 0;
            self.visit_stored(&mut |value: T| {
                if predicate(&value, index, self) {
                    kept.push(value);
                }
                index += 1;
                true
            });
            return Self::from_vec(kept);
        }
        let parent = self.clone();
        Self::new(move |emit| {
            parent.for_each(|value, index, seq| {
                if predicate(&value, index, seq) {
                    emit.emit(value);
                }
            })
        })
    }

    /// Transforms every element, with the same laziness rules as `filter`.
    pub fn map<U, F>(&self, transform: F) -> LazySequence<U>
    where
        U: Clone + 'static,
        F: Fn(T, usize, &Self) -> U + 'static,
    {
        if !self.is_lazy() {
            let mut mapped = Vec::new();
            let mut index = 0;
            self.visit_stored(&mut |value: T| {
                mapped.push(transform(value, index, self));
                index += 1;
                true
            });
            return LazySequence::<U>::from_vec(mapped);
        }
        let parent = self.clone();
        LazySequence::<U>::new(move |emit| {
            parent.for_each(|value, index, seq| {
                emit.emit(transform(value, index, seq));
            })
        })
    }

    /// Whether `predicate` holds for every element.
    ///
    /// Once an element fails, `predicate` is not called again and emit answers
    /// `false`, so a cooperating producer stops.
    pub fn every<F>(&self, mut predicate: F) -> Result<bool>
    where
        F: FnMut(&T, usize, &Self) -> bool,
    {
        let mut result = true;
        let mut index = 0;
        self.drive(&mut |value: T| {
            if result {
                result = predicate(&value, index, self);
            }
            index += 1;
            result
        })?;
        Ok(result)
    }

    /// Whether `predicate` holds for some element. Stops asking once it does.
    pub fn some<F>(&self, mut predicate: F) -> Result<bool>
    where
        F: FnMut(&T, usize, &Self) -> bool,
    {
        let mut result = false;
        let mut index = 0;
        self.drive(&mut |value: T| {
            if !result {
                result = predicate(&value, index, self);
            }
            index += 1;
            !result
        })?;
        Ok(result)
    }

    /// Left fold seeded with the first element, which is not passed to
    /// `combine`.
    pub fn reduce<F>(&self, mut combine: F) -> Result<T>
    where
        F: FnMut(T, T, usize, &Self) -> T,
    {
        let mut acc = None;
        let mut index = 0;
        self.drive(&mut |value: T| {
            acc = Some(match acc.take() {
                None => value,
                Some(prev) => combine(prev, value, index, self),
            });
            index += 1;
            true
        })?;
        acc.ok_or(Error::EmptySequence)
    }

    /// Left fold starting from `init`; every element goes through `combine`.
    pub fn fold<A, F>(&self, init: A, mut combine: F) -> Result<A>
    where
        F: FnMut(A, T, usize, &Self) -> A,
    {
        let mut acc = Some(init);
        let mut index = 0;
        self.drive(&mut |value: T| {
            acc = acc.take().map(|prev| combine(prev, value, index, self));
            index += 1;
            true
        })?;
        // `acc` is only empty while `combine` runs.
        acc.ok_or_else(|| Error::producer("fold step did not complete"))
    }

    /// Materializes, then iterates the stored elements.
    pub fn iter(&self) -> Result<Iter<T>> {
        self.materialize()?;
        Ok(Iter {
            seq: self.state.clone(),
            next_idx: 0,
        })
    }
}

impl LazySequence<i64> {
    /// Integers from `start` towards `end` (exclusive) in increments of
    /// `step`.
    pub fn range(start: i64, end: i64, step: i64) -> Result<Self> {
        if step == 0 {
            return Err(Error::InvalidArgument(
                "range step must be non-zero".to_string(),
            ));
        }
        Ok(Self::new(move |emit| {
            let mut value = start;
            while (step > 0 && value < end) || (step < 0 && value > end) {
                if !emit.emit(value) {
                    break;
                }
                value = match value.checked_add(step) {
                    Some(next) => next,
                    None => break,
                };
            }
            Ok(())
        }))
    }
}

impl<T: Clone> Iterator for Iter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let state = self.seq.borrow();
        match &*state {
            State::Materialized(vec) if self.next_idx < vec.len() => {
                let res = vec[self.next_idx].clone();
                self.next_idx += 1;
                Some(res)
            }
            _ => None,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LazySequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.state.try_borrow() {
            Ok(state) => match &*state {
                State::Lazy(_) => write!(f, "LazySequence(<lazy>)"),
                State::Materialized(vec) => {
                    write!(f, "LazySequence[{:?}]", vec.iter().format(", "))
                }
            },
            Err(_) => write!(f, "LazySequence(<busy>)"),
        }
    }
}
