//! Ordered sequences backed by a producer function.
//!
//! A [`LazySequence`] wraps a producer that calls [`Emitter::emit`] once per
//! element. `filter` and `map` stack new producers on top without running
//! anything; `for_each`, `every`, `some`, `reduce`, `fold` and
//! [`LazySequence::materialize`] drive the chain. Container operations such as
//! `push`, `sort` or `slice` need the full contents, so they materialize the
//! sequence into a `Vec` first. Materialization happens once; afterwards every
//! operation works on the stored elements.
//!
//! ```
//! use lazy_sequence::LazySequence;
//!
//! let seq: LazySequence<i32> = LazySequence::new(|emit| {
//!     emit.emit_all(vec![1, 2, 3]);
//!     Ok(())
//! });
//! let odd = seq.filter(|x, _, _| x % 2 == 1);
//! assert_eq!(odd.to_vec().unwrap(), vec![1, 3]);
//! assert_eq!(seq.reduce(|a, b, _, _| a + b).unwrap(), 6);
//! ```
//!
//! Producers may honor the `bool` returned by `emit` to stop early. Only
//! `every` and `some` ever ask for that; see [`Emitter::emit`].

mod container;
mod emitter;
mod error;
mod lazy_sequence;

pub use emitter::Emitter;
pub use error::{Error, Result};
pub use lazy_sequence::{Iter, LazySequence};
