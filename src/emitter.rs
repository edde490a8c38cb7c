use std::rc::Rc;

use crate::error::Result;

pub(crate) type Producer<T> = Rc<dyn Fn(&mut Emitter<'_, T>) -> Result<()>>;

/// Handle a producer uses to deliver elements downstream.
pub struct Emitter<'a, T> {
    sink: &'a mut dyn FnMut(T) -> bool,
}

impl<'a, T> Emitter<'a, T> {
    pub(crate) fn new(sink: &'a mut dyn FnMut(T) -> bool) -> Self {
        Self { sink }
    }

    /// Delivers one element.
    ///
    /// Returns `false` when the consumer asks the producer to stop. Stopping is
    /// voluntary: a producer that keeps emitting is still served, it just wastes
    /// work. Only `every` and `some` ever answer `false`; `for_each`, the
    /// producers built by `filter`/`map`, and materialization always answer
    /// `true`, so a stop requested downstream of a `filter` or `map` stage never
    /// reaches the root producer.
    pub fn emit(&mut self, value: T) -> bool {
        (self.sink)(value)
    }

    /// Emits `values` in order until one of them is answered with a stop.
    pub fn emit_all<I: IntoIterator<Item = T>>(&mut self, values: I) -> bool {
        for value in values {
            if !self.emit(value) {
                return false;
            }
        }
        true
    }
}
