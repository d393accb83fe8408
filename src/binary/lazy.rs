use error::{Error, Errors};
use features::Features;
use reader::{Reader, Read, FallibleIterator};

use core::marker::PhantomData;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum State {
    Reading,
    Done,
    Failed,
}

/// A `count`-prefixed run of `T` records, decoded one record per `next()`.
///
/// Only the count is read up front. Each pull either yields the next record,
/// reports the end of the sequence, or reports the first malformed record to
/// `errors` (at the offset where that record starts) and returns it as an
/// `Err`. After the end or an error every further pull returns `Ok(None)`;
/// the sequence cannot be restarted.
pub struct LazySection<'a, T, E: Errors> {
    base: Reader<'a>,
    r: Reader<'a>,
    count: Option<u32>,
    index: u32,
    state: State,
    errors: E,
    _phantom: PhantomData<T>,
}

impl<'a, T, E: Errors> LazySection<'a, T, E>
where Reader<'a>: Read<T> {
    pub fn new(data: &'a [u8], features: Features, mut errors: E) -> Self {
        let base = Reader::with_features(data, features);
        let mut r = base.clone();
        let (count, state) = match r.read_var_u32() {
            Ok(count) => {
                trace!("lazy section: {} items in {} bytes", count, data.len());
                (Some(count), State::Reading)
            }
            Err(e) => {
                debug!("lazy section: unreadable count: {:?}", e);
                errors.on_error(0, e);
                (None, State::Failed)
            }
        };
        LazySection { base, r, count, index: 0, state, errors, _phantom: PhantomData }
    }
}

impl<'a, T, E: Errors> LazySection<'a, T, E> {
    /// The declared number of records, or `None` if it could not be read.
    pub fn declared_count(&self) -> Option<u32> {
        self.count
    }

    /// Records still to be produced; zero once the sequence has ended or failed.
    pub fn remaining(&self) -> u32 {
        match (self.state, self.count) {
            (State::Reading, Some(count)) => count - self.index,
            _ => 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.r.offset_from(&self.base)
    }

    pub fn rest(&self) -> &'a [u8] {
        self.r.rest()
    }

    pub fn is_failed(&self) -> bool {
        self.state == State::Failed
    }

    pub fn into_errors(self) -> E {
        self.errors
    }
}

impl<'a, T, E: Errors> FallibleIterator for LazySection<'a, T, E>
where Reader<'a>: Read<T> {
    type Item = T;
    type Error = Error;

    fn next(&mut self) -> Result<Option<Self::Item>, Self::Error> {
        if self.state != State::Reading {
            return Ok(None)
        }
        if Some(self.index) == self.count {
            trace!("lazy section: end after {} items", self.index);
            if !self.r.is_empty() {
                warn!("lazy section: {} trailing bytes", self.r.len());
            }
            self.state = State::Done;
            return Ok(None)
        }
        let offset = self.offset();
        match self.r.read() {
            Ok(item) => {
                self.index += 1;
                Ok(Some(item))
            }
            Err(e) => {
                debug!("lazy section: item {} at {:#x}: {:?}", self.index, offset, e);
                self.errors.on_error(offset, e);
                self.state = State::Failed;
                Err(e)
            }
        }
    }
}
