//! Syntax feeds.
//!
//! A feed is a cursor over an array plus the specifier its words are read
//! through. Feeds are shared (`FeedRef`) because a variadic argument keeps
//! pulling from the caller's feed after fulfillment has moved on.
//!
//! Borrows of the inner `RefCell` never outlive a single method call.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::array::ArrayRef;
use crate::cell::Cell;
use crate::frame::WeakFrame;
use crate::specifier::Specifier;

/// Cursor state.
#[derive(Debug)]
pub struct Feed {
    array: ArrayRef,
    index: usize,
    specifier: Specifier,
}

/// Shared handle to a feed.
#[derive(Clone)]
pub struct FeedRef(Rc<RefCell<Feed>>);

impl FeedRef {
    pub fn new(array: ArrayRef, specifier: Specifier) -> Self {
        FeedRef::at(array, 0, specifier)
    }

    /// Feed starting at `index`.
    pub fn at(array: ArrayRef, index: usize, specifier: Specifier) -> Self {
        FeedRef(Rc::new(RefCell::new(Feed {
            array,
            index,
            specifier,
        })))
    }

    /// Unit under the cursor.
    pub fn peek(&self) -> Option<Cell> {
        self.peek_at(0)
    }

    /// Unit `offset` positions past the cursor.
    pub fn peek_at(&self, offset: usize) -> Option<Cell> {
        let feed = self.0.borrow();
        feed.array.get(feed.index + offset)
    }

    pub fn advance(&self) {
        self.0.borrow_mut().index += 1;
    }

    /// Take the unit under the cursor.
    pub fn next(&self) -> Option<Cell> {
        let cell = self.peek()?;
        self.advance();
        Some(cell)
    }

    pub fn at_end(&self) -> bool {
        let feed = self.0.borrow();
        feed.index >= feed.array.len()
    }

    pub fn index(&self) -> usize {
        self.0.borrow().index
    }

    pub fn array(&self) -> ArrayRef {
        self.0.borrow().array.clone()
    }

    pub fn specifier(&self) -> Specifier {
        self.0.borrow().specifier.clone()
    }

    /// Replace the specifier, e.g. after `let` adds a patch.
    pub fn set_specifier(&self, specifier: Specifier) {
        self.0.borrow_mut().specifier = specifier;
    }

    #[inline]
    pub fn ptr_eq(&self, other: &FeedRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for FeedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(feed) => write!(f, "FeedRef(at {} of {})", feed.index, feed.array.len()),
            Err(_) => f.write_str("FeedRef(<borrowed>)"),
        }
    }
}

/// A variadic argument: the caller's feed plus the parameter it fills.
#[derive(Clone, Debug)]
pub struct Varargs {
    pub feed: FeedRef,
    /// Call frame the parameter belongs to; decides how units are taken.
    pub frame: WeakFrame,
    /// 1-based parameter index in `frame`.
    pub param: usize,
}
