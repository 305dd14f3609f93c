//! Shared arrays of cells.
//!
//! Code bodies are arrays shared by every value that refers to them. The
//! interpreter never rewrites a shared body to run it; only explicit `bind`
//! mutates words in place.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::cell::Cell;

/// Single-threaded shared handle to an array of cells.
#[repr(transparent)]
pub struct ArrayRef(Rc<RefCell<Vec<Cell>>>);

impl ArrayRef {
    /// Create an empty array.
    pub fn new() -> Self {
        ArrayRef::from_vec(Vec::new())
    }

    /// Take ownership of cells as a new array.
    pub fn from_vec(cells: Vec<Cell>) -> Self {
        ArrayRef(Rc::new(RefCell::new(cells)))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Clone of the cell at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.0.borrow().get(index).cloned()
    }

    pub fn push(&self, cell: Cell) {
        self.0.borrow_mut().push(cell);
    }

    /// Borrow the cells immutably.
    #[inline]
    pub fn borrow(&self) -> Ref<'_, Vec<Cell>> {
        self.0.borrow()
    }

    /// Borrow the cells mutably.
    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, Vec<Cell>> {
        self.0.borrow_mut()
    }

    /// Snapshot of the cells.
    pub fn to_vec(&self) -> Vec<Cell> {
        self.0.borrow().clone()
    }

    /// Identity comparison.
    #[inline]
    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Clone for ArrayRef {
    #[inline]
    fn clone(&self) -> Self {
        ArrayRef(Rc::clone(&self.0))
    }
}

impl Default for ArrayRef {
    fn default() -> Self {
        ArrayRef::new()
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(cells) => write!(f, "ArrayRef(len={})", cells.len()),
            Err(_) => f.write_str("ArrayRef(<borrowed>)"),
        }
    }
}
