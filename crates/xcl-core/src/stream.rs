//! Streaming contracts
//!
//! Producers are pull-based: a [`CellProducer`] is an iterator of cells in
//! row-major order, already filtered by its [`Window`](crate::Window). Nothing
//! is read from the underlying source until the caller asks for the next cell.
//!
//! Consumers are push-based: cells are handed to [`CellConsumer::accept`] one
//! at a time and [`CellConsumer::close`] finalizes the output. Implementations
//! also close themselves on drop, so a sink is released on every exit path.

use crate::cell::Cell;
use crate::error::Result;

/// A lazy, finite, ordered source of cells
pub trait CellProducer: Iterator<Item = Result<Cell>> {
    /// Name of the requested sub-source (e.g. a sheet) when it did not exist
    ///
    /// A producer over a missing sheet yields nothing and reports the name here
    /// instead of failing at construction.
    fn source_missing(&self) -> Option<&str> {
        None
    }
}

/// A sink that receives cells in arrival order
pub trait CellConsumer {
    /// Accept one cell
    ///
    /// Cells arrive in non-decreasing row order. Returns [`Error::Closed`]
    /// after [`close`](CellConsumer::close).
    ///
    /// [`Error::Closed`]: crate::Error::Closed
    fn accept(&mut self, cell: Cell) -> Result<()>;

    /// Flush pending output and release the sink
    ///
    /// Calling `close` more than once is a no-op.
    fn close(&mut self) -> Result<()>;
}

impl<P: CellProducer + ?Sized> CellProducer for Box<P> {
    fn source_missing(&self) -> Option<&str> {
        (**self).source_missing()
    }
}

impl<C: CellConsumer + ?Sized> CellConsumer for Box<C> {
    fn accept(&mut self, cell: Cell) -> Result<()> {
        (**self).accept(cell)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<C: CellConsumer + ?Sized> CellConsumer for &mut C {
    fn accept(&mut self, cell: Cell) -> Result<()> {
        (**self).accept(cell)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
