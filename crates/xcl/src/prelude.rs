//! Prelude module - common imports for xcl users
//!
//! ```rust
//! use xcl::prelude::*;
//! ```

pub use crate::{
    // Pipeline
    convert,
    run,
    Address,
    Cell,
    CellConsumer,
    CellProducer,
    CellType,
    CellValue,
    // I/O types
    CsvCellReader,
    CsvCellWriter,
    CsvReadOptions,
    CsvWriteOptions,
    Format,
    Location,
    MemoryConsumer,
    MemoryProducer,
    RunStats,
    Sink,
    Source,
    Transformer,
    Window,
    // Error types
    XclError,
    XclResult,
    XlsxCellReader,
    XlsxCellWriter,
    XlsxReadOptions,
    XlsxWriteOptions,
};
