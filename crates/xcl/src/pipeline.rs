//! The pipeline driver: producer -> transformer -> consumer

use xcl_core::{CellConsumer, CellProducer};
use xcl_script::ScriptEngine;

use crate::error::XclResult;
use crate::transform::Transformer;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Cells pulled from the producer
    pub cells_read: usize,
    /// Cells handed to the consumer
    pub cells_written: usize,
    /// Distinct rows handed to the consumer
    pub rows_written: usize,
    /// Name of the requested sub-source when it did not exist
    pub source_missing: Option<String>,
}

/// Stream every cell of `producer` through `expressions` into `consumer`
///
/// The consumer is closed on every exit path. When the run fails and closing
/// fails too, the run's error is returned and the close error is logged. The
/// producer is dropped before this returns.
///
/// ```
/// use xcl::run;
/// use xcl_core::{CellValue, MemoryConsumer, MemoryProducer, Window};
///
/// let rows = vec![vec![CellValue::from("a"), CellValue::from(2.0)]];
/// let mut sink = MemoryConsumer::new();
///
/// let stats = run(MemoryProducer::new(rows, Window::all()), &mut sink, &["$1 * 3", "$0"]).unwrap();
///
/// assert_eq!(stats.cells_written, 2);
/// assert_eq!(sink.rows_as_strings(), vec![vec!["6", "a"]]);
/// ```
pub fn run<P, C, S>(producer: P, consumer: C, expressions: &[S]) -> XclResult<RunStats>
where
    P: CellProducer,
    C: CellConsumer,
    S: AsRef<str>,
{
    run_with(producer, consumer, Transformer::new(expressions))
}

/// Like [`run`], with a prepared transformer
pub fn run_with<P, C, E>(
    producer: P,
    mut consumer: C,
    mut transformer: Transformer<E>,
) -> XclResult<RunStats>
where
    P: CellProducer,
    C: CellConsumer,
    E: ScriptEngine,
{
    let result = drive(producer, &mut consumer, &mut transformer);
    let closed = consumer.close();

    match (result, closed) {
        (Ok(stats), Ok(())) => {
            log::debug!(
                "run finished: {} cells read, {} cells in {} rows written",
                stats.cells_read,
                stats.cells_written,
                stats.rows_written
            );
            Ok(stats)
        }
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            log::error!("failed to close output after error: {}", close_err);
            Err(e)
        }
    }
}

fn drive<P, C, E>(
    mut producer: P,
    consumer: &mut C,
    transformer: &mut Transformer<E>,
) -> XclResult<RunStats>
where
    P: CellProducer,
    C: CellConsumer,
    E: ScriptEngine,
{
    let mut stats = RunStats::default();
    let mut last_row = None;

    while let Some(cell) = producer.next() {
        let cell = cell?;
        stats.cells_read += 1;

        for out in transformer.evaluate(cell)? {
            if last_row != Some(out.row()) {
                last_row = Some(out.row());
                stats.rows_written += 1;
            }
            consumer.accept(out)?;
            stats.cells_written += 1;
        }
    }
    transformer.finish()?;

    stats.source_missing = producer.source_missing().map(str::to_string);
    if let Some(name) = &stats.source_missing {
        log::debug!("source '{}' not found, nothing was read", name);
    }
    Ok(stats)
}
