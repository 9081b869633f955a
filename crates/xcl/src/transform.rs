//! Per-column expression evaluation over a cell stream
//!
//! Output column `i` is computed by expression `i`. An expression names input
//! columns of the current row with `$N` (zero-based). Cells arrive one at a
//! time, left to right, and are bound into a table that only ever holds the
//! current row. As soon as every column referenced by any expression is bound
//! the whole output row is evaluated and emitted; until then the engine waits.

use lazy_regex::regex;
use xcl_core::{Address, Cell, CellValue};
use xcl_script::{Interpreter, ScriptEngine, ScriptValue};

use crate::error::{XclError, XclResult};

/// One output column expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnExpression {
    source: String,
    /// Referenced input columns, ascending and deduplicated
    references: Vec<u32>,
    /// The source with every `$N` replaced by its engine variable
    script: String,
}

impl ColumnExpression {
    /// Parse the column references of an expression
    ///
    /// ```
    /// use xcl::ColumnExpression;
    ///
    /// let expr = ColumnExpression::new("$1 + $1 * $0");
    /// assert_eq!(expr.references(), &[0, 1]);
    /// assert_eq!(expr.script(), "__col1 + __col1 * __col0");
    /// ```
    pub fn new(source: &str) -> Self {
        let pattern = regex!(r"\$(\d+)");

        let mut references: Vec<u32> = pattern
            .captures_iter(source)
            // Indices too large for u32 can never be bound
            .map(|caps| caps[1].parse::<u32>().unwrap_or(u32::MAX))
            .collect();
        references.sort_unstable();
        references.dedup();

        let script = pattern
            .replace_all(source, |caps: &lazy_regex::Captures| {
                let column = caps[1].parse::<u32>().unwrap_or(u32::MAX);
                variable_name(column)
            })
            .into_owned();

        Self {
            source: source.to_string(),
            references,
            script,
        }
    }

    /// The expression as written
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Input columns the expression reads
    pub fn references(&self) -> &[u32] {
        &self.references
    }

    /// The rewritten statement handed to the engine
    pub fn script(&self) -> &str {
        &self.script
    }
}

/// Engine variable holding input column `column` of the current row
fn variable_name(column: u32) -> String {
    format!("__col{}", column)
}

/// Values seen so far in one row
#[derive(Debug)]
pub struct RowBindings {
    row: u32,
    values: Vec<Option<CellValue>>,
    evaluated: bool,
}

impl RowBindings {
    fn new(row: u32) -> Self {
        Self {
            row,
            values: Vec::new(),
            evaluated: false,
        }
    }

    /// Row these bindings belong to
    pub fn row(&self) -> u32 {
        self.row
    }

    fn bind(&mut self, column: u32, value: CellValue) {
        let idx = column as usize;
        if self.values.len() <= idx {
            self.values.resize(idx + 1, None);
        }
        self.values[idx] = Some(value);
    }

    /// Value bound for `column`, if that cell has been seen
    pub fn get(&self, column: u32) -> Option<&CellValue> {
        self.values.get(column as usize).and_then(Option::as_ref)
    }

    fn is_bound(&self, column: u32) -> bool {
        self.get(column).is_some()
    }
}

/// The transformation engine
///
/// With no expressions every cell passes through unchanged.
///
/// ```
/// use xcl::Transformer;
/// use xcl_core::{Cell, CellValue};
///
/// let mut t = Transformer::new(&["$0", "$1 + $1", "$2"]);
/// assert!(t.evaluate(Cell::at(0, 0, "a")).unwrap().is_empty());
/// assert!(t.evaluate(Cell::at(0, 1, 2.0)).unwrap().is_empty());
///
/// let out = t.evaluate(Cell::at(0, 2, true)).unwrap();
/// assert_eq!(out[1], Cell::at(0, 1, 4.0));
/// ```
pub struct Transformer<E: ScriptEngine = Interpreter> {
    expressions: Vec<ColumnExpression>,
    /// Union of all referenced columns, ascending
    required: Vec<u32>,
    engine: E,
    bindings: Option<RowBindings>,
}

impl Transformer<Interpreter> {
    /// Build a transformer backed by the built-in interpreter
    pub fn new<S: AsRef<str>>(expressions: &[S]) -> Self {
        Self::with_engine(expressions, Interpreter::new())
    }
}

impl<E: ScriptEngine> Transformer<E> {
    /// Build a transformer backed by any script engine
    pub fn with_engine<S: AsRef<str>>(expressions: &[S], engine: E) -> Self {
        let expressions: Vec<ColumnExpression> = expressions
            .iter()
            .map(|e| ColumnExpression::new(e.as_ref()))
            .collect();

        let mut required: Vec<u32> = expressions
            .iter()
            .flat_map(|e| e.references().iter().copied())
            .collect();
        required.sort_unstable();
        required.dedup();

        log::debug!(
            "transformer: {} expressions, input columns {:?}",
            expressions.len(),
            required
        );

        Self {
            expressions,
            required,
            engine,
            bindings: None,
        }
    }

    /// Whether cells are forwarded unchanged
    pub fn is_pass_through(&self) -> bool {
        self.expressions.is_empty()
    }

    /// The parsed output column expressions
    pub fn expressions(&self) -> &[ColumnExpression] {
        &self.expressions
    }

    /// Bindings of the row currently being read
    pub fn bindings(&self) -> Option<&RowBindings> {
        self.bindings.as_ref()
    }

    /// Feed one input cell, returning the output cells it completes
    ///
    /// Returns an empty vector while the row still lacks referenced columns
    /// and after the row has already been emitted.
    pub fn evaluate(&mut self, cell: Cell) -> XclResult<Vec<Cell>> {
        if self.is_pass_through() {
            return Ok(vec![cell]);
        }

        let row = cell.row();
        if self.bindings.as_ref().map_or(true, |b| b.row != row) {
            self.end_row()?;
            self.bindings = Some(RowBindings::new(row));
        }

        let Some(bindings) = self.bindings.as_mut() else {
            return Ok(Vec::new());
        };
        bindings.bind(cell.column(), cell.value);

        if bindings.evaluated {
            return Ok(Vec::new());
        }
        if let Some(missing) = self.required.iter().find(|c| !bindings.is_bound(**c)) {
            log::trace!("row {}: waiting for column {}", row, missing);
            return Ok(Vec::new());
        }

        bindings.evaluated = true;
        self.evaluate_row()
    }

    /// Signal the end of the stream
    ///
    /// Fails with [`XclError::UnboundColumn`] when the last row never saw
    /// every referenced column.
    pub fn finish(&mut self) -> XclResult<()> {
        self.end_row()
    }

    /// Drop the current row, failing if it was never evaluated
    fn end_row(&mut self) -> XclResult<()> {
        let Some(bindings) = self.bindings.take() else {
            return Ok(());
        };
        if bindings.evaluated {
            return Ok(());
        }

        let missing = self.required.iter().copied().find(|c| !bindings.is_bound(*c));
        match missing {
            Some(column) => {
                let expression = self
                    .expressions
                    .iter()
                    .find(|e| e.references().contains(&column))
                    .map(|e| e.source().to_string())
                    .unwrap_or_default();
                Err(XclError::UnboundColumn {
                    row: bindings.row,
                    column,
                    expression,
                })
            }
            None => Ok(()),
        }
    }

    fn evaluate_row(&mut self) -> XclResult<Vec<Cell>> {
        let Some(bindings) = self.bindings.as_ref() else {
            return Ok(Vec::new());
        };
        let row = bindings.row;
        log::trace!("row {}: evaluating {} expressions", row, self.expressions.len());

        // Variables never outlive their row
        self.engine.clear();
        for &column in &self.required {
            let value = bindings.get(column).cloned().unwrap_or_default();
            self.engine.set(&variable_name(column), ScriptValue::from(value));
        }

        let mut out = Vec::with_capacity(self.expressions.len());
        for (i, expression) in self.expressions.iter().enumerate() {
            let address = Address::new(row, i as u32);
            let value = self
                .engine
                .eval(expression.script())
                .map_err(|source| XclError::Evaluation {
                    address,
                    expression: expression.source().to_string(),
                    source,
                })?;
            out.push(Cell::new(address, value.into_cell_value()));
        }
        Ok(out)
    }
}
