//! # xcl-script
//!
//! A small expression language with a variable store.
//!
//! This crate provides:
//! - Statement parsing (text → AST)
//! - An [`Interpreter`] that evaluates statements against its variables
//! - The [`ScriptEngine`] trait, the narrow `set` / `eval` / `get` capability
//!   the column transformer depends on
//! - Built-in functions (`IF`, `ROUND`, `UPPER`, `DATE`, ...)
//!
//! ## Example
//!
//! ```rust
//! use xcl_script::{Interpreter, ScriptEngine, ScriptValue};
//!
//! let mut engine = Interpreter::new();
//! engine.set("price", ScriptValue::Number(2.5));
//! engine.eval("total = price * 4").unwrap();
//! assert_eq!(engine.get("total"), Some(&ScriptValue::Number(10.0)));
//!
//! let greeting = engine.eval("\"n=\" + total").unwrap();
//! assert_eq!(greeting, ScriptValue::String("n=10".into()));
//! ```

pub mod ast;
pub mod engine;
pub mod error;
pub mod functions;
pub mod interpreter;
pub mod parser;
pub mod value;

pub use ast::{BinaryOperator, Expr, Statement, UnaryOperator};
pub use engine::ScriptEngine;
pub use error::{ScriptError, ScriptResult};
pub use interpreter::Interpreter;
pub use parser::parse_statement;
pub use value::ScriptValue;
