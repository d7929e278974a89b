// Main library entry point for exprkey: structural equality and hashing of
// expression trees.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

pub use application::{are_equal, hash_expr, ComparerConfig, ExprKey, ExpressionEqualityComparer};
pub use domain::expr::{Expr, ExprKind, ExprRef, NodeType};
pub use domain::symbol::{Sym, Symbol};
pub use domain::value::Value;
pub use error::ExprError;
