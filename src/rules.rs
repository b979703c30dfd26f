#![forbid(unsafe_code)]

//! Rule-configuration language: atoms, combinators, trigger, routing config

pub mod atom;
pub mod expr;
pub mod routing;
pub mod ruleset;

pub use atom::Atom;
pub use expr::Expr;
pub use routing::{RoutingConfig, RoutingEntry};
pub use ruleset::{Combinator, RuleSet};
