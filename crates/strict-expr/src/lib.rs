//! Lazy body parsing for Strict methods.
//!
//! [`method_body`] turns a method's raw lines into a typed
//! [`Body`](strict_lang::Body) on first access: the pre-parser groups
//! indented lines into scopes, each line is tokenized, operators are
//! ordered by Shunting-Yard, and identifiers resolve against the
//! surrounding body, method, type, and package. [`member_type`] types a
//! member's initializer the same way. [`diagnostics`] renders the tagged
//! errors of either crate against file sources.

mod body;
pub mod diagnostics;
mod parser;
mod shunting_yard;
mod token;

pub use parser::{member_type, method_body};
