//! Typed expressions.
//!
//! Every expression carries the [`TypeId`] it evaluates to. The expression
//! parser crate produces these; here they are plain data plus the canonical
//! textual form: `Display` output parsed again yields an equal expression.

use std::fmt;

use crate::body::Body;
use crate::program::TypeId;
use crate::ty::MethodSlot;

/// A typed expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub return_type: TypeId,
}

impl Expression {
    pub fn new(kind: ExpressionKind, return_type: TypeId) -> Self {
        Self { kind, return_type }
    }
}

/// The expression sum type.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Number(f64),
    Text(String),
    Boolean(bool),
    /// A non-empty list literal `(a, b, c)`; the return type is the `List`
    /// instantiation for the common element type.
    List(Vec<Expression>),
    /// A body variable, parameter, or implicit loop variable.
    VariableCall { name: String },
    /// Member access, optionally on an instance (`member` / `a.member`).
    MemberCall {
        instance: Option<Box<Expression>>,
        member: String,
    },
    /// A resolved method call; zero-argument calls render without
    /// parentheses (`list.length`).
    MethodCall {
        instance: Option<Box<Expression>>,
        name: String,
        slot: MethodSlot,
        arguments: Vec<Expression>,
    },
    /// Constructor call `TypeName(args…)` via `from` or auto-initialization.
    From {
        type_name: String,
        constructed: TypeId,
        arguments: Vec<Expression>,
    },
    /// The `Mutable(expr)` wrapper form.
    Mutable(Box<Expression>),
    /// A binary operator resolved to a method on the left operand's type
    /// or on `BinaryOperator`.
    Binary {
        left: Box<Expression>,
        operator: String,
        right: Box<Expression>,
    },
    /// `not x`, resolved to `x.not()`.
    Not(Box<Expression>),
    /// `let name = value` or `constant name = value`.
    Assignment {
        name: String,
        value: Box<Expression>,
        is_constant: bool,
    },
    /// `mutable name = value`.
    MutableDeclaration {
        name: String,
        value: Box<Expression>,
    },
    /// `target = value` on a mutable variable or member.
    Reassignment {
        target: Box<Expression>,
        value: Box<Expression>,
    },
    /// Inline conditional `cond ? then else otherwise`; both branches have
    /// the same type and conditionals cannot nest.
    Conditional {
        condition: Box<Expression>,
        then: Box<Expression>,
        otherwise: Box<Expression>,
    },
    /// `if cond` with an indented body and optional `else` body.
    If {
        condition: Box<Expression>,
        then: Body,
        otherwise: Option<Body>,
    },
    /// `for iterable` or `for variable in iterable` with an indented body.
    For {
        value: Box<Expression>,
        variable: Option<String>,
        body: Body,
    },
    /// `return value`.
    Return(Box<Expression>),
}

fn write_arguments(f: &mut fmt::Formatter<'_>, arguments: &[Expression]) -> fmt::Result {
    write!(f, "(")?;
    for (index, argument) in arguments.iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{argument}")?;
    }
    write!(f, ")")
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExpressionKind::Number(value) => write!(f, "{value}"),
            ExpressionKind::Text(text) => write!(f, "\"{text}\""),
            ExpressionKind::Boolean(value) => write!(f, "{value}"),
            ExpressionKind::List(elements) => write_arguments(f, elements),
            ExpressionKind::VariableCall { name } => write!(f, "{name}"),
            ExpressionKind::MemberCall { instance, member } => {
                if let Some(instance) = instance {
                    write!(f, "{instance}.")?;
                }
                write!(f, "{member}")
            }
            ExpressionKind::MethodCall { instance, name, arguments, .. } => {
                if let Some(instance) = instance {
                    write!(f, "{instance}.")?;
                }
                write!(f, "{name}")?;
                if arguments.is_empty() {
                    Ok(())
                } else {
                    write_arguments(f, arguments)
                }
            }
            ExpressionKind::From { type_name, arguments, .. } => {
                write!(f, "{type_name}")?;
                write_arguments(f, arguments)
            }
            ExpressionKind::Mutable(value) => write!(f, "Mutable({value})"),
            ExpressionKind::Binary { left, operator, right } => {
                write!(f, "{left} {operator} {right}")
            }
            ExpressionKind::Not(operand) => write!(f, "not {operand}"),
            ExpressionKind::Assignment { name, value, is_constant } => {
                let keyword = if *is_constant { "constant" } else { "let" };
                write!(f, "{keyword} {name} = {value}")
            }
            ExpressionKind::MutableDeclaration { name, value } => {
                write!(f, "mutable {name} = {value}")
            }
            ExpressionKind::Reassignment { target, value } => write!(f, "{target} = {value}"),
            ExpressionKind::Conditional { condition, then, otherwise } => {
                write!(f, "{condition} ? {then} else {otherwise}")
            }
            ExpressionKind::If { condition, then, otherwise } => {
                write!(f, "if {condition}\n{then}")?;
                if let Some(otherwise) = otherwise {
                    let indent = "\t".repeat(then.tabs.saturating_sub(1));
                    write!(f, "\n{indent}else\n{otherwise}")?;
                }
                Ok(())
            }
            ExpressionKind::For { value, variable, body } => {
                match variable {
                    Some(variable) => write!(f, "for {variable} in {value}")?,
                    None => write!(f, "for {value}")?,
                }
                write!(f, "\n{body}")
            }
            ExpressionKind::Return(value) => write!(f, "return {value}"),
        }
    }
}
