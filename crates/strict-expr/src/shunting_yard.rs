//! Shunting-Yard conversion from infix to postfix.
//!
//! Operands are already-built expressions (the operand parser resolves
//! literals, calls, and navigation first), so the yard only orders
//! operators by precedence. `is not` is right-associative; everything else
//! associates left.

use strict_lang::Expression;

/// An element of the infix (and postfix) sequence.
#[derive(Debug)]
pub(crate) enum InfixItem {
    Operand(Expression),
    Operator(String),
}

/// Binding strength; higher binds tighter.
pub(crate) fn precedence(operator: &str) -> u8 {
    match operator {
        "or" => 1,
        "and" => 2,
        "is" | "is not" => 3,
        "<" | ">" | "<=" | ">=" => 4,
        "+" | "-" => 5,
        "*" | "/" | "%" => 6,
        _ => 0,
    }
}

fn is_right_associative(operator: &str) -> bool {
    operator == "is not"
}

/// Reorder an alternating operand/operator sequence into postfix.
pub(crate) fn to_postfix(items: Vec<InfixItem>) -> Vec<InfixItem> {
    let mut output = Vec::with_capacity(items.len());
    let mut operators: Vec<String> = Vec::new();
    for item in items {
        match item {
            InfixItem::Operand(_) => output.push(item),
            InfixItem::Operator(operator) => {
                while operators.last().is_some_and(|top| {
                    precedence(top) > precedence(&operator)
                        || (precedence(top) == precedence(&operator)
                            && !is_right_associative(&operator))
                }) {
                    if let Some(top) = operators.pop() {
                        output.push(InfixItem::Operator(top));
                    }
                }
                operators.push(operator);
            }
        }
    }
    while let Some(top) = operators.pop() {
        output.push(InfixItem::Operator(top));
    }
    output
}
