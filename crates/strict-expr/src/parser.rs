//! Expression parsing with type resolution.
//!
//! Bodies are parsed lazily on first access. Each line is recognized by
//! prefix (`if`, `else`, `for`, `let`, `constant`, `mutable`, `return`,
//! reassignment) or parsed as a value expression: operands are resolved
//! first (literals, calls, dotted navigation), the Shunting-Yard pass
//! orders the operators, and the postfix stream is folded bottom-up into
//! typed expressions. Identifiers resolve against body variables, then
//! parameters, then members, then types, then methods.

use std::iter::Peekable;
use std::vec::IntoIter;

use strict_common::{ErrorKind, ParseError, SourceContext};
use strict_lang::{
    Body, Context, Expression, ExpressionKind, Program, TypeId, Variable,
};

use crate::body::{pre_parse, RawBody, RawItem};
use crate::shunting_yard::{to_postfix, InfixItem};
use crate::token::{tokenize, Token};

/// Parse (or fetch) the body of a method. The parsed body is cached on the
/// method and held for the lifetime of the program.
pub fn method_body<'p>(
    program: &'p mut Program,
    ty: TypeId,
    method: usize,
) -> Result<&'p Body, ParseError> {
    if program.ty(ty).methods[method].body().is_none() {
        let body = parse_method_body(program, ty, method)?;
        return Ok(program.set_method_body(ty, method, body));
    }
    match program.ty(ty).methods[method].body() {
        Some(body) => Ok(body),
        None => unreachable!("method body was parsed above"),
    }
}

/// Resolve the type of a member, parsing its initializer if the
/// declaration deferred it.
pub fn member_type(
    program: &mut Program,
    ty: TypeId,
    member: usize,
) -> Result<TypeId, ParseError> {
    let mut parser = BodyParser::for_type(program, ty);
    parser.member_type(ty, member)
}

fn parse_method_body(
    program: &mut Program,
    ty: TypeId,
    method: usize,
) -> Result<Body, ParseError> {
    let (lines, start_line, method_name, type_name, return_type, is_constructor) = {
        let t = program.ty(ty);
        let m = &t.methods[method];
        (
            m.body_lines().to_vec(),
            m.body_start_line(),
            m.name.clone(),
            t.name.clone(),
            m.return_type,
            m.is_constructor(),
        )
    };
    if lines.is_empty() {
        return Err(ParseError::new(
            ErrorKind::TraitContract {
                message: format!("method `{method_name}` has no body to parse"),
            },
            SourceContext::new(type_name.as_str(), 0, "").in_method(method_name.clone()),
        ));
    }
    let numbered: Vec<(usize, &str)> = lines
        .iter()
        .enumerate()
        .map(|(index, line)| (start_line + index, line.as_str()))
        .collect();
    let raw = pre_parse(&numbered, &type_name, &method_name)?;

    let mut parser = BodyParser {
        program: &mut *program,
        ty,
        method: Some(method),
        type_name,
        method_name: Some(method_name.clone()),
        scopes: Vec::new(),
        member_trail: Vec::new(),
    };
    let last_line = raw.end_line.saturating_sub(1);
    let body = parser.parse_body(raw, Vec::new())?;

    // The body's value must be assignable to the declared return type;
    // constructors assemble the owner instead of returning it.
    let none = program.known().none;
    if return_type != none && !is_constructor && !program.is_compatible(body.return_type, return_type) {
        let method_name = program.ty(ty).methods[method].name.clone();
        return Err(ParseError::new(
            ErrorKind::Type {
                message: format!(
                    "method `{}` must return `{}`, body returns `{}`",
                    method_name,
                    program.ty(return_type).name,
                    program.ty(body.return_type).name
                ),
            },
            SourceContext::new(program.ty(ty).name.as_str(), last_line, "")
                .in_method(method_name.clone()),
        ));
    }
    Ok(body)
}

/// Line-by-line body parser holding the scope stack.
struct BodyParser<'p> {
    program: &'p mut Program,
    ty: TypeId,
    method: Option<usize>,
    type_name: String,
    method_name: Option<String>,
    /// One frame per body, innermost last.
    scopes: Vec<Vec<Variable>>,
    /// Members currently having their initializer typed, to refuse cycles.
    member_trail: Vec<(TypeId, usize)>,
}

impl<'p> BodyParser<'p> {
    fn for_type(program: &'p mut Program, ty: TypeId) -> Self {
        let type_name = program.ty(ty).name.clone();
        Self {
            program,
            ty,
            method: None,
            type_name,
            method_name: None,
            scopes: Vec::new(),
            member_trail: Vec::new(),
        }
    }

    fn context(&self, number: usize, line: &str) -> SourceContext {
        let context = SourceContext::new(self.type_name.as_str(), number, line);
        match &self.method_name {
            Some(name) => context.in_method(name.clone()),
            None => context,
        }
    }

    fn lang_context(&self) -> Context {
        match self.method {
            Some(method) => Context::Method { ty: self.ty, method },
            None => Context::Type(self.ty),
        }
    }

    fn syntax(&self, message: String, number: usize, line: &str) -> ParseError {
        ParseError::new(ErrorKind::Syntax { message }, self.context(number, line))
    }

    fn type_error(&self, message: String, number: usize, line: &str) -> ParseError {
        ParseError::new(ErrorKind::Type { message }, self.context(number, line))
    }

    fn find_scope_variable(&self, name: &str) -> Option<Variable> {
        self.scopes
            .iter()
            .rev()
            .find_map(|frame| frame.iter().find(|variable| variable.name == name))
            .cloned()
    }

    // ── Bodies ──────────────────────────────────────────────────────────

    fn parse_body(&mut self, raw: RawBody, initial: Vec<Variable>) -> Result<Body, ParseError> {
        self.scopes.push(initial);
        let result = self.parse_items(raw.items);
        let variables = self.scopes.pop().unwrap_or_default();
        let expressions = result?;
        let none = self.program.known().none;
        let mut body = Body {
            tabs: raw.tabs,
            line_range: raw.start_line..raw.end_line,
            expressions,
            variables,
            return_type: none,
        };
        body.return_type = body
            .returned_type()
            .or_else(|| body.expressions.last().map(|expression| expression.return_type))
            .unwrap_or(none);
        Ok(body)
    }

    fn parse_items(&mut self, items: Vec<RawItem>) -> Result<Vec<Expression>, ParseError> {
        let mut items = items.into_iter().peekable();
        let mut expressions = Vec::new();
        while let Some(item) = items.next() {
            match item {
                RawItem::Line { number, text } => {
                    if text == "else" || text.starts_with("else ") {
                        return Err(self.syntax("`else` without a preceding `if`".into(), number, &text));
                    }
                    if let Some(condition) = text.strip_prefix("if ") {
                        let expression =
                            self.parse_if(condition, number, &text, &mut items)?;
                        expressions.push(expression);
                    } else if let Some(rest) = text.strip_prefix("for ") {
                        let expression = self.parse_for(rest, number, &text, &mut items)?;
                        expressions.push(expression);
                    } else {
                        expressions.push(self.parse_line(&text, number)?);
                    }
                }
                RawItem::Body(child) => {
                    return Err(self.syntax(
                        "indented body without an `if`, `else`, or `for`".into(),
                        child.start_line,
                        "",
                    ));
                }
            }
        }
        Ok(expressions)
    }

    fn child_body(
        &mut self,
        items: &mut Peekable<IntoIter<RawItem>>,
        initial: Vec<Variable>,
        keyword: &str,
        number: usize,
        line: &str,
    ) -> Result<Body, ParseError> {
        match items.peek() {
            Some(RawItem::Body(_)) => match items.next() {
                Some(RawItem::Body(child)) => self.parse_body(child, initial),
                _ => unreachable!("peeked a body"),
            },
            _ => Err(self.syntax(
                format!("`{keyword}` needs an indented body"),
                number,
                line,
            )),
        }
    }

    /// A `return` inside a child body must produce the method's type.
    fn check_child_return(&self, body: &Body, number: usize, line: &str) -> Result<(), ParseError> {
        let Some(method) = self.method else { return Ok(()) };
        let Some(returned) = body.returned_type() else { return Ok(()) };
        let expected = self.program.ty(self.ty).methods[method].return_type;
        let none = self.program.known().none;
        if expected != none && !self.program.is_compatible(returned, expected) {
            return Err(self.type_error(
                format!(
                    "`return` type `{}` is not assignable to method return type `{}`",
                    self.program.ty(returned).name,
                    self.program.ty(expected).name
                ),
                number,
                line,
            ));
        }
        Ok(())
    }

    fn parse_if(
        &mut self,
        condition_text: &str,
        number: usize,
        line: &str,
        items: &mut Peekable<IntoIter<RawItem>>,
    ) -> Result<Expression, ParseError> {
        let condition = self.parse_value(condition_text, number, line)?;
        let boolean = self.program.known().boolean;
        if condition.return_type != boolean {
            return Err(self.type_error(
                format!(
                    "`if` condition must be a Boolean, found `{}`",
                    self.program.ty(condition.return_type).name
                ),
                number,
                line,
            ));
        }
        let then = self.child_body(items, Vec::new(), "if", number, line)?;
        self.check_child_return(&then, number, line)?;
        let otherwise = match items.peek() {
            Some(RawItem::Line { text, .. }) if text == "else" => {
                let Some(RawItem::Line { number: else_number, text: else_text }) = items.next()
                else {
                    unreachable!("peeked a line");
                };
                let body =
                    self.child_body(items, Vec::new(), "else", else_number, &else_text)?;
                self.check_child_return(&body, else_number, &else_text)?;
                Some(body)
            }
            _ => None,
        };
        let return_type = then.return_type;
        Ok(Expression::new(
            ExpressionKind::If { condition: Box::new(condition), then, otherwise },
            return_type,
        ))
    }

    fn parse_for(
        &mut self,
        rest: &str,
        number: usize,
        line: &str,
        items: &mut Peekable<IntoIter<RawItem>>,
    ) -> Result<Expression, ParseError> {
        let (variable, iterable_text) = match rest.split_once(" in ") {
            Some((name, iterable)) => (Some(name.trim().to_string()), iterable),
            None => (None, rest),
        };
        let iterable = self.parse_value(iterable_text, number, line)?;
        let Some(element) = self.program.element_type(iterable.return_type) else {
            return Err(self.type_error(
                format!(
                    "`{}` of type `{}` is not iterable",
                    iterable,
                    self.program.ty(iterable.return_type).name
                ),
                number,
                line,
            ));
        };
        let number_type = self.program.known().number;
        let mut initial = Vec::new();
        match &variable {
            // The implicit form introduces `index` and `value`; `index`
            // may not be shadowed, so nesting needs explicit variables.
            None => {
                if self.find_scope_variable("index").is_some() {
                    return Err(self.syntax(
                        "`index` cannot be shadowed by a nested `for`".into(),
                        number,
                        line,
                    ));
                }
                initial.push(Variable { name: "index".into(), ty: number_type, is_mutable: false });
                initial.push(Variable { name: "value".into(), ty: element, is_mutable: false });
            }
            Some(name) => match self.find_scope_variable(name) {
                // `for x in …` over an existing binding requires a mutable,
                // element-compatible variable.
                Some(existing) => {
                    if !existing.is_mutable {
                        return Err(ParseError::new(
                            ErrorKind::ImmutableViolation { target: name.clone() },
                            self.context(number, line),
                        ));
                    }
                    if !self.program.is_compatible(element, existing.ty) {
                        return Err(self.type_error(
                            format!(
                                "loop variable `{}` of type `{}` cannot hold `{}` elements",
                                name,
                                self.program.ty(existing.ty).name,
                                self.program.ty(element).name
                            ),
                            number,
                            line,
                        ));
                    }
                }
                None => {
                    initial.push(Variable { name: name.clone(), ty: element, is_mutable: true })
                }
            },
        }
        let body = self.child_body(items, initial, "for", number, line)?;
        self.check_child_return(&body, number, line)?;
        let return_type = body.return_type;
        Ok(Expression::new(
            ExpressionKind::For { value: Box::new(iterable), variable, body },
            return_type,
        ))
    }

    // ── Lines ───────────────────────────────────────────────────────────

    fn parse_line(&mut self, text: &str, number: usize) -> Result<Expression, ParseError> {
        if let Some(rest) = text.strip_prefix("let ") {
            return self.parse_declaration(rest, false, false, number, text);
        }
        if let Some(rest) = text.strip_prefix("constant ") {
            return self.parse_declaration(rest, true, false, number, text);
        }
        if let Some(rest) = text.strip_prefix("mutable ") {
            return self.parse_declaration(rest, false, true, number, text);
        }
        if text == "return" {
            return Err(self.syntax("`return` needs a value".into(), number, text));
        }
        if let Some(rest) = text.strip_prefix("return ") {
            let value = self.parse_value(rest, number, text)?;
            let return_type = value.return_type;
            return Ok(Expression::new(ExpressionKind::Return(Box::new(value)), return_type));
        }
        if let Some(position) = top_level_assignment(text) {
            let target = text[..position].trim_end();
            let value = text[position + 1..].trim_start();
            if !target.is_empty()
                && target.chars().all(|c| c.is_alphanumeric() || c == '.')
            {
                return self.parse_reassignment(target, value, number, text);
            }
        }
        self.parse_value(text, number, text)
    }

    fn parse_declaration(
        &mut self,
        rest: &str,
        is_constant: bool,
        is_mutable: bool,
        number: usize,
        line: &str,
    ) -> Result<Expression, ParseError> {
        let keyword = if is_mutable {
            "mutable"
        } else if is_constant {
            "constant"
        } else {
            "let"
        };
        let Some((name, value_text)) = rest.split_once(" = ") else {
            return Err(self.syntax(format!("`{keyword}` needs `name = value`"), number, line));
        };
        if name.is_empty()
            || !name.chars().all(|c| c.is_alphanumeric())
            || !name.chars().next().is_some_and(|c| c.is_lowercase())
        {
            return Err(self.syntax(
                format!("variable name `{name}` must start lowercase"),
                number,
                line,
            ));
        }
        if self
            .scopes
            .last()
            .is_some_and(|frame| frame.iter().any(|variable| variable.name == name))
        {
            return Err(self.syntax(
                format!("variable `{name}` is already defined in this body"),
                number,
                line,
            ));
        }
        let value = self.parse_value(value_text, number, line)?;
        // Binding a Mutable(T) value yields a mutable variable holding a T.
        let (variable_type, wrapped) = match self.program.data_type(value.return_type) {
            Some(data) => (data, true),
            None => (value.return_type, false),
        };
        let variable = Variable {
            name: name.to_string(),
            ty: variable_type,
            is_mutable: is_mutable || wrapped,
        };
        if let Some(frame) = self.scopes.last_mut() {
            frame.push(variable);
        }
        let kind = if is_mutable {
            ExpressionKind::MutableDeclaration { name: name.to_string(), value: Box::new(value) }
        } else {
            ExpressionKind::Assignment {
                name: name.to_string(),
                value: Box::new(value),
                is_constant,
            }
        };
        Ok(Expression::new(kind, variable_type))
    }

    fn parse_reassignment(
        &mut self,
        target_text: &str,
        value_text: &str,
        number: usize,
        line: &str,
    ) -> Result<Expression, ParseError> {
        let value = self.parse_value(value_text, number, line)?;
        let target = self.parse_value(target_text, number, line)?;
        match &target.kind {
            ExpressionKind::VariableCall { name } => {
                let Some(variable) = self.find_scope_variable(name) else {
                    return Err(ParseError::new(
                        ErrorKind::NameResolution {
                            name: name.clone(),
                            searched: "variable".into(),
                        },
                        self.context(number, line),
                    ));
                };
                if !variable.is_mutable {
                    return Err(ParseError::new(
                        ErrorKind::ImmutableViolation { target: name.clone() },
                        self.context(number, line),
                    ));
                }
                self.check_assignable(value.return_type, variable.ty, number, line)?;
            }
            ExpressionKind::MemberCall { instance, member } => {
                let owner = match instance {
                    Some(instance) => instance.return_type,
                    None => self.ty,
                };
                let Some(index) = self.program.ty(owner).find_member(member) else {
                    return Err(ParseError::new(
                        ErrorKind::NameResolution {
                            name: member.clone(),
                            searched: "member".into(),
                        },
                        self.context(number, line),
                    ));
                };
                if !self.program.ty(owner).members[index].is_mutable {
                    return Err(ParseError::new(
                        ErrorKind::ImmutableViolation { target: member.clone() },
                        self.context(number, line),
                    ));
                }
                self.check_assignable(value.return_type, target.return_type, number, line)?;
            }
            _ => {
                return Err(self.syntax(
                    format!("cannot assign to `{target_text}`"),
                    number,
                    line,
                ));
            }
        }
        let return_type = value.return_type;
        Ok(Expression::new(
            ExpressionKind::Reassignment { target: Box::new(target), value: Box::new(value) },
            return_type,
        ))
    }

    fn check_assignable(
        &self,
        from: TypeId,
        to: TypeId,
        number: usize,
        line: &str,
    ) -> Result<(), ParseError> {
        if self.program.is_compatible(from, to) {
            return Ok(());
        }
        Err(self.type_error(
            format!(
                "cannot assign `{}` where `{}` is expected",
                self.program.ty(from).name,
                self.program.ty(to).name
            ),
            number,
            line,
        ))
    }

    // ── Value expressions ───────────────────────────────────────────────

    fn parse_value(
        &mut self,
        text: &str,
        number: usize,
        line: &str,
    ) -> Result<Expression, ParseError> {
        let context = self.context(number, line);
        let tokens = tokenize(text, &context)?;
        self.parse_tokens(&tokens, number, line)
    }

    fn parse_tokens(
        &mut self,
        tokens: &[Token],
        number: usize,
        line: &str,
    ) -> Result<Expression, ParseError> {
        if let Some(question) = top_level_position(tokens, |token| matches!(token, Token::Question))
        {
            return self.parse_conditional(tokens, question, number, line);
        }
        self.parse_token_run(tokens, number, line)
    }

    /// `condition ? then else otherwise`, both branches of one type, never
    /// nested.
    fn parse_conditional(
        &mut self,
        tokens: &[Token],
        question: usize,
        number: usize,
        line: &str,
    ) -> Result<Expression, ParseError> {
        let rest = &tokens[question + 1..];
        let Some(else_position) = top_level_position(rest, |token| {
            matches!(token, Token::Identifier(name) if name == "else")
        }) else {
            return Err(self.syntax("conditional expression needs `else`".into(), number, line));
        };
        let then_tokens = &rest[..else_position];
        let otherwise_tokens = &rest[else_position + 1..];
        if then_tokens.iter().any(|token| matches!(token, Token::Question))
            || otherwise_tokens.iter().any(|token| matches!(token, Token::Question))
        {
            return Err(self.syntax("conditional expressions cannot be nested".into(), number, line));
        }
        let condition = self.parse_token_run(&tokens[..question], number, line)?;
        let boolean = self.program.known().boolean;
        if condition.return_type != boolean {
            return Err(self.type_error(
                format!(
                    "conditional needs a Boolean condition, found `{}`",
                    self.program.ty(condition.return_type).name
                ),
                number,
                line,
            ));
        }
        let then = self.parse_token_run(then_tokens, number, line)?;
        let otherwise = self.parse_token_run(otherwise_tokens, number, line)?;
        if then.return_type != otherwise.return_type {
            return Err(self.type_error(
                format!(
                    "conditional branches must have the same type, found `{}` and `{}`",
                    self.program.ty(then.return_type).name,
                    self.program.ty(otherwise.return_type).name
                ),
                number,
                line,
            ));
        }
        let return_type = then.return_type;
        Ok(Expression::new(
            ExpressionKind::Conditional {
                condition: Box::new(condition),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
            return_type,
        ))
    }

    /// Operands and operators → postfix → typed tree.
    fn parse_token_run(
        &mut self,
        tokens: &[Token],
        number: usize,
        line: &str,
    ) -> Result<Expression, ParseError> {
        let mut items = Vec::new();
        let mut position = 0;
        loop {
            let operand = self.parse_operand(tokens, &mut position, number, line)?;
            items.push(InfixItem::Operand(operand));
            if position >= tokens.len() {
                break;
            }
            match &tokens[position] {
                Token::Operator(operator) => {
                    items.push(InfixItem::Operator(operator.clone()));
                    position += 1;
                    if position >= tokens.len() {
                        return Err(self.syntax(
                            "expression ends with an operator".into(),
                            number,
                            line,
                        ));
                    }
                }
                other => {
                    return Err(self.syntax(
                        format!("expected an operator, found `{other}`"),
                        number,
                        line,
                    ));
                }
            }
        }
        let mut stack: Vec<Expression> = Vec::new();
        for item in to_postfix(items) {
            match item {
                InfixItem::Operand(expression) => stack.push(expression),
                InfixItem::Operator(operator) => {
                    let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                        return Err(self.syntax("malformed expression".into(), number, line));
                    };
                    stack.push(self.resolve_binary(left, operator, right, number, line)?);
                }
            }
        }
        match (stack.pop(), stack.is_empty()) {
            (Some(expression), true) => Ok(expression),
            _ => Err(self.syntax("malformed expression".into(), number, line)),
        }
    }

    fn resolve_binary(
        &mut self,
        left: Expression,
        operator: String,
        right: Expression,
        number: usize,
        line: &str,
    ) -> Result<Expression, ParseError> {
        let context = self.context(number, line);
        let owner = left.return_type;
        let slot = if self.program.available_methods(owner).contains_key(&operator) {
            self.program.find_method(owner, &operator, &[right.return_type], &context)?
        } else {
            // Operators not on the left operand's type live on
            // BinaryOperator.
            let fallback = self.program.known().binary_operator;
            match self.program.find_method(fallback, &operator, &[right.return_type], &context) {
                Ok(slot) => slot,
                Err(error) if matches!(error.kind, ErrorKind::Type { .. }) => return Err(error),
                Err(_) => {
                    return Err(ParseError::new(
                        ErrorKind::NameResolution {
                            name: operator.clone(),
                            searched: "operator".into(),
                        },
                        context,
                    ));
                }
            }
        };
        let return_type = self.program.method(slot).return_type;
        Ok(Expression::new(
            ExpressionKind::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            },
            return_type,
        ))
    }

    fn parse_operand(
        &mut self,
        tokens: &[Token],
        position: &mut usize,
        number: usize,
        line: &str,
    ) -> Result<Expression, ParseError> {
        let Some(token) = tokens.get(*position) else {
            return Err(self.syntax("expected an expression".into(), number, line));
        };
        let base = match token {
            Token::Not => {
                *position += 1;
                let operand = self.parse_operand(tokens, position, number, line)?;
                let context = self.context(number, line);
                let slot =
                    self.program.find_method(operand.return_type, "not", &[], &context)?;
                let return_type = self.program.method(slot).return_type;
                return Ok(Expression::new(
                    ExpressionKind::Not(Box::new(operand)),
                    return_type,
                ));
            }
            Token::Number(value) => {
                *position += 1;
                Expression::new(ExpressionKind::Number(*value), self.program.known().number)
            }
            Token::Text(text) => {
                *position += 1;
                Expression::new(ExpressionKind::Text(text.clone()), self.program.known().text)
            }
            Token::Identifier(name) if name == "true" || name == "false" => {
                let value = name == "true";
                *position += 1;
                Expression::new(ExpressionKind::Boolean(value), self.program.known().boolean)
            }
            Token::Identifier(name) => {
                let name = name.clone();
                *position += 1;
                if matches!(tokens.get(*position), Some(Token::OpenParen)) {
                    let arguments = self.parse_arguments(tokens, position, number, line)?;
                    self.resolve_call(&name, arguments, number, line)?
                } else {
                    self.resolve_identifier(&name, number, line)?
                }
            }
            Token::OpenParen => self.parse_group(tokens, position, number, line)?,
            other => {
                return Err(self.syntax(format!("unexpected `{other}`"), number, line));
            }
        };
        self.parse_navigation(base, tokens, position, number, line)
    }

    /// `(expr)` grouping or a `(a, b, c)` list literal.
    fn parse_group(
        &mut self,
        tokens: &[Token],
        position: &mut usize,
        number: usize,
        line: &str,
    ) -> Result<Expression, ParseError> {
        let close = matching_paren(tokens, *position)
            .ok_or_else(|| self.syntax("unclosed parentheses".into(), number, line))?;
        let inner = &tokens[*position + 1..close];
        *position = close + 1;
        if inner.is_empty() {
            return Err(self.type_error("empty lists are not allowed".into(), number, line));
        }
        let slices = split_commas(inner);
        if slices.len() == 1 {
            return self.parse_token_run(slices[0], number, line);
        }
        let mut elements = Vec::new();
        for slice in slices {
            elements.push(self.parse_token_run(slice, number, line)?);
        }
        let mut element = elements[0].return_type;
        for candidate in &elements[1..] {
            if self.program.is_compatible(candidate.return_type, element) {
                continue;
            }
            if self.program.is_compatible(element, candidate.return_type) {
                element = candidate.return_type;
                continue;
            }
            return Err(self.type_error(
                format!(
                    "list elements must share a compatible type, found `{}` and `{}`",
                    self.program.ty(element).name,
                    self.program.ty(candidate.return_type).name
                ),
                number,
                line,
            ));
        }
        let list = self.program.known().list;
        let instance = self
            .program
            .instantiate(list, vec![element])
            .map_err(|kind| ParseError::new(kind, self.context(number, line)))?;
        Ok(Expression::new(ExpressionKind::List(elements), instance))
    }

    /// Dotted navigation: members and methods on the instance's type.
    fn parse_navigation(
        &mut self,
        base: Expression,
        tokens: &[Token],
        position: &mut usize,
        number: usize,
        line: &str,
    ) -> Result<Expression, ParseError> {
        let mut expression = base;
        while matches!(tokens.get(*position), Some(Token::Dot)) {
            *position += 1;
            let Some(Token::Identifier(segment)) = tokens.get(*position) else {
                return Err(self.syntax("expected a name after `.`".into(), number, line));
            };
            let segment = segment.clone();
            *position += 1;
            let owner = expression.return_type;
            if matches!(tokens.get(*position), Some(Token::OpenParen)) {
                let arguments = self.parse_arguments(tokens, position, number, line)?;
                let argument_types: Vec<TypeId> =
                    arguments.iter().map(|argument| argument.return_type).collect();
                let context = self.context(number, line);
                let slot = self.program.find_method(owner, &segment, &argument_types, &context)?;
                let return_type = self.program.method(slot).return_type;
                expression = Expression::new(
                    ExpressionKind::MethodCall {
                        instance: Some(Box::new(expression)),
                        name: segment,
                        slot,
                        arguments,
                    },
                    return_type,
                );
            } else if let Some(index) = self.program.ty(owner).find_member(&segment) {
                let member_ty = self.member_type(owner, index)?;
                expression = Expression::new(
                    ExpressionKind::MemberCall {
                        instance: Some(Box::new(expression)),
                        member: segment,
                    },
                    member_ty,
                );
            } else {
                // No member: a zero-argument method call like `list.length`.
                let context = self.context(number, line);
                let slot = self.program.find_method(owner, &segment, &[], &context)?;
                let return_type = self.program.method(slot).return_type;
                expression = Expression::new(
                    ExpressionKind::MethodCall {
                        instance: Some(Box::new(expression)),
                        name: segment,
                        slot,
                        arguments: Vec::new(),
                    },
                    return_type,
                );
            }
        }
        Ok(expression)
    }

    fn parse_arguments(
        &mut self,
        tokens: &[Token],
        position: &mut usize,
        number: usize,
        line: &str,
    ) -> Result<Vec<Expression>, ParseError> {
        let close = matching_paren(tokens, *position)
            .ok_or_else(|| self.syntax("unclosed parentheses".into(), number, line))?;
        let inner = &tokens[*position + 1..close];
        *position = close + 1;
        if inner.is_empty() {
            return Err(self.syntax("empty parentheses are not allowed".into(), number, line));
        }
        let mut arguments = Vec::new();
        for slice in split_commas(inner) {
            arguments.push(self.parse_token_run(slice, number, line)?);
        }
        Ok(arguments)
    }

    /// `TypeName(args…)`: generic instantiation, `from`, or member-sequence
    /// auto-initialization; otherwise a method call on the current type.
    fn resolve_call(
        &mut self,
        name: &str,
        arguments: Vec<Expression>,
        number: usize,
        line: &str,
    ) -> Result<Expression, ParseError> {
        let context = self.context(number, line);
        let argument_types: Vec<TypeId> =
            arguments.iter().map(|argument| argument.return_type).collect();
        let lang_context = self.lang_context();
        if let Some(target) = self.program.find_type(lang_context, name) {
            if self.program.ty(target).is_generic_template() {
                let instance = self
                    .program
                    .instantiate(target, argument_types.clone())
                    .map_err(|kind| ParseError::new(kind, context.clone()))?;
                if target == self.program.known().mutable {
                    let Some(value) = arguments.into_iter().next() else {
                        return Err(ParseError::new(
                            ErrorKind::Generic {
                                message: "`Mutable` wraps exactly one value".into(),
                            },
                            context,
                        ));
                    };
                    return Ok(Expression::new(
                        ExpressionKind::Mutable(Box::new(value)),
                        instance,
                    ));
                }
                return Ok(Expression::new(
                    ExpressionKind::From {
                        type_name: name.to_string(),
                        constructed: instance,
                        arguments,
                    },
                    instance,
                ));
            }
            return match self.program.find_method(target, "from", &argument_types, &context) {
                Ok(slot) => {
                    let return_type = self.program.method(slot).return_type;
                    Ok(Expression::new(
                        ExpressionKind::From {
                            type_name: name.to_string(),
                            constructed: target,
                            arguments,
                        },
                        return_type,
                    ))
                }
                Err(error) if matches!(error.kind, ErrorKind::NameResolution { .. }) => {
                    // No `from`: auto-initialization against the member
                    // sequence.
                    if self.program.ty(target).members.len() == argument_types.len() {
                        let mut compatible = true;
                        for (index, &argument) in argument_types.iter().enumerate() {
                            let member_ty = self.member_type(target, index)?;
                            if !self.program.is_compatible(argument, member_ty) {
                                compatible = false;
                                break;
                            }
                        }
                        if compatible {
                            return Ok(Expression::new(
                                ExpressionKind::From {
                                    type_name: name.to_string(),
                                    constructed: target,
                                    arguments,
                                },
                                target,
                            ));
                        }
                    }
                    Err(ParseError::new(
                        ErrorKind::Type {
                            message: format!("arguments do not match members of `{name}`"),
                        },
                        context,
                    ))
                }
                Err(error) => Err(error),
            };
        }
        let slot = self.program.find_method(self.ty, name, &argument_types, &context)?;
        let return_type = self.program.method(slot).return_type;
        Ok(Expression::new(
            ExpressionKind::MethodCall { instance: None, name: name.to_string(), slot, arguments },
            return_type,
        ))
    }

    /// Resolution order: body variable → parameter → member → type →
    /// zero-argument method.
    fn resolve_identifier(
        &mut self,
        name: &str,
        number: usize,
        line: &str,
    ) -> Result<Expression, ParseError> {
        if let Some(variable) = self.find_scope_variable(name) {
            return Ok(Expression::new(
                ExpressionKind::VariableCall { name: name.to_string() },
                variable.ty,
            ));
        }
        if let Some(method) = self.method {
            let parameter_type = self.program.ty(self.ty).methods[method]
                .parameters
                .iter()
                .find(|parameter| parameter.name == name)
                .map(|parameter| parameter.ty);
            if let Some(ty) = parameter_type {
                return Ok(Expression::new(
                    ExpressionKind::VariableCall { name: name.to_string() },
                    ty,
                ));
            }
        }
        if let Some(index) = self.program.ty(self.ty).find_member(name) {
            let member_ty = self.member_type(self.ty, index)?;
            return Ok(Expression::new(
                ExpressionKind::MemberCall { instance: None, member: name.to_string() },
                member_ty,
            ));
        }
        let lang_context = self.lang_context();
        if let Some(target) = self.program.find_type(lang_context, name) {
            // A bare type name, used as navigation base (`Log.write(…)`).
            return Ok(Expression::new(
                ExpressionKind::VariableCall { name: name.to_string() },
                target,
            ));
        }
        let context = self.context(number, line);
        if self.program.available_methods(self.ty).contains_key(name) {
            let slot = self.program.find_method(self.ty, name, &[], &context)?;
            let return_type = self.program.method(slot).return_type;
            return Ok(Expression::new(
                ExpressionKind::MethodCall {
                    instance: None,
                    name: name.to_string(),
                    slot,
                    arguments: Vec::new(),
                },
                return_type,
            ));
        }
        Err(ParseError::new(
            ErrorKind::NameResolution { name: name.to_string(), searched: "identifier".into() },
            context,
        ))
    }

    // ── Members ─────────────────────────────────────────────────────────

    /// The type of a member, parsing its initializer on first access.
    fn member_type(&mut self, owner: TypeId, index: usize) -> Result<TypeId, ParseError> {
        if let Some(ty) = self.program.ty(owner).members[index].ty {
            return Ok(ty);
        }
        let member = &self.program.ty(owner).members[index];
        let member_name = member.name.clone();
        let member_line = member.line;
        let Some(text) = member.initializer.clone() else {
            return Err(ParseError::new(
                ErrorKind::Generic {
                    message: format!("member `{member_name}` has no type and no initializer"),
                },
                SourceContext::new(self.program.ty(owner).name.as_str(), member_line, ""),
            ));
        };
        if self.member_trail.contains(&(owner, index)) {
            return Err(ParseError::new(
                ErrorKind::Generic {
                    message: format!("initializer of member `{member_name}` depends on itself"),
                },
                SourceContext::new(self.program.ty(owner).name.as_str(), member_line, ""),
            ));
        }
        self.member_trail.push((owner, index));

        // Initializers are typed in the owning type's context, outside any
        // method scope.
        let saved_ty = self.ty;
        let saved_method = self.method;
        let saved_type_name = std::mem::take(&mut self.type_name);
        let saved_method_name = self.method_name.take();
        let saved_scopes = std::mem::take(&mut self.scopes);
        self.ty = owner;
        self.method = None;
        self.type_name = self.program.ty(owner).name.clone();

        let result = self.parse_value(&text, member_line, &text);

        self.ty = saved_ty;
        self.method = saved_method;
        self.type_name = saved_type_name;
        self.method_name = saved_method_name;
        self.scopes = saved_scopes;
        self.member_trail.pop();

        let value = result?;
        let (resolved, wrapped) = match self.program.data_type(value.return_type) {
            Some(data) => (data, true),
            None => (value.return_type, false),
        };
        self.program.resolve_member(owner, index, resolved, wrapped);
        Ok(resolved)
    }
}

// ── Token helpers ───────────────────────────────────────────────────────

/// Position of the `=` of a reassignment: depth zero, outside text, not
/// part of `<=`/`>=`.
fn top_level_assignment(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_text = false;
    let mut previous = ' ';
    for (index, c) in text.char_indices() {
        match c {
            '"' => in_text = !in_text,
            '(' if !in_text => depth += 1,
            ')' if !in_text => depth = depth.saturating_sub(1),
            '=' if !in_text && depth == 0 && previous != '<' && previous != '>' => {
                return Some(index);
            }
            _ => {}
        }
        previous = c;
    }
    None
}

/// First token matching the predicate at parenthesis depth zero.
fn top_level_position(tokens: &[Token], predicate: impl Fn(&Token) -> bool) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::OpenParen => depth += 1,
            Token::CloseParen => depth = depth.saturating_sub(1),
            token if depth == 0 && predicate(token) => return Some(index),
            _ => {}
        }
    }
    None
}

/// Index of the `)` matching the `(` at `open`.
fn matching_paren(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        match token {
            Token::OpenParen => depth += 1,
            Token::CloseParen => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split a token slice at top-level commas.
fn split_commas(tokens: &[Token]) -> Vec<&[Token]> {
    let mut slices = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::OpenParen => depth += 1,
            Token::CloseParen => depth = depth.saturating_sub(1),
            Token::Comma if depth == 0 => {
                slices.push(&tokens[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    slices.push(&tokens[start..]);
    slices
}
