//! Methods and parameters.
//!
//! A method stores its raw body lines at declaration time; the body is
//! parsed into a typed [`Body`](crate::body::Body) on first access by the
//! expression parser crate.

use crate::body::Body;
use crate::program::TypeId;

/// A method parameter.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeId,
    pub is_mutable: bool,
    /// Raw default value text, parsed together with the body.
    pub default_value: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            is_mutable: false,
            default_value: None,
        }
    }
}

/// A method of a type. `from` is the constructor.
#[derive(Debug)]
pub struct Method {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeId,
    /// 1-based line of the signature within the type file.
    pub line: usize,
    body_lines: Vec<String>,
    body_start_line: usize,
    body: Option<Body>,
}

impl Method {
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<Parameter>,
        return_type: TypeId,
        line: usize,
    ) -> Self {
        Self {
            name: name.into(),
            parameters,
            return_type,
            line,
            body_lines: Vec::new(),
            body_start_line: 0,
            body: None,
        }
    }

    pub(crate) fn with_body_lines(mut self, lines: Vec<String>, start_line: usize) -> Self {
        self.body_lines = lines;
        self.body_start_line = start_line;
        self
    }

    /// Public methods start with an uppercase letter.
    pub fn is_public(&self) -> bool {
        self.name.chars().next().is_some_and(|c| c.is_uppercase())
    }

    /// `from` constructs instances of the owning type.
    pub fn is_constructor(&self) -> bool {
        self.name == "from"
    }

    /// Raw body lines (leading tabs included), captured at declaration time.
    pub fn body_lines(&self) -> &[String] {
        &self.body_lines
    }

    /// 1-based line number of the first body line.
    pub fn body_start_line(&self) -> usize {
        self.body_start_line
    }

    /// The parsed body, if it has been parsed already.
    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Store the parsed body and return it. First writer wins; the caller
    /// checks `body()` before parsing.
    pub fn set_body(&mut self, body: Body) -> &Body {
        self.body.insert(body)
    }

    /// Clone this method for a generic instantiation, mapping parameter and
    /// return types through the substitution. The clone's body is unparsed.
    pub(crate) fn clone_with_substitution(
        &self,
        substitute: &impl Fn(TypeId) -> TypeId,
    ) -> Method {
        let parameters = self
            .parameters
            .iter()
            .map(|parameter| Parameter {
                name: parameter.name.clone(),
                ty: substitute(parameter.ty),
                is_mutable: parameter.is_mutable,
                default_value: parameter.default_value.clone(),
            })
            .collect();
        Method {
            name: self.name.clone(),
            parameters,
            return_type: substitute(self.return_type),
            line: self.line,
            body_lines: self.body_lines.clone(),
            body_start_line: self.body_start_line,
            body: None,
        }
    }
}
