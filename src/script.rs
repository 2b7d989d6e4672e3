// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Bundled reference evaluator
//!
//! The module core is engine-agnostic; any host can supply its own
//! [`Evaluate`]. This one compiles a deliberately tiny line-directive
//! dialect, enough to exercise every loader behavior from the CLI and the
//! test suite:
//!
//! ```text
//! # comment
//! export greeting "hello"        # exports.greeting = "hello"
//! require ./side-effects        # load for effect, discard exports
//! import answer ./math answer   # exports.answer = require("./math").answer
//! use math ./math               # exports.math = require("./math") (whole object)
//! replace "just a string"       # module.exports = "just a string"
//! print loading...              # write a line to the print sink
//! ```
//!
//! Parsing happens at compile time; the returned body only interprets the
//! parsed directives, so syntax errors surface before any side effect runs.

use crate::error::{Result, RuntimeError};
use crate::module_system::{Evaluate, ModuleBody, ModuleScope};
use crate::value::Value;

/// [`Evaluate`] implementation for the line-directive dialect
#[derive(Debug, Default)]
pub struct LineEvaluator;

impl Evaluate for LineEvaluator {
    fn evaluate(&self, source: &str, filename: &str, start_line: u32) -> Result<ModuleBody> {
        let mut directives = Vec::new();
        for (offset, line) in source.lines().enumerate() {
            let lineno = start_line + offset as u32;
            if let Some(directive) = Directive::parse(line, filename, lineno)? {
                directives.push(directive);
            }
        }
        Ok(Box::new(move |scope| {
            for directive in &directives {
                directive.run(scope)?;
            }
            Ok(())
        }))
    }
}

/// One parsed line
#[derive(Debug)]
enum Directive {
    Export { key: String, value: Literal },
    Require { id: String },
    Import { key: String, id: String, field: String },
    Use { key: String, id: String },
    Replace { value: Literal },
    Print { text: String },
}

impl Directive {
    /// Parse a single line; `None` for blanks and comments
    fn parse(line: &str, filename: &str, lineno: u32) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (word, rest) = split_word(line);
        let bad = |msg: &str| RuntimeError::evaluation(filename, lineno, msg);

        let directive = match word {
            "export" => {
                let (key, rest) = split_word(rest);
                if key.is_empty() || rest.is_empty() {
                    return Err(bad("export needs a key and a value"));
                }
                Self::Export {
                    key: key.to_string(),
                    value: Literal::parse(rest),
                }
            }
            "require" => {
                if rest.is_empty() {
                    return Err(bad("require needs a module id"));
                }
                Self::Require {
                    id: unquote(rest).to_string(),
                }
            }
            "import" => {
                let (key, rest) = split_word(rest);
                let (id, field) = split_word(rest);
                if key.is_empty() || id.is_empty() || field.is_empty() {
                    return Err(bad("import needs a key, a module id and a field"));
                }
                Self::Import {
                    key: key.to_string(),
                    id: unquote(id).to_string(),
                    field: field.to_string(),
                }
            }
            "use" => {
                let (key, id) = split_word(rest);
                if key.is_empty() || id.is_empty() {
                    return Err(bad("use needs a key and a module id"));
                }
                Self::Use {
                    key: key.to_string(),
                    id: unquote(id).to_string(),
                }
            }
            "replace" => {
                if rest.is_empty() {
                    return Err(bad("replace needs a value"));
                }
                Self::Replace {
                    value: Literal::parse(rest),
                }
            }
            "print" => Self::Print {
                text: rest.to_string(),
            },
            other => return Err(bad(&format!("unknown directive '{other}'"))),
        };
        Ok(Some(directive))
    }

    /// Interpret the directive against a module scope
    fn run(&self, scope: &ModuleScope) -> Result<()> {
        match self {
            Self::Export { key, value } => {
                scope.module.exports().set(key.clone(), value.to_value())
            }
            Self::Require { id } => {
                scope.require.call(id)?;
                Ok(())
            }
            Self::Import { key, id, field } => {
                let exports = scope.require.call(id)?;
                scope.module.exports().set(key.clone(), exports.get(field))
            }
            Self::Use { key, id } => {
                let exports = scope.require.call(id)?;
                scope.module.exports().set(key.clone(), exports)
            }
            Self::Replace { value } => {
                scope.module.set_exports(value.to_value());
                Ok(())
            }
            Self::Print { text } => {
                (scope.print)(text);
                Ok(())
            }
        }
    }
}

/// A literal on the right-hand side of `export` or `replace`
#[derive(Debug)]
enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
}

impl Literal {
    fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(inner) = quoted(text) {
            return Self::Str(inner.to_string());
        }
        match text {
            "null" => Self::Null,
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => match text.parse::<f64>() {
                Ok(n) => Self::Number(n),
                Err(_) => Self::Str(text.to_string()),
            },
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(*n),
            Self::Str(s) => Value::str(s.clone()),
        }
    }
}

/// Split off the first whitespace-delimited word
fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

/// The inner text of a double-quoted token, if it is one
fn quoted(text: &str) -> Option<&str> {
    text.strip_prefix('"')?.strip_suffix('"')
}

/// Strip optional quotes around a module id
fn unquote(text: &str) -> &str {
    quoted(text).unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literals() {
        assert!(matches!(Literal::parse("null"), Literal::Null));
        assert!(matches!(Literal::parse("true"), Literal::Bool(true)));
        assert!(matches!(Literal::parse("3.5"), Literal::Number(n) if n == 3.5));
        assert!(matches!(Literal::parse("\"3.5\""), Literal::Str(s) if s == "3.5"));
        assert!(matches!(Literal::parse("bare"), Literal::Str(s) if s == "bare"));
    }

    #[test]
    fn test_comments_and_blanks_skipped() {
        assert!(Directive::parse("", "m.js", 1).unwrap().is_none());
        assert!(Directive::parse("  # note", "m.js", 1).unwrap().is_none());
    }

    #[test]
    fn test_unknown_directive_positions_error() {
        let evaluator = LineEvaluator;
        let err = evaluator
            .evaluate("export a 1\nbogus\n", "m.js", 1)
            .err()
            .unwrap();
        match err {
            RuntimeError::Evaluation { filename, line, .. } => {
                assert_eq!(filename, "m.js");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_export_requires_value() {
        let evaluator = LineEvaluator;
        assert!(evaluator.evaluate("export a", "m.js", 1).is_err());
    }
}
