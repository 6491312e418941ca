// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::*;
use crate::builtins;
use crate::lexer::*;
use crate::number::*;
use crate::utils::{get_path_string, is_keyword};

use core::str::FromStr;

use anyhow::{bail, Result};

#[derive(Clone)]
pub struct Parser<'source> {
    source: Source,
    lexer: Lexer<'source>,
    tok: Token,
    line: u32,
    end: u32,
}

impl<'source> Parser<'source> {
    pub fn new(source: &'source Source) -> Result<Self> {
        let mut lexer = Lexer::new(source);
        let tok = lexer.next_token()?;
        Ok(Self {
            source: source.clone(),
            lexer,
            tok,
            line: 0,
            end: 0,
        })
    }

    pub fn token_text(&self) -> &str {
        match self.tok.0 {
            TokenKind::Symbol | TokenKind::Number | TokenKind::Ident | TokenKind::Eof => {
                self.tok.1.text()
            }
            TokenKind::String | TokenKind::RawString => "",
        }
    }

    pub fn next_token(&mut self) -> Result<()> {
        self.line = self.tok.1.line;
        self.end = self.tok.1.end;
        self.tok = self.lexer.next_token()?;
        Ok(())
    }

    fn peek_token(&self) -> Result<Token> {
        self.lexer.clone().next_token()
    }

    fn expect(&mut self, text: &str, context: &str) -> Result<()> {
        if self.token_text() == text {
            self.next_token()
        } else {
            let msg = format!("expecting `{text}` {context}");
            Err(self.source.error(self.tok.1.line, self.tok.1.col, &msg))
        }
    }

    fn expect_eof(&self, context: &str) -> Result<()> {
        match self.tok.0 {
            TokenKind::Eof => Ok(()),
            _ => Err(self.tok.1.error(&format!("unexpected token {context}"))),
        }
    }

    // Span running from `start` to the end of the last consumed token.
    fn span_from(&self, start: &Span) -> Span {
        let mut span = start.clone();
        span.end = self.end;
        span
    }

    fn parse_ident(&mut self) -> Result<Span> {
        let span = self.tok.1.clone();
        match self.tok.0 {
            TokenKind::Ident if is_keyword(span.text()) => Err(self.source.error(
                self.tok.1.line,
                self.tok.1.col,
                &format!("unexpected keyword `{}`", span.text()),
            )),
            TokenKind::Ident => {
                self.next_token()?;
                Ok(span)
            }
            _ => Err(self
                .source
                .error(self.tok.1.line, self.tok.1.col, "expecting identifier")),
        }
    }

    fn read_number(span: Span) -> Result<Term> {
        match Number::from_str(span.text()) {
            Ok(v) => Ok(Term::with_location(Value::Number(v), span)),
            Err(_) => bail!(span.error("could not parse number")),
        }
    }

    fn read_string(span: &Span) -> Result<String> {
        match serde_json::from_str::<String>(format!("\"{}\"", span.text()).as_str()) {
            Ok(s) => Ok(s),
            Err(e) => bail!(span.error(format!("invalid string literal. {e}").as_str())),
        }
    }

    fn parse_scalar_or_var(&mut self) -> Result<Term> {
        let span = self.tok.1.clone();
        let value = match &self.tok.0 {
            TokenKind::Number => {
                self.next_token()?;
                return Self::read_number(span);
            }
            TokenKind::String => Value::String(Self::read_string(&span)?.as_str().into()),
            TokenKind::RawString => Value::String(span.text().into()),
            TokenKind::Ident => match self.token_text() {
                "null" => Value::Null,
                "true" => Value::Boolean(true),
                "false" => Value::Boolean(false),
                _ => {
                    let ident = self.parse_ident()?;
                    return Ok(Term::with_location(
                        Value::Var(Var::new(ident.text())),
                        ident,
                    ));
                }
            },
            _ => {
                return Err(self.source.error(
                    self.tok.1.line,
                    self.tok.1.col,
                    "expecting term",
                ))
            }
        };
        self.next_token()?;
        Ok(Term::with_location(value, span))
    }

    fn parse_array(&mut self) -> Result<Term> {
        let span = self.tok.1.clone();
        self.expect("[", "while parsing array")?;

        let mut items = vec![];
        if self.token_text() != "]" {
            items.push(self.parse_term()?);
            while self.token_text() == "," {
                self.next_token()?;
                match self.token_text() {
                    "]" => break,
                    _ => items.push(self.parse_term()?),
                }
            }
        }
        self.expect("]", "while parsing array")?;
        Ok(Term::with_location(Value::Array(items), self.span_from(&span)))
    }

    fn parse_object_item(&mut self, pairs: &mut Vec<(Term, Term)>) -> Result<()> {
        let key = self.parse_term()?;
        self.expect(":", "while parsing object")?;
        let value = self.parse_term()?;
        if pairs.iter().any(|(k, _)| *k == key) {
            let span = key.location.as_ref().unwrap_or(&self.tok.1);
            bail!(span.error(&format!("duplicate key `{key}` in object")));
        }
        pairs.push((key, value));
        Ok(())
    }

    fn parse_object(&mut self) -> Result<Term> {
        let span = self.tok.1.clone();
        self.expect("{", "while parsing object")?;

        let mut pairs = vec![];
        if self.token_text() != "}" {
            self.parse_object_item(&mut pairs)?;
            while self.token_text() == "," {
                self.next_token()?;
                match self.token_text() {
                    "}" => break,
                    _ => self.parse_object_item(&mut pairs)?,
                }
            }
        }
        self.expect("}", "while parsing object")?;
        Ok(Term::with_location(Value::Object(pairs), self.span_from(&span)))
    }

    // True if the current token continues the term just parsed.
    fn is_adjacent(&self, text: &str) -> bool {
        self.tok.0 == TokenKind::Symbol && self.token_text() == text && self.tok.1.start == self.end
    }

    fn parse_ref(&mut self) -> Result<Term> {
        let span = self.tok.1.clone();
        let base = self.parse_scalar_or_var()?;
        if base.as_var().is_none() {
            return Ok(base);
        }

        if self.is_adjacent("(") {
            bail!(span.error("function calls are only allowed at the start of an expression"));
        }

        let mut terms = vec![base];
        loop {
            if self.is_adjacent(".") {
                self.next_token()?;
                if self.tok.1.start != self.end {
                    bail!(self.tok.1.error("unexpected whitespace after `.`"));
                }
                let field = self.parse_ident()?;
                terms.push(Term::with_location(
                    Value::String(field.text().into()),
                    field,
                ));
            } else if self.is_adjacent("[") {
                self.next_token()?;
                terms.push(self.parse_term()?);
                self.expect("]", "while parsing ref")?;
            } else {
                break;
            }
        }

        match terms.len() {
            1 => Ok(terms.remove(0)),
            _ => Ok(Term::with_location(
                Value::Ref(Ref::new(terms)),
                self.span_from(&span),
            )),
        }
    }

    pub fn parse_term(&mut self) -> Result<Term> {
        match (&self.tok.0, self.token_text()) {
            (TokenKind::Symbol, "[") => self.parse_array(),
            (TokenKind::Symbol, "{") => self.parse_object(),
            _ => self.parse_ref(),
        }
    }

    fn parse_call(&mut self) -> Result<Expr> {
        let name = self.parse_ident()?;
        let builtin = match builtins::lookup(name.text()) {
            Some(b) if b.name == name.text() => b,
            _ => bail!(name.error(&format!("unknown function `{}`", name.text()))),
        };

        self.expect("(", "while parsing call")?;
        let mut terms = vec![Term::with_location(
            Value::Var(Var::new(builtin.name)),
            name.clone(),
        )];
        if self.token_text() != ")" {
            terms.push(self.parse_term()?);
            while self.token_text() == "," {
                self.next_token()?;
                terms.push(self.parse_term()?);
            }
        }
        self.expect(")", "while parsing call")?;

        if terms.len() - 1 != builtin.args {
            bail!(name.error(&format!(
                "`{}` expects {} arguments, found {}",
                builtin.name,
                builtin.args,
                terms.len() - 1
            )));
        }
        Ok(Expr::call(terms))
    }

    pub fn parse_expr(&mut self) -> Result<Expr> {
        let negated = self.tok.0 == TokenKind::Ident && self.token_text() == "not";
        if negated {
            self.next_token()?;
        }

        let is_call = self.tok.0 == TokenKind::Ident && !is_keyword(self.token_text()) && {
            let next = self.peek_token()?;
            next.0 == TokenKind::Symbol && next.1.text() == "(" && next.1.start == self.tok.1.end
        };

        let expr = if is_call {
            self.parse_call()?
        } else {
            let lhs = self.parse_term()?;
            let op = match self.tok.0 {
                TokenKind::Symbol => builtins::lookup_infix(self.token_text()),
                _ => None,
            };
            match op {
                Some(b) => {
                    let op_span = self.tok.1.clone();
                    self.next_token()?;
                    let rhs = self.parse_term()?;
                    let op = Term::with_location(Value::Var(Var::new(b.name)), op_span);
                    Expr::call(vec![op, lhs, rhs])
                }
                None => Expr::new(lhs),
            }
        };

        Ok(if negated { expr.negate() } else { expr })
    }

    pub fn parse_body(&mut self) -> Result<Body> {
        let mut exprs = vec![self.parse_expr()?];
        while self.token_text() == "," && self.tok.0 == TokenKind::Symbol {
            self.next_token()?;
            exprs.push(self.parse_expr()?);
        }
        Ok(Body::new(exprs))
    }

    pub fn parse_rule(&mut self) -> Result<Rule> {
        let name = self.parse_ident()?;

        let key = if self.token_text() == "[" && self.tok.0 == TokenKind::Symbol {
            self.next_token()?;
            let key = self.parse_term()?;
            self.expect("]", "while parsing rule key")?;
            Some(key)
        } else {
            None
        };

        let value = if self.token_text() == "=" && self.tok.0 == TokenKind::Symbol {
            self.next_token()?;
            Some(self.parse_term()?)
        } else {
            None
        };

        let body = if self.token_text() == ":-" && self.tok.0 == TokenKind::Symbol {
            self.next_token()?;
            self.parse_body()?
        } else {
            Body::new([Expr::new(Term::with_location(
                Value::Boolean(true),
                name.clone(),
            ))])
        };

        Ok(Rule {
            name: Var::new(name.text()),
            key,
            value,
            body,
        })
    }

    pub fn parse_package(&mut self) -> Result<Package> {
        self.expect("package", "Missing package declaration.")?;

        let first = self.parse_ident()?;
        let mut terms = vec![
            Term::var(ROOT_DOCUMENT),
            Term::with_location(Value::String(first.text().into()), first),
        ];
        loop {
            if self.is_adjacent(".") {
                self.next_token()?;
                let field = self.parse_ident()?;
                terms.push(Term::with_location(
                    Value::String(field.text().into()),
                    field,
                ));
            } else if self.is_adjacent("[") {
                self.next_token()?;
                match self.tok.0 {
                    TokenKind::String | TokenKind::RawString => terms.push(self.parse_term()?),
                    _ => bail!(self.tok.1.error("package path keys must be strings")),
                }
                self.expect("]", "while parsing package")?;
            } else {
                break;
            }
        }

        Ok(Package {
            path: Ref::new(terms),
        })
    }

    pub fn parse_import(&mut self) -> Result<Import> {
        let span = self.tok.1.clone();
        self.expect("import", "while parsing import")?;

        let path = self.parse_ref()?;
        if !matches!(path.value, Value::Var(_) | Value::Ref(_)) {
            bail!(span.error("import path must be a reference"));
        }

        let alias = if self.token_text() == "as" && self.tok.0 == TokenKind::Ident {
            self.next_token()?;
            Some(Var::new(self.parse_ident()?.text()))
        } else {
            None
        };

        Ok(Import { path, alias })
    }

    pub fn parse_module(&mut self) -> Result<Module> {
        let package = self.parse_package()?;

        let mut imports = vec![];
        while self.token_text() == "import" && self.tok.0 == TokenKind::Ident {
            imports.push(self.parse_import()?);
        }

        let mut rules = vec![];
        while self.tok.0 != TokenKind::Eof {
            rules.push(self.parse_rule()?);
        }

        let path = get_path_string(&package.path);
        tracing::debug!(
            file = %self.source.file(),
            package = path.as_deref().unwrap_or("<non-identifier path>"),
            imports = imports.len(),
            rules = rules.len(),
            "parsed module"
        );

        Ok(Module {
            package,
            imports,
            rules,
        })
    }
}

fn parse_with<T>(
    file: &str,
    text: &str,
    f: impl FnOnce(&mut Parser) -> Result<T>,
) -> Result<T> {
    let source = Source::from_contents(file.to_string(), text.to_string())?;
    let mut parser = Parser::new(&source)?;
    let node = f(&mut parser)?;
    parser.expect_eof("after end of input")?;
    Ok(node)
}

/// Parses a complete module.
pub fn parse_module(file: &str, text: &str) -> Result<Module> {
    parse_with(file, text, |p| p.parse_module())
        .inspect_err(|e| tracing::debug!(file, error = %e, "failed to parse module"))
}

/// Parses a comma separated list of expressions.
pub fn parse_body(text: &str) -> Result<Body> {
    parse_with("<body>", text, |p| p.parse_body())
        .inspect_err(|e| tracing::debug!(error = %e, "failed to parse body"))
}

pub fn parse_term(text: &str) -> Result<Term> {
    parse_with("<term>", text, |p| p.parse_term())
        .inspect_err(|e| tracing::debug!(error = %e, "failed to parse term"))
}
