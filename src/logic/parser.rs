//! Text syntax for terms and clauses.
//!
//! A small operator-precedence parser over the subset of Prolog syntax the
//! tactic tooling needs: atoms (plain, symbolic, quoted), variables, integers,
//! compounds, lists with `|` tails, parentheses, `%` line comments, `/* */`
//! block comments, and the operators
//!
//! | priority | type | operators |
//! |----------|------|-----------|
//! | 1200 | xfx | `:-` |
//! | 1100 | xfy | `;` |
//! | 1000 | xfy | `,` |
//! | 900  | fy  | `\+` |
//! | 700  | xfx | `=` `\=` `==` `\==` |

use crate::errors::ParseError;
use crate::logic::clause::Clause;
use crate::logic::term::{is_symbol_char, Term, VarId};

const ARG_PRIORITY: u32 = 999;
const MAX_PRIORITY: u32 = 1200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assoc {
    Xfx,
    Xfy,
}

fn infix_operator(name: &str) -> Option<(u32, Assoc)> {
    match name {
        ":-" => Some((1200, Assoc::Xfx)),
        ";" => Some((1100, Assoc::Xfy)),
        "," => Some((1000, Assoc::Xfy)),
        "=" | "\\=" | "==" | "\\==" => Some((700, Assoc::Xfx)),
        _ => None,
    }
}

fn prefix_operator(name: &str) -> Option<u32> {
    match name {
        "\\+" => Some(900),
        _ => None,
    }
}

/// A term together with the source names of its variables.
///
/// `var_names[i]` is the name of `Term::Var(i)`; anonymous variables are
/// recorded as `_`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTerm {
    pub term: Term,
    pub var_names: Vec<String>,
}

pub fn parse_term(text: &str) -> Result<ParsedTerm, ParseError> {
    let mut parser = Parser::new(text)?;
    let term = parser.parse(MAX_PRIORITY)?;
    parser.skip_optional_end();
    parser.expect_eof()?;
    Ok(ParsedTerm {
        term,
        var_names: parser.var_names,
    })
}

pub fn parse_clause(text: &str) -> Result<Clause, ParseError> {
    let mut clauses = parse_program(text)?;
    match clauses.len() {
        1 => Ok(clauses.remove(0)),
        n => Err(ParseError::new(0, format!("expected exactly one clause, found {n}"))),
    }
}

/// Every clause in `text`, each with its own variable numbering.
pub fn parse_program(text: &str) -> Result<Vec<Clause>, ParseError> {
    let mut parser = Parser::new(text)?;
    let mut clauses = Vec::new();

    while !parser.at_eof() {
        parser.var_names.clear();
        let offset = parser.offset();
        let term = parser.parse(MAX_PRIORITY)?;
        parser.expect_end()?;
        let clause = Clause::from_term(term, parser.var_names.len())
            .map_err(|fault| ParseError::new(offset, fault.to_string()))?;
        clauses.push(clause);
    }

    Ok(clauses)
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Atom(String),
    Var(String),
    Int(i64),
    Punct(char),
    End,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    offset: usize,
    /// Whitespace (or a comment) came right before this token.
    spaced: bool,
}

fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let at = |i: usize| chars.get(i).map(|(_, c)| *c);
    let mut tokens = Vec::new();
    let mut i = 0usize;
    let mut spaced = true;

    while let Some(ch) = at(i) {
        let offset = chars[i].0;

        if ch.is_whitespace() {
            spaced = true;
            i += 1;
            continue;
        }
        if ch == '%' {
            while at(i).is_some_and(|c| c != '\n') {
                i += 1;
            }
            spaced = true;
            continue;
        }
        if ch == '/' && at(i + 1) == Some('*') {
            i += 2;
            while at(i).is_some() && !(at(i) == Some('*') && at(i + 1) == Some('/')) {
                i += 1;
            }
            if at(i).is_none() {
                return Err(ParseError::new(offset, "unterminated block comment"));
            }
            i += 2;
            spaced = true;
            continue;
        }

        let ends_clause = |j: usize| at(j + 1).map_or(true, |c| c.is_whitespace() || c == '%');

        let kind = if ch == '.' && ends_clause(i) {
            i += 1;
            TokenKind::End
        } else if ch.is_ascii_digit() {
            let start = i;
            while at(i).is_some_and(|c| c.is_ascii_digit()) {
                i += 1;
            }
            let digits: String = chars[start..i].iter().map(|(_, c)| c).collect();
            let value = digits
                .parse::<i64>()
                .map_err(|_| ParseError::new(offset, "integer out of range"))?;
            TokenKind::Int(value)
        } else if ch.is_alphabetic() || ch == '_' {
            let start = i;
            while at(i).is_some_and(|c| c.is_alphanumeric() || c == '_') {
                i += 1;
            }
            let name: String = chars[start..i].iter().map(|(_, c)| c).collect();
            if ch.is_uppercase() || ch == '_' {
                TokenKind::Var(name)
            } else {
                TokenKind::Atom(name)
            }
        } else if ch == '\'' {
            i += 1;
            let mut name = String::new();
            loop {
                match at(i) {
                    None => return Err(ParseError::new(offset, "unterminated quoted atom")),
                    Some('\\') if at(i + 1).is_some() => {
                        if let Some(escaped) = at(i + 1) {
                            name.push(escaped);
                        }
                        i += 2;
                    }
                    Some('\'') if at(i + 1) == Some('\'') => {
                        name.push('\'');
                        i += 2;
                    }
                    Some('\'') => {
                        i += 1;
                        break;
                    }
                    Some(c) => {
                        name.push(c);
                        i += 1;
                    }
                }
            }
            TokenKind::Atom(name)
        } else if matches!(ch, '(' | ')' | '[' | ']' | ',' | '|') {
            i += 1;
            TokenKind::Punct(ch)
        } else if ch == '!' || ch == ';' {
            i += 1;
            TokenKind::Atom(ch.to_string())
        } else if is_symbol_char(ch) {
            let start = i;
            while at(i).is_some_and(is_symbol_char) && !(at(i) == Some('.') && ends_clause(i)) {
                i += 1;
            }
            TokenKind::Atom(chars[start..i].iter().map(|(_, c)| c).collect())
        } else {
            return Err(ParseError::new(offset, format!("unexpected character `{ch}`")));
        };

        tokens.push(Token {
            kind,
            offset,
            spaced,
        });
        spaced = false;
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    var_names: Vec<String>,
    text_len: usize,
}

impl Parser {
    fn new(text: &str) -> Result<Self, ParseError> {
        Ok(Self {
            tokens: tokenize(text)?,
            pos: 0,
            var_names: Vec::new(),
            text_len: text.len(),
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|token| &token.kind)
    }

    fn offset(&self) -> usize {
        self.peek().map_or(self.text_len, |token| token.offset)
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn error(&self, reason: impl Into<String>) -> ParseError {
        ParseError::new(self.offset(), reason)
    }

    fn expect_punct(&mut self, expected: char) -> Result<(), ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Punct(c)) if *c == expected => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.error(format!("expected `{expected}`"))),
        }
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        match self.peek_kind() {
            Some(TokenKind::End) => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.error("expected `.` at end of clause")),
        }
    }

    fn skip_optional_end(&mut self) {
        if matches!(self.peek_kind(), Some(TokenKind::End)) {
            self.pos += 1;
        }
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        if self.at_eof() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing input"))
        }
    }

    fn variable(&mut self, name: String) -> Term {
        if name != "_" {
            if let Some(id) = self.var_names.iter().position(|known| *known == name) {
                return Term::Var(id);
            }
        }
        let id: VarId = self.var_names.len();
        self.var_names.push(name);
        Term::Var(id)
    }

    /// Name of the infix operator at the cursor, if any.
    fn peek_infix(&self) -> Option<(String, u32, Assoc)> {
        let name = match self.peek_kind()? {
            TokenKind::Punct(',') => ",".to_owned(),
            TokenKind::Atom(name) => name.clone(),
            _ => return None,
        };
        infix_operator(&name).map(|(prec, assoc)| (name, prec, assoc))
    }

    fn starts_term(&self) -> bool {
        match self.peek_kind() {
            Some(TokenKind::Atom(name)) => infix_operator(name).is_none(),
            Some(TokenKind::Var(_) | TokenKind::Int(_)) => true,
            Some(TokenKind::Punct(c)) => matches!(c, '(' | '['),
            _ => false,
        }
    }

    fn parse(&mut self, max: u32) -> Result<Term, ParseError> {
        let (mut left, mut left_prec) = self.parse_primary(max)?;

        while let Some((name, prec, assoc)) = self.peek_infix() {
            let right_max = match assoc {
                Assoc::Xfx => prec - 1,
                Assoc::Xfy => prec,
            };
            if prec > max || left_prec > prec - 1 {
                break;
            }
            self.pos += 1;
            let right = self.parse(right_max)?;
            left = Term::compound(&name, vec![left, right]);
            left_prec = prec;
        }

        Ok(left)
    }

    fn parse_primary(&mut self, max: u32) -> Result<(Term, u32), ParseError> {
        let Some(token) = self.advance() else {
            return Err(self.error("unexpected end of input"));
        };

        match token.kind {
            TokenKind::Int(value) => Ok((Term::Int(value), 0)),
            TokenKind::Var(name) => Ok((self.variable(name), 0)),
            TokenKind::Punct('(') => {
                let inner = self.parse(MAX_PRIORITY)?;
                self.expect_punct(')')?;
                Ok((inner, 0))
            }
            TokenKind::Punct('[') => Ok((self.parse_list()?, 0)),
            TokenKind::Atom(name) => {
                let functional = matches!(
                    self.peek(),
                    Some(Token { kind: TokenKind::Punct('('), spaced: false, .. })
                );
                if functional {
                    self.pos += 1;
                    let args = self.parse_arguments()?;
                    return Ok((Term::compound(&name, args), 0));
                }
                if let Some(prec) = prefix_operator(&name) {
                    if self.starts_term() {
                        let prec = prec.min(max);
                        let operand = self.parse(prec)?;
                        return Ok((Term::compound(&name, vec![operand]), prec));
                    }
                }
                let prec = infix_operator(&name).map_or(0, |(p, _)| p.min(max));
                Ok((Term::atom(&name), prec))
            }
            TokenKind::Punct(c) => Err(ParseError::new(token.offset, format!("unexpected `{c}`"))),
            TokenKind::End => Err(ParseError::new(token.offset, "unexpected `.`")),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Term>, ParseError> {
        let mut args = vec![self.parse(ARG_PRIORITY)?];
        while matches!(self.peek_kind(), Some(TokenKind::Punct(','))) {
            self.pos += 1;
            args.push(self.parse(ARG_PRIORITY)?);
        }
        self.expect_punct(')')?;
        Ok(args)
    }

    fn parse_list(&mut self) -> Result<Term, ParseError> {
        if matches!(self.peek_kind(), Some(TokenKind::Punct(']'))) {
            self.pos += 1;
            return Ok(Term::nil());
        }

        let mut items = vec![self.parse(ARG_PRIORITY)?];
        while matches!(self.peek_kind(), Some(TokenKind::Punct(','))) {
            self.pos += 1;
            items.push(self.parse(ARG_PRIORITY)?);
        }

        let tail = if matches!(self.peek_kind(), Some(TokenKind::Punct('|'))) {
            self.pos += 1;
            self.parse(ARG_PRIORITY)?
        } else {
            Term::nil()
        };
        self.expect_punct(']')?;

        Ok(items
            .into_iter()
            .rev()
            .fold(tail, |tail, head| Term::cons(head, tail)))
    }
}
