//! Recursive descent parser for SQuery
//!
//! Consumes the token stream in order; each production either consumes its
//! expected tokens or fails with a parse error naming the position. Clause
//! keywords the parser does not know are skipped with a warning, so a query
//! written against a newer surface still translates as far as it can.

use crate::base::TextSize;
use crate::diagnostics::{Diagnostic, DiagnosticCode, TranslateError};

use super::ast::{
    CompareOp, FieldRef, Join, JoinPath, LogicalOp, Query, Sort, SortDirection, Value, WhereExpr,
};
use super::keywords::Keyword;
use super::lexer::{lex, Op, Token, TokenKind};

/// Parse result: the query plus any non-fatal diagnostics.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub query: Query,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a decoded SQuery string against a root entity name.
pub fn parse_squery(input: &str, root_entity: &str) -> Result<ParseOutcome, TranslateError> {
    let (tokens, diagnostics) = lex(input);
    let mut parser = Parser::new(&tokens, root_entity);
    parser.diagnostics = diagnostics;
    parser.parse_query()?;
    Ok(parser.finish())
}

/// The parser state
struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    query: Query,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>], root_entity: &str) -> Self {
        Self {
            tokens,
            pos: 0,
            query: Query::new(root_entity),
            diagnostics: Vec::new(),
        }
    }

    fn finish(self) -> ParseOutcome {
        ParseOutcome {
            query: self.query,
            diagnostics: self.diagnostics,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().map(|t| t.kind) == Some(kind)
    }

    fn at_keyword(&self, keyword: Keyword) -> bool {
        self.at(TokenKind::Keyword(keyword))
    }

    fn at_clause_keyword(&self) -> bool {
        matches!(
            self.current().map(|t| t.kind),
            Some(TokenKind::Keyword(
                Keyword::Join
                    | Keyword::Top
                    | Keyword::Select
                    | Keyword::Where
                    | Keyword::Order
            ))
        )
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Byte offset of the current token, or the end of input.
    fn offset(&self) -> u32 {
        match self.current() {
            Some(token) => token.offset.into(),
            None => self
                .tokens
                .last()
                .map(|t| u32::from(t.offset) + t.text.len() as u32)
                .unwrap_or(0),
        }
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) -> Option<&Token<'a>> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn fatal(&self, message: impl Into<String>) -> TranslateError {
        TranslateError::parse_at(message, self.offset())
    }

    fn warn(&mut self, code: DiagnosticCode, message: impl Into<String>) {
        let mut diagnostic = Diagnostic::warning(code, message);
        if let Some(token) = self.current() {
            diagnostic = diagnostic.with_span(token.range());
        }
        self.diagnostics.push(diagnostic);
    }

    // =========================================================================
    // Productions
    // =========================================================================

    /// Top-level loop: dispatch on the clause keyword.
    fn parse_query(&mut self) -> Result<(), TranslateError> {
        while let Some(token) = self.current().copied() {
            match token.kind {
                TokenKind::Keyword(Keyword::Join) => self.parse_join()?,
                TokenKind::Keyword(Keyword::Top) => self.parse_top()?,
                TokenKind::Keyword(Keyword::Select) => self.parse_select()?,
                TokenKind::Keyword(Keyword::Where) => self.parse_where_clause()?,
                TokenKind::Keyword(Keyword::Order) => self.parse_order_by()?,
                TokenKind::Keyword(other) => {
                    self.warn(
                        DiagnosticCode::E0205,
                        format!("unexpected keyword '{}' was skipped", other.as_str()),
                    );
                    self.bump();
                }
                _ => {
                    let text = token.text.to_string();
                    self.warn(
                        DiagnosticCode::E0201,
                        format!("unexpected token '{text}' was skipped"),
                    );
                    self.bump();
                }
            }
        }
        Ok(())
    }

    /// `id (DOT id)*`; keywords are accepted as parts after the first
    /// position (to allow field names like `Type`).
    fn parse_dotted_ident(&mut self, clause: &str) -> Result<FieldRef, TranslateError> {
        let first = match self.current().copied() {
            Some(token) if token.kind == TokenKind::Ident => {
                self.pos += 1;
                token
            }
            _ => {
                return Err(self.fatal(format!("expected an identifier in {clause}")));
            }
        };
        let mut parts = vec![first.text.to_string()];
        let mut end = first.offset + TextSize::of(first.text);

        while self.at(TokenKind::Dot) {
            self.bump();
            let part = match self.current().copied() {
                Some(token)
                    if matches!(token.kind, TokenKind::Ident | TokenKind::Keyword(_)) =>
                {
                    self.pos += 1;
                    token
                }
                _ => {
                    return Err(self.fatal(format!("expected an identifier after '.' in {clause}")));
                }
            };
            parts.push(part.text.to_string());
            end = part.offset + TextSize::of(part.text);
        }

        let span = crate::base::TextRange::new(first.offset, end);
        Ok(FieldRef::new(parts, span))
    }

    /// `join EntityPath [of type TypeFilter] alias`
    fn parse_join(&mut self) -> Result<(), TranslateError> {
        let start = TextSize::new(self.offset());
        self.bump();

        let path = self.parse_dotted_ident("the JOIN clause")?;

        let type_filter = if self.at_keyword(Keyword::Of) {
            self.bump();
            if !self.eat(TokenKind::Keyword(Keyword::Type)) {
                return Err(self.fatal("expected 'type' after 'of' in the JOIN clause"));
            }
            Some(self.parse_dotted_ident("the JOIN type filter")?.path())
        } else {
            None
        };

        // Keyword tokens are accepted as aliases for convenience.
        let alias = match self.current().copied() {
            Some(token) if matches!(token.kind, TokenKind::Ident | TokenKind::Keyword(_)) => {
                self.pos += 1;
                token.text.to_string()
            }
            _ => {
                return Err(self.fatal(format!(
                    "expected an alias after 'join {}'",
                    path.path()
                )));
            }
        };

        let end = TextSize::new(self.offset());
        self.query.joins.push(Join {
            path: JoinPath::from_segments(path.parts),
            type_filter,
            alias,
            span: crate::base::TextRange::new(start, end),
        });
        Ok(())
    }

    /// `top NUMBER`
    fn parse_top(&mut self) -> Result<(), TranslateError> {
        self.bump();
        let token = match self.current().copied() {
            Some(token) if token.kind == TokenKind::Number => {
                self.pos += 1;
                token
            }
            _ => return Err(self.fatal("expected a number after 'top'")),
        };
        self.query.top = token
            .text
            .parse::<i64>()
            .map_err(|_| TranslateError::parse_at(
                format!("'{}' is not a valid top count", token.text),
                token.offset.into(),
            ))?;
        Ok(())
    }

    /// `select field (, field)*`; a trailing comma before a clause keyword is
    /// tolerated.
    fn parse_select(&mut self) -> Result<(), TranslateError> {
        self.bump();
        loop {
            if self.at_eof() || self.at_clause_keyword() {
                break;
            }
            let field = self.parse_dotted_ident("the SELECT clause")?;
            self.query.select.push(field);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(())
    }

    /// `where or-expression`
    fn parse_where_clause(&mut self) -> Result<(), TranslateError> {
        self.bump();
        let expr = self.parse_or()?;
        self.query.where_expr = Some(expr);
        Ok(())
    }

    fn parse_or(&mut self) -> Result<WhereExpr, TranslateError> {
        let mut left = self.parse_and()?;
        while self.at_keyword(Keyword::Or) {
            self.bump();
            let right = self.parse_and()?;
            left = WhereExpr::Logical {
                left: Box::new(left),
                op: LogicalOp::Or,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<WhereExpr, TranslateError> {
        let mut left = self.parse_not()?;
        while self.at_keyword(Keyword::And) {
            self.bump();
            let right = self.parse_not()?;
            left = WhereExpr::Logical {
                left: Box::new(left),
                op: LogicalOp::And,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<WhereExpr, TranslateError> {
        if self.at_keyword(Keyword::Not) {
            self.bump();
            let child = self.parse_not()?;
            return Ok(WhereExpr::Not(Box::new(child)));
        }
        self.parse_primary()
    }

    /// `'(' or ')' | comparison`; a missing `)` is tolerated with a warning.
    fn parse_primary(&mut self) -> Result<WhereExpr, TranslateError> {
        if self.at(TokenKind::LParen) {
            self.bump();
            let expr = self.parse_or()?;
            if !self.eat(TokenKind::RParen) {
                self.warn(
                    DiagnosticCode::E0202,
                    "missing ')' in the WHERE clause; treated as closed here",
                );
            }
            return Ok(expr);
        }
        self.parse_comparison()
    }

    /// `dottedId OPERATOR value`
    fn parse_comparison(&mut self) -> Result<WhereExpr, TranslateError> {
        let field = self.parse_dotted_ident("the WHERE clause")?;

        let op = match self.current().map(|t| t.kind) {
            Some(TokenKind::Op(op)) => {
                let op = match op {
                    Op::Eq => CompareOp::Eq,
                    Op::Ne => CompareOp::Ne,
                    Op::Gt => CompareOp::Gt,
                    Op::Ge => CompareOp::Ge,
                    Op::Lt => CompareOp::Lt,
                    Op::Le => CompareOp::Le,
                    Op::Like => CompareOp::Like,
                    Op::LikeBoth => CompareOp::LikeBoth,
                    Op::Bang => {
                        return Err(self.fatal("expected '=' after '!'"));
                    }
                    Op::Percent => {
                        return Err(self.fatal("stray '%' is not a comparison operator"));
                    }
                };
                self.bump();
                op
            }
            _ => {
                return Err(self.fatal(format!(
                    "expected a comparison operator after '{}'",
                    field.path()
                )));
            }
        };

        let value = self.parse_value()?;
        Ok(WhereExpr::Compare { field, op, value })
    }

    /// `NUMBER | STRING | NULL | BOOLEAN | identifier`
    fn parse_value(&mut self) -> Result<Value, TranslateError> {
        let token = match self.current().copied() {
            Some(token) => token,
            None => return Err(self.fatal("expected a value at the end of the WHERE clause")),
        };
        let value = match token.kind {
            TokenKind::Number => parse_number(token.text)
                .ok_or_else(|| {
                    TranslateError::parse_at(
                        format!("'{}' is not a valid number", token.text),
                        token.offset.into(),
                    )
                })?,
            TokenKind::Str => Value::Str(token.unquoted().to_string()),
            TokenKind::Null => Value::Null,
            TokenKind::Bool => Value::Bool(token.text.eq_ignore_ascii_case("true")),
            // A bare word is taken as a string value.
            TokenKind::Ident => Value::Str(token.text.to_string()),
            _ => {
                return Err(self.fatal(format!("expected a value, found '{}'", token.text)));
            }
        };
        self.bump();
        Ok(value)
    }

    /// `order by field [asc|desc] (, field [asc|desc])*`
    fn parse_order_by(&mut self) -> Result<(), TranslateError> {
        self.bump();
        if !self.eat(TokenKind::Keyword(Keyword::By)) {
            return Err(self.fatal("expected 'by' after 'order'"));
        }
        loop {
            if self.at_eof() || self.at_clause_keyword() {
                break;
            }
            let field = self.parse_dotted_ident("the ORDER BY clause")?;
            let direction = if self.eat(TokenKind::Keyword(Keyword::Asc)) {
                SortDirection::Asc
            } else if self.eat(TokenKind::Keyword(Keyword::Desc)) {
                SortDirection::Desc
            } else {
                SortDirection::default()
            };
            self.query.order_by.push(Sort { field, direction });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(())
    }
}

/// Culture-invariant number parsing; integers keep 64-bit precision.
fn parse_number(text: &str) -> Option<Value> {
    if text.contains('.') {
        text.parse::<f64>().ok().map(Value::Float)
    } else {
        text.parse::<i64>().ok().map(Value::Int)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> ParseOutcome {
        parse_squery(input, "Category").expect("parse should succeed")
    }

    #[test]
    fn test_parse_select_and_order() {
        let outcome = parse("select Id, Identifier, DisplayName order by Id asc");
        assert_eq!(outcome.query.select.len(), 3);
        assert_eq!(outcome.query.order_by.len(), 1);
        assert_eq!(outcome.query.order_by[0].direction, SortDirection::Asc);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_parse_trailing_comma_in_select() {
        let outcome = parse("select Id, Name, where Id = 1");
        assert_eq!(outcome.query.select.len(), 2);
        assert!(outcome.query.where_expr.is_some());
    }

    #[test]
    fn test_parse_join_variants() {
        let outcome = parse("join Role r join r.Policy rp join Owner:Directory_FR_User o");
        let joins = &outcome.query.joins;
        assert_eq!(joins.len(), 3);
        assert_eq!(joins[0].path.nav_prop, "Role");
        assert_eq!(joins[0].alias, "r");
        assert_eq!(joins[1].path.parent.as_deref(), Some("r"));
        assert_eq!(joins[1].path.nav_prop, "Policy");
        assert_eq!(joins[2].path.type_suffix.as_deref(), Some("Directory_FR_User"));
    }

    #[test]
    fn test_parse_join_of_type() {
        let outcome = parse("join Owner of type Directory_FR_User o");
        assert_eq!(
            outcome.query.joins[0].type_filter.as_deref(),
            Some("Directory_FR_User")
        );
    }

    #[test]
    fn test_parse_keyword_as_field_part() {
        let outcome = parse("select r.Type join Role r");
        assert_eq!(outcome.query.select[0].parts, vec!["r", "Type"]);
    }

    #[test]
    fn test_parse_where_precedence() {
        let outcome = parse("where A = 1 or B = 2 and C = 3");
        // `and` binds tighter than `or`
        match outcome.query.where_expr.unwrap() {
            WhereExpr::Logical { op: LogicalOp::Or, right, .. } => match *right {
                WhereExpr::Logical { op: LogicalOp::And, .. } => {}
                other => panic!("expected AND under OR, got {other:?}"),
            },
            other => panic!("expected OR at the top, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_not_and_parens() {
        let outcome = parse("where not (A = 1 or A = 2)");
        match outcome.query.where_expr.unwrap() {
            WhereExpr::Not(child) => match *child {
                WhereExpr::Logical { op: LogicalOp::Or, .. } => {}
                other => panic!("expected OR under NOT, got {other:?}"),
            },
            other => panic!("expected NOT, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_values() {
        let outcome = parse("where A = null and B = true and C = 'x' and D = 9007199254740993");
        let mut compares = Vec::new();
        fn collect(expr: &WhereExpr, out: &mut Vec<Value>) {
            match expr {
                WhereExpr::Compare { value, .. } => out.push(value.clone()),
                WhereExpr::Logical { left, right, .. } => {
                    collect(left, out);
                    collect(right, out);
                }
                WhereExpr::Not(child) => collect(child, out),
            }
        }
        collect(outcome.query.where_expr.as_ref().unwrap(), &mut compares);
        assert_eq!(
            compares,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Str("x".into()),
                // 64-bit identifiers keep integer precision
                Value::Int(9007199254740993),
            ]
        );
    }

    #[test]
    fn test_parse_missing_rparen_is_warning() {
        let outcome = parse("where (A = 1 or A = 2");
        assert!(outcome.query.where_expr.is_some());
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::E0202));
    }

    #[test]
    fn test_parse_negative_top() {
        let outcome = parse("top -5 select Id");
        assert_eq!(outcome.query.top, -5);
    }

    #[test]
    fn test_parse_unknown_keyword_skipped() {
        let outcome = parse("select Id by Name");
        assert_eq!(outcome.query.select.len(), 1);
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::E0205));
    }

    #[test]
    fn test_parse_stray_bang_is_fatal() {
        let err = parse_squery("where A ! 1", "Category").unwrap_err();
        assert!(matches!(err, TranslateError::Parse(_)));
        assert!(err.to_string().contains("expected '=' after '!'"));
    }

    #[test]
    fn test_parse_missing_operator_is_fatal() {
        let err = parse_squery("where A", "Category").unwrap_err();
        assert!(err.to_string().contains("comparison operator"));
    }

    #[test]
    fn test_parse_empty_input() {
        let outcome = parse("");
        assert!(outcome.query.is_empty());
    }
}
