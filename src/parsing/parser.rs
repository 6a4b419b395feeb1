//! The SaneQL parser
//!
//! A hand written recursive descent parser over the lexer tokens. It checks
//! that the syntax is well formed and builds the AST; name resolution and
//! typing happen later in the semantic analyzer.

use super::ast::{
    ArgValue, BinaryOp, Expr, FuncArg, LetArg, LetEntry, Literal, Query, QueryBody, TypeName,
    UnaryOp,
};
use super::lexer::{Keyword, Lexer, Token};
use crate::error::{Error, Result};
use std::iter::Peekable;

pub struct Parser<'a> {
    lexer: Peekable<Lexer<'a>>,
}

impl Parser<'_> {
    /// Parse the input string into a query. The entire string must be one
    /// query, ending with an optional semicolon.
    pub fn parse(query: &str) -> Result<Query> {
        let mut parser = Parser { lexer: Lexer::new(query).peekable() };
        let query = parser.parse_query()?;
        parser.skip(Token::Semicolon);
        if let Some(token) = parser.lexer.next().transpose()? {
            return Err(Error::Syntax(format!("unexpected token {}", token)));
        }
        Ok(query)
    }

    /// Fetch the next token, or error if none is found
    fn next(&mut self) -> Result<Token> {
        self.lexer
            .next()
            .transpose()?
            .ok_or_else(|| Error::Syntax("unexpected end of input".into()))
    }

    /// Return the next identifier, or error if not found
    fn next_ident(&mut self) -> Result<String> {
        match self.next()? {
            Token::Ident(ident) | Token::QuotedIdent(ident) => Ok(ident),
            token => Err(Error::Syntax(format!("expected identifier, got {}", token))),
        }
    }

    /// Return the next token if it satisfies the predicate
    fn next_if(&mut self, predicate: impl Fn(&Token) -> bool) -> Option<Token> {
        self.peek().ok()?.filter(|t| predicate(t))?;
        self.next().ok()
    }

    /// Consume the next token if it is the given one, returning true
    fn next_is(&mut self, token: Token) -> bool {
        self.next_if(|t| t == &token).is_some()
    }

    /// Consume the next token if it is the expected one, or error
    fn expect(&mut self, expect: Token) -> Result<()> {
        let token = self.next()?;
        if token != expect {
            return Err(Error::Syntax(format!("expected token {}, found {}", expect, token)));
        }
        Ok(())
    }

    /// Consume the next token if it is the given token
    fn skip(&mut self, token: Token) {
        self.next_is(token);
    }

    /// Peek the next token, if any
    fn peek(&mut self) -> Result<Option<&Token>> {
        self.lexer
            .peek()
            .map(|r| r.as_ref().map_err(|err| err.clone()))
            .transpose()
    }

    /// Parse a query: either a defun or let definitions plus one body
    fn parse_query(&mut self) -> Result<Query> {
        if self.next_is(Token::Keyword(Keyword::Defun)) {
            // Recognized for error reporting; the analyzer rejects it
            while self.lexer.next().transpose()?.is_some() {}
            return Ok(Query::DefineFunction);
        }
        let mut lets = Vec::new();
        while self.next_is(Token::Keyword(Keyword::Let)) {
            lets.push(self.parse_let_entry()?);
        }
        let body = self.parse_expression()?;
        Ok(Query::Body(QueryBody { lets, body }))
    }

    /// Parse one let definition: `let name[(params)] := body`
    fn parse_let_entry(&mut self) -> Result<LetEntry> {
        let name = self.next_ident()?;
        let mut args = Vec::new();
        if self.next_is(Token::OpenParen) {
            while !self.next_is(Token::CloseParen) {
                if !args.is_empty() {
                    self.expect(Token::Comma)?;
                }
                args.push(self.parse_let_arg()?);
            }
        }
        self.expect(Token::ColonEquals)?;
        let body = self.parse_expression()?;
        Ok(LetEntry { name, args, body })
    }

    /// Parse one let parameter: `name [: category] [:= default]`
    fn parse_let_arg(&mut self) -> Result<LetArg> {
        let name = self.next_ident()?;
        let category = if self.next_is(Token::Colon) { Some(self.next_ident()?) } else { None };
        let default = if self.next_is(Token::ColonEquals) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(LetArg { name, category, default })
    }

    /// Parse an expression
    fn parse_expression(&mut self) -> Result<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut expr = self.parse_and()?;
        while self.next_is(Token::OrOr) {
            let right = self.parse_and()?;
            expr = Expr::Binary {
                op: BinaryOp::Or,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut expr = self.parse_comparison()?;
        while self.next_is(Token::AndAnd) {
            let right = self.parse_comparison()?;
            expr = Expr::Binary {
                op: BinaryOp::And,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    /// Comparisons do not associate
    fn parse_comparison(&mut self) -> Result<Expr> {
        let expr = self.parse_additive()?;
        let op = match self.peek()? {
            Some(Token::Equal) => BinaryOp::Equals,
            Some(Token::NotEqual) => BinaryOp::NotEquals,
            Some(Token::Less) => BinaryOp::Less,
            Some(Token::LessOrEqual) => BinaryOp::LessOrEqual,
            Some(Token::Greater) => BinaryOp::Greater,
            Some(Token::GreaterOrEqual) => BinaryOp::GreaterOrEqual,
            _ => return Ok(expr),
        };
        self.next()?;
        let right = self.parse_additive()?;
        Ok(Expr::Binary { op, left: Box::new(expr), right: Box::new(right) })
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut expr = self.parse_multiplicative()?;
        loop {
            let op = match self.peek()? {
                Some(Token::Plus) => BinaryOp::Plus,
                Some(Token::Minus) => BinaryOp::Minus,
                _ => return Ok(expr),
            };
            self.next()?;
            let right = self.parse_multiplicative()?;
            expr = Expr::Binary { op, left: Box::new(expr), right: Box::new(right) };
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut expr = self.parse_power()?;
        loop {
            let op = match self.peek()? {
                Some(Token::Asterisk) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Mod,
                _ => return Ok(expr),
            };
            self.next()?;
            let right = self.parse_power()?;
            expr = Expr::Binary { op, left: Box::new(expr), right: Box::new(right) };
        }
    }

    /// Exponentiation associates to the right
    fn parse_power(&mut self) -> Result<Expr> {
        let expr = self.parse_unary()?;
        if self.next_is(Token::Caret) {
            let right = self.parse_power()?;
            return Ok(Expr::Binary {
                op: BinaryOp::Pow,
                left: Box::new(expr),
                right: Box::new(right),
            });
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let op = match self.peek()? {
            Some(Token::Plus) => UnaryOp::Plus,
            Some(Token::Minus) => UnaryOp::Minus,
            Some(Token::Exclamation) => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        self.next()?;
        let value = self.parse_unary()?;
        Ok(Expr::Unary { op, value: Box::new(value) })
    }

    /// Parse postfix chains: member access, method calls, and casts
    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.next_is(Token::Period) {
                let part = self.next_ident()?;
                let access = Expr::Access { base: Box::new(expr), part };
                if self.next_is(Token::OpenParen) {
                    let args = self.parse_call_args()?;
                    expr = Expr::Call { func: Box::new(access), args };
                } else {
                    expr = access;
                }
            } else if self.next_is(Token::ColonColon) {
                let name = self.next_ident()?;
                expr = Expr::Cast { value: Box::new(expr), ty: TypeName { name } };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.next()? {
            Token::Integer(value) => Ok(Expr::Literal(Literal::Integer(value))),
            Token::Float(value) => Ok(Expr::Literal(Literal::Float(value))),
            Token::String(value) => Ok(Expr::Literal(Literal::String(value))),
            Token::Keyword(Keyword::True) => Ok(Expr::Literal(Literal::True)),
            Token::Keyword(Keyword::False) => Ok(Expr::Literal(Literal::False)),
            Token::Keyword(Keyword::Null) => Ok(Expr::Literal(Literal::Null)),
            Token::Ident(name) | Token::QuotedIdent(name) => {
                if self.next_is(Token::OpenParen) {
                    let args = self.parse_call_args()?;
                    return Ok(Expr::Call { func: Box::new(Expr::Token(name)), args });
                }
                Ok(Expr::Token(name))
            }
            Token::OpenParen => {
                let expr = self.parse_expression()?;
                self.expect(Token::CloseParen)?;
                Ok(expr)
            }
            token => Err(Error::Syntax(format!("unexpected token {}", token))),
        }
    }

    /// Parse call arguments up to the closing parenthesis
    fn parse_call_args(&mut self) -> Result<Vec<FuncArg>> {
        let mut args = Vec::new();
        while !self.next_is(Token::CloseParen) {
            if !args.is_empty() {
                self.expect(Token::Comma)?;
            }
            args.push(self.parse_func_arg(false)?);
        }
        Ok(args)
    }

    /// Parse one call argument or brace list entry. Arguments may be named
    /// (`name: value`), braced lists, or, inside braces, case pairs
    /// (`condition => result`).
    fn parse_func_arg(&mut self, in_list: bool) -> Result<FuncArg> {
        if matches!(self.peek()?, Some(Token::OpenBrace)) {
            return Ok(FuncArg { name: None, value: self.parse_brace_list()? });
        }
        let expr = self.parse_expression()?;
        if expr.as_token().is_some() && self.next_is(Token::Colon) {
            let name = expr.as_token().map(String::from);
            let value = if matches!(self.peek()?, Some(Token::OpenBrace)) {
                self.parse_brace_list()?
            } else {
                ArgValue::Expr(self.parse_expression()?)
            };
            return Ok(FuncArg { name, value });
        }
        if in_list && self.next_is(Token::FatArrow) {
            let result = self.parse_expression()?;
            return Ok(FuncArg { name: None, value: ArgValue::Case { condition: expr, result } });
        }
        Ok(FuncArg { name: None, value: ArgValue::Expr(expr) })
    }

    /// Parse a braced entry list
    fn parse_brace_list(&mut self) -> Result<ArgValue> {
        self.expect(Token::OpenBrace)?;
        let mut entries = Vec::new();
        while !self.next_is(Token::CloseBrace) {
            if !entries.is_empty() {
                self.expect(Token::Comma)?;
            }
            entries.push(self.parse_func_arg(true)?);
        }
        Ok(ArgValue::List(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_body(input: &str) -> QueryBody {
        match Parser::parse(input).unwrap() {
            Query::Body(body) => body,
            Query::DefineFunction => panic!("unexpected defun"),
        }
    }

    #[test]
    fn method_chains_nest_left_to_right() {
        let body = parse_body("nation.filter(n_regionkey = 1).project({n_name})");
        let Expr::Call { func, .. } = &body.body else {
            panic!("expected call");
        };
        let Expr::Access { base, part } = func.as_ref() else {
            panic!("expected access");
        };
        assert_eq!(part, "project");
        assert!(matches!(base.as_ref(), Expr::Call { .. }));
    }

    #[test]
    fn named_and_positional_arguments() {
        let body = parse_body("t.join(u, a = b, type: leftouter)");
        let Expr::Call { args, .. } = &body.body else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 3);
        assert_eq!(args[0].name, None);
        assert_eq!(args[2].name.as_deref(), Some("type"));
    }

    #[test]
    fn brace_lists_and_case_pairs() {
        let body = parse_body("case({a = 1 => 'x', true => 'y'}, else: 'z')");
        let Expr::Call { args, .. } = &body.body else {
            panic!("expected call");
        };
        let ArgValue::List(entries) = &args[0].value else {
            panic!("expected list");
        };
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0].value, ArgValue::Case { .. }));
        assert_eq!(args[1].name.as_deref(), Some("else"));
    }

    #[test]
    fn lets_with_parameters_and_defaults() {
        let body = parse_body("let sq(x) := x*x let two(t: table, n := 2) := t sq(3)");
        assert_eq!(body.lets.len(), 2);
        assert_eq!(body.lets[0].name, "sq");
        assert_eq!(body.lets[0].args.len(), 1);
        let two = &body.lets[1];
        assert_eq!(two.args[0].category.as_deref(), Some("table"));
        assert!(two.args[1].default.is_some());
    }

    #[test]
    fn casts_and_precedence() {
        let body = parse_body("1 + 2 * 3 = 7 && !false");
        let Expr::Binary { op: BinaryOp::And, left, .. } = &body.body else {
            panic!("expected and");
        };
        assert!(matches!(left.as_ref(), Expr::Binary { op: BinaryOp::Equals, .. }));

        let body = parse_body("'1996-01-01'::date");
        let Expr::Cast { ty, .. } = &body.body else {
            panic!("expected cast");
        };
        assert_eq!(ty.name, "date");
    }

    #[test]
    fn defun_is_recognized() {
        assert!(matches!(
            Parser::parse("defun f(x) := x").unwrap(),
            Query::DefineFunction
        ));
    }

    #[test]
    fn trailing_garbage_errors() {
        assert!(Parser::parse("nation nation").is_err());
        assert!(Parser::parse("nation;").is_ok());
    }
}
