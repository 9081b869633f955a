//! Statement parser
//!
//! A recursive descent parser with the usual operator precedence.

use crate::ast::{BinaryOperator, Expr, Statement, UnaryOperator};
use crate::error::{ScriptError, ScriptResult};

/// Parse a statement: `name = expr` or a bare expression
///
/// # Example
/// ```rust
/// use xcl_script::{parse_statement, Statement};
///
/// let stmt = parse_statement("total = price * 2").unwrap();
/// assert!(matches!(stmt, Statement::Assign { .. }));
///
/// let stmt = parse_statement("IF(a > 0, \"yes\", \"no\")").unwrap();
/// assert!(matches!(stmt, Statement::Expr(_)));
/// ```
pub fn parse_statement(source: &str) -> ScriptResult<Statement> {
    let mut parser = ScriptParser::new(source.trim())?;
    let expr = parser.parse_expression()?;

    let statement = if matches!(parser.current_token(), Token::Assign) {
        let Expr::Variable(name) = expr else {
            return Err(ScriptError::Parse(
                "Left side of an assignment must be a variable name".into(),
            ));
        };
        parser.consume()?;
        let value = parser.parse_expression()?;
        Statement::Assign { name, value }
    } else {
        Statement::Expr(expr)
    };

    if matches!(parser.current_token(), Token::Semicolon) {
        parser.consume()?;
    }

    if !matches!(parser.current_token(), Token::Eof) {
        return Err(ScriptError::Parse(format!(
            "Unexpected {:?} after expression",
            parser.current_token()
        )));
    }

    Ok(statement)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    Number(f64),
    String(String),
    Boolean(bool),
    Null,

    Identifier(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Ampersand,
    AndAnd,
    OrOr,
    Bang,
    EqualEqual,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    Assign,

    // Delimiters
    Comma,
    Semicolon,
    LeftParen,
    RightParen,

    Eof,
}

struct ScriptParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Token,
}

impl<'a> ScriptParser<'a> {
    fn new(input: &'a str) -> ScriptResult<Self> {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: Token::Eof,
        };
        parser.current_token = parser.scan_token()?;
        Ok(parser)
    }

    // === Token scanning ===

    fn scan_token(&mut self) -> ScriptResult<Token> {
        self.skip_whitespace();

        let Some(c) = self.peek_char() else {
            return Ok(Token::Eof);
        };

        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '%' => Some(Token::Percent),
            '^' => Some(Token::Caret),
            ',' => Some(Token::Comma),
            ';' => Some(Token::Semicolon),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        match c {
            '&' => {
                self.advance();
                if self.eat('&') {
                    return Ok(Token::AndAnd);
                }
                return Ok(Token::Ampersand);
            }
            '|' => {
                self.advance();
                if self.eat('|') {
                    return Ok(Token::OrOr);
                }
                return Err(ScriptError::Parse("Expected '||'".into()));
            }
            '!' => {
                self.advance();
                if self.eat('=') {
                    return Ok(Token::NotEqual);
                }
                return Ok(Token::Bang);
            }
            '=' => {
                self.advance();
                if self.eat('=') {
                    return Ok(Token::EqualEqual);
                }
                return Ok(Token::Assign);
            }
            '<' => {
                self.advance();
                if self.eat('=') {
                    return Ok(Token::LessEqual);
                }
                if self.eat('>') {
                    return Ok(Token::NotEqual);
                }
                return Ok(Token::LessThan);
            }
            '>' => {
                self.advance();
                if self.eat('=') {
                    return Ok(Token::GreaterEqual);
                }
                return Ok(Token::GreaterThan);
            }
            '"' | '\'' => return self.scan_string(c),
            _ => {}
        }

        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        if c.is_alphabetic() || c == '_' {
            return Ok(self.scan_identifier());
        }

        Err(ScriptError::Parse(format!(
            "Unexpected character '{}' at offset {}",
            c, self.pos
        )))
    }

    fn scan_string(&mut self, quote: char) -> ScriptResult<Token> {
        let start = self.pos;
        self.advance();

        let mut s = String::new();
        loop {
            let Some(c) = self.peek_char() else {
                return Err(ScriptError::Parse(format!(
                    "Unterminated string starting at offset {}",
                    start
                )));
            };
            self.advance();

            if c == quote {
                // A doubled quote is an escaped quote
                if self.peek_char() == Some(quote) {
                    s.push(quote);
                    self.advance();
                    continue;
                }
                return Ok(Token::String(s));
            }

            if c == '\\' {
                let escaped = self.peek_char().ok_or_else(|| {
                    ScriptError::Parse("Unterminated escape sequence".into())
                })?;
                self.advance();
                s.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
                continue;
            }

            s.push(c);
        }
    }

    fn scan_number(&mut self) -> ScriptResult<Token> {
        let start = self.pos;

        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            self.advance();
            if self.peek_char().map_or(false, |c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = &self.input[start..self.pos];
        text.parse()
            .map(Token::Number)
            .map_err(|_| ScriptError::Parse(format!("Invalid number '{}'", text)))
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;
        while self
            .peek_char()
            .map_or(false, |c| c.is_alphanumeric() || c == '_')
        {
            self.advance();
        }

        let text = &self.input[start..self.pos];
        match text.to_ascii_lowercase().as_str() {
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            "null" => Token::Null,
            _ => Token::Identifier(text.to_string()),
        }
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        &self.current_token
    }

    fn consume(&mut self) -> ScriptResult<Token> {
        let next = self.scan_token()?;
        Ok(std::mem::replace(&mut self.current_token, next))
    }

    fn expect(&mut self, expected: &Token) -> ScriptResult<()> {
        if self.current_token() == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(ScriptError::Parse(format!(
                "Expected {:?}, got {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Logical or: ||
    // 2. Logical and: &&
    // 3. Comparison: == != <> < <= > >=
    // 4. Concatenation: &
    // 5. Addition/Subtraction: + -
    // 6. Multiplication/Division/Remainder: * / %
    // 7. Exponentiation: ^ (right associative)
    // 8. Unary: - + !
    // 9. Primary: literals, variables, function calls, parentheses

    fn parse_expression(&mut self) -> ScriptResult<Expr> {
        self.parse_or()
    }

    fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn parse_or(&mut self) -> ScriptResult<Expr> {
        let mut left = self.parse_and()?;
        while matches!(self.current_token(), Token::OrOr) {
            self.consume()?;
            let right = self.parse_and()?;
            left = Self::binary(BinaryOperator::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ScriptResult<Expr> {
        let mut left = self.parse_comparison()?;
        while matches!(self.current_token(), Token::AndAnd) {
            self.consume()?;
            let right = self.parse_comparison()?;
            left = Self::binary(BinaryOperator::And, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> ScriptResult<Expr> {
        let mut left = self.parse_concatenation()?;

        loop {
            let op = match self.current_token() {
                Token::EqualEqual => BinaryOperator::Equal,
                Token::NotEqual => BinaryOperator::NotEqual,
                Token::LessThan => BinaryOperator::LessThan,
                Token::LessEqual => BinaryOperator::LessEqual,
                Token::GreaterThan => BinaryOperator::GreaterThan,
                Token::GreaterEqual => BinaryOperator::GreaterEqual,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_concatenation()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_concatenation(&mut self) -> ScriptResult<Expr> {
        let mut left = self.parse_additive()?;
        while matches!(self.current_token(), Token::Ampersand) {
            self.consume()?;
            let right = self.parse_additive()?;
            left = Self::binary(BinaryOperator::Concat, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> ScriptResult<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_multiplicative()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ScriptResult<Expr> {
        let mut left = self.parse_exponent()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                Token::Percent => BinaryOperator::Modulo,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_exponent()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_exponent(&mut self) -> ScriptResult<Expr> {
        let left = self.parse_unary()?;

        if matches!(self.current_token(), Token::Caret) {
            self.consume()?;
            let right = self.parse_exponent()?;
            return Ok(Self::binary(BinaryOperator::Power, left, right));
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ScriptResult<Expr> {
        let op = match self.current_token() {
            Token::Minus => UnaryOperator::Negate,
            Token::Plus => UnaryOperator::Plus,
            Token::Bang => UnaryOperator::Not,
            _ => return self.parse_primary(),
        };

        self.consume()?;
        let operand = self.parse_unary()?;
        Ok(Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_primary(&mut self) -> ScriptResult<Expr> {
        match self.consume()? {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::String(s) => Ok(Expr::String(s)),
            Token::Boolean(b) => Ok(Expr::Boolean(b)),
            Token::Null => Ok(Expr::Null),

            Token::LeftParen => {
                let expr = self.parse_expression()?;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }

            Token::Identifier(name) => {
                if matches!(self.current_token(), Token::LeftParen) {
                    self.parse_function_call(name)
                } else {
                    Ok(Expr::Variable(name))
                }
            }

            Token::Eof => Err(ScriptError::Parse("Unexpected end of input".into())),

            other => Err(ScriptError::Parse(format!("Unexpected token: {:?}", other))),
        }
    }

    fn parse_function_call(&mut self, name: String) -> ScriptResult<Expr> {
        self.expect(&Token::LeftParen)?;

        let mut args = Vec::new();
        if !matches!(self.current_token(), Token::RightParen) {
            args.push(self.parse_expression()?);
            while matches!(self.current_token(), Token::Comma) {
                self.consume()?;
                args.push(self.parse_expression()?);
            }
        }

        self.expect(&Token::RightParen)?;

        Ok(Expr::Function {
            name: name.to_uppercase(),
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn expr(source: &str) -> Expr {
        match parse_statement(source).unwrap() {
            Statement::Expr(e) => e,
            other => panic!("expected expression, got {:?}", other),
        }
    }

    fn var(name: &str) -> Box<Expr> {
        Box::new(Expr::Variable(name.into()))
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(expr("42"), Expr::Number(42.0));
        assert_eq!(expr("1.5e3"), Expr::Number(1500.0));
        assert_eq!(expr(".5"), Expr::Number(0.5));
        assert_eq!(expr("\"hi\""), Expr::String("hi".into()));
        assert_eq!(expr("'it''s'"), Expr::String("it's".into()));
        assert_eq!(expr(r#""say \"x\"""#), Expr::String("say \"x\"".into()));
        assert_eq!(expr("TRUE"), Expr::Boolean(true));
        assert_eq!(expr("null"), Expr::Null);
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_statement("__out = __col1 + __col1").unwrap(),
            Statement::Assign {
                name: "__out".into(),
                value: Expr::BinaryOp {
                    op: BinaryOperator::Add,
                    left: var("__col1"),
                    right: var("__col1"),
                },
            }
        );
    }

    #[test]
    fn test_parse_precedence() {
        // a || b && c == d
        let e = expr("a || b && c == d");
        let Expr::BinaryOp { op, right, .. } = e else {
            panic!("not a binary op");
        };
        assert_eq!(op, BinaryOperator::Or);
        assert!(matches!(
            *right,
            Expr::BinaryOp {
                op: BinaryOperator::And,
                ..
            }
        ));

        // 1 + 2 * 3
        let e = expr("1 + 2 * 3");
        let Expr::BinaryOp { op, right, .. } = e else {
            panic!("not a binary op");
        };
        assert_eq!(op, BinaryOperator::Add);
        assert!(matches!(
            *right,
            Expr::BinaryOp {
                op: BinaryOperator::Multiply,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_power_right_associative() {
        let e = expr("2 ^ 3 ^ 2");
        let Expr::BinaryOp { op, left, right } = e else {
            panic!("not a binary op");
        };
        assert_eq!(op, BinaryOperator::Power);
        assert_eq!(*left, Expr::Number(2.0));
        assert!(matches!(
            *right,
            Expr::BinaryOp {
                op: BinaryOperator::Power,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_unary_and_not_equal() {
        assert_eq!(
            expr("!a"),
            Expr::UnaryOp {
                op: UnaryOperator::Not,
                operand: var("a"),
            }
        );
        assert!(matches!(
            expr("a <> b"),
            Expr::BinaryOp {
                op: BinaryOperator::NotEqual,
                ..
            }
        ));
        assert!(matches!(
            expr("a != b"),
            Expr::BinaryOp {
                op: BinaryOperator::NotEqual,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_function_call() {
        assert_eq!(
            expr("round(x, 2)"),
            Expr::Function {
                name: "ROUND".into(),
                args: vec![Expr::Variable("x".into()), Expr::Number(2.0)],
            }
        );
        assert_eq!(
            expr("CONCAT()"),
            Expr::Function {
                name: "CONCAT".into(),
                args: vec![],
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_statement("").is_err());
        assert!(parse_statement("1 +").is_err());
        assert!(parse_statement("(1 + 2").is_err());
        assert!(parse_statement("\"open").is_err());
        assert!(parse_statement("1 2").is_err());
        assert!(parse_statement("3 = 4").is_err());
        assert!(parse_statement("a | b").is_err());
        assert!(parse_statement("#").is_err());
    }
}
