use crate::ast::{Binding, BinaryOperator, Call, FunctionDef, MatchClause, Node, Program};
use crate::error::CoreError;
use crate::lexer::{Token, TokenKind, lex};

/// Deepest syntax tree the parser will build. Every later stage walks the
/// tree recursively, so this also bounds their stack use.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Lex and parse a whole source string.
pub fn parse_source(input: &str) -> Result<Program, CoreError> {
    let tokens = lex(input)?;
    parse(&tokens)
}

/// Parse a token stream into a `Program`.
///
/// A token that cannot start a statement is skipped; a token missing
/// inside a production aborts with `CoreError::ParseError`.
pub fn parse(tokens: &[Token]) -> Result<Program, CoreError> {
    let mut parser = Parser {
        tokens,
        position: 0,
        depth: 0,
        peak: 0,
    };
    let mut statements = Vec::new();
    while parser.position < tokens.len() {
        if let Some(statement) = parser.statement()? {
            statements.push(statement);
        }
    }
    Ok(Program { statements })
}

struct Parser<'t> {
    tokens: &'t [Token],
    position: usize,
    /// Nesting level of the production being parsed.
    depth: usize,
    /// Highest `depth` reached inside the innermost operator chain.
    peak: usize,
}

impl<'t> Parser<'t> {
    fn peek_kind(&self) -> TokenKind {
        self.tokens
            .get(self.position)
            .map_or(TokenKind::Eof, |token| token.kind)
    }

    fn peek_next_kind(&self) -> TokenKind {
        self.tokens
            .get(self.position + 1)
            .map_or(TokenKind::Eof, |token| token.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> Result<&'t Token, CoreError> {
        match self.tokens.get(self.position) {
            Some(token) if token.kind == kind => {
                self.position += 1;
                Ok(token)
            }
            _ => Err(self.unexpected(kind.describe())),
        }
    }

    fn eat_ident(&mut self) -> Result<String, CoreError> {
        self.eat(TokenKind::Ident).map(|token| token.lexeme.clone())
    }

    fn unexpected(&self, expected: &str) -> CoreError {
        let found = match self.tokens.get(self.position) {
            Some(token) => format!("{} '{}'", token.kind, token.lexeme),
            None => TokenKind::Eof.describe().to_string(),
        };
        CoreError::ParseError {
            expected: expected.to_string(),
            found,
            position: self.position,
        }
    }

    /// Run `parse` one nesting level deeper.
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        self.descend()?;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn descend(&mut self) -> Result<(), CoreError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.unexpected(&format!(
                "at most {MAX_NESTING_DEPTH} levels of nesting"
            )));
        }
        self.depth += 1;
        self.peak = self.peak.max(self.depth);
        Ok(())
    }

    fn statement(&mut self) -> Result<Option<Node>, CoreError> {
        self.nested(Self::statement_at_level)
    }

    fn statement_at_level(&mut self) -> Result<Option<Node>, CoreError> {
        let statement = match self.peek_kind() {
            TokenKind::Val => self.val_binding()?,
            TokenKind::Var => self.var_binding()?,
            TokenKind::Fn => self.function_def()?,
            TokenKind::If => self.if_expr()?,
            TokenKind::Return => self.return_stmt()?,
            TokenKind::Send => self.send_expr()?,
            TokenKind::Receive => self.receive_block()?,
            TokenKind::Match => self.match_expr()?,
            TokenKind::Spawn => self.spawn_expr()?,
            TokenKind::Ident if self.tokens[self.position].lexeme == "print" => {
                self.print_call()?
            }
            TokenKind::Ident => self.expression()?,
            _ => {
                self.position += 1;
                return Ok(None);
            }
        };
        Ok(Some(statement))
    }

    /// `{ statement* }`
    fn block(&mut self) -> Result<Vec<Node>, CoreError> {
        self.eat(TokenKind::LBrace)?;
        let mut body = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            if let Some(statement) = self.statement()? {
                body.push(statement);
            }
        }
        self.eat(TokenKind::RBrace)?;
        Ok(body)
    }

    fn val_binding(&mut self) -> Result<Node, CoreError> {
        self.eat(TokenKind::Val)?;
        let name = self.eat_ident()?;
        let annotation = if self.at(TokenKind::Colon) {
            self.eat(TokenKind::Colon)?;
            Some(self.eat_ident()?)
        } else {
            None
        };
        self.eat(TokenKind::Assign)?;
        let value = Box::new(self.expression()?);
        Ok(Node::ValBinding(Binding {
            name,
            annotation,
            value,
        }))
    }

    fn var_binding(&mut self) -> Result<Node, CoreError> {
        self.eat(TokenKind::Var)?;
        let name = self.eat_ident()?;
        self.eat(TokenKind::Assign)?;
        let value = Box::new(self.expression()?);
        Ok(Node::VarBinding(Binding {
            name,
            annotation: None,
            value,
        }))
    }

    fn function_def(&mut self) -> Result<Node, CoreError> {
        self.eat(TokenKind::Fn)?;
        let name = self.eat_ident()?;
        self.eat(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.at(TokenKind::RParen) {
            params.push(self.eat_ident()?);
            while self.at(TokenKind::Comma) {
                self.eat(TokenKind::Comma)?;
                params.push(self.eat_ident()?);
            }
        }
        self.eat(TokenKind::RParen)?;
        let body = self.block()?;
        Ok(Node::FunctionDef(FunctionDef { name, params, body }))
    }

    fn if_expr(&mut self) -> Result<Node, CoreError> {
        self.eat(TokenKind::If)?;
        let condition = Box::new(self.expression()?);
        let then_body = self.block()?;
        let else_body = if self.at(TokenKind::Else) {
            self.eat(TokenKind::Else)?;
            Some(self.block()?)
        } else {
            None
        };
        Ok(Node::IfExpr {
            condition,
            then_body,
            else_body,
        })
    }

    fn return_stmt(&mut self) -> Result<Node, CoreError> {
        self.eat(TokenKind::Return)?;
        Ok(Node::ReturnStmt(Box::new(self.expression()?)))
    }

    fn print_call(&mut self) -> Result<Node, CoreError> {
        self.eat(TokenKind::Ident)?;
        self.eat(TokenKind::LParen)?;
        let value = self.expression()?;
        self.eat(TokenKind::RParen)?;
        Ok(Node::Print(Box::new(value)))
    }

    fn send_expr(&mut self) -> Result<Node, CoreError> {
        self.eat(TokenKind::Send)?;
        self.eat(TokenKind::LParen)?;
        let target = Box::new(self.expression()?);
        self.eat(TokenKind::Comma)?;
        let message = Box::new(self.expression()?);
        self.eat(TokenKind::RParen)?;
        Ok(Node::SendExpr { target, message })
    }

    fn spawn_expr(&mut self) -> Result<Node, CoreError> {
        self.eat(TokenKind::Spawn)?;
        let name = self.eat_ident()?;
        let args = self.call_args()?;
        Ok(Node::SpawnExpr(Call { name, args }))
    }

    fn receive_block(&mut self) -> Result<Node, CoreError> {
        self.eat(TokenKind::Receive)?;
        let binding = self.eat_ident()?;
        let body = self.block()?;
        Ok(Node::ReceiveBlock { binding, body })
    }

    fn match_expr(&mut self) -> Result<Node, CoreError> {
        self.eat(TokenKind::Match)?;
        let value = Box::new(self.expression()?);
        self.eat(TokenKind::LBrace)?;
        let mut clauses = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            let pattern = self.expression()?;
            self.eat(TokenKind::FatArrow)?;
            let body = match self.peek_kind() {
                TokenKind::LBrace => self.block()?,
                // A bare clause value such as `1` or `(a + b)`.
                TokenKind::IntLiteral
                | TokenKind::StringLiteral
                | TokenKind::BoolLiteral
                | TokenKind::None
                | TokenKind::LParen => vec![self.expression()?],
                _ => self.statement()?.into_iter().collect(),
            };
            clauses.push(MatchClause { pattern, body });
            if self.at(TokenKind::Comma) {
                self.eat(TokenKind::Comma)?;
            }
        }
        self.eat(TokenKind::RBrace)?;
        Ok(Node::MatchExpr { value, clauses })
    }

    /// `( expr, ... )` after a callee name.
    fn call_args(&mut self) -> Result<Vec<Node>, CoreError> {
        self.eat(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.at(TokenKind::RParen) {
            args.push(self.expression()?);
            while self.at(TokenKind::Comma) {
                self.eat(TokenKind::Comma)?;
                args.push(self.expression()?);
            }
        }
        self.eat(TokenKind::RParen)?;
        Ok(args)
    }

    // Precedence, lowest first: additive, comparison, multiplicative.
    // Comparison binding tighter than `+`/`-` is the language's rule, so
    // `a + b == c` is `a + (b == c)`.

    fn expression(&mut self) -> Result<Node, CoreError> {
        self.nested(|parser| parser.chain(Self::comparison, additive_operator))
    }

    fn comparison(&mut self) -> Result<Node, CoreError> {
        self.chain(Self::term, comparison_operator)
    }

    fn term(&mut self) -> Result<Node, CoreError> {
        self.chain(Self::primary, multiplicative_operator)
    }

    /// A left-associative chain `operand (op operand)*`.
    ///
    /// Each right operand is parsed one level below the deepest point of
    /// everything to its left, so the tree height stays within the
    /// nesting limit however long the chain is.
    fn chain(
        &mut self,
        operand: fn(&mut Self) -> Result<Node, CoreError>,
        operator: fn(TokenKind) -> Option<BinaryOperator>,
    ) -> Result<Node, CoreError> {
        let start = self.depth;
        let outer_peak = std::mem::replace(&mut self.peak, start);
        let result = self.chain_operands(operand, operator);
        self.depth = start;
        self.peak = self.peak.max(outer_peak);
        result
    }

    fn chain_operands(
        &mut self,
        operand: fn(&mut Self) -> Result<Node, CoreError>,
        operator: fn(TokenKind) -> Option<BinaryOperator>,
    ) -> Result<Node, CoreError> {
        let mut node = operand(self)?;
        while let Some(op) = operator(self.peek_kind()) {
            self.position += 1;
            self.depth = self.peak;
            self.descend()?;
            let right = operand(self)?;
            node = binary(op, node, right);
        }
        Ok(node)
    }

    fn primary(&mut self) -> Result<Node, CoreError> {
        match self.peek_kind() {
            TokenKind::IntLiteral => {
                let token = self.eat(TokenKind::IntLiteral)?;
                token.lexeme.parse::<i64>().map(Node::LiteralInt).map_err(|_| {
                    CoreError::ParseError {
                        expected: "integer literal that fits in 64 bits".to_string(),
                        found: format!("{} '{}'", token.kind, token.lexeme),
                        position: self.position - 1,
                    }
                })
            }
            TokenKind::StringLiteral => {
                let token = self.eat(TokenKind::StringLiteral)?;
                Ok(Node::LiteralString(token.lexeme.trim_matches('"').to_string()))
            }
            TokenKind::BoolLiteral => {
                let token = self.eat(TokenKind::BoolLiteral)?;
                Ok(Node::LiteralBool(token.lexeme == "true"))
            }
            TokenKind::None => {
                self.eat(TokenKind::None)?;
                Ok(Node::NoneLiteral)
            }
            TokenKind::Ident => {
                let name = self.eat_ident()?;
                if self.at(TokenKind::LParen) {
                    let args = self.call_args()?;
                    Ok(Node::FunctionCall(Call { name, args }))
                } else {
                    Ok(Node::Identifier(name))
                }
            }
            TokenKind::Send => self.send_expr(),
            TokenKind::Receive => self.receive_block(),
            TokenKind::Match => self.match_expr(),
            TokenKind::Spawn => self.spawn_expr(),
            TokenKind::LBrace => self.map_literal(),
            TokenKind::LParen => {
                self.eat(TokenKind::LParen)?;
                let node = self.expression()?;
                self.eat(TokenKind::RParen)?;
                Ok(node)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn map_literal(&mut self) -> Result<Node, CoreError> {
        self.eat(TokenKind::LBrace)?;
        let mut entries = Vec::new();
        if self.at(TokenKind::RBrace) {
            self.eat(TokenKind::RBrace)?;
            return Ok(Node::MapLiteral(entries));
        }
        loop {
            if !self.at(TokenKind::Ident) {
                return Err(self.unexpected("map key"));
            }
            let key = self.eat_ident()?;
            self.eat(TokenKind::Colon)?;
            let value = self.expression()?;
            entries.push((key, value));
            if self.at(TokenKind::Comma) && self.peek_next_kind() != TokenKind::RBrace {
                self.eat(TokenKind::Comma)?;
            } else {
                break;
            }
        }
        if self.at(TokenKind::Comma) {
            self.eat(TokenKind::Comma)?;
        }
        self.eat(TokenKind::RBrace)?;
        Ok(Node::MapLiteral(entries))
    }
}

fn binary(op: BinaryOperator, left: Node, right: Node) -> Node {
    Node::BinaryOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn additive_operator(kind: TokenKind) -> Option<BinaryOperator> {
    match kind {
        TokenKind::Plus => Some(BinaryOperator::Add),
        TokenKind::Minus => Some(BinaryOperator::Sub),
        _ => None,
    }
}

fn comparison_operator(kind: TokenKind) -> Option<BinaryOperator> {
    match kind {
        TokenKind::EqEq => Some(BinaryOperator::Eq),
        TokenKind::NotEq => Some(BinaryOperator::NotEq),
        TokenKind::Less => Some(BinaryOperator::Less),
        TokenKind::Greater => Some(BinaryOperator::Greater),
        TokenKind::LessEq => Some(BinaryOperator::LessEq),
        TokenKind::GreaterEq => Some(BinaryOperator::GreaterEq),
        _ => None,
    }
}

fn multiplicative_operator(kind: TokenKind) -> Option<BinaryOperator> {
    match kind {
        TokenKind::Star => Some(BinaryOperator::Mul),
        TokenKind::Slash => Some(BinaryOperator::Div),
        _ => None,
    }
}
