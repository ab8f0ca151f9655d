//! Expression parsing implementation
//!
//! Precedence climbing with left-associative folding at each tier:
//!
//! ```text
//! logical-or > logical-and > equality > relational
//!            > additive > multiplicative > unary > postfix > primary
//! ```
//!
//! Postfix forms (calls, 1D/2D indexing, `x++`/`x--`) attach to identifiers
//! only; there are no pointers, casts, or ternaries in the subset.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{Parser, SyntaxError};

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<AstNode, SyntaxError> {
        self.parse_logical_or()
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Result<AstNode, SyntaxError> {
        let mut left = self.parse_logical_and()?;

        while self.match_token(&Token::OrOr(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_logical_and()?);
            left = AstNode::BinaryExpression {
                op: BinOp::Or,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<AstNode, SyntaxError> {
        let mut left = self.parse_equality()?;

        while self.match_token(&Token::AndAnd(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_equality()?);
            left = AstNode::BinaryExpression {
                op: BinOp::And,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse equality (== !=)
    fn parse_equality(&mut self) -> Result<AstNode, SyntaxError> {
        let mut left = self.parse_relational()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::EqEq(loc)) {
                BinOp::Eq
            } else if self.match_token(&Token::NotEq(loc)) {
                BinOp::Ne
            } else {
                break;
            };

            let right = Box::new(self.parse_relational()?);
            left = AstNode::BinaryExpression {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse relational (< <= > >=)
    fn parse_relational(&mut self) -> Result<AstNode, SyntaxError> {
        let mut left = self.parse_additive()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Lt(loc)) {
                BinOp::Lt
            } else if self.match_token(&Token::Le(loc)) {
                BinOp::Le
            } else if self.match_token(&Token::Gt(loc)) {
                BinOp::Gt
            } else if self.match_token(&Token::Ge(loc)) {
                BinOp::Ge
            } else {
                break;
            };

            let right = Box::new(self.parse_additive()?);
            left = AstNode::BinaryExpression {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse additive (+ -)
    fn parse_additive(&mut self) -> Result<AstNode, SyntaxError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Plus(loc)) {
                BinOp::Add
            } else if self.match_token(&Token::Minus(loc)) {
                BinOp::Sub
            } else {
                break;
            };

            let right = Box::new(self.parse_multiplicative()?);
            left = AstNode::BinaryExpression {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse multiplicative (* / %)
    fn parse_multiplicative(&mut self) -> Result<AstNode, SyntaxError> {
        let mut left = self.parse_unary()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Star(loc)) {
                BinOp::Mul
            } else if self.match_token(&Token::Slash(loc)) {
                BinOp::Div
            } else if self.match_token(&Token::Percent(loc)) {
                BinOp::Mod
            } else {
                break;
            };

            let right = Box::new(self.parse_unary()?);
            left = AstNode::BinaryExpression {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse unary (! - ++x --x)
    fn parse_unary(&mut self) -> Result<AstNode, SyntaxError> {
        let loc = self.current_location();

        if self.match_token(&Token::Bang(loc)) {
            let operand = Box::new(self.parse_unary()?);
            return Ok(AstNode::UnaryExpression {
                op: UnOp::Not,
                operand,
                location: loc,
            });
        }

        if self.match_token(&Token::Minus(loc)) {
            let operand = Box::new(self.parse_unary()?);
            return Ok(AstNode::UnaryExpression {
                op: UnOp::Neg,
                operand,
                location: loc,
            });
        }

        if self.match_token(&Token::PlusPlus(loc)) {
            let name = self.expect_identifier()?;
            return Ok(AstNode::UpdateExpression {
                name,
                op: UpdateOp::Increment,
                prefix: true,
                location: loc,
            });
        }

        if self.match_token(&Token::MinusMinus(loc)) {
            let name = self.expect_identifier()?;
            return Ok(AstNode::UpdateExpression {
                name,
                op: UpdateOp::Decrement,
                prefix: true,
                location: loc,
            });
        }

        self.parse_primary()
    }

    /// Parse primary (literals, identifiers with postfix forms, parens)
    fn parse_primary(&mut self) -> Result<AstNode, SyntaxError> {
        let loc = self.current_location();

        if let Token::IntLiteral(n, loc) = self.peek_token() {
            self.advance();
            return Ok(AstNode::Literal {
                value: LiteralValue::Int(n),
                location: loc,
            });
        }

        if let Token::FloatLiteral(x, loc) = self.peek_token() {
            self.advance();
            return Ok(AstNode::Literal {
                value: LiteralValue::Float(x),
                location: loc,
            });
        }

        if let Token::StringLiteral(s, loc) = self.peek_token() {
            self.advance();
            return Ok(AstNode::Literal {
                value: LiteralValue::Str(s),
                location: loc,
            });
        }

        if let Token::CharLiteral(c, loc) = self.peek_token() {
            self.advance();
            return Ok(AstNode::Literal {
                value: LiteralValue::Char(c),
                location: loc,
            });
        }

        if self.match_token(&Token::True(loc)) {
            return Ok(AstNode::Literal {
                value: LiteralValue::Bool(true),
                location: loc,
            });
        }

        if self.match_token(&Token::False(loc)) {
            return Ok(AstNode::Literal {
                value: LiteralValue::Bool(false),
                location: loc,
            });
        }

        if let Token::Ident(name, loc) = self.peek_token() {
            self.advance();
            return self.parse_identifier_postfix(name, loc);
        }

        if self.match_token(&Token::LParen(loc)) {
            let expr = self.parse_expression()?;
            self.expect_token(
                &Token::RParen(self.current_location()),
                "Expected ')' after expression",
            )?;
            return Ok(expr);
        }

        Err(SyntaxError {
            message: format!("Unexpected token in expression: {}", self.peek()),
            location: loc,
        })
    }

    /// Parse the postfix forms that can follow an identifier:
    /// calls, array accesses, and `x++`/`x--`.
    fn parse_identifier_postfix(
        &mut self,
        name: String,
        loc: SourceLocation,
    ) -> Result<AstNode, SyntaxError> {
        if self.match_token(&Token::LParen(self.current_location())) {
            let args = self.parse_argument_list()?;
            self.expect_token(
                &Token::RParen(self.current_location()),
                "Expected ')' after function arguments",
            )?;
            return Ok(AstNode::CallExpression {
                callee: name,
                args,
                location: loc,
            });
        }

        if self.match_token(&Token::LBracket(self.current_location())) {
            let index = Box::new(self.parse_expression()?);
            self.expect_token(
                &Token::RBracket(self.current_location()),
                "Expected ']' after array index",
            )?;

            if self.match_token(&Token::LBracket(self.current_location())) {
                let index2 = Box::new(self.parse_expression()?);
                self.expect_token(
                    &Token::RBracket(self.current_location()),
                    "Expected ']' after second array index",
                )?;
                return Ok(AstNode::ArrayAccess2D {
                    name,
                    index,
                    index2,
                    location: loc,
                });
            }

            return Ok(AstNode::ArrayAccess {
                name,
                index,
                location: loc,
            });
        }

        if self.match_token(&Token::PlusPlus(self.current_location())) {
            return Ok(AstNode::UpdateExpression {
                name,
                op: UpdateOp::Increment,
                prefix: false,
                location: loc,
            });
        }

        if self.match_token(&Token::MinusMinus(self.current_location())) {
            return Ok(AstNode::UpdateExpression {
                name,
                op: UpdateOp::Decrement,
                prefix: false,
                location: loc,
            });
        }

        Ok(AstNode::Identifier {
            name,
            location: loc,
        })
    }

    /// Parse argument list: (expr, expr, ...)
    fn parse_argument_list(&mut self) -> Result<Vec<AstNode>, SyntaxError> {
        let mut args = Vec::new();

        if self.check(&Token::RParen(self.current_location())) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse::Parser;

    fn parse_expr(src: &str) -> AstNode {
        let source = format!("int main() {{ x = {}; }}", src);
        let mut parser = Parser::new(&source).unwrap();
        let program = parser.parse_program().unwrap();
        match program.nodes.into_iter().next().unwrap() {
            AstNode::Main { mut body, .. } => match body.remove(0) {
                AstNode::Assignment { value, .. } => *value,
                other => panic!("Expected assignment, got {:?}", other),
            },
            other => panic!("Expected main, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 folds the multiplication first
        let expr = parse_expr("1 + 2 * 3");
        match expr {
            AstNode::BinaryExpression {
                op: BinOp::Add,
                right,
                ..
            } => {
                assert!(matches!(
                    *right,
                    AstNode::BinaryExpression { op: BinOp::Mul, .. }
                ));
            }
            other => panic!("Expected addition at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_left_associativity() {
        // 10 - 4 - 3 is (10 - 4) - 3
        let expr = parse_expr("10 - 4 - 3");
        match expr {
            AstNode::BinaryExpression {
                op: BinOp::Sub,
                left,
                ..
            } => {
                assert!(matches!(
                    *left,
                    AstNode::BinaryExpression { op: BinOp::Sub, .. }
                ));
            }
            other => panic!("Expected subtraction at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_logical_over_comparison() {
        let expr = parse_expr("a > 1 && b < 2");
        assert!(matches!(
            expr,
            AstNode::BinaryExpression { op: BinOp::And, .. }
        ));
    }

    #[test]
    fn test_parenthesized() {
        let expr = parse_expr("(1 + 2) * 3");
        match expr {
            AstNode::BinaryExpression {
                op: BinOp::Mul,
                left,
                ..
            } => {
                assert!(matches!(
                    *left,
                    AstNode::BinaryExpression { op: BinOp::Add, .. }
                ));
            }
            other => panic!("Expected multiplication at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_array_access_2d() {
        let expr = parse_expr("grid[i][j]");
        assert!(matches!(expr, AstNode::ArrayAccess2D { ref name, .. } if name == "grid"));
    }

    #[test]
    fn test_call_with_args() {
        let expr = parse_expr("add(1, y)");
        match expr {
            AstNode::CallExpression { callee, args, .. } => {
                assert_eq!(callee, "add");
                assert_eq!(args.len(), 2);
            }
            other => panic!("Expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_unary_and_update() {
        assert!(matches!(
            parse_expr("-x"),
            AstNode::UnaryExpression { op: UnOp::Neg, .. }
        ));
        assert!(matches!(
            parse_expr("!done"),
            AstNode::UnaryExpression { op: UnOp::Not, .. }
        ));
        assert!(matches!(
            parse_expr("i++"),
            AstNode::UpdateExpression { prefix: false, .. }
        ));
    }
}
