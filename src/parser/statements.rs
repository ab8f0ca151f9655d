//! Statement parsing implementation
//!
//! Handles every statement form of the teaching subset:
//!
//! - Typedef and variable declarations (with `const`, 1D/2D dimensions, and
//!   brace initializers)
//! - Assignments, plain and compound, including array-element targets
//! - Control flow: `if`/`else if`/`else`, `while`, `for`, `switch`
//! - Jump statements: `return`, `break`, `continue`
//! - Stream I/O: `cout <<` chains and `cin >>` chains
//! - Bare call statements and `x++;` update statements
//!
//! All bodies are brace-delimited blocks. Parsing methods are `pub(crate)`
//! methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{Parser, SyntaxError};

impl Parser {
    /// Parse statements until the closing brace of the enclosing block
    pub(crate) fn parse_block_statements(&mut self) -> Result<Vec<AstNode>, SyntaxError> {
        let mut statements = Vec::new();

        while !self.check(&Token::RBrace(self.current_location())) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    /// Parse a single statement
    pub(crate) fn parse_statement(&mut self) -> Result<AstNode, SyntaxError> {
        let loc = self.current_location();

        if self.match_token(&Token::Typedef(loc)) {
            return self.parse_typedef_declaration();
        }

        if self.match_token(&Token::While(loc)) {
            return self.parse_while_statement();
        }

        if self.match_token(&Token::For(loc)) {
            return self.parse_for_statement();
        }

        if self.match_token(&Token::If(loc)) {
            return self.parse_if_statement();
        }

        if self.match_token(&Token::Switch(loc)) {
            return self.parse_switch_statement();
        }

        if self.match_token(&Token::Return(loc)) {
            return self.parse_return_statement();
        }

        if self.match_token(&Token::Break(loc)) {
            self.expect_token(
                &Token::Semicolon(self.current_location()),
                "Expected ';' after 'break'",
            )?;
            return Ok(AstNode::BreakStatement { location: loc });
        }

        if self.match_token(&Token::Continue(loc)) {
            self.expect_token(
                &Token::Semicolon(self.current_location()),
                "Expected ';' after 'continue'",
            )?;
            return Ok(AstNode::ContinueStatement { location: loc });
        }

        if self.match_token(&Token::Cout(loc)) {
            return self.parse_output_statement();
        }

        if self.match_token(&Token::Cin(loc)) {
            return self.parse_input_statement();
        }

        // Prefix update statement: ++x;
        if self.check(&Token::PlusPlus(loc)) || self.check(&Token::MinusMinus(loc)) {
            return self.parse_update_statement(true);
        }

        // Declarations start with `const`, a type keyword, or a typedef
        // alias followed by another identifier (`km distance = 5;`)
        if self.check(&Token::Const(loc)) || self.at_type_keyword() {
            return self.parse_variable_declaration();
        }
        if matches!(self.peek_token(), Token::Ident(_, _))
            && matches!(self.peek_ahead(1), Some(Token::Ident(_, _)))
        {
            return self.parse_variable_declaration();
        }

        if let Token::Ident(_, _) = self.peek_token() {
            // Call statement: foo(...);
            if matches!(self.peek_ahead(1), Some(Token::LParen(_))) {
                let call = self.parse_expression()?;
                self.expect_token(
                    &Token::Semicolon(self.current_location()),
                    "Expected ';' after call",
                )?;
                return Ok(AstNode::ExpressionStatement {
                    expr: Box::new(call),
                    location: loc,
                });
            }

            // Postfix update statement: x++;
            if matches!(
                self.peek_ahead(1),
                Some(Token::PlusPlus(_)) | Some(Token::MinusMinus(_))
            ) {
                return self.parse_update_statement(false);
            }

            return self.parse_assignment_statement();
        }

        Err(SyntaxError {
            message: format!("Unexpected token at start of statement: {}", self.peek()),
            location: loc,
        })
    }

    /// Parse typedef declaration: typedef type name;
    fn parse_typedef_declaration(&mut self) -> Result<AstNode, SyntaxError> {
        let loc = self.previous_location();
        let base_type = self.parse_type_name()?;
        let new_name = self.expect_identifier()?;
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            "Expected ';' after typedef",
        )?;

        Ok(AstNode::TypedefDeclaration {
            base_type,
            new_name,
            location: loc,
        })
    }

    /// Parse variable declaration: [const] type name[dims] [= init];
    pub(crate) fn parse_variable_declaration(&mut self) -> Result<AstNode, SyntaxError> {
        let loc = self.current_location();

        let is_const = self.match_token(&Token::Const(loc));
        let type_name = self.parse_type_name()?;
        let name = self.expect_identifier()?;

        let mut dims = Vec::new();
        while self.match_token(&Token::LBracket(self.current_location())) {
            // Array sizes must be constant integer literals
            if let Token::IntLiteral(n, lit_loc) = self.peek_token() {
                if n < 0 {
                    return Err(SyntaxError {
                        message: "Array size must be non-negative".to_string(),
                        location: lit_loc,
                    });
                }
                dims.push(n as usize);
                self.advance();
            } else {
                return Err(SyntaxError {
                    message: "Array size must be a constant integer".to_string(),
                    location: self.current_location(),
                });
            }
            self.expect_token(
                &Token::RBracket(self.current_location()),
                "Expected ']' after array size",
            )?;
        }

        if dims.len() > 2 {
            return Err(SyntaxError {
                message: "Arrays of more than two dimensions are not supported".to_string(),
                location: loc,
            });
        }

        let init = if self.match_token(&Token::Eq(self.current_location())) {
            if self.check(&Token::LBrace(self.current_location())) {
                Some(Box::new(self.parse_array_initializer()?))
            } else {
                Some(Box::new(self.parse_expression()?))
            }
        } else {
            None
        };

        self.expect_token(
            &Token::Semicolon(self.current_location()),
            "Expected ';' after variable declaration",
        )?;

        Ok(AstNode::VariableDeclaration {
            name,
            type_name,
            is_const,
            dims,
            init,
            location: loc,
        })
    }

    /// Parse brace initializer: {expr, expr, ...} with one nesting level for 2D
    fn parse_array_initializer(&mut self) -> Result<AstNode, SyntaxError> {
        let loc = self.current_location();
        self.expect_token(
            &Token::LBrace(loc),
            "Expected '{' to open initializer list",
        )?;

        let mut values = Vec::new();
        if !self.check(&Token::RBrace(self.current_location())) {
            loop {
                if self.check(&Token::LBrace(self.current_location())) {
                    values.push(self.parse_array_initializer()?);
                } else {
                    values.push(self.parse_expression()?);
                }
                if !self.match_token(&Token::Comma(self.current_location())) {
                    break;
                }
            }
        }

        self.expect_token(
            &Token::RBrace(self.current_location()),
            "Expected '}' to close initializer list",
        )?;

        Ok(AstNode::ArrayInitializer {
            values,
            location: loc,
        })
    }

    /// Parse assignment statement: name[[i]][[j]] op expr;
    fn parse_assignment_statement(&mut self) -> Result<AstNode, SyntaxError> {
        let loc = self.current_location();
        let (target, indices, op) = self.parse_assignment_head()?;
        let value = self.parse_expression()?;
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            "Expected ';' after assignment",
        )?;

        Ok(AstNode::Assignment {
            target,
            indices,
            op,
            value: Box::new(value),
            location: loc,
        })
    }

    /// Parse the target and operator of an assignment (shared with `for` steps)
    fn parse_assignment_head(
        &mut self,
    ) -> Result<(String, Vec<AstNode>, AssignOp), SyntaxError> {
        let target = self.expect_identifier()?;

        let mut indices = Vec::new();
        while indices.len() < 2 && self.match_token(&Token::LBracket(self.current_location())) {
            indices.push(self.parse_expression()?);
            self.expect_token(
                &Token::RBracket(self.current_location()),
                "Expected ']' after index",
            )?;
        }

        let loc = self.current_location();
        let op = if self.match_token(&Token::Eq(loc)) {
            AssignOp::Assign
        } else if self.match_token(&Token::PlusEq(loc)) {
            AssignOp::AddAssign
        } else if self.match_token(&Token::MinusEq(loc)) {
            AssignOp::SubAssign
        } else if self.match_token(&Token::StarEq(loc)) {
            AssignOp::MulAssign
        } else if self.match_token(&Token::SlashEq(loc)) {
            AssignOp::DivAssign
        } else if self.match_token(&Token::PercentEq(loc)) {
            AssignOp::ModAssign
        } else {
            return Err(SyntaxError {
                message: format!("Expected assignment operator, found {}", self.peek()),
                location: loc,
            });
        };

        Ok((target, indices, op))
    }

    /// Parse update statement: x++; or ++x;
    fn parse_update_statement(&mut self, prefix: bool) -> Result<AstNode, SyntaxError> {
        let loc = self.current_location();

        let (name, op) = if prefix {
            let op = self.parse_update_op()?;
            (self.expect_identifier()?, op)
        } else {
            let name = self.expect_identifier()?;
            (name, self.parse_update_op()?)
        };

        self.expect_token(
            &Token::Semicolon(self.current_location()),
            "Expected ';' after update expression",
        )?;

        Ok(AstNode::UpdateExpression {
            name,
            op,
            prefix,
            location: loc,
        })
    }

    fn parse_update_op(&mut self) -> Result<UpdateOp, SyntaxError> {
        let loc = self.current_location();
        if self.match_token(&Token::PlusPlus(loc)) {
            Ok(UpdateOp::Increment)
        } else if self.match_token(&Token::MinusMinus(loc)) {
            Ok(UpdateOp::Decrement)
        } else {
            Err(SyntaxError {
                message: format!("Expected '++' or '--', found {}", self.peek()),
                location: loc,
            })
        }
    }

    /// Parse while statement: while (cond) { body }
    fn parse_while_statement(&mut self) -> Result<AstNode, SyntaxError> {
        let loc = self.previous_location();

        self.expect_token(
            &Token::LParen(self.current_location()),
            "Expected '(' after 'while'",
        )?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_token(
            &Token::RParen(self.current_location()),
            "Expected ')' after while condition",
        )?;

        let body = self.parse_brace_block()?;

        Ok(AstNode::WhileLoop {
            condition,
            body,
            location: loc,
        })
    }

    /// Parse for statement: for (init; cond; step) { body }
    fn parse_for_statement(&mut self) -> Result<AstNode, SyntaxError> {
        let loc = self.previous_location();

        self.expect_token(
            &Token::LParen(self.current_location()),
            "Expected '(' after 'for'",
        )?;

        // Init: declaration, assignment, or empty. Declarations and
        // assignments consume their own ';'.
        let init = if self.match_token(&Token::Semicolon(self.current_location())) {
            None
        } else if self.check(&Token::Const(self.current_location())) || self.at_type_keyword() {
            Some(Box::new(self.parse_variable_declaration()?))
        } else {
            Some(Box::new(self.parse_assignment_statement()?))
        };

        let condition = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            "Expected ';' after for condition",
        )?;

        let step = if self.check(&Token::RParen(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_for_step()?))
        };

        self.expect_token(
            &Token::RParen(self.current_location()),
            "Expected ')' after for clauses",
        )?;

        let body = self.parse_brace_block()?;

        Ok(AstNode::ForLoop {
            init,
            condition,
            step,
            body,
            location: loc,
        })
    }

    /// Parse the third `for` clause: update, assignment, or plain expression
    fn parse_for_step(&mut self) -> Result<AstNode, SyntaxError> {
        let loc = self.current_location();

        if self.check(&Token::PlusPlus(loc)) || self.check(&Token::MinusMinus(loc)) {
            let op = self.parse_update_op()?;
            let name = self.expect_identifier()?;
            return Ok(AstNode::UpdateExpression {
                name,
                op,
                prefix: true,
                location: loc,
            });
        }

        if matches!(self.peek_token(), Token::Ident(_, _)) {
            if matches!(
                self.peek_ahead(1),
                Some(Token::PlusPlus(_)) | Some(Token::MinusMinus(_))
            ) {
                let name = self.expect_identifier()?;
                let op = self.parse_update_op()?;
                return Ok(AstNode::UpdateExpression {
                    name,
                    op,
                    prefix: false,
                    location: loc,
                });
            }

            if matches!(
                self.peek_ahead(1),
                Some(Token::Eq(_))
                    | Some(Token::PlusEq(_))
                    | Some(Token::MinusEq(_))
                    | Some(Token::StarEq(_))
                    | Some(Token::SlashEq(_))
                    | Some(Token::PercentEq(_))
            ) {
                let (target, indices, op) = self.parse_assignment_head()?;
                let value = self.parse_expression()?;
                return Ok(AstNode::Assignment {
                    target,
                    indices,
                    op,
                    value: Box::new(value),
                    location: loc,
                });
            }
        }

        self.parse_expression()
    }

    /// Parse if statement: if (cond) { } [else if (cond) { }]* [else { }]
    fn parse_if_statement(&mut self) -> Result<AstNode, SyntaxError> {
        let loc = self.previous_location();

        self.expect_token(
            &Token::LParen(self.current_location()),
            "Expected '(' after 'if'",
        )?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_token(
            &Token::RParen(self.current_location()),
            "Expected ')' after if condition",
        )?;

        let body = self.parse_brace_block()?;

        let mut else_ifs = Vec::new();
        let mut alternate = None;

        while self.match_token(&Token::Else(self.current_location())) {
            if self.match_token(&Token::If(self.current_location())) {
                let clause_loc = self.previous_location();
                self.expect_token(
                    &Token::LParen(self.current_location()),
                    "Expected '(' after 'else if'",
                )?;
                let clause_cond = Box::new(self.parse_expression()?);
                self.expect_token(
                    &Token::RParen(self.current_location()),
                    "Expected ')' after else-if condition",
                )?;
                let clause_body = self.parse_brace_block()?;

                else_ifs.push(ElseIfClause {
                    condition: clause_cond,
                    body: clause_body,
                    location: clause_loc,
                });
            } else {
                alternate = Some(self.parse_brace_block()?);
                break;
            }
        }

        Ok(AstNode::IfStatement {
            condition,
            body,
            else_ifs,
            alternate,
            location: loc,
        })
    }

    /// Parse switch statement: switch (expr) { case v: ... default: ... }
    fn parse_switch_statement(&mut self) -> Result<AstNode, SyntaxError> {
        let loc = self.previous_location();

        self.expect_token(
            &Token::LParen(self.current_location()),
            "Expected '(' after 'switch'",
        )?;
        let discriminant = Box::new(self.parse_expression()?);
        self.expect_token(
            &Token::RParen(self.current_location()),
            "Expected ')' after switch expression",
        )?;
        self.expect_token(
            &Token::LBrace(self.current_location()),
            "Expected '{' before switch body",
        )?;

        let mut cases = Vec::new();
        let mut default_case = None;

        while !self.check(&Token::RBrace(self.current_location())) && !self.is_at_end() {
            if self.match_token(&Token::Case(self.current_location())) {
                let case_loc = self.previous_location();
                let value = self.parse_expression()?;
                self.expect_token(
                    &Token::Colon(self.current_location()),
                    "Expected ':' after case value",
                )?;

                cases.push(SwitchCase {
                    value: Box::new(value),
                    body: self.parse_case_body()?,
                    location: case_loc,
                });
            } else if self.match_token(&Token::Default(self.current_location())) {
                let default_loc = self.previous_location();
                self.expect_token(
                    &Token::Colon(self.current_location()),
                    "Expected ':' after 'default'",
                )?;

                if default_case.is_some() {
                    return Err(SyntaxError {
                        message: "Multiple 'default' cases in switch".to_string(),
                        location: default_loc,
                    });
                }
                default_case = Some(DefaultCase {
                    body: self.parse_case_body()?,
                    location: default_loc,
                });
            } else {
                return Err(SyntaxError {
                    message: "Expected 'case' or 'default' in switch body".to_string(),
                    location: self.current_location(),
                });
            }
        }

        self.expect_token(
            &Token::RBrace(self.current_location()),
            "Expected '}' after switch body",
        )?;

        Ok(AstNode::SwitchStatement {
            discriminant,
            cases,
            default_case,
            location: loc,
        })
    }

    /// Parse statements of one case arm, up to the next case/default/brace
    fn parse_case_body(&mut self) -> Result<Vec<AstNode>, SyntaxError> {
        let mut statements = Vec::new();

        while !self.check(&Token::Case(self.current_location()))
            && !self.check(&Token::Default(self.current_location()))
            && !self.check(&Token::RBrace(self.current_location()))
            && !self.is_at_end()
        {
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    /// Parse return statement
    fn parse_return_statement(&mut self) -> Result<AstNode, SyntaxError> {
        let loc = self.previous_location();

        let argument = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        self.expect_token(
            &Token::Semicolon(self.current_location()),
            "Expected ';' after return",
        )?;

        Ok(AstNode::ReturnStatement {
            argument,
            location: loc,
        })
    }

    /// Parse output statement: cout << item [<< item]*;
    fn parse_output_statement(&mut self) -> Result<AstNode, SyntaxError> {
        let loc = self.previous_location();
        let mut items = Vec::new();

        self.expect_token(
            &Token::Shl(self.current_location()),
            "Expected '<<' after 'cout'",
        )?;
        loop {
            if self.match_token(&Token::Endl(self.current_location())) {
                items.push(OutputItem::Endl);
            } else {
                items.push(OutputItem::Expr(self.parse_expression()?));
            }
            if !self.match_token(&Token::Shl(self.current_location())) {
                break;
            }
        }

        self.expect_token(
            &Token::Semicolon(self.current_location()),
            "Expected ';' after output statement",
        )?;

        Ok(AstNode::OutputStatement {
            items,
            location: loc,
        })
    }

    /// Parse input statement: cin >> name [>> name]*;
    fn parse_input_statement(&mut self) -> Result<AstNode, SyntaxError> {
        let loc = self.previous_location();
        let mut targets = Vec::new();

        self.expect_token(
            &Token::Shr(self.current_location()),
            "Expected '>>' after 'cin'",
        )?;
        loop {
            targets.push(self.expect_identifier()?);
            if !self.match_token(&Token::Shr(self.current_location())) {
                break;
            }
        }

        self.expect_token(
            &Token::Semicolon(self.current_location()),
            "Expected ';' after input statement",
        )?;

        Ok(AstNode::InputStatement {
            targets,
            location: loc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse::Parser;

    fn parse_main_body(body_src: &str) -> Vec<AstNode> {
        let source = format!("int main() {{ {} }}", body_src);
        let mut parser = Parser::new(&source).unwrap();
        let program = parser.parse_program().unwrap();
        match program.nodes.into_iter().next().unwrap() {
            AstNode::Main { body, .. } => body,
            other => panic!("Expected main, got {:?}", other),
        }
    }

    #[test]
    fn test_declaration_with_initializer() {
        let body = parse_main_body("const int limit = 10;");
        match &body[0] {
            AstNode::VariableDeclaration {
                name,
                type_name,
                is_const,
                dims,
                init,
                ..
            } => {
                assert_eq!(name, "limit");
                assert_eq!(type_name, "int");
                assert!(is_const);
                assert!(dims.is_empty());
                assert!(init.is_some());
            }
            other => panic!("Expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_array_declarations() {
        let body = parse_main_body("int arr[3]; int grid[2][4] = {{1, 2, 3, 4}, {5, 6, 7, 8}};");
        match &body[0] {
            AstNode::VariableDeclaration { dims, .. } => assert_eq!(dims, &vec![3]),
            other => panic!("Expected declaration, got {:?}", other),
        }
        match &body[1] {
            AstNode::VariableDeclaration { dims, init, .. } => {
                assert_eq!(dims, &vec![2, 4]);
                match init.as_deref() {
                    Some(AstNode::ArrayInitializer { values, .. }) => {
                        assert_eq!(values.len(), 2);
                    }
                    other => panic!("Expected initializer, got {:?}", other),
                }
            }
            other => panic!("Expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_typedef_and_alias_declaration() {
        let body = parse_main_body("typedef int km; km distance = 5;");
        assert!(matches!(
            &body[0],
            AstNode::TypedefDeclaration { base_type, new_name, .. }
                if base_type == "int" && new_name == "km"
        ));
        assert!(matches!(
            &body[1],
            AstNode::VariableDeclaration { type_name, name, .. }
                if type_name == "km" && name == "distance"
        ));
    }

    #[test]
    fn test_compound_assignment_with_index() {
        let body = parse_main_body("arr[2] += 5;");
        match &body[0] {
            AstNode::Assignment {
                target,
                indices,
                op,
                ..
            } => {
                assert_eq!(target, "arr");
                assert_eq!(indices.len(), 1);
                assert_eq!(*op, AssignOp::AddAssign);
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_if_else_if_chain() {
        let body = parse_main_body(
            "if (x > 0) { y = 1; } else if (x < 0) { y = 2; } else { y = 3; }",
        );
        match &body[0] {
            AstNode::IfStatement {
                else_ifs,
                alternate,
                ..
            } => {
                assert_eq!(else_ifs.len(), 1);
                assert!(alternate.is_some());
            }
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_switch_with_default() {
        let body = parse_main_body(
            "switch (x) { case 1: y = 1; break; case 2: y = 2; break; default: y = 0; }",
        );
        match &body[0] {
            AstNode::SwitchStatement {
                cases,
                default_case,
                ..
            } => {
                assert_eq!(cases.len(), 2);
                assert!(default_case.is_some());
                assert_eq!(cases[0].body.len(), 2);
            }
            other => panic!("Expected switch, got {:?}", other),
        }
    }

    #[test]
    fn test_for_loop_clauses() {
        let body = parse_main_body("for (int i = 0; i < 10; i++) { x = i; }");
        match &body[0] {
            AstNode::ForLoop {
                init,
                condition,
                step,
                body,
                ..
            } => {
                assert!(matches!(
                    init.as_deref(),
                    Some(AstNode::VariableDeclaration { .. })
                ));
                assert!(condition.is_some());
                assert!(matches!(
                    step.as_deref(),
                    Some(AstNode::UpdateExpression { prefix: false, .. })
                ));
                assert_eq!(body.len(), 1);
            }
            other => panic!("Expected for loop, got {:?}", other),
        }
    }

    #[test]
    fn test_io_statements() {
        let body = parse_main_body("cout << \"value: \" << x << endl; cin >> a >> b;");
        match &body[0] {
            AstNode::OutputStatement { items, .. } => assert_eq!(items.len(), 3),
            other => panic!("Expected output statement, got {:?}", other),
        }
        match &body[1] {
            AstNode::InputStatement { targets, .. } => {
                assert_eq!(targets, &vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("Expected input statement, got {:?}", other),
        }
    }

    #[test]
    fn test_update_statements() {
        let body = parse_main_body("x++; --y;");
        assert!(matches!(
            &body[0],
            AstNode::UpdateExpression {
                op: UpdateOp::Increment,
                prefix: false,
                ..
            }
        ));
        assert!(matches!(
            &body[1],
            AstNode::UpdateExpression {
                op: UpdateOp::Decrement,
                prefix: true,
                ..
            }
        ));
    }
}
