//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including the error type, helper methods, and the program-level entry point.
//!
//! # Parser Architecture
//!
//! Recursive descent over the token stream, split across `impl Parser` blocks:
//! - This module: Parser struct, helpers, and top-level program structure
//! - `statements`: statements and declarations
//! - `expressions`: precedence-climbing expression parsing
//!
//! Parsing is all-or-nothing: the first grammar failure aborts with a
//! [`SyntaxError`] carrying the 1-based source line, and no partial AST is
//! returned.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token};
use thiserror::Error;

/// Parser error type
#[derive(Debug, Clone, Error)]
#[error("syntax error at line {}: {message}", .location.line)]
pub struct SyntaxError {
    pub message: String,
    pub location: SourceLocation,
}

impl SyntaxError {
    /// 1-based line for user-facing reporting
    pub fn line(&self) -> usize {
        self.location.line
    }
}

impl From<LexError> for SyntaxError {
    fn from(err: LexError) -> Self {
        SyntaxError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Recursive descent parser for the teaching C++ subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, SyntaxError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parse the entire program (top-level declarations)
    pub fn parse_program(&mut self) -> Result<Program, SyntaxError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            let decl = self.parse_top_level()?;
            program.nodes.push(decl);
        }

        Ok(program)
    }

    /// Parse one top-level item: namespace directive or function definition.
    /// A function named `main` becomes the dedicated [`AstNode::Main`] node.
    fn parse_top_level(&mut self) -> Result<AstNode, SyntaxError> {
        let loc = self.current_location();

        if self.match_token(&Token::Using(loc)) {
            self.expect_token(
                &Token::Namespace(self.current_location()),
                "Expected 'namespace' after 'using'",
            )?;
            let name = self.expect_identifier()?;
            self.expect_token(
                &Token::Semicolon(self.current_location()),
                "Expected ';' after namespace directive",
            )?;
            return Ok(AstNode::NamespaceDirective {
                name,
                location: loc,
            });
        }

        self.parse_function_definition()
    }

    /// Parse function definition: type name(params) { body }
    fn parse_function_definition(&mut self) -> Result<AstNode, SyntaxError> {
        let loc = self.current_location();
        let return_type = self.parse_type_name()?;
        let name = self.expect_identifier()?;

        self.expect_token(
            &Token::LParen(self.current_location()),
            "Expected '(' after function name",
        )?;
        let params = self.parse_parameter_list()?;
        self.expect_token(
            &Token::RParen(self.current_location()),
            "Expected ')' after parameters",
        )?;

        let body = self.parse_brace_block()?;

        if name == "main" {
            Ok(AstNode::Main {
                body,
                location: loc,
            })
        } else {
            Ok(AstNode::FunctionDefinition {
                name,
                return_type,
                params,
                body,
                location: loc,
            })
        }
    }

    /// Parse parameter list: (type name, type name, ...)
    fn parse_parameter_list(&mut self) -> Result<Vec<Param>, SyntaxError> {
        let mut params = Vec::new();

        if self.check(&Token::RParen(self.current_location())) {
            return Ok(params);
        }

        loop {
            let type_name = self.parse_type_name()?;
            let name = self.expect_identifier()?;
            params.push(Param { name, type_name });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(params)
    }

    /// Parse a type name, including multi-word forms (`unsigned long long`,
    /// `long double`) and typedef aliases (plain identifiers).
    pub(crate) fn parse_type_name(&mut self) -> Result<String, SyntaxError> {
        let loc = self.current_location();

        if self.match_token(&Token::Unsigned(loc)) {
            if self.match_token(&Token::Long(self.current_location())) {
                if self.match_token(&Token::Long(self.current_location())) {
                    return Ok("unsigned long long".to_string());
                }
                return Ok("unsigned long".to_string());
            }
            // Bare `unsigned` means `unsigned int`
            self.match_token(&Token::Int(self.current_location()));
            return Ok("unsigned int".to_string());
        }

        if self.match_token(&Token::Long(loc)) {
            if self.match_token(&Token::Long(self.current_location())) {
                return Ok("long long".to_string());
            }
            if self.match_token(&Token::Double(self.current_location())) {
                return Ok("long double".to_string());
            }
            return Ok("long".to_string());
        }

        let simple = match self.peek_token() {
            Token::Int(_) => Some("int"),
            Token::Float(_) => Some("float"),
            Token::Double(_) => Some("double"),
            Token::Char(_) => Some("char"),
            Token::StringType(_) => Some("string"),
            Token::Bool(_) => Some("bool"),
            Token::Void(_) => Some("void"),
            Token::Auto(_) => Some("auto"),
            Token::Short(_) => Some("short"),
            _ => None,
        };
        if let Some(name) = simple {
            self.advance();
            return Ok(name.to_string());
        }

        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            return Ok(name);
        }

        Err(SyntaxError {
            message: format!("Expected type, found {}", self.peek()),
            location: self.current_location(),
        })
    }

    /// Parse a brace-delimited block: { statements }
    pub(crate) fn parse_brace_block(&mut self) -> Result<Vec<AstNode>, SyntaxError> {
        self.expect_token(
            &Token::LBrace(self.current_location()),
            "Expected '{' to open block",
        )?;
        let statements = self.parse_block_statements()?;
        self.expect_token(
            &Token::RBrace(self.current_location()),
            "Expected '}' to close block",
        )?;
        Ok(statements)
    }

    // ===== Helper methods =====

    /// True if the current token starts a (keyword) type
    pub(crate) fn at_type_keyword(&self) -> bool {
        matches!(
            self.peek_token(),
            Token::Int(_)
                | Token::Float(_)
                | Token::Double(_)
                | Token::Char(_)
                | Token::StringType(_)
                | Token::Bool(_)
                | Token::Void(_)
                | Token::Auto(_)
                | Token::Short(_)
                | Token::Long(_)
                | Token::Unsigned(_)
        )
    }

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if std::mem::discriminant(&self.peek_token()) == std::mem::discriminant(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(&self.peek_token()) == std::mem::discriminant(token)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek_token(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_token(&self) -> Token {
        self.tokens[self.position].clone()
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position - 1]
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        self.previous().location()
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    pub(crate) fn expect_token(&mut self, token: &Token, message: &str) -> Result<(), SyntaxError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(SyntaxError {
                message: format!("{}, found {}", message, self.peek()),
                location: self.current_location(),
            })
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, SyntaxError> {
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            Err(SyntaxError {
                message: format!("Expected identifier, found {}", self.peek()),
                location: self.current_location(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_main() {
        let source = "int main() { return 0; }";
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();

        assert_eq!(program.nodes.len(), 1);
        match &program.nodes[0] {
            AstNode::Main { body, .. } => assert_eq!(body.len(), 1),
            other => panic!("Expected main node, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_namespace_and_functions() {
        let source = r#"
            using namespace std;
            int add(int a, int b) { return a + b; }
            int main() { return 0; }
        "#;
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();

        assert_eq!(program.nodes.len(), 3);
        assert!(matches!(program.nodes[0], AstNode::NamespaceDirective { ref name, .. } if name == "std"));
        match &program.nodes[1] {
            AstNode::FunctionDefinition {
                name,
                return_type,
                params,
                body,
                ..
            } => {
                assert_eq!(name, "add");
                assert_eq!(return_type, "int");
                assert_eq!(params.len(), 2);
                assert_eq!(body.len(), 1);
            }
            other => panic!("Expected function definition, got {:?}", other),
        }
        assert!(matches!(program.nodes[2], AstNode::Main { .. }));
    }

    #[test]
    fn test_parse_failure_reports_line() {
        let source = "int main() {\n  int x = ;\n}";
        let mut parser = Parser::new(source).unwrap();
        let err = parser.parse_program().unwrap_err();
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn test_multiword_types() {
        let source = "unsigned long long big() { return 0; } int main() { return 0; }";
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();
        match &program.nodes[0] {
            AstNode::FunctionDefinition { return_type, .. } => {
                assert_eq!(return_type, "unsigned long long");
            }
            other => panic!("Expected function definition, got {:?}", other),
        }
    }
}
