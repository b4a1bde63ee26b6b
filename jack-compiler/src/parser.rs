//! Recursive-descent parser for Jack.
//!
//! One `parse_` method per grammar nonterminal. Each assumes the cursor
//! sits on the first token of its construct and leaves it just past the
//! last one. The grammar is LL(1) except for terms starting with an
//! identifier and the optional index in a let statement, both resolved
//! with one token of lookahead.

use crate::ast::{
    BinaryOp, Class, ClassVarDec, ClassVarScope, Expression, KeywordConst, Param, ReturnType,
    Statement, SubroutineBody, SubroutineCall, SubroutineDec, SubroutineKind, Term, Type, UnaryOp,
    VarDec,
};
use crate::error::CompileError;
use crate::tokenizer::{Keyword, Token, TokenWithLine};

pub struct Parser {
    tokens: Vec<TokenWithLine>,
    pos: usize,
}

impl Parser {
    #[must_use]
    pub fn new(tokens: Vec<TokenWithLine>) -> Self {
        Parser { tokens, pos: 0 }
    }

    /// Parses a complete class; trailing tokens after the closing brace
    /// are an error.
    pub fn parse_class(mut self) -> Result<Class, CompileError> {
        self.expect_keyword(Keyword::Class)?;
        let name = self.expect_identifier()?;
        self.expect_symbol('{')?;

        let mut var_decs = Vec::new();
        while self.at_keyword(Keyword::Static) || self.at_keyword(Keyword::Field) {
            var_decs.push(self.parse_class_var_dec()?);
        }

        let mut subroutines = Vec::new();
        while self.at_keyword(Keyword::Constructor)
            || self.at_keyword(Keyword::Function)
            || self.at_keyword(Keyword::Method)
        {
            subroutines.push(self.parse_subroutine()?);
        }

        self.expect_symbol('}')?;

        if let Some(extra) = self.current() {
            return Err(CompileError::Syntax {
                expected: "end of file".to_string(),
                actual: extra.describe(),
                line: self.line(),
            });
        }

        Ok(Class {
            name,
            var_decs,
            subroutines,
        })
    }

    fn parse_class_var_dec(&mut self) -> Result<ClassVarDec, CompileError> {
        let scope = if self.at_keyword(Keyword::Static) {
            ClassVarScope::Static
        } else {
            ClassVarScope::Field
        };
        self.advance();

        let ty = self.parse_type()?;
        let names = self.parse_name_list()?;
        self.expect_symbol(';')?;

        Ok(ClassVarDec { scope, ty, names })
    }

    fn parse_subroutine(&mut self) -> Result<SubroutineDec, CompileError> {
        let kind = match self.current_keyword() {
            Some(Keyword::Constructor) => SubroutineKind::Constructor,
            Some(Keyword::Function) => SubroutineKind::Function,
            _ => SubroutineKind::Method,
        };
        self.advance();

        let return_type = if self.at_keyword(Keyword::Void) {
            self.advance();
            ReturnType::Void
        } else {
            ReturnType::Of(self.parse_type()?)
        };

        let name = self.expect_identifier()?;
        self.expect_symbol('(')?;
        let params = self.parse_parameter_list()?;
        self.expect_symbol(')')?;
        let body = self.parse_subroutine_body()?;

        Ok(SubroutineDec {
            kind,
            return_type,
            name,
            params,
            body,
        })
    }

    fn parse_parameter_list(&mut self) -> Result<Vec<Param>, CompileError> {
        let mut params = Vec::new();

        if self.at_symbol(')') {
            return Ok(params);
        }

        loop {
            let ty = self.parse_type()?;
            let name = self.expect_identifier()?;
            params.push(Param { ty, name });

            if self.at_symbol(',') {
                self.advance();
            } else {
                break;
            }
        }

        Ok(params)
    }

    fn parse_subroutine_body(&mut self) -> Result<SubroutineBody, CompileError> {
        self.expect_symbol('{')?;

        let mut var_decs = Vec::new();
        while self.at_keyword(Keyword::Var) {
            var_decs.push(self.parse_var_dec()?);
        }

        let statements = self.parse_statements()?;
        self.expect_symbol('}')?;

        Ok(SubroutineBody {
            var_decs,
            statements,
        })
    }

    fn parse_var_dec(&mut self) -> Result<VarDec, CompileError> {
        self.expect_keyword(Keyword::Var)?;
        let ty = self.parse_type()?;
        let names = self.parse_name_list()?;
        self.expect_symbol(';')?;

        Ok(VarDec { ty, names })
    }

    /// `name (',' name)*`
    fn parse_name_list(&mut self) -> Result<Vec<String>, CompileError> {
        let mut names = vec![self.expect_identifier()?];
        while self.at_symbol(',') {
            self.advance();
            names.push(self.expect_identifier()?);
        }
        Ok(names)
    }

    fn parse_type(&mut self) -> Result<Type, CompileError> {
        let ty = match self.current() {
            Some(Token::Keyword(Keyword::Int)) => Type::Int,
            Some(Token::Keyword(Keyword::Char)) => Type::Char,
            Some(Token::Keyword(Keyword::Boolean)) => Type::Boolean,
            Some(Token::Identifier(name)) => Type::ClassName(name.clone()),
            _ => return Err(self.expected("a type")),
        };
        self.advance();
        Ok(ty)
    }

    fn parse_statements(&mut self) -> Result<Vec<Statement>, CompileError> {
        let mut statements = Vec::new();

        loop {
            match self.current_keyword() {
                Some(Keyword::Let) => statements.push(self.parse_let()?),
                Some(Keyword::If) => statements.push(self.parse_if()?),
                Some(Keyword::While) => statements.push(self.parse_while()?),
                Some(Keyword::Do) => statements.push(self.parse_do()?),
                Some(Keyword::Return) => statements.push(self.parse_return()?),
                _ => break,
            }
        }

        Ok(statements)
    }

    fn parse_let(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(Keyword::Let)?;
        let name = self.expect_identifier()?;

        let index = if self.at_symbol('[') {
            self.advance();
            let expr = self.parse_expression()?;
            self.expect_symbol(']')?;
            Some(expr)
        } else {
            None
        };

        self.expect_symbol('=')?;
        let value = self.parse_expression()?;
        self.expect_symbol(';')?;

        Ok(Statement::Let { name, index, value })
    }

    fn parse_if(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(Keyword::If)?;
        self.expect_symbol('(')?;
        let condition = self.parse_expression()?;
        self.expect_symbol(')')?;

        self.expect_symbol('{')?;
        let then_branch = self.parse_statements()?;
        self.expect_symbol('}')?;

        let else_branch = if self.at_keyword(Keyword::Else) {
            self.advance();
            self.expect_symbol('{')?;
            let body = self.parse_statements()?;
            self.expect_symbol('}')?;
            Some(body)
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_while(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(Keyword::While)?;
        self.expect_symbol('(')?;
        let condition = self.parse_expression()?;
        self.expect_symbol(')')?;

        self.expect_symbol('{')?;
        let body = self.parse_statements()?;
        self.expect_symbol('}')?;

        Ok(Statement::While { condition, body })
    }

    fn parse_do(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(Keyword::Do)?;
        let first = self.expect_identifier()?;
        let call = self.parse_call_tail(first)?;
        self.expect_symbol(';')?;

        Ok(Statement::Do(call))
    }

    fn parse_return(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(Keyword::Return)?;

        let value = if self.at_symbol(';') {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_symbol(';')?;

        Ok(Statement::Return(value))
    }

    fn parse_expression(&mut self) -> Result<Expression, CompileError> {
        let term = self.parse_term()?;
        let mut rest = Vec::new();

        while let Some(op) = self.current_binary_op() {
            self.advance();
            rest.push((op, self.parse_term()?));
        }

        Ok(Expression { term, rest })
    }

    fn current_binary_op(&self) -> Option<BinaryOp> {
        match self.current() {
            Some(Token::Symbol(c)) => BinaryOp::from_symbol(*c),
            _ => None,
        }
    }

    fn parse_term(&mut self) -> Result<Term, CompileError> {
        match self.current() {
            Some(Token::IntConst(n)) => {
                let n = *n;
                self.advance();
                Ok(Term::IntConst(n))
            }
            Some(Token::StringConst(s)) => {
                let s = s.clone();
                self.advance();
                Ok(Term::StringConst(s))
            }
            Some(Token::Keyword(k)) => {
                let constant = match k {
                    Keyword::True => KeywordConst::True,
                    Keyword::False => KeywordConst::False,
                    Keyword::Null => KeywordConst::Null,
                    Keyword::This => KeywordConst::This,
                    _ => return Err(self.expected("a term")),
                };
                self.advance();
                Ok(Term::KeywordConst(constant))
            }
            Some(Token::Symbol('(')) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_symbol(')')?;
                Ok(Term::Paren(Box::new(expr)))
            }
            Some(Token::Symbol('-')) => {
                self.advance();
                Ok(Term::Unary(UnaryOp::Neg, Box::new(self.parse_term()?)))
            }
            Some(Token::Symbol('~')) => {
                self.advance();
                Ok(Term::Unary(UnaryOp::Not, Box::new(self.parse_term()?)))
            }
            Some(Token::Identifier(_)) => {
                let name = self.expect_identifier()?;
                match self.current() {
                    Some(Token::Symbol('[')) => {
                        self.advance();
                        let index = self.parse_expression()?;
                        self.expect_symbol(']')?;
                        Ok(Term::IndexedVar(name, Box::new(index)))
                    }
                    Some(Token::Symbol('(' | '.')) => {
                        Ok(Term::Call(self.parse_call_tail(name)?))
                    }
                    _ => Ok(Term::Var(name)),
                }
            }
            _ => Err(self.expected("a term")),
        }
    }

    /// Continues a subroutine call after its first identifier, which is
    /// either the subroutine name or the receiver before a dot.
    fn parse_call_tail(&mut self, first: String) -> Result<SubroutineCall, CompileError> {
        let (receiver, name) = if self.at_symbol('.') {
            self.advance();
            (Some(first), self.expect_identifier()?)
        } else {
            (None, first)
        };

        self.expect_symbol('(')?;
        let args = self.parse_expression_list()?;
        self.expect_symbol(')')?;

        Ok(SubroutineCall {
            receiver,
            name,
            args,
        })
    }

    fn parse_expression_list(&mut self) -> Result<Vec<Expression>, CompileError> {
        let mut args = Vec::new();

        if self.at_symbol(')') {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);
            if self.at_symbol(',') {
                self.advance();
            } else {
                break;
            }
        }

        Ok(args)
    }

    // Cursor helpers

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn current_keyword(&self) -> Option<Keyword> {
        match self.current() {
            Some(Token::Keyword(k)) => Some(*k),
            _ => None,
        }
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(0, |t| t.line)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn at_symbol(&self, symbol: char) -> bool {
        matches!(self.current(), Some(Token::Symbol(c)) if *c == symbol)
    }

    fn at_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.current(), Some(Token::Keyword(k)) if *k == keyword)
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<(), CompileError> {
        if self.at_symbol(symbol) {
            self.advance();
            Ok(())
        } else {
            Err(self.expected(&format!("'{symbol}'")))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), CompileError> {
        if self.at_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.expected(&format!("'{keyword:?}'").to_lowercase()))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, CompileError> {
        match self.current() {
            Some(Token::Identifier(name)) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.expected("an identifier")),
        }
    }

    fn expected(&self, expected: &str) -> CompileError {
        CompileError::Syntax {
            expected: expected.to_string(),
            actual: self
                .current()
                .map_or_else(|| "end of file".to_string(), Token::describe),
            line: self.line(),
        }
    }
}
