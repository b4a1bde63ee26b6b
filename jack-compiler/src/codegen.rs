//! VM code generation from the syntax tree.
//!
//! A post-order traversal: operands are compiled before their operator,
//! arguments before their call. The generator owns the symbol table and
//! the if/while label counter, which resets per subroutine; labels are
//! prefixed with `Class.subroutine` so they stay unique within the
//! compilation unit.

use std::io::Write;

use crate::ast::{
    BinaryOp, Class, ClassVarScope, Expression, KeywordConst, Statement, SubroutineCall,
    SubroutineDec, SubroutineKind, Term, UnaryOp,
};
use crate::error::CompileError;
use crate::symbol_table::{SymbolKind, SymbolTable};
use crate::vm_writer::{Segment, VmOp, VmWriter};

pub struct CodeGenerator<W: Write> {
    vm: VmWriter<W>,
    symbols: SymbolTable,
    current_subroutine: String,
    label_index: u16,
}

/// Compiles one class into VM commands on `out`.
pub fn generate<W: Write>(class: &Class, out: W) -> Result<W, CompileError> {
    let mut generator = CodeGenerator {
        vm: VmWriter::new(out),
        symbols: SymbolTable::new(&class.name),
        current_subroutine: String::new(),
        label_index: 0,
    };
    generator.compile_class(class)?;
    generator.vm.close()?;
    Ok(generator.vm.into_inner())
}

impl<W: Write> CodeGenerator<W> {
    fn compile_class(&mut self, class: &Class) -> Result<(), CompileError> {
        for dec in &class.var_decs {
            let kind = match dec.scope {
                ClassVarScope::Static => SymbolKind::Static,
                ClassVarScope::Field => SymbolKind::Field,
            };
            for name in &dec.names {
                self.symbols.define(name, dec.ty.clone(), kind)?;
            }
        }

        for subroutine in &class.subroutines {
            self.compile_subroutine(subroutine)?;
        }

        Ok(())
    }

    fn compile_subroutine(&mut self, dec: &SubroutineDec) -> Result<(), CompileError> {
        self.symbols.start_subroutine();
        self.label_index = 0;
        self.current_subroutine.clear();
        self.current_subroutine.push_str(&dec.name);

        // A method's receiver occupies argument 0, shifting the declared
        // parameters by one.
        if dec.kind == SubroutineKind::Method {
            let this_type = crate::ast::Type::ClassName(self.symbols.class_name().to_string());
            self.symbols.define("this", this_type, SymbolKind::Arg)?;
        }
        for param in &dec.params {
            self.symbols
                .define(&param.name, param.ty.clone(), SymbolKind::Arg)?;
        }
        for var_dec in &dec.body.var_decs {
            for name in &var_dec.names {
                self.symbols
                    .define(name, var_dec.ty.clone(), SymbolKind::Var)?;
            }
        }

        let full_name = format!("{}.{}", self.symbols.class_name(), dec.name);
        self.vm
            .write_function(&full_name, self.symbols.var_count(SymbolKind::Var))?;

        match dec.kind {
            SubroutineKind::Method => {
                self.vm.write_push(Segment::Argument, 0)?;
                self.vm.write_pop(Segment::Pointer, 0)?;
            }
            SubroutineKind::Constructor => {
                let field_count = self.symbols.var_count(SymbolKind::Field);
                self.vm.write_push(Segment::Constant, field_count)?;
                self.vm.write_call("Memory.alloc", 1)?;
                self.vm.write_pop(Segment::Pointer, 0)?;
            }
            SubroutineKind::Function => {}
        }

        self.compile_statements(&dec.body.statements)
    }

    fn compile_statements(&mut self, statements: &[Statement]) -> Result<(), CompileError> {
        for statement in statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    fn compile_statement(&mut self, statement: &Statement) -> Result<(), CompileError> {
        match statement {
            Statement::Let { name, index, value } => self.compile_let(name, index.as_ref(), value),
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => self.compile_if(condition, then_branch, else_branch.as_deref()),
            Statement::While { condition, body } => self.compile_while(condition, body),
            Statement::Do(call) => {
                self.compile_call(call)?;
                // The call's return value is unused.
                self.vm.write_pop(Segment::Temp, 0)
            }
            Statement::Return(value) => {
                match value {
                    Some(expression) => self.compile_expression(expression)?,
                    // Void subroutines still return a word.
                    None => self.vm.write_push(Segment::Constant, 0)?,
                }
                self.vm.write_return()
            }
        }
    }

    fn compile_let(
        &mut self,
        name: &str,
        index: Option<&Expression>,
        value: &Expression,
    ) -> Result<(), CompileError> {
        match index {
            None => {
                self.compile_expression(value)?;
                let (segment, idx) = self.resolve(name)?;
                self.vm.write_pop(segment, idx)
            }
            Some(index) => {
                // The target address is computed and parked in temp 0
                // before the value expression runs, so side effects in
                // the value cannot clobber pointer 1.
                let (segment, idx) = self.resolve(name)?;
                self.vm.write_push(segment, idx)?;
                self.compile_expression(index)?;
                self.vm.write_arithmetic(VmOp::Add)?;
                self.compile_expression(value)?;
                self.vm.write_pop(Segment::Temp, 0)?;
                self.vm.write_pop(Segment::Pointer, 1)?;
                self.vm.write_push(Segment::Temp, 0)?;
                self.vm.write_pop(Segment::That, 0)
            }
        }
    }

    fn compile_if(
        &mut self,
        condition: &Expression,
        then_branch: &[Statement],
        else_branch: Option<&[Statement]>,
    ) -> Result<(), CompileError> {
        let n = self.next_label_index();
        let else_label = self.make_label("IF_ELSE", n);
        let end_label = self.make_label("IF_END", n);

        self.compile_expression(condition)?;
        self.vm.write_arithmetic(VmOp::Not)?;
        self.vm.write_if(&else_label)?;
        self.compile_statements(then_branch)?;
        self.vm.write_goto(&end_label)?;
        self.vm.write_label(&else_label)?;
        if let Some(body) = else_branch {
            self.compile_statements(body)?;
        }
        self.vm.write_label(&end_label)
    }

    fn compile_while(
        &mut self,
        condition: &Expression,
        body: &[Statement],
    ) -> Result<(), CompileError> {
        let n = self.next_label_index();
        let top_label = self.make_label("WHILE_TOP", n);
        let end_label = self.make_label("WHILE_END", n);

        self.vm.write_label(&top_label)?;
        self.compile_expression(condition)?;
        self.vm.write_arithmetic(VmOp::Not)?;
        self.vm.write_if(&end_label)?;
        self.compile_statements(body)?;
        self.vm.write_goto(&top_label)?;
        self.vm.write_label(&end_label)
    }

    fn compile_expression(&mut self, expression: &Expression) -> Result<(), CompileError> {
        self.compile_term(&expression.term)?;
        for (op, term) in &expression.rest {
            self.compile_term(term)?;
            self.compile_binary_op(*op)?;
        }
        Ok(())
    }

    fn compile_binary_op(&mut self, op: BinaryOp) -> Result<(), CompileError> {
        match op {
            BinaryOp::Add => self.vm.write_arithmetic(VmOp::Add),
            BinaryOp::Sub => self.vm.write_arithmetic(VmOp::Sub),
            BinaryOp::And => self.vm.write_arithmetic(VmOp::And),
            BinaryOp::Or => self.vm.write_arithmetic(VmOp::Or),
            BinaryOp::Lt => self.vm.write_arithmetic(VmOp::Lt),
            BinaryOp::Gt => self.vm.write_arithmetic(VmOp::Gt),
            BinaryOp::Eq => self.vm.write_arithmetic(VmOp::Eq),
            BinaryOp::Mul => self.vm.write_call("Math.multiply", 2),
            BinaryOp::Div => self.vm.write_call("Math.divide", 2),
        }
    }

    fn compile_term(&mut self, term: &Term) -> Result<(), CompileError> {
        match term {
            Term::IntConst(n) => self.vm.write_push(Segment::Constant, *n),
            Term::StringConst(s) => self.compile_string(s),
            Term::KeywordConst(constant) => match constant {
                KeywordConst::True => {
                    self.vm.write_push(Segment::Constant, 0)?;
                    self.vm.write_arithmetic(VmOp::Not)
                }
                KeywordConst::False | KeywordConst::Null => {
                    self.vm.write_push(Segment::Constant, 0)
                }
                KeywordConst::This => self.vm.write_push(Segment::Pointer, 0),
            },
            Term::Var(name) => {
                let (segment, index) = self.resolve(name)?;
                self.vm.write_push(segment, index)
            }
            Term::IndexedVar(name, index) => {
                let (segment, idx) = self.resolve(name)?;
                self.vm.write_push(segment, idx)?;
                self.compile_expression(index)?;
                self.vm.write_arithmetic(VmOp::Add)?;
                self.vm.write_pop(Segment::Pointer, 1)?;
                self.vm.write_push(Segment::That, 0)
            }
            Term::Call(call) => self.compile_call(call),
            Term::Paren(expression) => self.compile_expression(expression),
            Term::Unary(op, operand) => {
                self.compile_term(operand)?;
                match op {
                    UnaryOp::Neg => self.vm.write_arithmetic(VmOp::Neg),
                    UnaryOp::Not => self.vm.write_arithmetic(VmOp::Not),
                }
            }
        }
    }

    /// Builds a string object, appending one character at a time.
    fn compile_string(&mut self, value: &str) -> Result<(), CompileError> {
        let length = value.chars().count() as u16;
        self.vm.write_push(Segment::Constant, length)?;
        self.vm.write_call("String.new", 1)?;
        for ch in value.chars() {
            self.vm.write_push(Segment::Constant, ch as u16)?;
            self.vm.write_call("String.appendChar", 2)?;
        }
        Ok(())
    }

    /// The three call forms:
    /// - `sub(args)`: method on the current object
    /// - `name.sub(args)` with `name` in the symbol table: method on that
    ///   object
    /// - `Name.sub(args)` otherwise: `Name` is a class
    fn compile_call(&mut self, call: &SubroutineCall) -> Result<(), CompileError> {
        let n_args = call.args.len() as u16;

        match &call.receiver {
            None => {
                self.vm.write_push(Segment::Pointer, 0)?;
                self.compile_arguments(&call.args)?;
                let target = format!("{}.{}", self.symbols.class_name(), call.name);
                self.vm.write_call(&target, n_args + 1)
            }
            Some(receiver) => {
                let resolved = self
                    .symbols
                    .get(receiver)
                    .map(|s| (s.kind, s.index, s.ty.to_string()));

                match resolved {
                    Some((kind, index, type_name)) => {
                        self.vm.write_push(segment_of(kind), index)?;
                        self.compile_arguments(&call.args)?;
                        let target = format!("{}.{}", type_name, call.name);
                        self.vm.write_call(&target, n_args + 1)
                    }
                    None => {
                        self.compile_arguments(&call.args)?;
                        let target = format!("{}.{}", receiver, call.name);
                        self.vm.write_call(&target, n_args)
                    }
                }
            }
        }
    }

    fn compile_arguments(&mut self, args: &[Expression]) -> Result<(), CompileError> {
        for arg in args {
            self.compile_expression(arg)?;
        }
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<(Segment, u16), CompileError> {
        let kind = self.symbols.kind_of(name).ok_or_else(|| {
            CompileError::semantic(format!(
                "unknown identifier '{}' in {}.{}",
                name,
                self.symbols.class_name(),
                self.current_subroutine
            ))
        })?;
        Ok((segment_of(kind), self.symbols.index_of(name)?))
    }

    fn make_label(&self, prefix: &str, n: u16) -> String {
        format!(
            "{}.{}.{}.{}",
            self.symbols.class_name(),
            self.current_subroutine,
            prefix,
            n
        )
    }

    fn next_label_index(&mut self) -> u16 {
        let n = self.label_index;
        self.label_index += 1;
        n
    }
}

/// Symbol kind to VM segment.
fn segment_of(kind: SymbolKind) -> Segment {
    match kind {
        SymbolKind::Var => Segment::Local,
        SymbolKind::Arg => Segment::Argument,
        SymbolKind::Field => Segment::This,
        SymbolKind::Static => Segment::Static,
    }
}
