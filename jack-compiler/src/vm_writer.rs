//! Emission of VM commands, one per line.

use std::fmt;
use std::io::Write;

use crate::error::CompileError;

/// The eight VM memory segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            Segment::Constant => "constant",
            Segment::Argument => "argument",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        };
        write!(f, "{text}")
    }
}

/// The nine stack-arithmetic commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl fmt::Display for VmOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            VmOp::Add => "add",
            VmOp::Sub => "sub",
            VmOp::Neg => "neg",
            VmOp::Eq => "eq",
            VmOp::Gt => "gt",
            VmOp::Lt => "lt",
            VmOp::And => "and",
            VmOp::Or => "or",
            VmOp::Not => "not",
        };
        write!(f, "{text}")
    }
}

/// Writes VM commands to an output sink.
pub struct VmWriter<W: Write> {
    out: W,
}

impl<W: Write> VmWriter<W> {
    pub fn new(out: W) -> Self {
        VmWriter { out }
    }

    pub fn write_push(&mut self, segment: Segment, index: u16) -> Result<(), CompileError> {
        writeln!(self.out, "push {segment} {index}")?;
        Ok(())
    }

    pub fn write_pop(&mut self, segment: Segment, index: u16) -> Result<(), CompileError> {
        writeln!(self.out, "pop {segment} {index}")?;
        Ok(())
    }

    pub fn write_arithmetic(&mut self, op: VmOp) -> Result<(), CompileError> {
        writeln!(self.out, "{op}")?;
        Ok(())
    }

    pub fn write_label(&mut self, label: &str) -> Result<(), CompileError> {
        writeln!(self.out, "label {label}")?;
        Ok(())
    }

    pub fn write_goto(&mut self, label: &str) -> Result<(), CompileError> {
        writeln!(self.out, "goto {label}")?;
        Ok(())
    }

    pub fn write_if(&mut self, label: &str) -> Result<(), CompileError> {
        writeln!(self.out, "if-goto {label}")?;
        Ok(())
    }

    pub fn write_call(&mut self, name: &str, n_args: u16) -> Result<(), CompileError> {
        writeln!(self.out, "call {name} {n_args}")?;
        Ok(())
    }

    pub fn write_function(&mut self, name: &str, n_locals: u16) -> Result<(), CompileError> {
        writeln!(self.out, "function {name} {n_locals}")?;
        Ok(())
    }

    pub fn write_return(&mut self) -> Result<(), CompileError> {
        writeln!(self.out, "return")?;
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), CompileError> {
        self.out.flush()?;
        Ok(())
    }

    /// Consumes the writer, handing back the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}
