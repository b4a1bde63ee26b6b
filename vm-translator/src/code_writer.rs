//! Assembly emission for VM commands.
//!
//! Every template operates on the stack at `SP` (next free slot). Pops
//! use `AM=M-1` to decrement and address in one instruction; `R13`/`R14`
//! serve as scratch registers for pop targets and the return frame.

use std::io::Write;
use std::path::Path;

use crate::error::TranslateError;

// Writes a fixed sequence of assembly lines in one call.
macro_rules! write_asm {
    ($writer:expr, $($line:literal)*) => {
        $writer.write_all(concat!($($line, "\n"),*).as_bytes())
    };
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Segment {
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
    Constant,
}

impl Segment {
    fn from_str(segment: &str) -> Option<Self> {
        match segment {
            "local" => Some(Segment::Local),
            "argument" => Some(Segment::Argument),
            "this" => Some(Segment::This),
            "that" => Some(Segment::That),
            "temp" => Some(Segment::Temp),
            "pointer" => Some(Segment::Pointer),
            "static" => Some(Segment::Static),
            "constant" => Some(Segment::Constant),
            _ => None,
        }
    }

    /// Base-pointer symbol for the four indirect segments.
    fn pointer_symbol(self) -> &'static str {
        match self {
            Segment::Local => "LCL",
            Segment::Argument => "ARG",
            Segment::This => "THIS",
            Segment::That => "THAT",
            _ => unreachable!("segment has no base pointer"),
        }
    }
}

/// Translates parsed VM commands into Hack assembly on an output sink.
pub struct CodeWriter<W: Write> {
    out: W,
    /// Current translation unit; scopes `static` addresses and generated
    /// labels. Starts as the output name so bootstrap labels have a home
    /// before the first file is set.
    unit: String,
    /// Enclosing `function` name; namespaces label/goto/if-goto targets.
    current_function: String,
    label_counter: usize,
}

impl<W: Write> CodeWriter<W> {
    pub fn new(out: W, name: &str) -> Self {
        CodeWriter {
            out,
            unit: name.to_string(),
            current_function: String::new(),
            label_counter: 0,
        }
    }

    /// Starts a new translation unit; `static i` now addresses
    /// `<stem>.<i>`.
    #[inline]
    pub fn set_file_name(&mut self, filename: &str) {
        let stem = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown");
        self.unit.clear();
        self.unit.push_str(stem);
    }

    /// Bootstrap: `SP = 256`, then call `Sys.init` with no arguments.
    pub fn write_init(&mut self) -> Result<(), TranslateError> {
        writeln!(self.out, "// bootstrap")?;
        write_asm!(self.out,
            "@256"
            "D=A"
            "@SP"
            "M=D"
        )?;
        self.write_call("Sys.init", 0)
    }

    pub fn write_arithmetic(&mut self, command: &str, line: usize) -> Result<(), TranslateError> {
        writeln!(self.out, "// {command}")?;

        match command {
            "add" => self.write_binary_op("M=D+M")?,
            "sub" => self.write_binary_op("M=M-D")?,
            "and" => self.write_binary_op("M=D&M")?,
            "or" => self.write_binary_op("M=D|M")?,
            "neg" => self.write_unary_op("M=-M")?,
            "not" => self.write_unary_op("M=!M")?,
            "eq" => self.write_comparison("JEQ", "EQ")?,
            "gt" => self.write_comparison("JGT", "GT")?,
            "lt" => self.write_comparison("JLT", "LT")?,
            _ => {
                return Err(TranslateError::UnknownCommand {
                    command: command.to_string(),
                    line,
                })
            }
        }

        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// Pops y into D, then applies `op` in place on x at the new stack top.
    #[inline]
    fn write_binary_op(&mut self, op: &str) -> Result<(), TranslateError> {
        write_asm!(self.out,
            "@SP"
            "AM=M-1"
            "D=M"
            "@SP"
            "AM=M-1"
        )?;
        writeln!(self.out, "{op}")?;
        write_asm!(self.out,
            "@SP"
            "M=M+1"
        )?;
        Ok(())
    }

    #[inline]
    fn write_unary_op(&mut self, op: &str) -> Result<(), TranslateError> {
        write_asm!(self.out,
            "@SP"
            "AM=M-1"
        )?;
        writeln!(self.out, "{op}")?;
        write_asm!(self.out,
            "@SP"
            "M=M+1"
        )?;
        Ok(())
    }

    /// Pops two values, computes x-y, and pushes -1 (true) or 0 (false)
    /// depending on `jump` applied to the difference.
    fn write_comparison(&mut self, jump: &str, prefix: &str) -> Result<(), TranslateError> {
        let n = self.next_label_index();
        let true_label = format!("{}.{}_TRUE.{}", self.unit, prefix, n);
        let end_label = format!("{}.{}_END.{}", self.unit, prefix, n);

        write_asm!(self.out,
            "@SP"
            "AM=M-1"
            "D=M"
            "@SP"
            "AM=M-1"
            "D=M-D"
        )?;
        writeln!(self.out, "@{true_label}")?;
        writeln!(self.out, "D;{jump}")?;
        write_asm!(self.out,
            "@SP"
            "A=M"
            "M=0"
        )?;
        writeln!(self.out, "@{end_label}")?;
        writeln!(self.out, "0;JMP")?;
        writeln!(self.out, "({true_label})")?;
        write_asm!(self.out,
            "@SP"
            "A=M"
            "M=-1"
        )?;
        writeln!(self.out, "({end_label})")?;
        write_asm!(self.out,
            "@SP"
            "M=M+1"
        )?;
        Ok(())
    }

    pub fn write_push(
        &mut self,
        segment: &str,
        index: u16,
        line: usize,
    ) -> Result<(), TranslateError> {
        writeln!(self.out, "// push {segment} {index}")?;

        match Segment::from_str(segment) {
            Some(Segment::Constant) => {
                writeln!(self.out, "@{index}")?;
                writeln!(self.out, "D=A")?;
                self.write_push_d()?;
            }
            Some(
                seg @ (Segment::Local | Segment::Argument | Segment::This | Segment::That),
            ) => {
                writeln!(self.out, "@{}", seg.pointer_symbol())?;
                writeln!(self.out, "D=M")?;
                writeln!(self.out, "@{index}")?;
                writeln!(self.out, "A=D+A")?;
                writeln!(self.out, "D=M")?;
                self.write_push_d()?;
            }
            Some(Segment::Temp) => {
                check_index(index, 8, line)?;
                writeln!(self.out, "@R5")?;
                writeln!(self.out, "D=A")?;
                writeln!(self.out, "@{index}")?;
                writeln!(self.out, "A=D+A")?;
                writeln!(self.out, "D=M")?;
                self.write_push_d()?;
            }
            Some(Segment::Pointer) => {
                check_index(index, 2, line)?;
                writeln!(self.out, "@THIS")?;
                writeln!(self.out, "D=A")?;
                writeln!(self.out, "@{index}")?;
                writeln!(self.out, "A=D+A")?;
                writeln!(self.out, "D=M")?;
                self.write_push_d()?;
            }
            Some(Segment::Static) => {
                writeln!(self.out, "@{}.{}", self.unit, index)?;
                writeln!(self.out, "D=M")?;
                self.write_push_d()?;
            }
            None => {
                return Err(TranslateError::UnknownSegment {
                    segment: segment.to_string(),
                    line,
                })
            }
        }

        self.out.write_all(b"\n")?;
        Ok(())
    }

    pub fn write_pop(
        &mut self,
        segment: &str,
        index: u16,
        line: usize,
    ) -> Result<(), TranslateError> {
        writeln!(self.out, "// pop {segment} {index}")?;

        match Segment::from_str(segment) {
            Some(
                seg @ (Segment::Local | Segment::Argument | Segment::This | Segment::That),
            ) => {
                writeln!(self.out, "@{}", seg.pointer_symbol())?;
                writeln!(self.out, "D=M")?;
                self.write_pop_to_address(index)?;
            }
            Some(Segment::Temp) => {
                check_index(index, 8, line)?;
                write_asm!(self.out,
                    "@R5"
                    "D=A"
                )?;
                self.write_pop_to_address(index)?;
            }
            Some(Segment::Pointer) => {
                check_index(index, 2, line)?;
                write_asm!(self.out,
                    "@THIS"
                    "D=A"
                )?;
                self.write_pop_to_address(index)?;
            }
            Some(Segment::Static) => {
                self.write_pop_to_d()?;
                writeln!(self.out, "@{}.{}", self.unit, index)?;
                writeln!(self.out, "M=D")?;
            }
            Some(Segment::Constant) => {
                return Err(TranslateError::PopFromConstant { line });
            }
            None => {
                return Err(TranslateError::UnknownSegment {
                    segment: segment.to_string(),
                    line,
                })
            }
        }

        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// With the segment base in D: computes base+index into R13, pops the
    /// stack top, and stores it at the saved address.
    fn write_pop_to_address(&mut self, index: u16) -> Result<(), TranslateError> {
        writeln!(self.out, "@{index}")?;
        write_asm!(self.out,
            "D=D+A"
            "@R13"
            "M=D"
        )?;
        self.write_pop_to_d()?;
        write_asm!(self.out,
            "@R13"
            "A=M"
            "M=D"
        )?;
        Ok(())
    }

    /// `label L`: define a jump target, namespaced by the enclosing
    /// function.
    pub fn write_label(&mut self, label: &str) -> Result<(), TranslateError> {
        writeln!(self.out, "// label {label}")?;
        writeln!(self.out, "({})", self.scoped_label(label))?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// `goto L`: unconditional jump.
    pub fn write_goto(&mut self, label: &str) -> Result<(), TranslateError> {
        writeln!(self.out, "// goto {label}")?;
        writeln!(self.out, "@{}", self.scoped_label(label))?;
        writeln!(self.out, "0;JMP")?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// `if-goto L`: pop, jump if nonzero.
    pub fn write_if(&mut self, label: &str) -> Result<(), TranslateError> {
        writeln!(self.out, "// if-goto {label}")?;
        self.write_pop_to_d()?;
        writeln!(self.out, "@{}", self.scoped_label(label))?;
        writeln!(self.out, "D;JNE")?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// `call f n`: push the return address and the caller's frame, reseat
    /// ARG and LCL, jump to `f`, and define the return label.
    pub fn write_call(&mut self, name: &str, n_args: u16) -> Result<(), TranslateError> {
        writeln!(self.out, "// call {name} {n_args}")?;

        let label_index = self.next_label_index();
        let ret_label = format!("{}.RET.{}", self.unit, label_index);

        writeln!(self.out, "@{ret_label}")?;
        writeln!(self.out, "D=A")?;
        self.write_push_d()?;

        for pointer in ["LCL", "ARG", "THIS", "THAT"] {
            writeln!(self.out, "@{pointer}")?;
            writeln!(self.out, "D=M")?;
            self.write_push_d()?;
        }

        // ARG = SP - n - 5
        write_asm!(self.out,
            "@SP"
            "D=M"
            "@5"
            "D=D-A"
        )?;
        writeln!(self.out, "@{n_args}")?;
        write_asm!(self.out,
            "D=D-A"
            "@ARG"
            "M=D"
        )?;

        // LCL = SP
        write_asm!(self.out,
            "@SP"
            "D=M"
            "@LCL"
            "M=D"
        )?;

        writeln!(self.out, "@{name}")?;
        writeln!(self.out, "0;JMP")?;
        writeln!(self.out, "({ret_label})")?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// `function f k`: define the entry label and zero-initialize k local
    /// slots.
    pub fn write_function(&mut self, name: &str, n_locals: u16) -> Result<(), TranslateError> {
        writeln!(self.out, "// function {name} {n_locals}")?;
        writeln!(self.out, "({name})")?;

        for _ in 0..n_locals {
            write_asm!(self.out,
                "@SP"
                "A=M"
                "M=0"
                "@SP"
                "M=M+1"
            )?;
        }

        self.current_function.clear();
        self.current_function.push_str(name);
        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// `return`: copy the return value into the caller's arg 0 slot,
    /// restore the saved frame, and jump to the saved return address.
    pub fn write_return(&mut self) -> Result<(), TranslateError> {
        writeln!(self.out, "// return")?;

        // R13 = frame, R14 = return address = *(frame - 5)
        write_asm!(self.out,
            "@LCL"
            "D=M"
            "@R13"
            "M=D"
            "@5"
            "D=A"
            "@R13"
            "A=M-D"
            "D=M"
            "@R14"
            "M=D"
        )?;

        // *ARG = pop(); SP = ARG + 1
        write_asm!(self.out,
            "@SP"
            "AM=M-1"
            "D=M"
            "@ARG"
            "A=M"
            "M=D"
            "@ARG"
            "D=M+1"
            "@SP"
            "M=D"
        )?;

        self.write_frame_restore("THAT", 1)?;
        self.write_frame_restore("THIS", 2)?;
        self.write_frame_restore("ARG", 3)?;
        self.write_frame_restore("LCL", 4)?;

        write_asm!(self.out,
            "@R14"
            "A=M"
            "0;JMP"
        )?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// `segment = *(frame - offset)`, with the frame base in R13.
    fn write_frame_restore(
        &mut self,
        segment: &'static str,
        offset: u16,
    ) -> Result<(), TranslateError> {
        writeln!(self.out, "@{offset}")?;
        write_asm!(self.out,
            "D=A"
            "@R13"
            "A=M-D"
            "D=M"
        )?;
        writeln!(self.out, "@{segment}")?;
        writeln!(self.out, "M=D")?;
        Ok(())
    }

    #[inline]
    fn write_push_d(&mut self) -> Result<(), TranslateError> {
        write_asm!(self.out,
            "@SP"
            "A=M"
            "M=D"
            "@SP"
            "M=M+1"
        )?;
        Ok(())
    }

    #[inline]
    fn write_pop_to_d(&mut self) -> Result<(), TranslateError> {
        write_asm!(self.out,
            "@SP"
            "AM=M-1"
            "D=M"
        )?;
        Ok(())
    }

    #[inline]
    fn scoped_label(&self, label: &str) -> String {
        if self.current_function.is_empty() {
            label.to_string()
        } else {
            format!("{}${}", self.current_function, label)
        }
    }

    #[inline]
    fn next_label_index(&mut self) -> usize {
        let n = self.label_counter;
        self.label_counter += 1;
        n
    }

    #[inline]
    pub fn close(&mut self) -> Result<(), TranslateError> {
        self.out.flush()?;
        Ok(())
    }

    /// Consumes the writer, handing back the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

fn check_index(index: u16, limit: u16, line: usize) -> Result<(), TranslateError> {
    if index < limit {
        Ok(())
    } else {
        Err(TranslateError::InvalidIndex {
            value: index.to_string(),
            line,
        })
    }
}
