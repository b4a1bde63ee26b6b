//! End-to-end compiler checks: Jack source through the full toolchain.

use jack_compiler::compile_source;

/// Sends compiler output through the VM translator and the assembler,
/// returning the binary program. A failure at any stage panics.
fn compile_through_pipeline(vm_code: &str, unit: &str) -> Vec<String> {
    let units = vec![(unit.to_string(), vm_code.to_string())];
    let mut asm = Vec::new();
    hack_vm_translator::translate_units(&units, unit, &mut asm)
        .expect("VM code must translate");

    let asm_lines: Vec<String> = String::from_utf8(asm)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    hack_assembler::assemble(&asm_lines).expect("assembly must assemble")
}

#[test]
fn string_constant_assignment() {
    let source = r#"
class Main {
    function void main() {
        var String x;
        let x = "hi";
        return;
    }
}
"#;
    let vm = compile_source(source).unwrap();
    let expected = "push constant 2\n\
                    call String.new 1\n\
                    push constant 104\n\
                    call String.appendChar 2\n\
                    push constant 105\n\
                    call String.appendChar 2\n\
                    pop local 0\n";
    assert!(vm.contains(expected), "unexpected VM code:\n{vm}");
}

#[test]
fn method_call_on_field() {
    let source = "
class Game {
    field Point p;
    method void step() {
        do p.move(1, 2);
        return;
    }
}
";
    let vm = compile_source(source).unwrap();
    let expected = "push this 0\n\
                    push constant 1\n\
                    push constant 2\n\
                    call Point.move 3\n\
                    pop temp 0\n";
    assert!(vm.contains(expected), "unexpected VM code:\n{vm}");
}

#[test]
fn push_count_before_every_call() {
    // Every `call f n` must be preceded by exactly n pushes for its
    // arguments (receiver included when synthesized).
    let source = "
class Calc {
    function int apply(int a, int b) {
        return (a * b) + Calc.helper(a, b, 3);
    }
    function int helper(int x, int y, int z) {
        return x + y + z;
    }
}
";
    let vm = compile_source(source).unwrap();

    for (line_no, line) in vm.lines().enumerate() {
        if let Some(rest) = line.strip_prefix("call ") {
            let n: usize = rest.split_whitespace().nth(1).unwrap().parse().unwrap();
            let preceding: Vec<&str> = vm.lines().take(line_no).collect();
            let pushes = preceding
                .iter()
                .rev()
                .take(n)
                .filter(|l| l.starts_with("push "))
                .count();
            assert_eq!(pushes, n, "call '{line}' not preceded by {n} pushes");
        }
    }
}

#[test]
fn if_without_else_emits_no_orphan_labels() {
    let source = "
class T {
    function void f(int x) {
        if (x = 0) { do Output.println(); }
        while (x > 0) { }
        return;
    }
}
";
    let vm = compile_source(source).unwrap();

    // Every defined label is the target of exactly one jump, and every
    // jump targets a defined label.
    let mut defined = std::collections::HashSet::new();
    let mut referenced = std::collections::HashSet::new();
    for line in vm.lines() {
        if let Some(label) = line.strip_prefix("label ") {
            assert!(defined.insert(label.to_string()), "duplicate label {label}");
        } else if let Some(label) = line.strip_prefix("goto ") {
            referenced.insert(label.to_string());
        } else if let Some(label) = line.strip_prefix("if-goto ") {
            referenced.insert(label.to_string());
        }
    }
    assert_eq!(defined, referenced);
}

#[test]
fn full_pipeline_produces_executable_binary() {
    let source = "
class Sys {
    function void init() {
        var int total, i;
        let total = 0;
        let i = 1;
        while (~(i > 10)) {
            let total = total + i;
            let i = i + 1;
        }
        return;
    }
}
";
    let vm = compile_source(source).unwrap();
    let binary = compile_through_pipeline(&vm, "Sys");

    assert!(!binary.is_empty());
    for word in &binary {
        assert_eq!(word.len(), 16);
        assert!(word.bytes().all(|b| b == b'0' || b == b'1'));
    }
}

#[test]
fn object_class_compiles_through_pipeline() {
    let source = "
class Point {
    field int x, y;
    static int count;

    constructor Point new(int ax, int ay) {
        let x = ax;
        let y = ay;
        let count = count + 1;
        return this;
    }

    method int getX() { return x; }

    method int manhattan(Point other) {
        var int dx, dy;
        let dx = x - other.getX();
        if (dx < 0) { let dx = -dx; }
        let dy = y;
        return dx + dy;
    }
}
";
    let vm = compile_source(source).unwrap();

    // Constructor allocates two fields.
    assert!(vm.contains("push constant 2\ncall Memory.alloc 1\npop pointer 0\n"));
    // Static access compiles to the static segment.
    assert!(vm.contains("push static 0\npush constant 1\nadd\npop static 0\n"));
    // Method call on an argument dispatches on its declared type.
    assert!(vm.contains("push argument 1\ncall Point.getX 1\n"));

    let binary = compile_through_pipeline(&vm, "Point");
    assert!(!binary.is_empty());
}

#[test]
fn array_heavy_class_compiles() {
    let source = r#"
class Buffer {
    field Array data;
    field int size;

    method void fill(int value) {
        var int i;
        let i = 0;
        while (i < size) {
            let data[i] = value;
            let i = i + 1;
        }
        return;
    }

    method int at(int i) {
        return data[i];
    }
}
"#;
    let vm = compile_source(source).unwrap();
    assert!(vm.contains("pop pointer 1\npush temp 0\npop that 0\n"));

    let binary = compile_through_pipeline(&vm, "Buffer");
    assert!(!binary.is_empty());
}

#[test]
fn diagnostics_identify_position_and_cause() {
    let source = "class Main {\n    function void main() {\n        let x 1;\n    }\n}\n";
    let err = compile_source(source).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("line 3"), "got: {message}");
    assert!(message.contains("expected"), "got: {message}");
}
