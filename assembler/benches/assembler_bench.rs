//! Assembler benchmarks.
//!
//! Measures the PHF encoding tables, parser throughput, symbol table
//! operations, and the full two-pass pipeline.
//!
//! Run with:
//! ```bash
//! cargo bench
//! cargo bench --bench assembler_bench -- --save-baseline master
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use hack_assembler::{assemble, code, parser::ParserLines, symbol_table::SymbolTable};

/// PHF-based mnemonic lookups.
fn bench_code_lookups(c: &mut Criterion) {
    let mut group = c.benchmark_group("code_lookups");
    group.throughput(Throughput::Elements(4));

    group.bench_function("dest_lookup_hot", |b| {
        b.iter(|| {
            black_box(code::dest("AMD"));
            black_box(code::dest("D"));
            black_box(code::dest("M"));
            black_box(code::dest(""));
        });
    });

    group.bench_function("comp_lookup_hot", |b| {
        b.iter(|| {
            black_box(code::comp("D+1"));
            black_box(code::comp("D&M"));
            black_box(code::comp("M-D"));
            black_box(code::comp("0"));
        });
    });

    group.bench_function("encode_c_instruction_hot", |b| {
        b.iter(|| {
            black_box(code::encode_c_instruction("D", "D+1", "JMP"));
        });
    });

    group.finish();
}

/// A-instruction binary conversion.
fn bench_a_instruction(c: &mut Criterion) {
    let mut group = c.benchmark_group("a_instruction");

    group.bench_function("encode_small_address", |b| {
        b.iter(|| black_box(code::encode_a_instruction(100)));
    });

    group.bench_function("encode_max_address", |b| {
        b.iter(|| black_box(code::encode_a_instruction(32767)));
    });

    group.finish();
}

/// Symbol table operations.
fn bench_symbol_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("symbol_table");

    group.throughput(Throughput::Elements(3));
    group.bench_function("lookup_predefined_hot", |b| {
        let table = SymbolTable::new();
        b.iter(|| {
            black_box(table.get_address("SP"));
            black_box(table.get_address("R15"));
            black_box(table.get_address("SCREEN"));
        });
    });

    group.bench_function("get_or_insert_existing", |b| {
        let mut table = SymbolTable::new();
        table.add_entry("LOOP", 100);
        let mut ram_address = 16;
        b.iter(|| {
            black_box(table.get_or_insert("LOOP", &mut ram_address));
        });
    });

    group.finish();
}

/// Parser throughput over realistic command mixes.
fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    let lines_mixed: Vec<String> = vec![
        "@100".to_string(),
        "D=A".to_string(),
        "(LOOP)".to_string(),
        "D=D-1".to_string(),
        "@LOOP".to_string(),
        "D;JGT".to_string(),
    ];

    group.throughput(Throughput::Elements(lines_mixed.len() as u64));
    group.bench_function("parse_mixed_realistic", |b| {
        b.iter(|| {
            let mut parser = ParserLines::from_lines(&lines_mixed);
            while parser.advance().unwrap() {
                black_box(parser.command_type().unwrap());
            }
        });
    });

    let lines_with_comments: Vec<String> = vec![
        "@100 // This is a comment".to_string(),
        "D=D+1 // Another comment".to_string(),
        "// Full line comment".to_string(),
        "M=M+1".to_string(),
    ];

    group.throughput(Throughput::Elements(lines_with_comments.len() as u64));
    group.bench_function("parse_comment_stripping", |b| {
        b.iter(|| {
            let mut parser = ParserLines::from_lines(&lines_with_comments);
            while parser.advance().unwrap() {
                black_box(parser.command_type().unwrap());
            }
        });
    });

    group.finish();
}

/// Full two-pass pipeline, end to end.
fn bench_full_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_assembly");

    let medium_program: Vec<String> = vec![
        "@100".to_string(),
        "D=A".to_string(),
        "@i".to_string(),
        "M=D".to_string(),
        "(LOOP)".to_string(),
        "@i".to_string(),
        "D=M".to_string(),
        "@END".to_string(),
        "D;JEQ".to_string(),
        "@i".to_string(),
        "M=M-1".to_string(),
        "@LOOP".to_string(),
        "0;JMP".to_string(),
        "(END)".to_string(),
        "@END".to_string(),
        "0;JMP".to_string(),
    ];

    group.throughput(Throughput::Elements(medium_program.len() as u64));
    group.bench_function("pipeline_medium_16_lines", |b| {
        b.iter(|| assemble(black_box(&medium_program)).unwrap());
    });

    let large_program: Vec<String> = medium_program
        .iter()
        .cycle()
        .take(160)
        .cloned()
        .collect();

    // Cycling duplicates the labels; strip L-commands to keep it valid.
    let large_program: Vec<String> = large_program
        .into_iter()
        .filter(|l| !l.starts_with('('))
        .collect();

    group.throughput(Throughput::Elements(large_program.len() as u64));
    group.bench_function("pipeline_large_140_lines", |b| {
        b.iter(|| assemble(black_box(&large_program)).unwrap());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_code_lookups,
    bench_a_instruction,
    bench_symbol_table,
    bench_parser,
    bench_full_assembly
);
criterion_main!(benches);
