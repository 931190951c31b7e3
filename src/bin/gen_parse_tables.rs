// src/bin/gen_parse_tables.rs
// BNF grammar -> LALR(1) parse table (JSON).
//
// usage: gen_parse_tables <grammar.bnf> [out.json] [config.json]
//
// Grammar syntax:
//   <expr> ::= <expr> "+" <term> | <term>
//   <term> ::= "id" | "(" <expr> ")"
// Quoted strings are terminals, `""` is the empty string, and the first rule
// names the start symbol.

use std::{env, fs, path::PathBuf, time::Instant};

use anyhow::{Context, Result, anyhow, bail};
use tablegen::{
    Config, Diagnostics,
    parser::{
        bnf_input::grammar_from_bnf,
        tables::{ConflictKind, build_parser, save_parse_tables_json},
    },
};

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let grammar_path = args
        .next()
        .ok_or_else(|| anyhow!("usage: gen_parse_tables <grammar.bnf> [out.json] [config.json]"))?;
    let out_path = PathBuf::from(args.next().unwrap_or_else(|| "tables/parse_tables.json".into()));
    let config = match args.next() {
        Some(p) => Config::load(p.as_ref()).with_context(|| format!("reading config {p}"))?,
        None => Config::default(),
    }
    .with_env_overrides();

    let src = fs::read_to_string(&grammar_path).with_context(|| format!("reading {grammar_path}"))?;

    let t0 = Instant::now();
    let mut diags = Diagnostics::new();
    let table = grammar_from_bnf(&src, &mut diags)
        .and_then(|g| build_parser(&g, &config.parser, &mut diags));
    for d in diags.iter() {
        eprintln!("[gen_parse_tables] {d}");
    }
    let table = table?;
    if diags.had_error() {
        bail!("{} error(s); no table written", diags.errors().count());
    }

    if let Some(dir) = out_path.parent() {
        fs::create_dir_all(dir)?;
    }
    save_parse_tables_json(&out_path, &table)?;

    println!(
        "[gen_parse_tables] {} states, {} terminals, {} productions ({}) -> {} in {:?}",
        table.n_states(),
        table.terminal_names.len(),
        table.productions.len(),
        if config.parser.lalr { "LALR(1)" } else { "LR(1)" },
        out_path.display(),
        t0.elapsed()
    );
    if !table.conflicts.is_empty() {
        println!(
            "[gen_parse_tables] conflicts: {} shift/reduce, {} reduce/reduce, {} reduce/accept",
            table.conflicts_of(ConflictKind::ShiftReduce).count(),
            table.conflicts_of(ConflictKind::ReduceReduce).count(),
            table.conflicts_of(ConflictKind::ReduceAccept).count(),
        );
    }
    Ok(())
}
