// src/bin/gen_lex_tables.rs
// Token definitions (JSON) -> lexer tables.
//
// usage: gen_lex_tables <spec.json> [out_dir] [config.json]
//
// Without a spec path the built-in demo language is used. Writes
// <out_dir>/lexer_tables.json and <out_dir>/lexer_tables.bin
// (default out_dir: "tables").

use std::{env, fs, path::PathBuf, time::Instant};

use anyhow::{Context, Result, bail};
use tablegen::{
    Config, Diagnostics,
    dev::generator::demo_spec,
    lexer::tables::{LexSpec, LexerTables, build_lexer, save_tables_bin, save_tables_json},
};

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let spec_path = args.next().filter(|a| a != "-");
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "tables".into()));
    let config = match args.next() {
        Some(p) => Config::load(p.as_ref()).with_context(|| format!("reading config {p}"))?,
        None => Config::default(),
    }
    .with_env_overrides();

    let spec: LexSpec = match &spec_path {
        Some(p) => {
            let bytes = fs::read(p).with_context(|| format!("reading {p}"))?;
            serde_json::from_slice(&bytes).with_context(|| format!("parsing {p}"))?
        }
        None => {
            println!("[gen_lex_tables] no spec given, using the demo language");
            demo_spec()
        }
    };

    let t0 = Instant::now();
    let mut diags = Diagnostics::new();
    let dfa = build_lexer(&spec, &config.lexer, &mut diags);
    for d in diags.iter() {
        eprintln!("[gen_lex_tables] {d}");
    }
    let dfa = dfa?;
    if diags.had_error() {
        bail!("{} error(s); no tables written", diags.errors().count());
    }

    let tables = LexerTables::from_dfa(&dfa, &spec);
    fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let json_path = out_dir.join("lexer_tables.json");
    let bin_path = out_dir.join("lexer_tables.bin");
    save_tables_json(&json_path, &tables)?;
    save_tables_bin(&bin_path, &tables)?;

    println!(
        "[gen_lex_tables] {} tokens, {} symbols, {} states (minimize={}) -> {}, {} in {:?}",
        tables.token_names.len(),
        tables.n_symbols,
        tables.n_states,
        config.lexer.minimize,
        json_path.display(),
        bin_path.display(),
        t0.elapsed()
    );
    Ok(())
}
