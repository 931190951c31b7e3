// src/bin/fuzz_lex.rs
// Random inputs through the minimized and unminimized demo lexers; both must
// produce the same token stream (or both fail at the same byte).
//
//   FUZZ_SEED=<u64>    rng seed (default: time based, printed)
//   FUZZ_ITERS=<n>     number of cases (default 2000)
//   FUZZ_LEN=<n>       max characters per case (default 64)

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Result, bail};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tablegen::{
    Diagnostics, LexerConfig,
    dev::generator::{DEMO_CHARS, demo_spec, env_u64, env_usize, gen_source},
    lexer::{
        cpu::lex_on_cpu,
        tables::{LexerTables, build_lexer},
    },
};

fn main() -> Result<()> {
    let seed = env_u64(
        "FUZZ_SEED",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0),
    );
    let iters = env_usize("FUZZ_ITERS", 2000);
    let max_len = env_usize("FUZZ_LEN", 64).max(1);
    println!("[fuzz_lex] seed={seed} iters={iters} max_len={max_len}");

    let spec = demo_spec();
    let mut diags = Diagnostics::new();
    let full = build_lexer(&spec, &LexerConfig { minimize: false }, &mut diags)?;
    let min = build_lexer(&spec, &LexerConfig { minimize: true }, &mut diags)?;
    if diags.had_error() {
        bail!("demo language produced errors");
    }
    let full = LexerTables::from_dfa(&full, &spec);
    let min = LexerTables::from_dfa(&min, &spec);
    println!(
        "[fuzz_lex] states: {} unminimized, {} minimized",
        full.n_states, min.n_states
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let t0 = Instant::now();
    let mut rejected = 0usize;
    for i in 0..iters {
        let len = rng.random_range(1..=max_len);
        let src = gen_source(&mut rng, DEMO_CHARS, len);
        let a = lex_on_cpu(&full, &src, |_| false);
        let b = lex_on_cpu(&min, &src, |_| false);
        if a != b {
            eprintln!("[fuzz_lex] mismatch on case {i}: {src:?}");
            eprintln!("  unminimized: {a:?}");
            eprintln!("  minimized:   {b:?}");
            bail!("minimized lexer disagrees (seed={seed}, case={i})");
        }
        if a.is_err() {
            rejected += 1;
        }
    }
    println!(
        "[fuzz_lex] ok: {iters} cases ({rejected} rejected by both) in {:?}",
        t0.elapsed()
    );
    Ok(())
}
