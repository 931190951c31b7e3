//! Lexer pipeline properties: disjoint alphabet, deterministic DFA,
//! priority/maximal munch, minimization preserving the token language.
//!
//! Random cases are seeded from LEX_SEED (default fixed) and LEX_CASES.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tablegen::{
    Diagnostics, GenError, LexerConfig,
    dev::generator::{DEMO_CHARS, demo_spec, env_u64, env_usize, gen_source},
    lexer::{
        cpu::lex_on_cpu,
        tables::{
            Dfa, Expr, LexSpec, LexerTables, Range, RangeAlphabet, build_lexer,
            load_tables_bin_bytes, load_tables_json_bytes, minimize, save_tables_bin,
            save_tables_json,
        },
    },
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn build(spec: &LexSpec, minimize: bool) -> (Dfa, Diagnostics) {
    let mut diags = Diagnostics::new();
    let dfa = build_lexer(spec, &LexerConfig { minimize }, &mut diags).expect("lexer builds");
    (dfa, diags)
}

fn token_id(spec: &LexSpec, name: &str) -> u32 {
    spec.tokens
        .iter()
        .position(|t| t.name == name)
        .unwrap_or_else(|| panic!("no token {name}")) as u32
}

/// Number of Myhill-Nerode classes among the states of `dfa`, with missing
/// edges completed to a dead state (the dead state is counted as a class).
fn moore_classes(dfa: &Dfa) -> usize {
    let n = dfa.states.len();
    let k = dfa.alphabet.len();
    let dead = n;
    let target = |q: usize, sym: usize| -> usize {
        if q == dead {
            return dead;
        }
        dfa.states[q]
            .trans
            .get(&(sym as u32))
            .map(|&t| t as usize)
            .unwrap_or(dead)
    };

    let mut class: Vec<usize> = (0..=n)
        .map(|q| match (q < n).then(|| dfa.states[q].accept).flatten() {
            Some(tok) => tok as usize + 1,
            None => 0,
        })
        .collect();
    loop {
        let mut ids: BTreeMap<(usize, Vec<usize>), usize> = BTreeMap::new();
        let next: Vec<usize> = (0..=n)
            .map(|q| {
                let sig = (class[q], (0..k).map(|s| class[target(q, s)]).collect());
                let fresh = ids.len();
                *ids.entry(sig).or_insert(fresh)
            })
            .collect();
        let before = class.iter().collect::<std::collections::BTreeSet<_>>().len();
        let after = ids.len();
        class = next;
        if after == before {
            return after;
        }
    }
}

#[test]
fn alphabet_cuts_overlapping_ranges() {
    let input = [
        Range::chars('a', 'z'),
        Range::chars('m', 'p'),
        Range::single('x'),
    ];
    let alpha = RangeAlphabet::build(&input);
    let got: Vec<(u32, u32)> = alpha.ranges().iter().map(|r| (r.min, r.max)).collect();
    assert_eq!(
        got,
        vec![
            ('a' as u32, 'l' as u32),
            ('m' as u32, 'p' as u32),
            ('q' as u32, 'w' as u32),
            ('x' as u32, 'x' as u32),
            ('y' as u32, 'z' as u32),
        ]
    );

    assert_eq!(alpha.expand(Range::chars('a', 'z')), 0..5);
    assert_eq!(alpha.expand(Range::chars('m', 'p')), 1..2);
    assert_eq!(alpha.expand(Range::single('x')), 3..4);
    assert_eq!(alpha.symbol_of('n' as u32), Some(1));
    assert_eq!(alpha.symbol_of('A' as u32), None);
    assert_eq!(alpha.expansions().count(), 1);
}

#[test]
fn alphabet_of_demo_language_is_disjoint_and_tiles_every_literal() {
    let spec = demo_spec();
    let literals = spec.literal_ranges();
    let alpha = RangeAlphabet::build(&literals);

    for w in alpha.ranges().windows(2) {
        assert!(w[0].min <= w[0].max);
        assert!(w[0].max < w[1].min, "{:?} overlaps {:?}", w[0], w[1]);
    }
    for r in &literals {
        let span = alpha.expand(*r);
        assert!(!span.is_empty(), "{r:?} expands to nothing");
        assert_eq!(alpha.range(span.start).min, r.min);
        assert_eq!(alpha.range(span.end - 1).max, r.max);
        for s in span.start + 1..span.end {
            assert_eq!(alpha.range(s - 1).max + 1, alpha.range(s).min, "gap inside {r:?}");
        }
    }
}

#[test]
fn dfa_is_deterministic_over_the_alphabet() {
    init_logger();
    let (dfa, diags) = build(&demo_spec(), false);
    assert!(!diags.had_error());
    for w in dfa.alphabet.windows(2) {
        assert!(w[0].max < w[1].min);
    }
    for (s, st) in dfa.states.iter().enumerate() {
        for (&sym, &t) in &st.trans {
            assert!((sym as usize) < dfa.n_symbols(), "state {s}: bad symbol {sym}");
            assert!((t as usize) < dfa.n_states(), "state {s}: bad target {t}");
        }
    }
    assert!(dfa.states[dfa.start as usize].accept.is_none());
}

#[test]
fn keywords_win_ties_and_longest_match_wins_overall() {
    let spec = demo_spec();
    let (dfa, _) = build(&spec, true);
    let id = |n: &str| token_id(&spec, n);

    assert_eq!(dfa.matches("if"), Some(id("IF")));
    assert_eq!(dfa.matches("iff"), Some(id("IDENT")));
    assert_eq!(dfa.matches("else"), Some(id("ELSE")));
    assert_eq!(dfa.matches("elsewhere"), Some(id("IDENT")));
    assert_eq!(dfa.matches("i"), Some(id("IDENT")));
    assert_eq!(dfa.matches("9x"), None);

    assert_eq!(dfa.longest_match("if("), Some((id("IF"), 2)));
    assert_eq!(dfa.longest_match("iff+"), Some((id("IDENT"), 3)));
    assert_eq!(dfa.longest_match("==="), Some((id("EQEQ"), 2)));
    assert_eq!(dfa.longest_match("=x"), Some((id("ASSIGN"), 1)));
    assert_eq!(dfa.longest_match("12.5;"), Some((id("FLOAT"), 4)));
    assert_eq!(dfa.longest_match("12;"), Some((id("INT"), 2)));
    assert_eq!(dfa.longest_match("/* a ** b */x"), Some((id("BLOCK_COMMENT"), 12)));
    assert_eq!(dfa.longest_match("// hi\nx"), Some((id("LINE_COMMENT"), 5)));
    assert_eq!(dfa.longest_match("\"é\\\"\""), Some((id("STRING"), 6)));
    assert_eq!(dfa.longest_match("#"), None);
}

#[test]
fn cpu_lexer_skips_trivia_and_reports_the_failing_byte() {
    let spec = demo_spec();
    let (dfa, _) = build(&spec, true);
    let tables = LexerTables::from_dfa(&dfa, &spec);
    let trivia = [
        token_id(&spec, "WHITE"),
        token_id(&spec, "LINE_COMMENT"),
        token_id(&spec, "BLOCK_COMMENT"),
    ];

    let src = "if x == 12 /* c */ else";
    let toks = lex_on_cpu(&tables, src, |k| trivia.contains(&k)).expect("lexes");
    let names: Vec<&str> = toks.iter().map(|t| tables.token_name(t.kind)).collect();
    assert_eq!(names, ["IF", "IDENT", "EQEQ", "INT", "ELSE"]);
    assert_eq!(&src[toks[3].start..toks[3].start + toks[3].len], "12");

    let err = lex_on_cpu(&tables, "x # y", |_| false).unwrap_err();
    assert!(err.contains("byte 2"), "{err}");
}

#[test]
fn minimized_dfa_agrees_with_unminimized_on_random_inputs() {
    init_logger();
    let spec = demo_spec();
    let (full, _) = build(&spec, false);
    let (min, _) = build(&spec, true);
    assert!(min.n_states() <= full.n_states());

    let seed = env_u64("LEX_SEED", 0x5eed_1e8e);
    let cases = env_usize("LEX_CASES", 3000);
    let mut rng = StdRng::seed_from_u64(seed);
    for i in 0..cases {
        let len = rng.random_range(0..24);
        let src = gen_source(&mut rng, DEMO_CHARS, len);
        assert_eq!(full.matches(&src), min.matches(&src), "seed={seed} case={i} {src:?}");
        assert_eq!(
            full.longest_match(&src),
            min.longest_match(&src),
            "seed={seed} case={i} {src:?}"
        );
        assert_eq!(
            lex_on_cpu(&full, &src, |_| false),
            lex_on_cpu(&min, &src, |_| false),
            "seed={seed} case={i} {src:?}"
        );
    }
}

#[test]
fn minimized_dfa_is_minimal_and_stable() {
    let (min, _) = build(&demo_spec(), true);
    // every state distinguishable from every other and from the dead state
    assert_eq!(moore_classes(&min), min.n_states() + 1);

    let again = minimize(&min);
    assert_eq!(again.n_states(), min.n_states());

    // the only accept-free sink candidates were dropped
    for (s, st) in min.states.iter().enumerate() {
        if st.accept.is_none() {
            assert!(!st.trans.is_empty(), "state {s} is dead but kept");
        }
    }
}

#[test]
fn minimization_merges_equivalent_branches() {
    // (a|b)c* written so the subset construction keeps the branches apart
    let spec = LexSpec::new().token(
        "T",
        Expr::seq(vec![
            Expr::alt(vec![
                Expr::seq(vec![Expr::lit("a"), Expr::star(Expr::lit("c"))]),
                Expr::seq(vec![Expr::lit("b"), Expr::star(Expr::lit("c"))]),
            ]),
        ]),
    );
    let (full, _) = build(&spec, false);
    let (min, _) = build(&spec, true);
    assert!(full.n_states() > min.n_states());
    assert_eq!(min.n_states(), 2);
    for s in ["a", "b", "acc", "bc"] {
        assert_eq!(min.matches(s), Some(0), "{s}");
    }
    for s in ["", "c", "ab", "ca"] {
        assert_eq!(min.matches(s), None, "{s}");
    }
}

#[test]
fn fragments_are_copied_per_use() {
    let spec = LexSpec::new()
        .fragment("d", Expr::range('0', '9'))
        .token(
            "PAIR",
            Expr::seq(vec![Expr::reference("d"), Expr::lit(":"), Expr::reference("d")]),
        )
        .token("ONE", Expr::reference("d"));
    let (dfa, diags) = build(&spec, true);
    assert!(diags.is_empty());
    assert_eq!(dfa.matches("1:2"), Some(0));
    assert_eq!(dfa.matches("7"), Some(1));
    assert_eq!(dfa.matches("1:"), None);
    assert_eq!(dfa.matches("1:2:3"), None);
}

#[test]
fn tokens_may_reference_earlier_tokens() {
    let spec = LexSpec::new()
        .token("INT", Expr::plus(Expr::range('0', '9')))
        .token(
            "RANGE",
            Expr::seq(vec![Expr::reference("INT"), Expr::lit(".."), Expr::reference("INT")]),
        );
    let (dfa, diags) = build(&spec, true);
    assert!(!diags.had_error());
    assert_eq!(dfa.longest_match("10..20"), Some((1, 6)));
    assert_eq!(dfa.longest_match("10.."), Some((0, 2)));
}

#[test]
fn bad_definitions_are_reported_and_skipped() {
    init_logger();
    let spec = LexSpec::new()
        .fragment("a", Expr::seq(vec![Expr::lit("x"), Expr::reference("b")]))
        .fragment("b", Expr::opt(Expr::reference("a")))
        .token("CYCLE", Expr::reference("a"))
        .token("MISSING", Expr::seq(vec![Expr::lit("m"), Expr::reference("nope")]))
        .token("EMPTY", Expr::star(Expr::lit("e")))
        .token("OK", Expr::lit("ok"))
        .token("OK", Expr::lit("ko"));

    let mut diags = Diagnostics::new();
    let dfa = build_lexer(&spec, &LexerConfig::default(), &mut diags).expect("OK survives");
    assert!(diags.had_error());

    let errors: Vec<String> = diags.errors().map(|d| d.message.clone()).collect();
    let has = |needle: &str| errors.iter().any(|e| e.contains(needle));
    assert!(has("recursive reference"), "{errors:?}");
    assert!(has("undefined reference `nope`"), "{errors:?}");
    assert!(has("`EMPTY` can match the empty string"), "{errors:?}");
    assert!(has("duplicate definition `OK`"), "{errors:?}");

    assert_eq!(dfa.matches("ok"), Some(3));
    assert_eq!(dfa.matches("ko"), None);
    assert_eq!(dfa.matches("m"), None);
    assert_eq!(dfa.matches("ee"), None);
}

#[test]
fn structural_failures_are_fatal() {
    let mut diags = Diagnostics::new();
    let err = build_lexer(&LexSpec::new(), &LexerConfig::default(), &mut diags).unwrap_err();
    assert!(matches!(err, GenError::NoTokens));

    let spec = LexSpec::new().token("E", Expr::opt(Expr::lit("x")));
    let err = build_lexer(&spec, &LexerConfig::default(), &mut diags).unwrap_err();
    assert!(matches!(err, GenError::AllTokensRejected(1)));
}

#[test]
fn exported_tables_survive_json_and_binary() {
    let spec = demo_spec();
    let (dfa, _) = build(&spec, true);
    let tables = LexerTables::from_dfa(&dfa, &spec);

    let dir = std::env::temp_dir().join(format!("tablegen-lex-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let json = dir.join("lexer_tables.json");
    save_tables_json(&json, &tables).unwrap();
    let back = load_tables_json_bytes(&std::fs::read(&json).unwrap()).unwrap();
    assert_eq!(back, tables);

    let bin = dir.join("lexer_tables.bin");
    save_tables_bin(&bin, &tables).unwrap();
    let back = load_tables_bin_bytes(&std::fs::read(&bin).unwrap()).unwrap();
    assert_eq!(back.alphabet, tables.alphabet);
    assert_eq!(back.next, tables.next);
    assert_eq!(back.accept, tables.accept);
    assert_eq!(back.start, tables.start);
    assert!(back.token_names.is_empty());

    assert!(load_tables_bin_bytes(b"NOTMAGIC").is_err());

    // header claims a million states; the payload is a few bytes
    let mut huge = b"TGLEX001".to_vec();
    for v in [1_000_000u32, 1000, 0, 0] {
        huge.extend_from_slice(&v.to_le_bytes());
    }
    huge.extend_from_slice(&[0u8; 16]);
    let err = load_tables_bin_bytes(&huge).unwrap_err();
    assert!(err.contains("truncated"), "{err}");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn lexer_spec_reads_from_json() {
    let src = r#"{
        "fragments": [ { "name": "d", "expr": { "Ranges": [ { "min": 48, "max": 57 } ] } } ],
        "tokens": [
            { "name": "KW", "expr": { "Str": "let" } },
            { "name": "NUM", "expr": { "Plus": { "Ref": "d" } } }
        ]
    }"#;
    let spec: LexSpec = serde_json::from_str(src).unwrap();
    let (dfa, diags) = build(&spec, true);
    assert!(diags.is_empty());
    assert_eq!(dfa.matches("let"), Some(0));
    assert_eq!(dfa.matches("042"), Some(1));
}
