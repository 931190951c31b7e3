//! Both pipelines together, plus configuration loading.

use tablegen::{
    Config, Diagnostics, GenError, Severity,
    dev::generator::demo_spec,
    generate,
    grammar::{Grammar, GrammarBuilder},
    lexer::{cpu::lex_on_cpu, tables::LexSpec},
    parser::cpu::parse_on_cpu,
};

fn statements() -> Grammar {
    // terminal names match the demo lexer's token names, in its order
    let spec = demo_spec();
    let names = spec.token_names();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    GrammarBuilder::new()
        .terminals(&names)
        .nonterminals(&["stmts", "stmt", "expr"])
        .production("stmts", &["stmts", "stmt"])
        .production("stmts", &[])
        .production("stmt", &["IDENT", "ASSIGN", "expr", "SEMI"])
        .production("stmt", &["WHILE", "LPAREN", "expr", "RPAREN", "LBRACE", "stmts", "RBRACE"])
        .production("expr", &["expr", "PLUS", "INT"])
        .production("expr", &["IDENT"])
        .production("expr", &["INT"])
        .build(&mut Diagnostics::new())
        .unwrap()
}

#[test]
fn generated_tables_lex_and_parse_a_program() {
    let _ = env_logger::builder().is_test(true).try_init();
    let spec = demo_spec();
    let grammar = statements();
    let mut diags = Diagnostics::new();
    let out = generate(&spec, &grammar, &Config::default(), &mut diags).unwrap();
    assert!(!diags.had_error());
    assert!(out.parser.conflicts.is_empty());

    let trivia = ["WHITE", "LINE_COMMENT", "BLOCK_COMMENT"];
    let src = "x = 1 + 2; // init\nwhile (x) { y = x + 40; }";
    let toks = lex_on_cpu(&out.lexer, src, |k| trivia.contains(&out.lexer.token_name(k)))
        .unwrap();
    let kinds: Vec<u32> = toks.iter().map(|t| t.kind).collect();
    let reductions = parse_on_cpu(&out.parser, &kinds).unwrap();
    assert_eq!(reductions.iter().filter(|&&p| p == 2).count(), 2);
    assert_eq!(reductions.iter().filter(|&&p| p == 3).count(), 1);

    let bad: Vec<u32> = lex_on_cpu(&out.lexer, "x = ;", |k| k == 7)
        .unwrap()
        .iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(parse_on_cpu(&out.parser, &bad).unwrap_err().position, 2);
}

#[test]
fn generate_collects_diagnostics_from_both_sides() {
    let spec = LexSpec::new()
        .token("A", tablegen::lexer::tables::Expr::lit("a"))
        .token("BROKEN", tablegen::lexer::tables::Expr::reference("nowhere"));
    let grammar = GrammarBuilder::new()
        .terminals(&["A"])
        .nonterminals(&["S"])
        .production("S", &["S", "A"])
        .production("S", &["A", "B"])
        .production("S", &["A"])
        .build(&mut Diagnostics::new())
        .unwrap();

    let mut diags = Diagnostics::new();
    let out = generate(&spec, &grammar, &Config::default(), &mut diags).unwrap();
    assert!(diags.had_error());
    assert_eq!(diags.errors().count(), 1);
    assert!(diags.iter().all(|d| d.severity == Severity::Error));
    assert_eq!(out.lexer.token_names.len(), 2);

    let empty = LexSpec::new();
    let err = generate(&empty, &grammar, &Config::default(), &mut diags)
        .err()
        .unwrap();
    assert!(matches!(err, GenError::NoTokens));
}

#[test]
fn config_defaults_and_partial_json() {
    let c = Config::default();
    assert!(c.lexer.minimize);
    assert!(c.parser.lalr);

    let c = Config::from_json_bytes(br#"{ "parser": { "lalr": false } }"#).unwrap();
    assert!(c.lexer.minimize);
    assert!(!c.parser.lalr);

    assert!(matches!(
        Config::from_json_bytes(b"{ nope").unwrap_err(),
        GenError::Json(_)
    ));
}

#[test]
fn grammar_round_trips_through_json() {
    let g = statements();
    let json = serde_json::to_string(&g).unwrap();
    let back: Grammar = serde_json::from_str(&json).unwrap();
    assert_eq!(back, g);
}
