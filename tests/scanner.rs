//! End-to-end scanning scenarios.

use munch::prelude::*;
use munch::scanner::Scanner;

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Str(String),
    Int(i64),
    Float(f64),
}

fn str_type(name: &str, pattern: &str) -> TokenType<Value> {
    TokenType::new(
        name,
        RegEx::parse(pattern).unwrap(),
        |s: &str| Value::Str(s.to_string()),
        |v: &Value| match v {
            Value::Str(s) => s.clone(),
            other => panic!("not a string value: {other:?}"),
        },
    )
    .unwrap()
}

fn lex(scanner: &Scanner<Value>, input: &str) -> Vec<(String, String)> {
    let mut stream = TextStream::new(input);
    scanner
        .scan(&mut stream)
        .map(|t| {
            (
                scanner.token_type(t.type_id()).name().to_string(),
                t.lexeme().to_string(),
            )
        })
        .collect()
}

fn language_scanner() -> Scanner<Value> {
    let mut b = ScannerBuilder::new();
    b.token(str_type("fun", "fun"));
    b.token(str_type("function", "function"));
    b.token(str_type("identifier", "[a-zA-Z][a-zA-Z0-9]*"));
    b.token(
        TokenType::new(
            "integer",
            RegEx::parse("[0-9]+").unwrap(),
            |s: &str| Value::Int(s.parse().unwrap_or(0)),
            |v: &Value| match v {
                Value::Int(i) => i.to_string(),
                other => panic!("not an integer value: {other:?}"),
            },
        )
        .unwrap(),
    );
    b.token(
        TokenType::new(
            "float",
            RegEx::parse("[0-9]*\\.[0-9]+").unwrap(),
            |s: &str| Value::Float(s.parse().unwrap_or(0.0)),
            |v: &Value| match v {
                Value::Float(x) => x.to_string(),
                other => panic!("not a float value: {other:?}"),
            },
        )
        .unwrap(),
    );
    b.token(str_type("whitespace", "[ \t\r\n]+"));
    b.build()
}

#[test]
fn keywords_identifiers_and_numbers() {
    let scanner = language_scanner();
    assert_eq!(
        lex(&scanner, "funstuff\n\r123.456"),
        vec![
            ("identifier".into(), "funstuff".into()),
            ("whitespace".into(), "\n\r".into()),
            ("float".into(), "123.456".into()),
            ("EOF".into(), "EOF".into()),
        ]
    );
}

#[test]
fn parsed_values_ride_along() {
    let scanner = language_scanner();
    let mut stream = TextStream::new("fun 12 3.5");
    let values: Vec<Option<Value>> = scanner
        .scan(&mut stream)
        .map(Token::into_value)
        .collect();
    assert_eq!(
        values,
        vec![
            Some(Value::Str("fun".into())),
            Some(Value::Str(" ".into())),
            Some(Value::Int(12)),
            Some(Value::Str(" ".into())),
            Some(Value::Float(3.5)),
            None, // EOF carries no value
        ]
    );
}

#[test]
fn longest_match_beats_declaration_order() {
    let scanner = language_scanner();
    // "fun" is declared first but "funstuff" is longer
    assert_eq!(lex(&scanner, "funstuff")[0].0, "identifier");
    // a keyword on its own still wins its tie against identifier
    assert_eq!(lex(&scanner, "fun")[0].0, "fun");
    assert_eq!(lex(&scanner, "function")[0].0, "function");
    // one character past the longer keyword falls back to identifier
    assert_eq!(lex(&scanner, "functionx")[0].0, "identifier");
}

#[test]
fn operators_with_shared_prefixes() {
    let mut b = ScannerBuilder::new();
    b.token(str_type("opEq", "="));
    b.token(str_type("opNotEq", "!="));
    let scanner = b.build();
    assert_eq!(
        lex(&scanner, "==!="),
        vec![
            ("opEq".into(), "=".into()),
            ("opEq".into(), "=".into()),
            ("opNotEq".into(), "!=".into()),
            ("EOF".into(), "EOF".into()),
        ]
    );
}

#[test]
fn unmatched_prefix_becomes_an_error_token() {
    let scanner = language_scanner();
    assert_eq!(
        lex(&scanner, ":hello"),
        vec![
            ("ERROR".into(), ":".into()),
            ("identifier".into(), "hello".into()),
            ("EOF".into(), "EOF".into()),
        ]
    );
}

#[test]
fn comments_and_unterminated_tails() {
    let mut b = ScannerBuilder::new();
    b.token(str_type("comment", "\\{[^{}]*\\}"));
    b.token(str_type("identifier", "[a-zA-Z]+"));
    let scanner = b.build();

    assert_eq!(
        lex(&scanner, "{ incomplete --> }{ ...eof"),
        vec![
            ("comment".into(), "{ incomplete --> }".into()),
            ("ERROR".into(), "{ ...eof".into()),
            ("EOF".into(), "EOF".into()),
        ]
    );
}

#[test]
fn partial_match_is_committed_as_error() {
    let mut b = ScannerBuilder::new();
    b.token(str_type("comment", "\\{[^{}]*\\}"));
    let scanner = b.build();

    // the first "{ " run never reaches an accept state, so it ends up
    // as an error lexeme and scanning resumes at the second brace
    assert_eq!(
        lex(&scanner, "{ { }"),
        vec![
            ("ERROR".into(), "{ ".into()),
            ("comment".into(), "{ }".into()),
            ("EOF".into(), "EOF".into()),
        ]
    );
}

#[test]
fn trailing_rubbish_after_a_match() {
    let mut b = ScannerBuilder::new();
    b.token(str_type("comment", "\\{[^{}]*\\}"));
    let scanner = b.build();

    assert_eq!(
        lex(&scanner, "{ rubbish --> }@#$%"),
        vec![
            ("comment".into(), "{ rubbish --> }".into()),
            ("ERROR".into(), "@#$%".into()),
            ("EOF".into(), "EOF".into()),
        ]
    );
}

#[test]
fn arrows_and_operators() {
    let mut b = ScannerBuilder::new();
    b.token(str_type("operator", "[+*/-]"));
    b.token(str_type("arrowRight", "-->"));
    b.token(str_type("arrowLeft", "<--"));
    b.token(str_type("opEq", "="));
    let scanner = b.build();

    // '<' opens an arrow that never completes, so it is an error; the
    // rest scans as ordinary operators
    assert_eq!(
        lex(&scanner, "<=-"),
        vec![
            ("ERROR".into(), "<".into()),
            ("opEq".into(), "=".into()),
            ("operator".into(), "-".into()),
            ("EOF".into(), "EOF".into()),
        ]
    );

    // a '-' run resolves between operator and arrow by longest match
    assert_eq!(
        lex(&scanner, "-->-"),
        vec![
            ("arrowRight".into(), "-->".into()),
            ("operator".into(), "-".into()),
            ("EOF".into(), "EOF".into()),
        ]
    );
}

#[test]
fn overlapping_classes_share_their_overlap() {
    let re = RegEx::parse("[a-n]|[h-z]").unwrap();
    assert!(re.matches("m"));
    assert!(re.matches("b"));
    assert!(re.matches("y"));
    assert!(!re.matches("B"));
}

#[test]
fn positions_track_lines_and_columns() {
    let scanner = language_scanner();
    let mut stream = TextStream::new("fun\nstuff 12");
    let tokens: Vec<Token<Value>> = scanner.scan(&mut stream).collect();
    let positions: Vec<(u32, u32)> = tokens
        .iter()
        .map(|t| (t.position().line(), t.position().column()))
        .collect();
    assert_eq!(
        positions,
        vec![
            (1, 1), // fun
            (1, 4), // newline
            (2, 1), // stuff
            (2, 6), // space
            (2, 7), // 12
            (2, 9), // EOF
        ]
    );
}

#[test]
fn every_character_lands_in_exactly_one_lexeme() {
    let scanner = language_scanner();
    let input = "fun fun3.14@@@x 12.5.6..7 function\t{}";
    let tokens = lex(&scanner, input);
    let rebuilt: String = tokens
        .iter()
        .filter(|(name, _)| name != "EOF")
        .map(|(_, lexeme)| lexeme.as_str())
        .collect();
    assert_eq!(rebuilt, input);
}
