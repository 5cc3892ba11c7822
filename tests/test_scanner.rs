use namesfile::diagnostics::{DiagnosticKind, Diagnostics};
use namesfile::scanner::{Delimiter, MAX_NAME, NameScanner};

fn read_all(source: &str) -> Vec<(String, Delimiter)> {
    let mut scanner = NameScanner::new(source.as_bytes());
    let mut diags = Diagnostics::default();
    let mut names = vec![];
    while let Some(name) = scanner.read_name(MAX_NAME, true, &mut diags).unwrap() {
        names.push((name, scanner.delimiter()));
    }
    assert!(diags.is_empty(), "unexpected diagnostics: {:?}", diags);
    names
}

#[test]
fn test_escaped_colon_is_not_a_delimiter() {
    let names = read_all("a\\:b: continuous\n");
    assert_eq!(
        names,
        vec![
            ("a:b".to_owned(), Delimiter::Colon),
            ("continuous".to_owned(), Delimiter::Newline),
        ]
    );
}

#[test]
fn test_escaped_comma_is_kept() {
    let names = read_all("a\\,b:\n");
    assert_eq!(names, vec![("a,b".to_owned(), Delimiter::Colon)]);
}

#[test]
fn test_whitespace_collapses_to_a_single_space() {
    let names = read_all("foo   bar:\n");
    assert_eq!(names, vec![("foo bar".to_owned(), Delimiter::Colon)]);

    let names = read_all("foo\t\t bar:\n");
    assert_eq!(names, vec![("foo bar".to_owned(), Delimiter::Colon)]);
}

#[test]
fn test_comment_runs_to_end_of_line() {
    let names = read_all("n1 | note\nn2:\n");
    assert_eq!(
        names,
        vec![
            ("n1".to_owned(), Delimiter::Newline),
            ("n2".to_owned(), Delimiter::Colon),
        ]
    );
}

#[test]
fn test_trailing_period_terminates_the_name() {
    let names = read_all("weight.\n");
    assert_eq!(names, vec![("weight".to_owned(), Delimiter::Newline)]);

    // A period before a comment is trailing too.
    let names = read_all("n1.| note\nn2:\n");
    assert_eq!(
        names,
        vec![
            ("n1".to_owned(), Delimiter::Newline),
            ("n2".to_owned(), Delimiter::Colon),
        ]
    );
}

#[test]
fn test_embedded_period_is_kept() {
    let names = read_all("v1.5:\n");
    assert_eq!(names, vec![("v1.5".to_owned(), Delimiter::Colon)]);
}

#[test]
fn test_assign_is_a_single_delimiter() {
    let mut scanner = NameScanner::new("area := height * 2 | half\n".as_bytes());
    let mut diags = Diagnostics::default();

    let name = scanner.read_name(MAX_NAME, true, &mut diags).unwrap();
    assert_eq!(name.as_deref(), Some("area"));
    assert_eq!(scanner.delimiter(), Delimiter::Assign);

    let definition = scanner.read_definition().unwrap();
    assert_eq!(definition, "height * 2");
    assert!(diags.is_empty());
}

#[test]
fn test_assign_does_not_span_lines() {
    let mut scanner = NameScanner::new("a:\n=b\n".as_bytes());
    let mut diags = Diagnostics::default();

    scanner.read_name(MAX_NAME, true, &mut diags).unwrap();
    assert_eq!(scanner.delimiter(), Delimiter::Colon);
}

#[test]
fn test_colon_ignored_when_not_a_delimiter() {
    let mut scanner = NameScanner::new("a:b\n".as_bytes());
    let mut diags = Diagnostics::default();

    let name = scanner.read_name(MAX_NAME, false, &mut diags).unwrap();
    assert_eq!(name.as_deref(), Some("a:b"));
    assert_eq!(scanner.delimiter(), Delimiter::Newline);
}

#[test]
fn test_comma_separated_names() {
    let names = read_all("x, y");
    assert_eq!(
        names,
        vec![
            ("x".to_owned(), Delimiter::Comma),
            ("y".to_owned(), Delimiter::EndOfInput),
        ]
    );
}

#[test]
fn test_missing_name_is_reported_and_parsing_continues() {
    let mut scanner = NameScanner::new(",x:\n".as_bytes());
    let mut diags = Diagnostics::default();

    let name = scanner.read_name(MAX_NAME, true, &mut diags).unwrap();
    assert_eq!(name.as_deref(), Some(""));
    assert_eq!(scanner.delimiter(), Delimiter::Comma);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags.items()[0].kind, DiagnosticKind::MissingName);
    assert!(!diags.items()[0].kind.is_fatal());

    let name = scanner.read_name(MAX_NAME, true, &mut diags).unwrap();
    assert_eq!(name.as_deref(), Some("x"));
    assert_eq!(scanner.delimiter(), Delimiter::Colon);
}

#[test]
fn test_too_long_name_is_reported_once_and_truncated() {
    let mut scanner = NameScanner::new("abcdefgh:\n".as_bytes());
    let mut diags = Diagnostics::default();

    let name = scanner.read_name(4, true, &mut diags).unwrap();
    assert_eq!(name.as_deref(), Some("abcd"));
    assert_eq!(scanner.delimiter(), Delimiter::Colon);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags.items()[0].kind, DiagnosticKind::TokenTooLong);
}

#[test]
fn test_line_counter_tracks_pulled_lines() {
    let mut scanner = NameScanner::new("a:\nb:\nc:\n".as_bytes());
    let mut diags = Diagnostics::default();

    while scanner
        .read_name(MAX_NAME, true, &mut diags)
        .unwrap()
        .is_some()
    {}
    assert_eq!(scanner.line(), 3);
}

#[test]
fn test_no_names_in_empty_input() {
    let mut scanner = NameScanner::new("  | only a comment\n\n".as_bytes());
    let mut diags = Diagnostics::default();

    let name = scanner.read_name(MAX_NAME, true, &mut diags).unwrap();
    assert_eq!(name, None);
    assert_eq!(scanner.delimiter(), Delimiter::EndOfInput);
    assert!(diags.is_empty());
}
