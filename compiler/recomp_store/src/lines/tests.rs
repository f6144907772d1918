use pretty_assertions::assert_eq;

use super::*;

#[test]
fn escape_round_trips_awkward_strings() {
    for s in ["plain", "", "a\\b", "two\nlines", "cr\r\n", "trailing\\"] {
        assert_eq!(unescape(&escape(s), 1).unwrap(), s);
        assert_eq!(unescape(&escape_key(s), 1).unwrap(), s);
    }
}

#[test]
fn escaped_values_have_no_newlines() {
    assert!(!escape("a\nb\rc").contains('\n'));
    assert!(!escape("a\nb\rc").contains('\r'));
}

#[test]
fn entries_split_at_first_unescaped_colon() {
    let text = write_entries([
        ("C:\\src\\Widget.java", "100".to_string()),
        ("base", "sha256:abc:def".to_string()),
    ]);
    let entries = read_entries(&text).unwrap();
    assert_eq!(
        entries,
        vec![
            ("C:\\src\\Widget.java".to_string(), "100".to_string()),
            ("base".to_string(), "sha256:abc:def".to_string()),
        ]
    );
}

#[test]
fn entry_without_colon_is_malformed() {
    let err = read_entries("ok:1\nbroken\n").unwrap_err();
    assert_eq!(
        err,
        DecodeError::MalformedLine {
            line: 2,
            reason: "expected `name:value`"
        }
    );
}

#[test]
fn bad_escape_is_malformed() {
    assert!(matches!(
        unescape("oops\\x", 3),
        Err(DecodeError::MalformedLine { line: 3, .. })
    ));
}

#[test]
fn lines_preserve_empty_strings_and_order() {
    let text = write_lines(["b", "", "a"]);
    assert_eq!(read_lines(&text).unwrap(), vec!["b", "", "a"]);
    assert!(read_lines("").unwrap().is_empty());
}
