use super::*;

const SAMPLE: &str = "BEGIN:VCALENDAR\r\n\
PRODID:-//Example//EN\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
UID:abc-1\r\n\
SUMMARY:Team sync\\, weekly\r\n\
DESCRIPTION:Agenda:\\n1. status\\n2. blockers\r\n\
DTSTART:20240611T100000\r\n\
DTEND:20240611T110000\r\n\
RRULE:FREQ=WEEKLY;BYDAY=TU,TH\r\n\
BEGIN:VALARM\r\n\
TRIGGER:-PT15M\r\n\
END:VALARM\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

#[test]
fn builds_component_tree() {
    let doc = parse(SAMPLE).expect("sample should parse");
    let root = doc.root();
    assert_eq!(root.kind(), "vcalendar");
    assert_eq!(root.value("PRODID"), "-//Example//EN");

    let events: Vec<_> = doc.events().collect();
    assert_eq!(events.len(), 1);
    let event = events[0];
    assert_eq!(event.value("UID"), "abc-1");
    assert_eq!(event.value("SUMMARY"), "Team sync, weekly");
    assert_eq!(event.value("DESCRIPTION"), "Agenda:\n1. status\n2. blockers");
    assert_eq!(event.children().len(), 1);
    assert_eq!(event.children()[0].kind(), "valarm");
}

#[test]
fn structured_values_are_kept_raw() {
    let doc = parse(SAMPLE).unwrap();
    let event = doc.events().next().unwrap();
    assert_eq!(event.value("RRULE"), "FREQ=WEEKLY;BYDAY=TU,TH");
}

#[test]
fn unfolds_space_and_tab_continuations() {
    let text = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nSUMMARY:A long\n  title that\n\tcontinues\nEND:VEVENT\nEND:VCALENDAR\n";
    let doc = parse(text).unwrap();
    let event = doc.events().next().unwrap();
    assert_eq!(event.value("SUMMARY"), "A long title thatcontinues");
}

#[test]
fn unfold_reports_logical_line_numbers() {
    let lines = unfold("A:1\r\n B\r\nC:2");
    assert_eq!(lines, vec![(1, "A:1B".to_string()), (3, "C:2".to_string())]);
}

#[test]
fn splits_params_and_quoted_colons() {
    let line = split_content_line(r#"DTSTART;VALUE=DATE;X-URL="http://x":20240101"#).unwrap();
    assert_eq!(line.name, "DTSTART");
    assert_eq!(line.params, r#"VALUE=DATE;X-URL="http://x""#);
    assert_eq!(line.value, "20240101");

    let line = split_content_line("DESCRIPTION:time 10:30").unwrap();
    assert_eq!(line.value, "time 10:30");

    let line = split_content_line(r"X-A\:B;P=1:val:ue").unwrap();
    assert_eq!(line.name, r"X-A\:B");
    assert_eq!(line.params, "P=1");
    assert_eq!(line.value, "val:ue");

    let line = split_content_line(r"X-C;P=a\:b:v").unwrap();
    assert_eq!(line.name, "X-C");
    assert_eq!(line.params, r"P=a\:b");
    assert_eq!(line.value, "v");

    assert!(split_content_line("no colon here").is_none());
    assert!(split_content_line(":value without name").is_none());
}

#[test]
fn repeated_properties_are_appended() {
    let text = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nCOMMENT:one\nCOMMENT:two\nEND:VEVENT\nEND:VCALENDAR";
    let doc = parse(text).unwrap();
    let event = doc.events().next().unwrap();
    let comments: Vec<_> = event
        .property_values("COMMENT")
        .iter()
        .map(|v| v.value.as_str())
        .collect();
    assert_eq!(comments, vec!["one", "two"]);
}

#[test]
fn mismatched_end_fails() {
    let text = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nEND:VTODO\nEND:VCALENDAR";
    assert_eq!(
        parse(text),
        Err(ParseError::MismatchedEnd {
            line: 3,
            expected: "VEVENT".into(),
            found: "VTODO".into(),
        })
    );
}

#[test]
fn unterminated_component_fails() {
    let text = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nSUMMARY:x\n";
    assert!(matches!(
        parse(text),
        Err(ParseError::Unterminated { line: 2, ref kind }) if kind == "VEVENT"
    ));
}

#[test]
fn stray_end_fails() {
    assert!(matches!(
        parse("END:VCALENDAR"),
        Err(ParseError::UnexpectedEnd { line: 1, .. })
    ));
}

#[test]
fn empty_input_fails() {
    assert_eq!(parse(""), Err(ParseError::Empty));
    assert_eq!(parse("\r\n\r\n"), Err(ParseError::Empty));
    assert_eq!(parse("SUMMARY:orphan\n"), Err(ParseError::Empty));
}

#[test]
fn bare_event_is_not_a_calendar() {
    let text = "BEGIN:VEVENT\nSUMMARY:x\nEND:VEVENT";
    assert_eq!(parse(text), Err(ParseError::NotACalendar("VEVENT".into())));
}

#[test]
fn tolerates_junk_lines_and_extra_roots() {
    let text = "garbage before\nBEGIN:VCALENDAR\nnot a content line\nBEGIN:VEVENT\nUID:1\nEND:VEVENT\nEND:VCALENDAR\nBEGIN:VCALENDAR\nBEGIN:VEVENT\nUID:2\nEND:VEVENT\nEND:VCALENDAR\n";
    let doc = parse(text).unwrap();
    let uids: Vec<_> = doc.events().map(|e| e.value("UID")).collect();
    assert_eq!(uids, vec!["1"]);
}

#[test]
fn names_are_case_insensitive() {
    let text = "begin:vcalendar\nbegin:vevent\nsummary:lower\nend:VEVENT\nEND:vcalendar";
    let doc = parse(text).unwrap();
    assert_eq!(doc.events().next().unwrap().value("SUMMARY"), "lower");
}
