use papersmith_core::output_parsers::{extract_json_object, parse_json_object, strip_code_fences};
use papersmith_core::PapersmithError;

#[test]
fn strips_json_code_fence() {
    let raw = "```json\n{\"mcqs\": []}\n```";
    assert_eq!(strip_code_fences(raw), "{\"mcqs\": []}");
}

#[test]
fn strips_bare_code_fence() {
    let raw = "```\n{\"short\": []}\n```";
    assert_eq!(strip_code_fences(raw), "{\"short\": []}");
}

#[test]
fn extracts_object_surrounded_by_prose() {
    let raw = "Sure! Here are your questions:\n{\"long\": [{\"question\": \"q\"}]}\nGood luck.";
    assert_eq!(extract_json_object(raw), "{\"long\": [{\"question\": \"q\"}]}");
}

#[test]
fn parse_returns_object_value() {
    let value = parse_json_object("noise {\"fill_blanks\": [1, 2]} noise").unwrap();
    assert_eq!(value["fill_blanks"].as_array().map(Vec::len), Some(2));
}

#[test]
fn parse_rejects_non_object_payloads() {
    let err = parse_json_object("[1, 2, 3]").unwrap_err();
    assert!(matches!(err, PapersmithError::ParseFailed { .. }));
}

#[test]
fn parse_reports_malformed_json() {
    let err = parse_json_object("{\"mcqs\": [}").unwrap_err();
    match err {
        PapersmithError::ParseFailed { output, .. } => assert!(output.contains("mcqs")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn trailing_prose_with_braces_is_ignored() {
    let raw = "{\"mcqs\": [{\"question\": \"q\"}]}\nNote: use the {answer} field.";
    assert_eq!(extract_json_object(raw), "{\"mcqs\": [{\"question\": \"q\"}]}");
    let value = parse_json_object(raw).unwrap();
    assert_eq!(value["mcqs"][0]["question"], "q");
}

#[test]
fn skips_brace_fragments_before_the_object() {
    let raw = "Fill in {blank} style.\n```json\n{\"fill_blanks\": []}\n```";
    let value = parse_json_object(raw).unwrap();
    assert!(value["fill_blanks"].as_array().unwrap().is_empty());
}
