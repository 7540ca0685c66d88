use devbridge_protocol::path;
use serde::Serialize;

use super::*;

#[derive(Serialize)]
struct Line {
	evt: &'static str,
	n: u32,
}

impl TextRecord for Line {
	fn text_lines(&self) -> Vec<String> {
		vec![format!("{} {}", self.evt, self.n)]
	}
}

fn render(records: &[Line], format: OutputFormat) -> String {
	let mut out = Vec::new();
	write_records(&mut out, records, format).unwrap();
	String::from_utf8(out).unwrap()
}

#[test]
fn test_json_prints_single_record_bare() {
	let out = render(&[Line { evt: "a", n: 1 }], OutputFormat::Json);
	let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
	assert_eq!(parsed, serde_json::json!({"evt": "a", "n": 1}));
}

#[test]
fn test_json_prints_many_records_as_array() {
	let out = render(&[Line { evt: "a", n: 1 }, Line { evt: "b", n: 2 }], OutputFormat::Json);
	let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
	assert_eq!(parsed.as_array().unwrap().len(), 2);
}

#[test]
fn test_ndjson_one_line_per_record() {
	let out = render(&[Line { evt: "a", n: 1 }, Line { evt: "b", n: 2 }], OutputFormat::Ndjson);
	assert_eq!(out, "{\"evt\":\"a\",\"n\":1}\n{\"evt\":\"b\",\"n\":2}\n");
}

#[test]
fn test_text_uses_record_lines() {
	let out = render(&[Line { evt: "a", n: 1 }, Line { evt: "b", n: 2 }], OutputFormat::Text);
	assert_eq!(out, "a 1\nb 2\n");
}

#[test]
fn test_display_path() {
	assert_eq!(display_path(&[]), "<root>");
	assert_eq!(display_path(&path!["props", 2usize, "style"]), "props.2.style");
}

#[test]
fn test_format_display_matches_value_names() {
	assert_eq!(OutputFormat::Json.to_string(), "json");
	assert_eq!(OutputFormat::Ndjson.to_string(), "ndjson");
	assert_eq!(OutputFormat::Text.to_string(), "text");
}
