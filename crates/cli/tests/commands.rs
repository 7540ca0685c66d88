//! Integration tests for the `sanitize` and `decode` commands.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use serde_json::{Value, json};
use tempfile::{NamedTempFile, TempDir};

fn devbridge() -> Command {
	Command::new(env!("CARGO_BIN_EXE_devbridge"))
}

fn run(args: &[&str]) -> Output {
	devbridge().args(args).output().expect("failed to execute devbridge")
}

fn run_with_stdin(args: &[&str], stdin: &[u8]) -> Output {
	let mut child = devbridge()
		.args(args)
		.stdin(Stdio::piped())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.spawn()
		.expect("failed to spawn devbridge");
	child.stdin.take().unwrap().write_all(stdin).unwrap();
	child.wait_with_output().unwrap()
}

fn json_file(value: &Value) -> NamedTempFile {
	let mut file = NamedTempFile::new().unwrap();
	write!(file, "{value}").unwrap();
	file
}

fn stdout_json(output: &Output) -> Value {
	assert!(
		output.status.success(),
		"devbridge failed: {}",
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn sanitize_truncates_deep_containers() {
	let input = json_file(&json!({"id": "n1", "a": {"b": {"c": {"d": 1}}}, "list": [[1, [2]]]}));
	let output = run(&["sanitize", input.path().to_str().unwrap()]);

	assert_eq!(
		stdout_json(&output),
		json!({
			"data": {
				"id": "n1",
				"a": {"b": {"c": {"type": "object", "name": "Object"}}},
				"list": [[1, {"type": "array", "name": "Array", "length": 1}]]
			},
			"cleaned": [["a", "b", "c"], ["list", 0, 1]]
		})
	);
}

#[test]
fn sanitize_flags_and_config_file() {
	let dir = TempDir::new().unwrap();
	let config = dir.path().join("bridge.json");
	std::fs::write(&config, r#"{"limits": {"max_string_len": 4}}"#).unwrap();
	let input = dir.path().join("payload.json");
	std::fs::write(&input, r#"{"s": "abcdefgh", "o": {"x": 1}}"#).unwrap();

	let output = run(&[
		"sanitize",
		input.to_str().unwrap(),
		"--config",
		config.to_str().unwrap(),
		"--max-depth",
		"0",
	]);

	assert_eq!(
		stdout_json(&output),
		json!({
			"data": {"s": "abcd...", "o": {"type": "object", "name": "Object"}},
			"cleaned": [["o"]]
		})
	);
}

#[test]
fn sanitize_reads_stdin_and_rejects_invalid_json() {
	let ok = run_with_stdin(&["sanitize", "-"], br#"{"x": [1, 2]}"#);
	assert_eq!(stdout_json(&ok), json!({"data": {"x": [1, 2]}, "cleaned": []}));

	let bad = run_with_stdin(&["sanitize"], b"{nope");
	assert!(!bad.status.success());
	assert!(String::from_utf8_lossy(&bad.stderr).contains("not valid JSON"));
}

#[test]
fn sanitize_keeps_large_integers_and_replaces_fragments() {
	let output = run_with_stdin(
		&["sanitize"],
		br#"{"n": 9007199254740993, "children": {"_reactFragment": true}}"#,
	);
	assert_eq!(
		stdout_json(&output),
		json!({"data": {"n": 9007199254740993u64, "children": "A react fragment"}, "cleaned": []})
	);
}

#[test]
fn sanitize_event_output_feeds_decode() {
	let input = json_file(&json!({"id": "n", "deep": {"a": {"b": {"c": 1}}}}));
	let event = run(&["sanitize", input.path().to_str().unwrap(), "--event", "mount"]);
	assert!(event.status.success());

	let wire: Value = serde_json::from_slice(&event.stdout).unwrap();
	assert_eq!(wire["type"], "event");
	assert_eq!(wire["evt"], "mount");
	assert_eq!(wire["cleaned"], json!([["deep", "a", "b"]]));

	let decoded = run_with_stdin(&["decode", "-f", "ndjson"], &event.stdout);
	assert_eq!(
		stdout_json(&decoded),
		json!({
			"kind": "event",
			"evt": "mount",
			"data": {"id": "n", "deep": {"a": {"b": {"name": "Object", "type": "object", "inspected": false}}}}
		})
	);
}

#[test]
fn decode_ndjson_capture_as_text() {
	let mut capture = NamedTempFile::new().unwrap();
	for message in [
		json!({"type": "many-events", "events": [
			{"evt": "update", "data": {"f": {"type": "function", "name": "go"}}, "cleaned": [["f"]]},
			{"evt": "tick", "data": 1, "cleaned": []}
		]}),
		json!({"type": "inspect", "id": "n1", "path": ["props", 0], "callback": 3}),
		json!({"type": "callback", "id": 3, "args": [{"a": 1}, [], null, []]}),
		json!({"type": "future-thing"}),
	] {
		writeln!(capture, "{message}").unwrap();
	}

	let output = run(&["-f", "text", "decode", capture.path().to_str().unwrap()]);
	assert!(output.status.success());
	let stdout = String::from_utf8(output.stdout).unwrap();
	let lines: Vec<&str> = stdout.lines().collect();
	assert_eq!(
		lines,
		[
			r#"update {"f":{"name":"go","type":"function","inspected":false}}"#,
			"tick 1",
			"inspect #3 n1 props.0",
			r#"callback #3 {"a":1}"#,
		]
	);
}

#[test]
fn decode_filters_events_and_reads_frames() {
	let dir = TempDir::new().unwrap();
	let capture = dir.path().join("capture.bin");
	let mut bytes = Vec::new();
	for message in [
		json!({"type": "event", "evt": "keep", "data": 1, "cleaned": []}),
		json!({"type": "event", "evt": "drop", "data": 2, "cleaned": []}),
	] {
		let body = serde_json::to_vec(&message).unwrap();
		bytes.extend((body.len() as u32).to_le_bytes());
		bytes.extend(body);
	}
	std::fs::write(&capture, bytes).unwrap();

	let output = run(&[
		"decode",
		"--framed",
		"--event",
		"keep",
		capture.to_str().unwrap(),
	]);
	assert_eq!(stdout_json(&output), json!({"kind": "event", "evt": "keep", "data": 1}));
}

#[test]
fn decode_strict_reports_bad_line() {
	let mut capture = NamedTempFile::new().unwrap();
	writeln!(capture, "{}", json!({"type": "event", "evt": "a"})).unwrap();
	writeln!(capture, "garbage").unwrap();

	let lenient = run(&["decode", capture.path().to_str().unwrap()]);
	assert!(lenient.status.success());

	let strict = run(&["decode", "--strict", capture.path().to_str().unwrap()]);
	assert!(!strict.status.success());
	assert!(String::from_utf8_lossy(&strict.stderr).contains("line 2"));
}

#[test]
fn missing_input_file_fails() {
	let output = run(&["decode", "/nonexistent/devbridge-capture.ndjson"]);
	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read"));
}
