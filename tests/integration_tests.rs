use std::fs::{self, File};
use std::path::Path;

use anyhow::Result;
use csv_converter::process;
use csv_converter::resolve::{resolve, OsFileSystem};
use csv_converter::types::{ConversionTarget, ResolveError};
use tempfile::TempDir;

static EXAMPLES: [(&str, ConversionTarget, Option<&str>); 6] = [
	(
		"tests/data/simple.csv",
		ConversionTarget::Json,
		Some("tests/data/simple.output.json"),
	),
	(
		"tests/data/simple.csv",
		ConversionTarget::Xml,
		Some("tests/data/simple.output.xml"),
	),
	(
		"tests/data/awkward.csv",
		ConversionTarget::Json,
		Some("tests/data/awkward.output.json"),
	),
	(
		"tests/data/awkward.csv",
		ConversionTarget::Xml,
		Some("tests/data/awkward.output.xml"),
	),
	("tests/data/ragged.csv", ConversionTarget::Json, None),
	("tests/data/ragged.csv", ConversionTarget::Xml, None),
];

#[test]
fn test_all_examples() -> Result<()> {
	for (input_path, target, expected_path) in EXAMPLES.iter() {
		test_example_file(input_path, *target, expected_path)?;
	}
	Ok(())
}

fn test_example_file(
	input_path: &str,
	target: ConversionTarget,
	expected_path: &Option<&str>,
) -> Result<()> {
	let mut input = File::open(input_path)?;
	let mut output = Vec::new();
	let result = process::run(&mut input, &mut output, target);

	if let Some(expected_path) = expected_path {
		assert!(result.is_ok(), "{}: {:?}", input_path, result);
		let expected = fs::read_to_string(expected_path)?;
		let result = std::str::from_utf8(&output)?;
		match target {
			ConversionTarget::Json => {
				let expected: serde_json::Value = serde_json::from_str(&expected)?;
				let result: serde_json::Value = serde_json::from_str(result)?;
				assert_eq!(expected, result, "{}", input_path);
			}
			_ => assert_eq!(sorted(&expected), sorted(result), "{}", input_path),
		}
	} else {
		assert!(result.is_err(), "{}", input_path);
	}
	Ok(())
}

fn sorted(s: &str) -> Vec<&str> {
	let mut list: Vec<&str> = s.split_ascii_whitespace().collect();
	list.sort_unstable();
	list
}

fn scratch_with_copy(name: &str) -> Result<(TempDir, String, String)> {
	let dir = TempDir::new()?;
	let source = dir.path().join(name);
	fs::copy(Path::new("tests/data").join(name), &source)?;
	let output = dir.path().join("converted");
	fs::create_dir(&output)?;
	Ok((
		dir,
		source.to_string_lossy().into_owned(),
		output.to_string_lossy().into_owned(),
	))
}

#[test]
fn test_resolve_then_convert() -> Result<()> {
	let (_dir, source, output_dir) = scratch_with_copy("simple.csv")?;
	let args = [source.as_str(), "xml", output_dir.as_str()];
	let mut prompts = Vec::new();
	let params = resolve(&args, &mut "".as_bytes(), &mut prompts, &OsFileSystem)?;
	assert!(prompts.is_empty());

	let written = process::convert(&params)?;
	assert_eq!(written, Path::new(&output_dir).join("simple.xml"));
	let expected = fs::read_to_string("tests/data/simple.output.xml")?;
	let result = fs::read_to_string(&written)?;
	assert_eq!(sorted(&expected), sorted(&result));
	Ok(())
}

#[test]
fn test_interactive_resolve_then_convert() -> Result<()> {
	let (_dir, source, output_dir) = scratch_with_copy("awkward.csv")?;
	let answers = format!("{}\nJson\n{}\n", source, output_dir);
	let mut prompts = Vec::new();
	let params = resolve::<&str, _, _, _>(&[], &mut answers.as_bytes(), &mut prompts, &OsFileSystem)?;
	let prompts = String::from_utf8(prompts)?;
	assert_eq!(
		prompts.lines().collect::<Vec<_>>(),
		[
			"Please specify a filepath as a parameter:",
			"JSON or XML?",
			"Please provide the directory to output to:",
		]
	);

	let written = process::convert(&params)?;
	let expected: serde_json::Value =
		serde_json::from_str(&fs::read_to_string("tests/data/awkward.output.json")?)?;
	let result: serde_json::Value = serde_json::from_str(&fs::read_to_string(&written)?)?;
	assert_eq!(expected, result);
	Ok(())
}

#[test]
fn test_failed_resolution_writes_nothing() -> Result<()> {
	let (dir, source, _) = scratch_with_copy("simple.csv")?;
	let args = [source.as_str(), "yaml", "."];
	let mut prompts = Vec::new();
	let result = resolve(&args, &mut "".as_bytes(), &mut prompts, &OsFileSystem);
	assert!(matches!(
		result,
		Err(ResolveError::UnrecognizedConversionTarget(_))
	));
	assert_eq!(fs::read_dir(dir.path().join("converted"))?.count(), 0);
	Ok(())
}
