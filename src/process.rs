//! CSV conversion to JSON or XML.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use csv::{StringRecord, Trim};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::{ConversionTarget, OperatingParameters};

static NO_TARGET_MSG: &str = "No conversion target specified";

/// One CSV record serialized as a map from header to field, in header order.
struct Row<'a> {
	headers: &'a [String],
	record: &'a StringRecord,
}

impl Serialize for Row<'_> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.headers.len()))?;
		for (header, field) in self.headers.iter().zip(self.record.iter()) {
			map.serialize_entry(header, field)?;
		}
		map.end()
	}
}

/// Convert
///
/// Convert the CSV file at `params.source_path` into `params.output_directory`, returning the
/// path of the file written.
pub fn convert(params: &OperatingParameters) -> Result<PathBuf> {
	let output_path = output_path(params)?;
	if same_file(&output_path, &params.source_path) {
		bail!(
			"Refusing to overwrite source file '{}'",
			params.source_path.display()
		);
	}
	let mut input = File::open(&params.source_path)
		.with_context(|| format!("Failed to open '{}'", params.source_path.display()))?;
	let mut output = File::create(&output_path)
		.with_context(|| format!("Failed to create '{}'", output_path.display()))?;
	run(&mut input, &mut output, params.conversion_target)?;
	log::debug!("Wrote '{}'", output_path.display());
	Ok(output_path)
}

/// Same File
///
/// Whether `a` and `b` name the same existing file, following symlinks and `..`.
fn same_file(a: &Path, b: &Path) -> bool {
	if a == b {
		return true;
	}
	match (fs::canonicalize(a), fs::canonicalize(b)) {
		(Ok(a), Ok(b)) => a == b,
		_ => false,
	}
}

/// Output Path
///
/// The source file's stem with the target's extension, inside the output directory.
pub fn output_path(params: &OperatingParameters) -> Result<PathBuf> {
	let extension = params
		.conversion_target
		.extension()
		.ok_or_else(|| anyhow!(NO_TARGET_MSG))?;
	let stem = params.source_path.file_stem().ok_or_else(|| {
		anyhow!(
			"Source path '{}' has no file name",
			params.source_path.display()
		)
	})?;
	let mut file_name = OsString::from(stem);
	file_name.push(".");
	file_name.push(extension);
	Ok(params.output_directory.join(file_name))
}

/// Run
///
/// Read a CSV document with a header row from `input` (trait bound `std::io::Read`) and write it
/// to `output` (trait bound `std::io::Write`) in the `target` format.
pub fn run<R: Read, W: Write>(input: &mut R, output: &mut W, target: ConversionTarget) -> Result<()> {
	if target == ConversionTarget::NotSpecified {
		bail!(NO_TARGET_MSG);
	}
	let (headers, records) = read_records(input)?;
	match target {
		ConversionTarget::Json => write_json(output, &headers, &records),
		ConversionTarget::Xml => write_xml(output, &headers, &records),
		ConversionTarget::NotSpecified => bail!(NO_TARGET_MSG),
	}
}

/// Read Records
///
/// Read the header and every record, trimming whitespace around fields. Records with a different
/// number of fields to the header are rejected by the reader. Repeated header names are made
/// unique.
fn read_records<R: Read>(input: &mut R) -> Result<(Vec<String>, Vec<StringRecord>)> {
	let buffered = BufReader::new(input);
	let mut rdr = csv::ReaderBuilder::new()
		.trim(Trim::All)
		.from_reader(buffered);

	let headers = unique_headers(rdr.headers()?);
	let mut records = Vec::new();
	for result in rdr.records() {
		let record = result?;
		log::debug!("{:?}", record);
		records.push(record);
	}
	Ok((headers, records))
}

/// Unique Headers
///
/// Rename each repeat of a header by appending `_2`, `_3`, ... so no column shadows another.
fn unique_headers(headers: &StringRecord) -> Vec<String> {
	let mut seen = HashSet::new();
	headers
		.iter()
		.map(|header| {
			let mut name = header.to_string();
			let mut n = 1;
			while !seen.insert(name.clone()) {
				n += 1;
				name = format!("{}_{}", header, n);
			}
			if n > 1 {
				log::debug!("Renamed repeated header '{}' to '{}'", header, name);
			}
			name
		})
		.collect()
}

/// Write JSON
///
/// Write records as a pretty-printed array of objects keyed by header.
fn write_json<W: Write>(wtr: &mut W, headers: &[String], records: &[StringRecord]) -> Result<()> {
	let rows: Vec<Row> = records
		.iter()
		.map(|record| Row { headers, record })
		.collect();
	let mut buffered = BufWriter::new(wtr);
	serde_json::to_writer_pretty(&mut buffered, &rows)?;
	writeln!(buffered)?;
	buffered.flush()?;
	Ok(())
}

/// Write XML
///
/// Write records as `<row>` elements under a `<rows>` root, one child element per column.
fn write_xml<W: Write>(wtr: &mut W, headers: &[String], records: &[StringRecord]) -> Result<()> {
	let names: Vec<String> = headers.iter().map(|header| element_name(header)).collect();
	let mut writer = Writer::new_with_indent(BufWriter::new(wtr), b' ', 2);
	writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
	writer.write_event(Event::Start(BytesStart::new("rows")))?;
	for record in records {
		writer.write_event(Event::Start(BytesStart::new("row")))?;
		for (name, field) in names.iter().zip(record.iter()) {
			writer.write_event(Event::Start(BytesStart::new(name.as_str())))?;
			writer.write_event(Event::Text(BytesText::new(field)))?;
			writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
		}
		writer.write_event(Event::End(BytesEnd::new("row")))?;
	}
	writer.write_event(Event::End(BytesEnd::new("rows")))?;

	let mut buffered = writer.into_inner();
	writeln!(buffered)?;
	buffered.flush()?;
	Ok(())
}

/// Element Name
///
/// Turn a CSV header into a valid XML element name. Anything outside `[A-Za-z0-9_.-]` becomes
/// `_`, and names that can't start an element or begin with the reserved `xml` get a leading
/// `_`.
fn element_name(header: &str) -> String {
	let mut name: String = header
		.chars()
		.map(|c| {
			if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
				c
			} else {
				'_'
			}
		})
		.collect();
	let reserved = name.get(..3).map_or(false, |prefix| prefix.eq_ignore_ascii_case("xml"));
	if reserved || !name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
		name.insert(0, '_');
	}
	name
}
