//! Program entrypoint and argument parsing.

use std::env;
use std::io;
use std::process::ExitCode;

use anyhow::{anyhow, Result};

use csv_converter::process;
use csv_converter::resolve::{self, OsFileSystem};
use csv_converter::types::ResolveError;

static ARG_MSG: &str =
	"Expected at most three positional arguments (CSV file path, JSON or XML, output directory)";

/// Parse Args
///
/// Collect up to three positional arguments, returning an error if there are more. Anything
/// missing is asked for interactively during resolution.
fn parse_args() -> Result<Vec<String>> {
	let args: Vec<String> = env::args().skip(1).collect();
	if args.len() > 3 {
		return Err(anyhow!(ARG_MSG));
	}
	Ok(args)
}

fn main() -> Result<ExitCode> {
	env_logger::init();
	let args = parse_args()?;
	let stdin = io::stdin();
	let mut input = stdin.lock();
	let mut output = io::stdout();
	let params = match resolve::resolve(args.as_slice(), &mut input, &mut output, &OsFileSystem) {
		Ok(params) => params,
		Err(ResolveError::Io(err)) => return Err(err.into()),
		Err(err) => {
			// The user has already been told why
			log::debug!("Resolution failed: {}", err);
			return Ok(ExitCode::FAILURE);
		}
	};
	let written = process::convert(&params)?;
	println!(
		"Converted {} to {}",
		params.source_path.display(),
		written.display()
	);
	Ok(ExitCode::SUCCESS)
}
