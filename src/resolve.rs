//! Resolution of the operating parameters from positional arguments and interactive prompts.

use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Component, Path, PathBuf};

use crate::types::{ConversionTarget, OperatingParameters, Parameter, ResolveError};

static SOURCE_PROMPT: &str = "Please specify a filepath as a parameter:";
static TARGET_PROMPT: &str = "JSON or XML?";
static DIRECTORY_PROMPT: &str = "Please provide the directory to output to:";

/// The filesystem queries resolution depends on.
pub trait FileSystem {
	fn is_file(&self, path: &Path) -> bool;
	fn is_dir(&self, path: &Path) -> bool;
	/// Make `path` absolute and collapse `.` and `..` without touching the filesystem.
	fn absolute(&self, path: &Path) -> io::Result<PathBuf>;
	fn current_dir(&self) -> io::Result<PathBuf>;
}

/// `FileSystem` backed by the real OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
	fn is_file(&self, path: &Path) -> bool {
		path.is_file()
	}

	fn is_dir(&self, path: &Path) -> bool {
		path.is_dir()
	}

	fn absolute(&self, path: &Path) -> io::Result<PathBuf> {
		std::path::absolute(path).map(|path| normalize(&path))
	}

	fn current_dir(&self) -> io::Result<PathBuf> {
		env::current_dir()
	}
}

/// Normalize
///
/// Lexically remove `.` components and resolve `..` against the preceding component. Symlinks
/// are not followed, and `..` at the root stays at the root.
pub fn normalize(path: &Path) -> PathBuf {
	let mut normalized = PathBuf::new();
	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				normalized.pop();
			}
			other => normalized.push(other),
		}
	}
	normalized
}

/// Where resolution currently is, carrying everything validated so far.
enum Stage {
	SourcePath,
	ConversionTarget {
		source_path: PathBuf,
	},
	OutputDirectory {
		source_path: PathBuf,
		conversion_target: ConversionTarget,
	},
	Resolved(OperatingParameters),
}

struct Resolver<'a, S, R, W, F> {
	args: &'a [S],
	input: &'a mut R,
	output: &'a mut W,
	fs: &'a F,
}

/// Resolve
///
/// Work out the source path, conversion target and output directory for one run. Each is taken
/// from the positional argument at its index in `args` if present, otherwise the user is prompted
/// on `output` and one line is read from `input`. The first invalid value ends resolution: a
/// message is written to `output` and the corresponding error returned, without visiting any
/// later stage.
pub fn resolve<S, R, W, F>(
	args: &[S],
	input: &mut R,
	output: &mut W,
	fs: &F,
) -> Result<OperatingParameters, ResolveError>
where
	S: AsRef<str>,
	R: BufRead,
	W: Write,
	F: FileSystem,
{
	let mut resolver = Resolver {
		args,
		input,
		output,
		fs,
	};
	let mut stage = Stage::SourcePath;
	loop {
		stage = match stage {
			Stage::SourcePath => resolver.source_path()?,
			Stage::ConversionTarget { source_path } => resolver.conversion_target(source_path)?,
			Stage::OutputDirectory {
				source_path,
				conversion_target,
			} => resolver.output_directory(source_path, conversion_target)?,
			Stage::Resolved(params) => return Ok(params),
		}
	}
}

impl<'a, S, R, W, F> Resolver<'a, S, R, W, F>
where
	S: AsRef<str>,
	R: BufRead,
	W: Write,
	F: FileSystem,
{
	fn source_path(&mut self) -> Result<Stage, ResolveError> {
		let candidate = self.candidate(0, SOURCE_PROMPT)?;
		let source_path = if candidate.trim().is_empty() {
			None
		} else {
			self.fs
				.absolute(Path::new(&candidate))
				.ok()
				.filter(|path| self.fs.is_file(path))
		};
		match source_path {
			Some(source_path) => {
				log::debug!("Resolved source path '{}'", source_path.display());
				Ok(Stage::ConversionTarget { source_path })
			}
			None => {
				writeln!(self.output, "File was not found at {}.", candidate)?;
				if candidate.trim().is_empty() {
					Err(ResolveError::MissingOrEmptyInput(Parameter::SourcePath))
				} else {
					Err(ResolveError::PathNotFound(candidate))
				}
			}
		}
	}

	fn conversion_target(&mut self, source_path: PathBuf) -> Result<Stage, ResolveError> {
		let candidate = self.candidate(1, TARGET_PROMPT)?;
		match candidate.parse::<ConversionTarget>() {
			Ok(conversion_target) => {
				log::debug!("Resolved conversion target {}", conversion_target);
				Ok(Stage::OutputDirectory {
					source_path,
					conversion_target,
				})
			}
			Err(err) => {
				writeln!(
					self.output,
					"Unable to determine conversion type for {}.",
					candidate
				)?;
				Err(err)
			}
		}
	}

	fn output_directory(
		&mut self,
		source_path: PathBuf,
		conversion_target: ConversionTarget,
	) -> Result<Stage, ResolveError> {
		let candidate = self.candidate(2, DIRECTORY_PROMPT)?;
		let existing = if candidate.trim().is_empty() {
			None
		} else {
			self.fs
				.absolute(Path::new(&candidate))
				.ok()
				.filter(|path| self.fs.is_dir(path))
		};
		let output_directory = match existing {
			Some(dir) => dir,
			None => {
				writeln!(
					self.output,
					"Unable to find existing directory for {}, would you like to use the current \
					 directory? Enter 'Y' to confirm or anything else to exit.",
					candidate
				)?;
				if !self.read_line()?.eq_ignore_ascii_case("y") {
					return Err(ResolveError::DirectoryNotFoundAndFallbackDeclined(candidate));
				}
				writeln!(self.output, "Using current directory...")?;
				self.fs.current_dir()?
			}
		};
		log::debug!("Resolved output directory '{}'", output_directory.display());
		Ok(Stage::Resolved(OperatingParameters {
			source_path,
			conversion_target,
			output_directory,
		}))
	}

	/// Candidate
	///
	/// The positional argument at `index`, or else the next line of input after writing `prompt`.
	fn candidate(&mut self, index: usize, prompt: &str) -> Result<String, ResolveError> {
		if let Some(arg) = self.args.get(index) {
			return Ok(arg.as_ref().to_string());
		}
		writeln!(self.output, "{}", prompt)?;
		self.read_line()
	}

	/// Read one line with its terminator removed. End of input reads as an empty line.
	fn read_line(&mut self) -> Result<String, ResolveError> {
		self.output.flush()?;
		let mut line = String::new();
		self.input.read_line(&mut line)?;
		if line.ends_with('\n') {
			line.pop();
			if line.ends_with('\r') {
				line.pop();
			}
		}
		Ok(line)
	}
}
