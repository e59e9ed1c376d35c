//! Global type definitions.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Output format requested for a conversion.
///
/// `NotSpecified` marks a target that has not been chosen yet. It never appears in a resolved
/// `OperatingParameters`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionTarget {
	NotSpecified,
	Json,
	Xml,
}

/// Names the parameter that was left blank.
///
/// A blank output directory is not listed: it is offered the current-directory fallback instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
	SourcePath,
	ConversionTarget,
}

/// Fully validated parameters for a single conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatingParameters {
	pub source_path: PathBuf,
	pub conversion_target: ConversionTarget,
	pub output_directory: PathBuf,
}

#[derive(Debug, Error)]
pub enum ResolveError {
	#[error("no value given for {0}")]
	MissingOrEmptyInput(Parameter),
	#[error("file was not found at {0}")]
	PathNotFound(String),
	#[error("unable to determine conversion type for {0}")]
	UnrecognizedConversionTarget(String),
	#[error("directory {0} does not exist and the current directory was declined")]
	DirectoryNotFoundAndFallbackDeclined(String),
	#[error(transparent)]
	Io(#[from] io::Error),
}

impl ConversionTarget {
	/// Extension used for files written in this format.
	pub fn extension(&self) -> Option<&'static str> {
		match self {
			ConversionTarget::Json => Some("json"),
			ConversionTarget::Xml => Some("xml"),
			ConversionTarget::NotSpecified => None,
		}
	}
}

impl FromStr for ConversionTarget {
	type Err = ResolveError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.trim();
		if trimmed.eq_ignore_ascii_case("json") {
			Ok(ConversionTarget::Json)
		} else if trimmed.eq_ignore_ascii_case("xml") {
			Ok(ConversionTarget::Xml)
		} else if trimmed.is_empty() {
			Err(ResolveError::MissingOrEmptyInput(Parameter::ConversionTarget))
		} else {
			Err(ResolveError::UnrecognizedConversionTarget(s.to_string()))
		}
	}
}

impl fmt::Display for ConversionTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			ConversionTarget::NotSpecified => "not specified",
			ConversionTarget::Json => "JSON",
			ConversionTarget::Xml => "XML",
		};
		f.write_str(name)
	}
}

impl fmt::Display for Parameter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Parameter::SourcePath => "source path",
			Parameter::ConversionTarget => "conversion target",
		};
		f.write_str(name)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use rstest::*;

	#[rstest]
	#[case("json", ConversionTarget::Json)]
	#[case("JSON", ConversionTarget::Json)]
	#[case("Json", ConversionTarget::Json)]
	#[case(" xml ", ConversionTarget::Xml)]
	#[case("XmL", ConversionTarget::Xml)]
	fn parses_case_insensitively(#[case] input: &str, #[case] expected: ConversionTarget) {
		assert_eq!(input.parse::<ConversionTarget>().ok(), Some(expected));
	}

	#[rstest]
	#[case("yaml")]
	#[case("")]
	#[case("   ")]
	#[case("notspecified")]
	fn unrecognised_input_is_rejected(#[case] input: &str) {
		assert!(input.parse::<ConversionTarget>().is_err());
	}

	#[test]
	fn blank_input_is_missing_rather_than_unrecognised() {
		let err = "".parse::<ConversionTarget>().unwrap_err();
		assert!(matches!(
			err,
			ResolveError::MissingOrEmptyInput(Parameter::ConversionTarget)
		));
		let err = "yaml".parse::<ConversionTarget>().unwrap_err();
		assert!(matches!(err, ResolveError::UnrecognizedConversionTarget(s) if s == "yaml"));
	}

	#[test]
	fn only_real_targets_have_extensions() {
		assert_eq!(ConversionTarget::Json.extension(), Some("json"));
		assert_eq!(ConversionTarget::Xml.extension(), Some("xml"));
		assert_eq!(ConversionTarget::NotSpecified.extension(), None);
	}
}
