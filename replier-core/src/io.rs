use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::{fs, io};

use crate::config::ReplierConfig;
use crate::error::ReplierError;

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
/// - Drops blank lines
pub fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents
		.lines()
		.filter(|line| !line.trim().is_empty())
		.map(str::to_owned)
		.collect())
}

/// Loads and validates a JSON configuration file.
///
/// # Errors
/// Returns an error if the file cannot be read, is not valid JSON, or
/// holds out-of-range values.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ReplierConfig, ReplierError> {
	let json = fs::read_to_string(path)?;
	ReplierConfig::from_json(&json)
}
