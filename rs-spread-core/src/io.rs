use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{Result, SpreadError};
use crate::model::scorer::ScoringTable;

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub fn read_file<P: AsRef<Path>>(filename: P) -> Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Reads a symbol list, one symbol per line.
///
/// Surrounding whitespace is trimmed; blank lines and lines starting
/// with `#` are skipped.
pub fn read_symbols<P: AsRef<Path>>(filename: P) -> Result<Vec<String>> {
	Ok(read_file(filename)?
		.into_iter()
		.map(|line| line.trim().to_owned())
		.filter(|line| !line.is_empty() && !line.starts_with('#'))
		.collect())
}

/// Reads a two-column CSV file (`key,value`, no header, `#` comments).
fn read_pairs<P: AsRef<Path>>(filename: P) -> Result<Vec<(usize, StringRecord)>> {
	let path = filename.as_ref();
	let mut reader = ReaderBuilder::new()
		.has_headers(false)
		.comment(Some(b'#'))
		.trim(Trim::All)
		.from_path(path)
		.map_err(|e| SpreadError::Parse(format!("{}: {}", path.display(), e)))?;

	let mut rows = Vec::new();
	for (line, record) in reader.records().enumerate() {
		let record = record.map_err(|e| SpreadError::Parse(format!("{}: {}", path.display(), e)))?;
		if record.len() < 2 {
			return Err(SpreadError::Parse(format!(
				"{}: row {} needs two columns, got {}",
				path.display(),
				line + 1,
				record.len()
			)));
		}
		rows.push((line + 1, record));
	}
	Ok(rows)
}

/// Loads a scoring table (`symbol,score` rows). The table is named after
/// the file stem.
pub fn read_table<P: AsRef<Path>>(filename: P) -> Result<ScoringTable> {
	let path = filename.as_ref();
	let name = get_filename(path)?;
	let mut values = HashMap::new();
	for (line, record) in read_pairs(path)? {
		let value: f64 = record[1].parse().map_err(|_| {
			SpreadError::Parse(format!(
				"{}: row {}: '{}' is not a number",
				path.display(),
				line,
				&record[1]
			))
		})?;
		values.insert(record[0].to_owned(), value);
	}
	Ok(ScoringTable::new(&name, values))
}

/// Loads a symbol-to-display mapping (`symbol,display` rows).
pub fn read_mapping<P: AsRef<Path>>(filename: P) -> Result<HashMap<String, String>> {
	Ok(read_pairs(filename)?
		.into_iter()
		.map(|(_, record)| (record[0].to_owned(), record[1].to_owned()))
		.collect())
}

/// Writes one line per item.
pub fn write_lines<P, I, S>(filename: P, lines: I) -> Result<()>
where
	P: AsRef<Path>,
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut writer = BufWriter::new(File::create(filename)?);
	for line in lines {
		writeln!(writer, "{}", line.as_ref())?;
	}
	writer.flush()?;
	Ok(())
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/results.txt` + `"bin"` → `data/results.bin`
pub fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| SpreadError::Config(format!("{} has no filename", input_path.display())))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Appends `suffix` to the full file name.
///
/// Example:
/// `data/results.txt` + `"-amino"` → `data/results.txt-amino`
pub fn with_suffix<P: AsRef<Path>>(input_path: P, suffix: &str) -> PathBuf {
	let mut name = input_path.as_ref().as_os_str().to_owned();
	name.push(suffix);
	PathBuf::from(name)
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/hydro.txt"` → `"hydro"`
/// - `"weight.csv"` → `"weight"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| SpreadError::Config(format!("{} has no filename", input_path.as_ref().display())))?;

	Ok(stem.to_string_lossy().to_string())
}
