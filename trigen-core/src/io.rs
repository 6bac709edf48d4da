use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Reads a whole corpus file into a single decoded `String`.
///
/// The model makes no assumption about where its text comes from; this
/// helper is the only place the crate touches the filesystem. "Corpus
/// not found" handling belongs to the caller.
pub fn read_corpus<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents)
}
