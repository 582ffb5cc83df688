use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;
use thiserror::Error;

use super::deck::{Card, Deck};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed record on line {line}: {text:?}")]
    MalformedRecord { line: usize, text: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One card per line: `TERM : DEFINITION : ERRORCOUNT`.
pub fn format_line(card: &Card) -> String {
    format!("{} : {} : {}", card.term, card.definition, card.errors)
}

pub fn parse_line(line: &str, number: usize) -> Result<(String, String, u32), SnapshotError> {
    let malformed = || SnapshotError::MalformedRecord {
        line: number,
        text: line.to_owned(),
    };
    match split_fields(line.trim()).as_slice() {
        [term, definition, count] => {
            let errors = count.parse::<u32>().map_err(|_| malformed())?;
            Ok(((*term).to_owned(), (*definition).to_owned(), errors))
        }
        _ => Err(malformed()),
    }
}

// A colon only delimits fields when whitespace surrounds it, so bare colons
// inside a term or definition survive. A literal " : " inside a field does
// not round-trip; the format has no escaping.
fn split_fields(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut fields = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b':'
            && i > start
            && bytes[i - 1].is_ascii_whitespace()
            && bytes.get(i + 1).is_some_and(|b| b.is_ascii_whitespace())
        {
            fields.push(line[start..i].trim_end());
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            start = i;
        } else {
            i += 1;
        }
    }
    fields.push(&line[start..]);
    fields
}

/// Feeds every line of the snapshot at `path` into `deck`, returning the
/// number of lines processed. A malformed line aborts the whole load.
pub fn load(deck: &mut Deck, path: &Path) -> Result<usize, SnapshotError> {
    let content = fs::read_to_string(path)?;
    let mut count = 0;
    for (idx, line) in content.lines().enumerate() {
        let (term, definition, errors) = parse_line(line, idx + 1)?;
        deck.upsert(&term, &definition, errors);
        count += 1;
    }
    info!("[Snapshot] Loaded {} cards from {:?}", count, path);
    Ok(count)
}

/// Writes the whole deck to `path` in iteration order. The file is flushed
/// before the count is returned, so a reported count always matches what is
/// on disk.
pub fn save(deck: &Deck, path: &Path) -> Result<usize, SnapshotError> {
    let mut writer = BufWriter::new(File::create(path)?);
    let mut count = 0;
    for card in deck.iter() {
        writeln!(writer, "{}", format_line(card))?;
        count += 1;
    }
    writer.flush()?;
    info!("[Snapshot] Saved {} cards to {:?}", count, path);
    Ok(count)
}
