// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounded tail scan of a day file.
//!
//! Reads at most `window_bytes` from the end of the file, so resolution cost
//! is independent of how much the day has accumulated. The returned
//! [`Window`] is ordered newest-first; that ordering is part of the type's
//! contract, not an incidental list operation.
//!
//! # Discard rules
//!
//! - The first split fragment is dropped unconditionally: the seek point may
//!   land mid-line, and even an aligned fragment is not trusted.
//! - A trailing fragment with no line terminator is dropped: it may be a
//!   partially flushed concurrent append. Together with the store's
//!   append-only, newline-delimited write discipline this is the entire
//!   concurrency story -- no locks are taken.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use thiserror::Error;

/// Tail scan errors. Absence of data is not an error, only I/O faults are.
#[derive(Debug, Error)]
pub enum TailError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parsed lines from the tail of a day file, ordered newest-first.
///
/// Ephemeral: built per read request, discarded after resolution. An empty
/// window is a valid "no data" outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Window {
    lines: Vec<Vec<String>>,
}

impl Window {
    /// Build a window from already-parsed lines, newest-first.
    pub fn from_lines(lines: Vec<Vec<String>>) -> Self {
        Self { lines }
    }

    /// Parsed lines, newest-first.
    pub fn lines(&self) -> &[Vec<String>] {
        &self.lines
    }

    /// Number of complete lines retained.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when no complete line survived the discard rules.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Read a bounded window from the end of `path`.
///
/// Seeks to `max(0, len - window_bytes)`, reads to end-of-file, splits on
/// newlines, applies the discard rules (see module docs) and returns the
/// remaining lines newest-first, each comma-split into fields.
pub fn read_window(path: &Path, window_bytes: u64) -> Result<Window, TailError> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();

    let start = len.saturating_sub(window_bytes);
    file.seek(SeekFrom::Start(start))?;

    let mut buf = Vec::with_capacity((len - start) as usize);
    file.read_to_end(&mut buf)?;
    let text = String::from_utf8_lossy(&buf);

    let mut raw: Vec<&str> = text.split('\n').collect();

    // Unterminated trailing fragment: possibly mid-write, drop it. A file
    // ending in a newline leaves an empty final fragment here, dropped the
    // same way.
    raw.pop();

    // Leading fragment: possibly mid-line, drop it even if aligned.
    if !raw.is_empty() {
        raw.remove(0);
    }

    let lines = raw
        .iter()
        .rev()
        .filter(|line| !line.is_empty())
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect();

    Ok(Window { lines })
}
