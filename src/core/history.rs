/// Previously submitted entries with a navigation cursor.
///
/// The list starts with one empty entry so that stepping back past the oldest
/// submission lands on a blank line.
#[derive(Debug, Clone)]
pub struct EntryHistory {
    entries: Vec<String>,
    cursor: usize,
}

impl EntryHistory {
    pub fn new() -> Self {
        Self {
            entries: vec![String::new()],
            cursor: 0,
        }
    }

    /// Append an entry and park the cursor past the end.
    pub fn add(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
        self.cursor = self.entries.len();
    }

    pub fn previous(&mut self) -> &str {
        self.cursor = self.cursor.saturating_sub(1).min(self.entries.len() - 1);
        &self.entries[self.cursor]
    }

    /// Step forward. Right after `add` the cursor is past the end, so this
    /// yields a blank entry until `previous` is called.
    pub fn next(&mut self) -> &str {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
        }
        self.entries.get(self.cursor).map(String::as_str).unwrap_or("")
    }

    /// Most recent submission, or "" if nothing was submitted yet.
    pub fn last(&self) -> &str {
        if self.cursor > 0 {
            self.entries.last().map(String::as_str).unwrap_or("")
        } else {
            ""
        }
    }

    /// Number of submitted entries.
    pub fn len(&self) -> usize {
        self.entries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self) -> &[String] {
        &self.entries[1..]
    }
}

impl Default for EntryHistory {
    fn default() -> Self {
        Self::new()
    }
}
