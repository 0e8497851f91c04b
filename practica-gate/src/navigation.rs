//! Navigation collaborator used by the gate to redirect.

/// How a navigation request affects history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// Append a new history entry.
    Push,
    /// Overwrite the current entry, so a blocked attempt leaves no trace.
    Replace,
}

/// The hosting router, as seen by the gate.
pub trait Navigator {
    fn location(&self) -> &str;
    fn navigate(&mut self, path: &str, mode: NavigationMode);
}

/// In-memory navigation history. The last entry is the current location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: vec![initial.into()],
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Go back one entry. Returns the new location, or `None` at the start.
    pub fn back(&mut self) -> Option<&str> {
        if self.entries.len() < 2 {
            return None;
        }
        self.entries.pop();
        self.entries.last().map(String::as_str)
    }
}

impl Navigator for History {
    fn location(&self) -> &str {
        self.entries.last().map(String::as_str).unwrap_or("/")
    }

    fn navigate(&mut self, path: &str, mode: NavigationMode) {
        match mode {
            NavigationMode::Push => self.entries.push(path.to_owned()),
            NavigationMode::Replace => match self.entries.last_mut() {
                Some(current) => *current = path.to_owned(),
                None => self.entries.push(path.to_owned()),
            },
        }
    }
}
