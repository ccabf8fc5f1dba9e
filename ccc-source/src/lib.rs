//! Source locations and diagnostic rendering.

use console::style;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in the original source code. Lines and columns are 1-based.
/// `Location::default()` (`0:0`) is used for synthesized nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    /// Create a new `Location` at `line` and `column`.
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.line, self.column)
    }
}

/// A secondary message attached to a [`Diagnostic`].
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub message: String,
    pub location: Location,
}

/// Represents a compile time error ready to be shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Short category, e.g. `undeclared variable`.
    pub category: &'static str,
    pub message: String,
    pub location: Location,
    pub notes: Vec<Note>,
}

impl Diagnostic {
    /// Create a new diagnostic without notes.
    pub fn new(category: &'static str, message: impl ToString, location: Location) -> Self {
        Self {
            category,
            message: message.to_string(),
            location,
            notes: Vec::new(),
        }
    }

    /// Attach a note pointing at another location (e.g. a previous definition).
    pub fn with_note(mut self, message: impl ToString, location: Location) -> Self {
        self.notes.push(Note {
            message: message.to_string(),
            location,
        });
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {}: {} [{}]",
            style("error").red().bold(),
            self.location,
            self.message,
            style(self.category).dim()
        )?;
        for note in &self.notes {
            writeln!(
                f,
                "{} {}: {}",
                style("note").cyan(),
                note.location,
                note.message
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_display() {
        assert_eq!(Location::new(3, 14).to_string(), "(3, 14)");
        assert_eq!(Location::default(), Location::new(0, 0));
    }

    #[test]
    fn diagnostic_notes() {
        let diagnostic = Diagnostic::new("duplicate function definition", "function f already defined", Location::new(4, 1))
            .with_note("previous definition seen here", Location::new(1, 1));
        assert_eq!(diagnostic.notes.len(), 1);
        assert_eq!(diagnostic.notes[0].location, Location::new(1, 1));

        let rendered = console::strip_ansi_codes(&diagnostic.to_string()).into_owned();
        assert!(rendered.contains("(4, 1): function f already defined"));
        assert!(rendered.contains("note (1, 1): previous definition seen here"));
    }
}
