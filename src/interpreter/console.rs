// Captured `console.log` output

use crate::parser::ast::SourceLocation;

/// A line of console output with the source location that printed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub text: String,
    pub location: SourceLocation,
}

/// Stand-in for a terminal: everything logged is kept for later display
#[derive(Debug, Clone, Default)]
pub struct Console {
    pub lines: Vec<ConsoleLine>,
}

impl Console {
    pub fn new() -> Self {
        Console { lines: Vec::new() }
    }

    /// Record one `console.log` call; embedded newlines start new lines
    pub fn log(&mut self, text: &str, location: SourceLocation) {
        for line in text.split('\n') {
            self.lines.push(ConsoleLine {
                text: line.to_string(),
                location,
            });
        }
    }

    /// Get all lines as a vector of strings
    pub fn output(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.text.clone()).collect()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_splits_lines() {
        let mut console = Console::new();
        console.log("a\nb", SourceLocation::new(1, 1));
        console.log("c", SourceLocation::new(2, 1));
        assert_eq!(console.output(), vec!["a", "b", "c"]);
        assert_eq!(console.lines[1].location.line, 1);
    }
}
