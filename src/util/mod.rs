mod code;
use once_cell::unsync::OnceCell;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
/// The line and column information at a code point.
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Create a new Position from a one-based line and column number.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A wrapper for the input text to be parsed, with lazily computed line information.
pub struct Code<'c> {
    pub value: &'c str,
    line_breaks: OnceCell<Vec<usize>>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// A enum structure to assign multiple level debugging to the parsing engines.
///
/// The payload is the label printed with every report; the variant decides how much of
/// a parse is reported. `Default` prints nothing by itself and exists for callers that
/// want a label without output, `Success` adds accepted parses, `Result` adds rejections
/// with their positions, and `Verbose` additionally traces chart and tokenizer progress.
pub enum Log<T> {
    None,
    Default(T),
    Success(T),
    Result(T),
    Verbose(T),
}

impl<T> Log<T> {
    pub fn label(&self) -> Option<&T> {
        match self {
            Log::None => None,
            Log::Default(label)
            | Log::Success(label)
            | Log::Result(label)
            | Log::Verbose(label) => Some(label),
        }
    }

    /// Whether accepted parses should be reported.
    pub fn logs_success(&self) -> bool {
        matches!(self, Log::Success(_) | Log::Result(_) | Log::Verbose(_))
    }

    /// Whether rejected parses should be reported.
    pub fn logs_result(&self) -> bool {
        matches!(self, Log::Result(_) | Log::Verbose(_))
    }

    /// Whether per-column chart sizes and tokenizer progress should be reported.
    pub fn logs_verbose(&self) -> bool {
        matches!(self, Log::Verbose(_))
    }
}

impl<T: Display> Display for Log<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.label() {
            Some(label) => write!(f, "{}", label),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels_are_cumulative() {
        let none: Log<&str> = Log::None;
        assert!(!none.logs_success() && !none.logs_result() && !none.logs_verbose());
        assert_eq!(none.label(), None);

        let success = Log::Success("cyk");
        assert!(success.logs_success());
        assert!(!success.logs_result());

        let verbose = Log::Verbose("earley");
        assert!(verbose.logs_success() && verbose.logs_result() && verbose.logs_verbose());
        assert_eq!(format!("{}", verbose), "earley");
    }

    #[test]
    fn positions_render_as_line_and_column() {
        assert_eq!(format!("{}", Position::new(3, 14)), "3:14");
    }
}
