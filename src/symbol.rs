use crate::util::Code;
use crate::{GrammarError, NonTerminal, Symbol, Terminal, TerminalExpression};
use regex::Regex;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::{Range, RangeInclusive};
use std::rc::Rc;

impl NonTerminal {
    /// Create a new non-terminal with the given name.
    pub fn new<T: Into<Rc<str>>>(name: T) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&str> for NonTerminal {
    fn from(name: &str) -> Self {
        NonTerminal::new(name)
    }
}

impl Display for NonTerminal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>", self.name)
    }
}

impl TerminalExpression {
    fn new(pattern: &str) -> Result<Self, GrammarError> {
        let regexp = Regex::new(pattern).map_err(|err| {
            GrammarError::new(
                "InvalidExpression".into(),
                format!("Pattern should be a valid regex expression. {:?}", err),
            )
        })?;
        Ok(Self {
            pattern: pattern.into(),
            regexp,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl PartialEq for TerminalExpression {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}
impl Eq for TerminalExpression {}

impl Hash for TerminalExpression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pattern.hash(state);
    }
}

impl Terminal {
    /// Create a terminal matching the given string byte for byte.
    ///
    /// The empty literal is the distinguished epsilon sentinel: it never matches any
    /// input, and [Production::new](crate::Production::new) removes it from right-hand
    /// sides so an empty derivation is always expressed by an empty production.
    pub fn literal<T: Into<Rc<str>>>(value: T) -> Self {
        Terminal::Literal(value.into())
    }

    /// Create a terminal matching exactly one code point inside the inclusive range.
    pub fn range(range: RangeInclusive<char>) -> Result<Self, GrammarError> {
        if range.is_empty() {
            return Err(GrammarError::new(
                "InvalidRange".into(),
                format!(
                    "Character range {:?}..={:?} has its upper bound below its lower bound.",
                    range.start(),
                    range.end()
                ),
            ));
        }
        Ok(Terminal::CharacterRange(range))
    }

    /// Create a terminal consuming the first match of a regular expression.
    ///
    /// The pattern is compiled eagerly; an invalid pattern fails here and never at match
    /// time. The pattern needs no anchor: a match is consumed only when it begins exactly
    /// at the cursor.
    pub fn expression(pattern: &str) -> Result<Self, GrammarError> {
        Ok(Terminal::Expression(TerminalExpression::new(pattern)?))
    }

    /// Whether this terminal is the epsilon sentinel (the empty literal).
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Terminal::Literal(value) if value.is_empty())
    }

    /// Try to match this terminal against the input at `pointer`.
    ///
    /// Returns the consumed byte range on success. The returned range always starts at
    /// `pointer` and is never empty; a non-match returns [None] and never an error.
    pub fn match_prefix(&self, code: &Code, pointer: usize) -> Option<Range<usize>> {
        if pointer >= code.value.len() || !code.value.is_char_boundary(pointer) {
            return None;
        }
        match self {
            Terminal::Literal(value) => {
                if !value.is_empty() && code.value[pointer..].starts_with(&**value) {
                    Some(pointer..pointer + value.len())
                } else {
                    None
                }
            }
            Terminal::CharacterRange(range) => {
                let c = code.value[pointer..].chars().next()?;
                if range.contains(&c) {
                    Some(pointer..pointer + c.len_utf8())
                } else {
                    None
                }
            }
            Terminal::Expression(expression) => {
                let m = expression.regexp.find(&code.value[pointer..])?;
                if m.start() == 0 && m.end() > 0 {
                    Some(pointer..pointer + m.end())
                } else {
                    None
                }
            }
        }
    }
}

impl Display for Terminal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Terminal::Literal(value) => write!(f, "'{}'", value),
            Terminal::CharacterRange(range) => {
                write!(f, "'{}'-'{}'", range.start(), range.end())
            }
            Terminal::Expression(expression) => {
                write!(f, "/{}/", expression.pattern().replace('/', "\\/"))
            }
        }
    }
}

impl Symbol {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn is_non_terminal(&self) -> bool {
        matches!(self, Symbol::NonTerminal(_))
    }
}

impl From<Terminal> for Symbol {
    fn from(terminal: Terminal) -> Self {
        Symbol::Terminal(terminal)
    }
}

impl From<NonTerminal> for Symbol {
    fn from(non_terminal: NonTerminal) -> Self {
        Symbol::NonTerminal(non_terminal)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Terminal(terminal) => write!(f, "{}", terminal),
            Symbol::NonTerminal(non_terminal) => write!(f, "{}", non_terminal),
        }
    }
}
