//! lang_cfg is a library to recognize and parse strings against arbitrary context-free grammars (CFG),
//! including ambiguous and nondeterministic ones.
//!
//! # Overview
//! Deterministic parser generators reject a large family of useful grammars: left recursion,
//! ambiguity, or plain nondeterminism each rule a grammar out of the LL/LR world.
//! This library instead implements two general recognition algorithms which accept every
//! context-free grammar: the Earley chart parser ([EarleyParser]) and the CYK tabular parser
//! ([CykParser]). A grammar is an ordinary value built from [Production]s over terminal and
//! non-terminal [Symbol]s; both parsers consume the same [Grammar] and produce the same
//! [ParseTree] shape, so an application can pick the engine per workload.
//!
//! # Design
//!
//! A [Grammar] is immutable after construction and freely shareable; every once-per-grammar
//! computation (production index, nullable set) is cached lazily. The [EarleyParser] works on
//! the grammar as written and tokenizes the input on the fly against the terminals the chart
//! expects at each position. The [CykParser] requires Chomsky Normal Form and therefore
//! normalizes the grammar once at construction time ([Grammar::chomsky_normalized]); the
//! non-terminals introduced by that transformation are recorded on the grammar and removed
//! again from every tree handed back to the caller, so the caller only ever observes the
//! grammar it wrote.
//!
//! Parse failures are reported as a [SyntaxError] carrying the byte range of the offending
//! input together with a [reason](SyntaxErrorReason) and, where applicable, the non-terminals
//! the parser was expecting.
//!
//! # Example
//!
//! Following is a parser for well-balanced round brackets.
//! ```
//! use lang_cfg::{EarleyParser, Grammar, IParser, NonTerminal, Production, Symbol, Terminal};
//!
//! let s = NonTerminal::new("s");
//! let grammar = Grammar::new(
//!     vec![
//!         Production::new(
//!             s.clone(),
//!             vec![
//!                 Symbol::Terminal(Terminal::literal("(")),
//!                 Symbol::NonTerminal(s.clone()),
//!                 Symbol::Terminal(Terminal::literal(")")),
//!             ],
//!         ),
//!         Production::new(s.clone(), vec![]),
//!     ],
//!     s.clone(),
//! );
//!
//! let parser = EarleyParser::new(&grammar);
//! assert!(parser.recognizes("(())"));
//! assert!(!parser.recognizes("(()"));
//!
//! let tree = parser.syntax_tree("()").unwrap();
//! assert_eq!(tree.key(), Some(&s));
//! ```

//! # License
//! [lang_cfg](crate) is provided under the MIT license.
mod cyk;
mod earley;
mod error;
pub mod examples;
mod grammar;
mod normalization;
mod production;
mod symbol;
mod tree;
pub mod util;

use once_cell::unsync::OnceCell;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::ops::{Range, RangeInclusive};
use std::rc::Rc;

use crate::util::Log;

/// A non-terminal symbol of a grammar.
///
/// Non-terminals are value types identified by their name; two non-terminals with the
/// same name compare equal and hash alike, no matter which grammar they were written for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonTerminal {
    name: Rc<str>,
}

/// A compiled regular-expression terminal.
///
/// The pattern text is the identity of the expression: equality and hashing ignore the
/// compiled automaton. Construction is fallible and happens through [Terminal::expression].
#[derive(Debug, Clone)]
pub struct TerminalExpression {
    pattern: Rc<str>,
    regexp: Regex,
}

/// A terminal symbol of a grammar.
///
/// Terminals are matched directly against the input. A [literal](Terminal::Literal) matches
/// itself, a [character range](Terminal::CharacterRange) matches exactly one code point
/// inside an inclusive range, and an [expression](Terminal::Expression) consumes the first
/// regular-expression match beginning exactly at the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Terminal {
    Literal(Rc<str>),
    CharacterRange(RangeInclusive<char>),
    Expression(TerminalExpression),
}

/// A grammar symbol, either a [Terminal] or a [NonTerminal].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

/// A production rule of a grammar.
///
/// A production derives its `pattern` non-terminal into the sequence of symbols on its
/// right-hand side. An empty right-hand side derives the empty string.
///
/// Productions synthesized by the Chomsky normalization carry a chain trace naming the
/// unit productions that were compacted into them; the trace is auxiliary metadata used
/// to rebuild the original tree shape and does not participate in equality or hashing.
#[derive(Debug, Clone)]
pub struct Production {
    pattern: NonTerminal,
    rhs: Vec<Symbol>,
    chain: Option<Vec<NonTerminal>>,
}

/// An immutable context-free grammar: a set of [Production]s together with a start symbol.
///
/// The set of `utility_nonterminals` names non-terminals introduced by normalization or by
/// an importer expansion. They are implementation detail of the grammar and are exploded
/// out of every [ParseTree] returned to the caller.
#[derive(Debug, Clone)]
pub struct Grammar {
    productions: Vec<Production>,
    start: NonTerminal,
    utility_nonterminals: HashSet<NonTerminal>,
    index: OnceCell<HashMap<NonTerminal, Vec<Production>>>,
    nullables: OnceCell<HashSet<NonTerminal>>,
}

/// A parse tree over the non-terminals of a grammar.
///
/// Inner nodes carry a key (by default a [NonTerminal]) and an ordered list of children;
/// leaves carry the byte range of the input they cover. Concatenating the leaf ranges of a
/// tree in order always reproduces the parsed input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseTree<TKey = NonTerminal> {
    Node {
        key: TKey,
        children: Vec<ParseTree<TKey>>,
    },
    Leaf(Range<usize>),
}

/// An error raised while constructing a grammar or one of its symbols,
/// e.g. an invalid regular expression or an inverted character range.
#[derive(Debug)]
pub struct GrammarError {
    what: String,
    message: String,
}

/// The failure category of a [SyntaxError].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxErrorReason {
    /// No terminal production matched the input at the reported position (CYK tokenization).
    UnknownToken,
    /// No expected terminal was able to consume the upcoming character (Earley chart).
    UnexpectedToken,
    /// The input, or its longest analyzable prefix, is not derivable from the start symbol.
    UnmatchedPattern,
    /// The input is empty and the grammar does not generate the empty word.
    EmptyNotAllowed,
}

/// An error returned when the parser failed to read the input with the provided grammar.
///
/// The `range` is a byte range into the parsed input and always lies within it.
/// `context` optionally lists the non-terminals the parser was expecting at that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub range: Range<usize>,
    pub reason: SyntaxErrorReason,
    pub context: Vec<NonTerminal>,
}

/// The interface shared by both parsing engines.
pub trait IParser {
    /// Whether the input is a word of the grammar's language.
    fn recognizes(&self, text: &str) -> bool;

    /// Parse the input and return one syntax tree. For ambiguous grammars an arbitrary
    /// derivation is chosen, at polynomial cost.
    fn syntax_tree(&self, text: &str) -> Result<ParseTree, SyntaxError>;

    /// Parse the input and return every syntax tree. For ambiguous grammars the number of
    /// derivations, and therefore the cost, can be exponential in the input length.
    fn all_syntax_trees(&self, text: &str) -> Result<Vec<ParseTree>, SyntaxError>;
}

/// An Earley chart parser.
///
/// Works on any [Grammar] as written, including left-recursive, right-recursive and
/// nullable ones. The input is tokenized on the fly: at every chart position exactly the
/// terminals expected by the chart are tried against the input, so overlapping terminals
/// never shadow each other.
pub struct EarleyParser {
    grammar: Grammar,
    debugger: OnceCell<Log<&'static str>>,
}

/// A CYK parser over the Chomsky Normal Form of a grammar.
///
/// The normalization runs once in [CykParser::new]; parse trees are mapped back to the
/// shape of the original grammar. The tokenizer is greedy, left to right: the first
/// terminal production that matches fixes the consumed range, and only alternatives
/// matching that same range are retained. Grammars whose terminals overlap only partially
/// (one terminal matching a strict prefix of another at the same position) can therefore
/// be mis-tokenized; the [EarleyParser] is the safer choice for such grammars.
pub struct CykParser {
    grammar: Grammar,
    normalized: Grammar,
    pair_index: HashMap<(NonTerminal, NonTerminal), Vec<Production>>,
    terminal_productions: Vec<Production>,
    debugger: OnceCell<Log<&'static str>>,
}
