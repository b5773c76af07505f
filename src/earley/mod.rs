//! The Earley chart parsing engine.
//!
//! The chart is an ordered collection of state-item columns indexed by byte position into
//! the input. A state item `(production, dot, origin)` is a partial parse of one
//! production which started at byte `origin` and has consumed `dot` of its right-hand
//! side symbols. At every column the predict and complete operations iterate to a fixed
//! point; scanning tries the terminals the column expects against the input and places
//! the advanced items in the column at the end of the consumed range, so terminals of
//! different lengths coexist without a separate tokenizer.

mod reconstruction;

use crate::util::{Code, Log};
use crate::{
    EarleyParser, Grammar, IParser, NonTerminal, ParseTree, Production, Symbol, SyntaxError,
    SyntaxErrorReason, Terminal,
};
use once_cell::unsync::OnceCell;
use reconstruction::TreeBuilder;
use std::collections::HashSet;
use std::ops::Range;

/// A partial parse of one production: `dot` symbols consumed since byte `origin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StateItem {
    production: Production,
    dot: usize,
    origin: usize,
}

impl StateItem {
    fn new(production: Production, origin: usize) -> Self {
        Self {
            production,
            dot: 0,
            origin,
        }
    }

    fn next_symbol(&self) -> Option<&Symbol> {
        self.production.rhs().get(self.dot)
    }

    fn advanced(&self) -> Self {
        Self {
            production: self.production.clone(),
            dot: self.dot + 1,
            origin: self.origin,
        }
    }
}

/// A completed state item, recorded in the column where it completed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ParsedItem {
    pub(crate) production: Production,
    pub(crate) origin: usize,
}

/// One column of the chart: an insertion-ordered worklist with set membership on the
/// three-field item identity. Completed columns are never mutated again.
#[derive(Default)]
struct StateColumn {
    items: Vec<StateItem>,
    membership: HashSet<StateItem>,
}

impl StateColumn {
    fn insert(&mut self, item: StateItem) -> bool {
        if self.membership.insert(item.clone()) {
            self.items.push(item);
            true
        } else {
            false
        }
    }
}

pub(crate) struct Chart {
    columns: Vec<StateColumn>,
    /// Completed items, keyed by their completion column.
    pub(crate) parsed: Vec<Vec<ParsedItem>>,
    /// Terminal matches, keyed by the column they start at.
    pub(crate) tokens: Vec<Vec<(Terminal, Range<usize>)>>,
}

impl Chart {
    fn token_ending_at(&self, end: usize) -> Option<Range<usize>> {
        self.tokens
            .iter()
            .flatten()
            .find(|(_, range)| range.end == end)
            .map(|(_, range)| range.clone())
    }

    fn last_token_range(&self) -> Option<Range<usize>> {
        self.tokens
            .iter()
            .flatten()
            .map(|(_, range)| range.clone())
            .max_by_key(|range| (range.end, range.start))
    }

    fn first_token_range(&self) -> Option<Range<usize>> {
        self.tokens
            .iter()
            .flatten()
            .map(|(_, range)| range.clone())
            .min_by_key(|range| (range.start, range.end))
    }
}

impl EarleyParser {
    /// Create a parser for the given grammar. The grammar's nullable set is computed
    /// here, once, and reused by every parse.
    pub fn new(grammar: &Grammar) -> Self {
        let grammar = grammar.clone();
        grammar.nullable_nonterminals();
        Self {
            grammar,
            debugger: OnceCell::new(),
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Set a log label to debug the parser based on the level of [Log].
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.debugger
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    fn build_chart(&self, code: &Code) -> Chart {
        let n = code.value.len();
        let mut chart = Chart {
            columns: (0..=n).map(|_| StateColumn::default()).collect(),
            parsed: vec![Vec::new(); n + 1],
            tokens: vec![Vec::new(); n + 1],
        };
        let nullables = self.grammar.nullable_nonterminals();

        for production in self.grammar.productions_for(self.grammar.start()) {
            chart.columns[0].insert(StateItem::new(production.clone(), 0));
        }

        for column in 0..=n {
            let mut cursor = 0;
            while cursor < chart.columns[column].items.len() {
                let item = chart.columns[column].items[cursor].clone();
                cursor += 1;
                match item.next_symbol() {
                    Some(Symbol::NonTerminal(non_terminal)) => {
                        let non_terminal = non_terminal.clone();
                        for production in self.grammar.productions_for(&non_terminal) {
                            chart.columns[column].insert(StateItem::new(production.clone(), column));
                        }
                        // A nullable symbol may derive nothing here; advancing over it at
                        // prediction time keeps right-nullable completions from being lost.
                        if nullables.contains(&non_terminal) {
                            chart.columns[column].insert(item.advanced());
                        }
                    }
                    Some(Symbol::Terminal(terminal)) => {
                        if let Some(range) = terminal.match_prefix(code, column) {
                            let token = (terminal.clone(), range.clone());
                            if !chart.tokens[column].contains(&token) {
                                chart.tokens[column].push(token);
                            }
                            chart.columns[range.end].insert(item.advanced());
                        }
                    }
                    None => {
                        let parsed = ParsedItem {
                            production: item.production.clone(),
                            origin: item.origin,
                        };
                        if !chart.parsed[column].contains(&parsed) {
                            chart.parsed[column].push(parsed);
                        }
                        let pattern = item.production.pattern();
                        let waiting: Vec<StateItem> = chart.columns[item.origin]
                            .items
                            .iter()
                            .filter(|candidate| {
                                matches!(
                                    candidate.next_symbol(),
                                    Some(Symbol::NonTerminal(awaited)) if awaited == pattern
                                )
                            })
                            .cloned()
                            .collect();
                        for candidate in waiting {
                            chart.columns[column].insert(candidate.advanced());
                        }
                    }
                }
            }
            self.log_column(code, column, chart.columns[column].items.len());
        }
        chart
    }

    fn accepted(&self, chart: &Chart, length: usize) -> bool {
        chart.parsed[length]
            .iter()
            .any(|item| item.origin == 0 && item.production.pattern() == self.grammar.start())
    }

    fn root_items<'chart>(&self, chart: &'chart Chart, length: usize) -> Vec<&'chart ParsedItem> {
        chart.parsed[length]
            .iter()
            .filter(|item| item.origin == 0 && item.production.pattern() == self.grammar.start())
            .collect()
    }

    fn diagnose(&self, code: &Code, chart: &Chart) -> SyntaxError {
        let n = code.value.len();
        if n == 0 {
            return SyntaxError::new(0..0, SyntaxErrorReason::EmptyNotAllowed);
        }
        let frontier = chart
            .columns
            .iter()
            .rposition(|column| !column.items.is_empty())
            .unwrap_or(0);
        if frontier < n {
            // the chart stalled before consuming the whole input
            let expects_terminal = chart.columns[frontier].items.iter().any(|item| {
                matches!(item.next_symbol(), Some(Symbol::Terminal(_)))
            });
            if expects_terminal && chart.tokens[frontier].is_empty() {
                return SyntaxError::new(
                    frontier..code.char_end(frontier),
                    SyntaxErrorReason::UnexpectedToken,
                );
            }
            let expected: Vec<NonTerminal> = chart.columns[frontier]
                .items
                .iter()
                .filter_map(|item| match item.next_symbol() {
                    Some(Symbol::NonTerminal(non_terminal)) => Some(non_terminal.clone()),
                    _ => None,
                })
                .collect();
            return SyntaxError::with_context(
                frontier..code.char_end(frontier),
                SyntaxErrorReason::UnmatchedPattern,
                expected,
            );
        }
        // the whole input is consumable: report past the longest start-rooted prefix
        let prefix = (0..=n).rev().find(|&end| {
            chart.parsed[end]
                .iter()
                .any(|item| item.origin == 0 && item.production.pattern() == self.grammar.start())
        });
        match prefix {
            Some(end) if end > 0 => {
                let range = chart
                    .token_ending_at(end)
                    .unwrap_or_else(|| code.last_char_range());
                SyntaxError::new(range, SyntaxErrorReason::UnmatchedPattern)
            }
            Some(_) => {
                // only the empty prefix derives from the start symbol
                SyntaxError::new(0..code.char_end(0), SyntaxErrorReason::UnmatchedPattern)
            }
            None => {
                let range = chart
                    .last_token_range()
                    .or_else(|| chart.first_token_range())
                    .unwrap_or_else(|| code.last_char_range());
                SyntaxError::new(range, SyntaxErrorReason::UnmatchedPattern)
            }
        }
    }

    fn finalize(&self, tree: ParseTree) -> ParseTree {
        tree.without_utility(self.grammar.utility_nonterminals())
    }

    fn log_column(&self, _code: &Code, _column: usize, _items: usize) {
        #[cfg(debug_assertions)]
        if let Some(log) = self.debugger.get() {
            if log.logs_verbose() {
                println!(
                    "[{}; EarleyColumn]: {} items at {}",
                    log,
                    _items,
                    _code.obtain_position(_column)
                )
            }
        }
    }

    fn log_result(&self, _code: &Code, _result: Result<(), &SyntaxError>) {
        #[cfg(debug_assertions)]
        if let Some(log) = self.debugger.get() {
            match _result {
                Ok(()) => {
                    if log.logs_success() {
                        println!("[{}; EarleySuccess]", log)
                    }
                }
                Err(err) => {
                    if log.logs_result() {
                        println!(
                            "[{}; EarleyError]: {} at {}",
                            log,
                            err,
                            err.position(_code)
                        )
                    }
                }
            }
        }
    }
}

impl IParser for EarleyParser {
    fn recognizes(&self, text: &str) -> bool {
        let code = Code::from(text);
        let chart = self.build_chart(&code);
        self.accepted(&chart, code.value.len())
    }

    fn syntax_tree(&self, text: &str) -> Result<ParseTree, SyntaxError> {
        let code = Code::from(text);
        let chart = self.build_chart(&code);
        let length = code.value.len();
        if !self.accepted(&chart, length) {
            let error = self.diagnose(&code, &chart);
            self.log_result(&code, Err(&error));
            return Err(error);
        }
        let mut builder = TreeBuilder::new(&chart, false);
        for root in self.root_items(&chart, length) {
            if let Some(tree) = builder
                .build(root.production.clone(), 0, length)
                .into_iter()
                .next()
            {
                self.log_result(&code, Ok(()));
                return Ok(self.finalize(tree));
            }
        }
        // an accepted chart always yields a derivation; kept as an error for safety
        let error = self.diagnose(&code, &chart);
        self.log_result(&code, Err(&error));
        Err(error)
    }

    fn all_syntax_trees(&self, text: &str) -> Result<Vec<ParseTree>, SyntaxError> {
        let code = Code::from(text);
        let chart = self.build_chart(&code);
        let length = code.value.len();
        if !self.accepted(&chart, length) {
            let error = self.diagnose(&code, &chart);
            self.log_result(&code, Err(&error));
            return Err(error);
        }
        let mut builder = TreeBuilder::new(&chart, true);
        let mut trees: Vec<ParseTree> = Vec::new();
        for root in self.root_items(&chart, length) {
            for tree in builder.build(root.production.clone(), 0, length) {
                let tree = self.finalize(tree);
                if !trees.contains(&tree) {
                    trees.push(tree);
                }
            }
        }
        self.log_result(&code, Ok(()));
        Ok(trees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nt(name: &str) -> NonTerminal {
        NonTerminal::new(name)
    }

    fn lit(value: &str) -> Symbol {
        Symbol::Terminal(Terminal::literal(value))
    }

    fn ab_grammar() -> Grammar {
        // s -> 'a' s 'b' | ε — the language aⁿbⁿ
        let s = nt("s");
        Grammar::new(
            vec![
                Production::new(
                    s.clone(),
                    vec![lit("a"), Symbol::NonTerminal(s.clone()), lit("b")],
                ),
                Production::new(s.clone(), vec![]),
            ],
            s,
        )
    }

    #[test]
    fn recognizes_matching_inputs() {
        let parser = EarleyParser::new(&ab_grammar());
        assert!(parser.recognizes(""));
        assert!(parser.recognizes("ab"));
        assert!(parser.recognizes("aaabbb"));
        assert!(!parser.recognizes("aab"));
        assert!(!parser.recognizes("ba"));
    }

    #[test]
    fn left_recursion_is_supported() {
        // list -> list 'x' | 'x'
        let list = nt("list");
        let grammar = Grammar::new(
            vec![
                Production::new(
                    list.clone(),
                    vec![Symbol::NonTerminal(list.clone()), lit("x")],
                ),
                Production::new(list.clone(), vec![lit("x")]),
            ],
            list,
        );
        let parser = EarleyParser::new(&grammar);
        assert!(parser.recognizes("x"));
        assert!(parser.recognizes("xxxxx"));
        assert!(!parser.recognizes(""));

        let tree = parser.syntax_tree("xxx").unwrap();
        assert_eq!(tree.leaves(), vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn eager_nullable_prediction() {
        // s -> a a; a -> 'a' | ε
        let grammar = Grammar::new(
            vec![
                Production::new(
                    nt("s"),
                    vec![Symbol::NonTerminal(nt("a")), Symbol::NonTerminal(nt("a"))],
                ),
                Production::new(nt("a"), vec![lit("a")]),
                Production::new(nt("a"), vec![]),
            ],
            nt("s"),
        );
        let parser = EarleyParser::new(&grammar);
        assert!(parser.recognizes(""));
        assert!(parser.recognizes("a"));
        assert!(parser.recognizes("aa"));
        assert!(!parser.recognizes("aaa"));
    }

    #[test]
    fn nullable_children_appear_in_the_tree() {
        let parser = EarleyParser::new(&ab_grammar());
        let tree = parser.syntax_tree("ab").unwrap();
        // s over "ab" derives 'a', the empty s, 'b'
        assert_eq!(tree.key(), Some(&nt("s")));
        assert_eq!(tree.children().len(), 3);
        assert_eq!(tree.children()[1], ParseTree::node(nt("s"), vec![]));
        assert_eq!(tree.leaves(), vec![0..1, 1..2]);
    }

    #[test]
    fn empty_input_errors_when_not_nullable() {
        let grammar = Grammar::new(vec![Production::new(nt("s"), vec![lit("x")])], nt("s"));
        let parser = EarleyParser::new(&grammar);
        let error = parser.syntax_tree("").unwrap_err();
        assert_eq!(error.reason, SyntaxErrorReason::EmptyNotAllowed);
        assert_eq!(error.range, 0..0);
    }

    #[test]
    fn unexpected_character_is_reported_where_scanning_stalled() {
        let parser = EarleyParser::new(&ab_grammar());
        let error = parser.syntax_tree("aXb").unwrap_err();
        assert_eq!(error.reason, SyntaxErrorReason::UnexpectedToken);
        assert_eq!(error.range, 1..2);
    }

    #[test]
    fn multi_character_terminals_land_in_later_columns() {
        // s -> 'ab' s | 'c'
        let s = nt("s");
        let grammar = Grammar::new(
            vec![
                Production::new(s.clone(), vec![lit("ab"), Symbol::NonTerminal(s.clone())]),
                Production::new(s.clone(), vec![lit("c")]),
            ],
            s,
        );
        let parser = EarleyParser::new(&grammar);
        assert!(parser.recognizes("ababc"));
        assert!(!parser.recognizes("abab"));
        let tree = parser.syntax_tree("abc").unwrap();
        assert_eq!(tree.leaves(), vec![0..2, 2..3]);
    }

    #[test]
    fn overlapping_terminals_are_all_tried() {
        // s -> 'a' 'ab' | 'aa' 'b'
        let grammar = Grammar::new(
            vec![
                Production::new(nt("s"), vec![lit("a"), lit("ab")]),
                Production::new(nt("s"), vec![lit("aa"), lit("b")]),
            ],
            nt("s"),
        );
        let parser = EarleyParser::new(&grammar);
        assert!(parser.recognizes("aab"));
        let trees = parser.all_syntax_trees("aab").unwrap();
        assert_eq!(trees.len(), 2);
    }

    #[test]
    fn unmatchable_nonterminal_reference_rejects() {
        // s -> 'a' missing — "missing" has no productions and generates nothing
        let grammar = Grammar::new(
            vec![Production::new(
                nt("s"),
                vec![lit("a"), Symbol::NonTerminal(nt("missing"))],
            )],
            nt("s"),
        );
        let parser = EarleyParser::new(&grammar);
        assert!(!parser.recognizes("a"));
        let error = parser.syntax_tree("ax").unwrap_err();
        assert_eq!(error.reason, SyntaxErrorReason::UnmatchedPattern);
        assert_eq!(error.range, 1..2);
        assert!(error.context.contains(&nt("missing")));
    }
}
