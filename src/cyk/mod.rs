//! The CYK tabular parsing engine.
//!
//! The algorithm requires Chomsky Normal Form, so the parser normalizes its grammar once
//! at construction. Recognition fills a triangular table: the first row holds the
//! tokenization, and the cell for a span of `k` tokens combines every split of the span
//! into two shorter ones, looking up the pair productions that derive the two halves.
//! Trees are built in the original grammar's shape: compacted unit chains are unfolded
//! into their spine and the normalization's utility non-terminals are exploded away.

use crate::util::{Code, Log};
use crate::{
    CykParser, Grammar, IParser, NonTerminal, ParseTree, Production, Symbol, SyntaxError,
    SyntaxErrorReason,
};
use once_cell::unsync::OnceCell;
use std::collections::{HashMap, HashSet};
use std::ops::Range;

/// The terminal productions matching one consumed range of the input.
struct TokenAlternatives {
    range: Range<usize>,
    productions: Vec<Production>,
}

#[derive(Clone)]
struct TableEntry {
    pattern: NonTerminal,
    tree: ParseTree,
}

impl CykParser {
    /// Create a parser for the given grammar.
    ///
    /// The Chomsky normalization and the production indexes are computed here; the
    /// original grammar is retained so parse trees keep its shape.
    pub fn new(grammar: &Grammar) -> Self {
        let normalized = grammar.chomsky_normalized();
        let mut pair_index: HashMap<(NonTerminal, NonTerminal), Vec<Production>> = HashMap::new();
        let mut terminal_productions = Vec::new();
        for production in normalized.productions() {
            match production.rhs() {
                [Symbol::NonTerminal(left), Symbol::NonTerminal(right)] => pair_index
                    .entry((left.clone(), right.clone()))
                    .or_default()
                    .push(production.clone()),
                [Symbol::Terminal(_)] => terminal_productions.push(production.clone()),
                _ => {}
            }
        }
        Self {
            grammar: grammar.clone(),
            normalized,
            pair_index,
            terminal_productions,
            debugger: OnceCell::new(),
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// The Chomsky Normal Form the parser operates on.
    pub fn normalized_grammar(&self) -> &Grammar {
        &self.normalized
    }

    /// Set a log label to debug the parser based on the level of [Log].
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.debugger
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    fn starts_empty(&self) -> bool {
        self.normalized
            .productions()
            .iter()
            .any(|production| production.is_empty() && production.pattern() == self.normalized.start())
    }

    /// Greedy left-to-right tokenization against the terminal productions.
    ///
    /// The first production that matches fixes the consumed range; every other terminal
    /// production matching the same range is kept as an alternative for that token.
    fn tokenize(&self, code: &Code) -> Result<Vec<TokenAlternatives>, SyntaxError> {
        let mut tokens = Vec::new();
        let mut pointer = 0;
        while pointer < code.value.len() {
            let mut matched: Option<Range<usize>> = None;
            let mut productions = Vec::new();
            for production in &self.terminal_productions {
                let terminal = match production.rhs() {
                    [Symbol::Terminal(terminal)] => terminal,
                    _ => continue,
                };
                if let Some(range) = terminal.match_prefix(code, pointer) {
                    let retained = match &matched {
                        None => true,
                        Some(first) => *first == range,
                    };
                    if retained {
                        if matched.is_none() {
                            matched = Some(range);
                        }
                        productions.push(production.clone());
                    }
                }
            }
            match matched {
                Some(range) => {
                    pointer = range.end;
                    tokens.push(TokenAlternatives { range, productions });
                }
                None => {
                    return Err(SyntaxError::new(
                        pointer..code.char_end(pointer),
                        SyntaxErrorReason::UnknownToken,
                    ));
                }
            }
        }
        self.log_tokens(code, &tokens);
        Ok(tokens)
    }

    /// Recognition-only table holding the derivable non-terminals per span.
    fn recognize_table(&self, tokens: &[TokenAlternatives]) -> Vec<Vec<HashSet<NonTerminal>>> {
        let n = tokens.len();
        let mut table: Vec<Vec<HashSet<NonTerminal>>> =
            (0..n).map(|row| vec![HashSet::new(); n - row]).collect();
        for (col, token) in tokens.iter().enumerate() {
            for production in &token.productions {
                table[0][col].insert(production.pattern().clone());
            }
        }
        for row in 1..n {
            for col in 0..n - row {
                let mut cell = HashSet::new();
                for split in 0..row {
                    let right_col = col + split + 1;
                    for left in &table[split][col] {
                        for right in &table[row - split - 1][right_col] {
                            if let Some(productions) =
                                self.pair_index.get(&(left.clone(), right.clone()))
                            {
                                for production in productions {
                                    cell.insert(production.pattern().clone());
                                }
                            }
                        }
                    }
                }
                table[row][col] = cell;
            }
        }
        table
    }

    /// Tree-building table. In single-tree mode every cell keeps one entry per pattern,
    /// which bounds the cell size; in all-trees mode every alternative derivation stays.
    fn build_table(&self, tokens: &[TokenAlternatives], all: bool) -> Vec<Vec<Vec<TableEntry>>> {
        let n = tokens.len();
        let mut table: Vec<Vec<Vec<TableEntry>>> =
            (0..n).map(|row| vec![Vec::new(); n - row]).collect();
        for (col, token) in tokens.iter().enumerate() {
            let mut cell = Vec::new();
            for production in &token.productions {
                cell.push(TableEntry {
                    pattern: production.pattern().clone(),
                    tree: unfolded_tree(production, vec![ParseTree::leaf(token.range.clone())]),
                });
            }
            if !all {
                let mut seen = HashSet::new();
                cell.retain(|entry| seen.insert(entry.pattern.clone()));
            }
            table[0][col] = cell;
        }
        for row in 1..n {
            for col in 0..n - row {
                let mut cell = Vec::new();
                for split in 0..row {
                    let right_col = col + split + 1;
                    for left in &table[split][col] {
                        for right in &table[row - split - 1][right_col] {
                            if let Some(productions) = self
                                .pair_index
                                .get(&(left.pattern.clone(), right.pattern.clone()))
                            {
                                for production in productions {
                                    cell.push(TableEntry {
                                        pattern: production.pattern().clone(),
                                        tree: unfolded_tree(
                                            production,
                                            vec![left.tree.clone(), right.tree.clone()],
                                        ),
                                    });
                                }
                            }
                        }
                    }
                }
                if !all {
                    let mut seen = HashSet::new();
                    cell.retain(|entry| seen.insert(entry.pattern.clone()));
                }
                table[row][col] = cell;
            }
        }
        table
    }

    fn syntax_trees_internal(&self, code: &Code, all: bool) -> Result<Vec<ParseTree>, SyntaxError> {
        if code.value.is_empty() {
            return if self.starts_empty() {
                Ok(vec![ParseTree::node(self.normalized.start().clone(), Vec::new())])
            } else {
                Err(SyntaxError::new(0..0, SyntaxErrorReason::EmptyNotAllowed))
            };
        }
        let tokens = self.tokenize(code)?;
        let table = self.build_table(&tokens, all);
        let n = tokens.len();
        let mut trees: Vec<ParseTree> = Vec::new();
        for entry in &table[n - 1][0] {
            if &entry.pattern == self.normalized.start() {
                let tree = entry
                    .tree
                    .clone()
                    .without_utility(self.normalized.utility_nonterminals());
                if !trees.contains(&tree) {
                    trees.push(tree);
                }
                if !all {
                    break;
                }
            }
        }
        if trees.is_empty() {
            return Err(self.diagnose(code, &tokens, &table));
        }
        Ok(trees)
    }

    /// Report the longest start-rooted prefix found in the first column; when there is
    /// none, the first token is the best hint available.
    fn diagnose(
        &self,
        code: &Code,
        tokens: &[TokenAlternatives],
        table: &[Vec<Vec<TableEntry>>],
    ) -> SyntaxError {
        for row in (0..table.len()).rev() {
            let cell = match table[row].first() {
                Some(cell) => cell,
                None => continue,
            };
            if let Some(entry) = cell
                .iter()
                .find(|entry| &entry.pattern == self.normalized.start())
            {
                if let Some(range) = entry.tree.leaf_range() {
                    return SyntaxError::new(range, SyntaxErrorReason::UnmatchedPattern);
                }
            }
        }
        let range = tokens
            .first()
            .map(|token| token.range.clone())
            .unwrap_or_else(|| code.last_char_range());
        SyntaxError::new(range, SyntaxErrorReason::UnmatchedPattern)
    }

    fn log_tokens(&self, _code: &Code, _tokens: &[TokenAlternatives]) {
        #[cfg(debug_assertions)]
        if let Some(log) = self.debugger.get() {
            if log.logs_verbose() {
                println!("[{}; CykTokens]: {} tokens", log, _tokens.len())
            }
        }
    }

    fn log_result(&self, _code: &Code, _result: Result<(), &SyntaxError>) {
        #[cfg(debug_assertions)]
        if let Some(log) = self.debugger.get() {
            match _result {
                Ok(()) => {
                    if log.logs_success() {
                        println!("[{}; CykSuccess]", log)
                    }
                }
                Err(err) => {
                    if log.logs_result() {
                        println!("[{}; CykError]: {} at {}", log, err, err.position(_code))
                    }
                }
            }
        }
    }
}

/// Rebuild the spine of a compacted unit chain around the children of a table entry.
fn unfolded_tree(production: &Production, children: Vec<ParseTree>) -> ParseTree {
    match production.chain() {
        Some(path) if !path.is_empty() => {
            let mut tree = ParseTree::node(path[path.len() - 1].clone(), children);
            for non_terminal in path[..path.len() - 1].iter().rev() {
                tree = ParseTree::node(non_terminal.clone(), vec![tree]);
            }
            tree
        }
        _ => ParseTree::node(production.pattern().clone(), children),
    }
}

impl IParser for CykParser {
    fn recognizes(&self, text: &str) -> bool {
        let code = Code::from(text);
        if code.value.is_empty() {
            return self.starts_empty();
        }
        match self.tokenize(&code) {
            Ok(tokens) => {
                let table = self.recognize_table(&tokens);
                table[tokens.len() - 1][0].contains(self.normalized.start())
            }
            Err(_) => false,
        }
    }

    fn syntax_tree(&self, text: &str) -> Result<ParseTree, SyntaxError> {
        let code = Code::from(text);
        match self.syntax_trees_internal(&code, false) {
            Ok(mut trees) => {
                self.log_result(&code, Ok(()));
                Ok(trees.remove(0))
            }
            Err(error) => {
                self.log_result(&code, Err(&error));
                Err(error)
            }
        }
    }

    fn all_syntax_trees(&self, text: &str) -> Result<Vec<ParseTree>, SyntaxError> {
        let code = Code::from(text);
        let result = self.syntax_trees_internal(&code, true);
        self.log_result(&code, result.as_ref().map(|_| ()));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Terminal;

    fn nt(name: &str) -> NonTerminal {
        NonTerminal::new(name)
    }

    fn lit(value: &str) -> Symbol {
        Symbol::Terminal(Terminal::literal(value))
    }

    fn bracket_grammar() -> Grammar {
        let s = nt("s");
        Grammar::new(
            vec![
                Production::new(
                    s.clone(),
                    vec![lit("("), Symbol::NonTerminal(s.clone()), lit(")")],
                ),
                Production::new(s.clone(), vec![]),
            ],
            s,
        )
    }

    #[test]
    fn recognizes_after_normalization() {
        let parser = CykParser::new(&bracket_grammar());
        assert!(parser.recognizes(""));
        assert!(parser.recognizes("()"));
        assert!(parser.recognizes("((()))"));
        assert!(!parser.recognizes("(()"));
        assert!(!parser.recognizes(")("));
    }

    #[test]
    fn normalization_preserves_the_language() {
        // recognizing against the normalized grammar equals recognizing the original
        let normalized = bracket_grammar().chomsky_normalized();
        let parser = CykParser::new(&normalized);
        for (input, expected) in [("", true), ("()", true), ("(())", true), ("(", false)] {
            assert_eq!(parser.recognizes(input), expected, "input {:?}", input);
        }
    }

    #[test]
    fn trees_have_the_original_shape() {
        let parser = CykParser::new(&bracket_grammar());
        let tree = parser.syntax_tree("(())").unwrap();
        // s(leaf, s(leaf, s, leaf), leaf) — no utility non-terminal anywhere
        assert_eq!(tree.key(), Some(&nt("s")));
        assert_eq!(tree.children().len(), 3);
        assert_eq!(tree.children()[1].key(), Some(&nt("s")));
        assert_eq!(tree.leaves(), vec![0..1, 1..2, 2..3, 3..4]);

        let utility = parser.normalized_grammar().utility_nonterminals().clone();
        let no_utility = tree.filter(&|key| !utility.contains(key));
        assert!(no_utility.is_some());
    }

    #[test]
    fn empty_input_tree_is_a_bare_start_node() {
        let parser = CykParser::new(&bracket_grammar());
        let tree = parser.syntax_tree("").unwrap();
        assert_eq!(tree, ParseTree::node(nt("s"), vec![]));
    }

    #[test]
    fn empty_input_errors_when_not_nullable() {
        let grammar = Grammar::new(vec![Production::new(nt("s"), vec![lit("x")])], nt("s"));
        let parser = CykParser::new(&grammar);
        assert!(!parser.recognizes(""));
        let error = parser.syntax_tree("").unwrap_err();
        assert_eq!(error.reason, SyntaxErrorReason::EmptyNotAllowed);
    }

    #[test]
    fn unknown_token_reports_the_position() {
        let grammar = Grammar::new(
            vec![Production::new(nt("s"), vec![lit("a"), lit("b")])],
            nt("s"),
        );
        let parser = CykParser::new(&grammar);
        let error = parser.syntax_tree("aX").unwrap_err();
        assert_eq!(error.reason, SyntaxErrorReason::UnknownToken);
        assert_eq!(error.range, 1..2);
    }

    #[test]
    fn unmatched_pattern_reports_the_longest_prefix() {
        let parser = CykParser::new(&bracket_grammar());
        let error = parser.syntax_tree("()(").unwrap_err();
        assert_eq!(error.reason, SyntaxErrorReason::UnmatchedPattern);
        // the longest start-rooted prefix is "()"
        assert_eq!(error.range, 0..2);
    }

    #[test]
    fn ambiguous_derivations_are_enumerated() {
        // e -> e '+' e | 'a'
        let e = nt("e");
        let grammar = Grammar::new(
            vec![
                Production::new(
                    e.clone(),
                    vec![
                        Symbol::NonTerminal(e.clone()),
                        lit("+"),
                        Symbol::NonTerminal(e.clone()),
                    ],
                ),
                Production::new(e.clone(), vec![lit("a")]),
            ],
            e,
        );
        let parser = CykParser::new(&grammar);
        assert_eq!(parser.all_syntax_trees("a").unwrap().len(), 1);
        assert_eq!(parser.all_syntax_trees("a+a").unwrap().len(), 1);
        assert_eq!(parser.all_syntax_trees("a+a+a").unwrap().len(), 2);
        assert_eq!(parser.all_syntax_trees("a+a+a+a").unwrap().len(), 5);
    }

    #[test]
    fn character_range_terminals_tokenize() {
        let s = nt("s");
        let grammar = Grammar::new(
            vec![Production::new(
                s.clone(),
                vec![Symbol::Terminal(Terminal::range('a'..='z').unwrap())],
            )],
            s,
        );
        let parser = CykParser::new(&grammar);
        assert!(parser.recognizes("a"));
        assert!(parser.recognizes("m"));
        assert!(parser.recognizes("z"));
        assert!(!parser.recognizes("A"));
        assert!(!parser.recognizes("aa"));
    }
}
