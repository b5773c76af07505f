use crate::{Grammar, GrammarError, NonTerminal, Production, Symbol};
use once_cell::unsync::OnceCell;
use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};

impl Grammar {
    /// Create a new grammar from its productions and start symbol.
    pub fn new(productions: Vec<Production>, start: NonTerminal) -> Self {
        Grammar::with_utility(productions, start, HashSet::new())
    }

    /// Create a grammar whose `utility` non-terminals were introduced by normalization or
    /// by an importer expansion. Utility non-terminals are exploded out of every parse
    /// tree returned to the caller.
    pub fn with_utility(
        productions: Vec<Production>,
        start: NonTerminal,
        utility: HashSet<NonTerminal>,
    ) -> Self {
        Self {
            productions,
            start,
            utility_nonterminals: utility,
            index: OnceCell::new(),
            nullables: OnceCell::new(),
        }
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn start(&self) -> &NonTerminal {
        &self.start
    }

    pub fn utility_nonterminals(&self) -> &HashSet<NonTerminal> {
        &self.utility_nonterminals
    }

    /// Every production whose pattern is the given non-terminal. A non-terminal without
    /// productions generates the empty language; references to it never match.
    pub fn productions_for(&self, non_terminal: &NonTerminal) -> &[Production] {
        self.obtain_index()
            .get(non_terminal)
            .map(|productions| productions.as_slice())
            .unwrap_or(&[])
    }

    fn obtain_index(&self) -> &HashMap<NonTerminal, Vec<Production>> {
        self.index.get_or_init(|| {
            let mut index: HashMap<NonTerminal, Vec<Production>> = HashMap::new();
            for production in &self.productions {
                index
                    .entry(production.pattern().clone())
                    .or_default()
                    .push(production.clone());
            }
            index
        })
    }

    /// The set of non-terminals which can derive the empty string, as a fixed point over
    /// the productions. Computed once per grammar.
    pub fn nullable_nonterminals(&self) -> &HashSet<NonTerminal> {
        self.nullables.get_or_init(|| {
            let mut nullable = HashSet::new();
            let mut changed = true;
            while changed {
                changed = false;
                for production in &self.productions {
                    if nullable.contains(production.pattern()) {
                        continue;
                    }
                    let all_nullable = production.rhs().iter().all(|symbol| match symbol {
                        Symbol::NonTerminal(non_terminal) => nullable.contains(non_terminal),
                        Symbol::Terminal(_) => false,
                    });
                    if all_nullable {
                        nullable.insert(production.pattern().clone());
                        changed = true;
                    }
                }
            }
            nullable
        })
    }

    /// Every non-terminal mentioned by the grammar, as pattern or on a right-hand side.
    pub fn non_terminals(&self) -> HashSet<NonTerminal> {
        let mut set = HashSet::new();
        for production in &self.productions {
            set.insert(production.pattern().clone());
            for non_terminal in production.generated_non_terminals() {
                set.insert(non_terminal.clone());
            }
        }
        set
    }

    /// Non-terminals that cannot be reached from the start symbol.
    pub fn unreachable_nonterminals(&self) -> HashSet<NonTerminal> {
        let mut reachable = HashSet::new();
        let mut queue = vec![self.start.clone()];
        while let Some(current) = queue.pop() {
            if !reachable.insert(current.clone()) {
                continue;
            }
            for production in self.productions_for(&current) {
                for non_terminal in production.generated_non_terminals() {
                    if !reachable.contains(non_terminal) {
                        queue.push(non_terminal.clone());
                    }
                }
            }
        }
        self.non_terminals()
            .into_iter()
            .filter(|non_terminal| !reachable.contains(non_terminal))
            .collect()
    }

    /// Non-terminals that cannot derive any terminal string, including non-terminals
    /// without productions.
    pub fn unterminated_nonterminals(&self) -> HashSet<NonTerminal> {
        let mut terminated: HashSet<NonTerminal> = HashSet::new();
        let mut changed = true;
        while changed {
            changed = false;
            for production in &self.productions {
                if terminated.contains(production.pattern()) {
                    continue;
                }
                let all_terminated = production.rhs().iter().all(|symbol| match symbol {
                    Symbol::NonTerminal(non_terminal) => terminated.contains(non_terminal),
                    Symbol::Terminal(_) => true,
                });
                if all_terminated {
                    terminated.insert(production.pattern().clone());
                    changed = true;
                }
            }
        }
        self.non_terminals()
            .into_iter()
            .filter(|non_terminal| !terminated.contains(non_terminal))
            .collect()
    }

    /// Validate that every non-terminal is reachable from the start symbol and derives at
    /// least one terminal string.
    pub fn validate(&self) -> Result<(), GrammarError> {
        let unreachable = self.unreachable_nonterminals();
        if !unreachable.is_empty() {
            let mut names: Vec<&str> = unreachable.iter().map(|n| n.name()).collect();
            names.sort_unstable();
            return Err(GrammarError::new(
                "UnreachableNonTerminals".into(),
                format!(
                    "Non-terminals {:?} cannot be reached from {}.",
                    names, self.start
                ),
            ));
        }
        let unterminated = self.unterminated_nonterminals();
        if !unterminated.is_empty() {
            let mut names: Vec<&str> = unterminated.iter().map(|n| n.name()).collect();
            names.sort_unstable();
            return Err(GrammarError::new(
                "UnterminatedNonTerminals".into(),
                format!("Non-terminals {:?} do not derive any terminal string.", names),
            ));
        }
        Ok(())
    }

    /// The Chomsky Normal Form of this grammar.
    ///
    /// Every production of the returned grammar is either a pair of non-terminals, a
    /// single terminal, or the start symbol's empty production. The transformation is
    /// deterministic; non-terminals it introduces are recorded in the returned grammar's
    /// [utility set](Grammar::utility_nonterminals).
    pub fn chomsky_normalized(&self) -> Grammar {
        crate::normalization::chomsky_normalized(self)
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // start symbol's alternatives first, the rest grouped in first-appearance order
        let mut order: Vec<&NonTerminal> = vec![&self.start];
        for production in &self.productions {
            if !order.contains(&production.pattern()) {
                order.push(production.pattern());
            }
        }
        for pattern in order {
            let alternatives = self.productions_for(pattern);
            if alternatives.is_empty() {
                continue;
            }
            write!(f, "{} ->", pattern)?;
            for (index, production) in alternatives.iter().enumerate() {
                if index != 0 {
                    write!(f, " |")?;
                }
                if production.rhs().is_empty() {
                    write!(f, " ''")?;
                }
                for symbol in production.rhs() {
                    write!(f, " {}", symbol)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
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

    #[test]
    fn nullable_fixed_point() {
        // s -> a b; a -> 'x' | ε; b -> ε
        let grammar = Grammar::new(
            vec![
                Production::new(
                    nt("s"),
                    vec![Symbol::NonTerminal(nt("a")), Symbol::NonTerminal(nt("b"))],
                ),
                Production::new(nt("a"), vec![lit("x")]),
                Production::new(nt("a"), vec![]),
                Production::new(nt("b"), vec![]),
            ],
            nt("s"),
        );
        let nullables = grammar.nullable_nonterminals();
        assert!(nullables.contains(&nt("s")));
        assert!(nullables.contains(&nt("a")));
        assert!(nullables.contains(&nt("b")));

        let non_nullable = Grammar::new(
            vec![Production::new(nt("s"), vec![lit("x")])],
            nt("s"),
        );
        assert!(non_nullable.nullable_nonterminals().is_empty());
    }

    #[test]
    fn generates_empty_consults_the_nullable_set() {
        let grammar = Grammar::new(
            vec![
                Production::new(nt("s"), vec![Symbol::NonTerminal(nt("a"))]),
                Production::new(nt("a"), vec![]),
            ],
            nt("s"),
        );
        assert!(grammar.productions()[0].generates_empty(&grammar));

        let with_terminal = Production::new(nt("s"), vec![lit("x")]);
        assert!(!with_terminal.generates_empty(&grammar));
    }

    #[test]
    fn linting_reports_unreachable_and_unterminated() {
        // "orphan" is never referenced; "loop" never derives a terminal string
        let grammar = Grammar::new(
            vec![
                Production::new(nt("s"), vec![lit("x")]),
                Production::new(nt("orphan"), vec![lit("y")]),
                Production::new(nt("loop"), vec![Symbol::NonTerminal(nt("loop"))]),
            ],
            nt("s"),
        );
        assert!(grammar.unreachable_nonterminals().contains(&nt("orphan")));
        assert!(grammar.unterminated_nonterminals().contains(&nt("loop")));
        assert!(grammar.validate().is_err());

        let clean = Grammar::new(vec![Production::new(nt("s"), vec![lit("x")])], nt("s"));
        assert!(clean.validate().is_ok());
    }

    #[test]
    fn productions_without_pattern_are_empty() {
        let grammar = Grammar::new(vec![Production::new(nt("s"), vec![lit("x")])], nt("s"));
        assert!(grammar.productions_for(&nt("missing")).is_empty());
    }
}
