use crate::{Grammar, NonTerminal, Production, Symbol, Terminal};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

impl Production {
    /// Create a new production deriving `pattern` into the right-hand side symbols.
    ///
    /// Epsilon-literal terminals are stripped from the right-hand side, so a production
    /// written as `a -> ''` is the same value as a production with an empty right-hand
    /// side.
    pub fn new(pattern: NonTerminal, rhs: Vec<Symbol>) -> Self {
        let rhs = rhs
            .into_iter()
            .filter(|symbol| match symbol {
                Symbol::Terminal(terminal) => !terminal.is_epsilon(),
                Symbol::NonTerminal(_) => true,
            })
            .collect();
        Self {
            pattern,
            rhs,
            chain: None,
        }
    }

    pub(crate) fn with_chain(
        pattern: NonTerminal,
        rhs: Vec<Symbol>,
        chain: Vec<NonTerminal>,
    ) -> Self {
        let mut production = Production::new(pattern, rhs);
        production.chain = Some(chain);
        production
    }

    pub fn pattern(&self) -> &NonTerminal {
        &self.pattern
    }

    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }

    /// The unit-chain compacted into this production during normalization, if any.
    /// The trace starts at this production's own pattern and ends at the pattern whose
    /// right-hand side this production carries.
    pub fn chain(&self) -> Option<&[NonTerminal]> {
        self.chain.as_deref()
    }

    /// Whether the right-hand side is empty, i.e. the production derives the empty string
    /// directly.
    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }

    /// Whether every right-hand side symbol is a terminal.
    pub fn is_final(&self) -> bool {
        self.rhs.iter().all(Symbol::is_terminal)
    }

    /// Whether the production has one of the two Chomsky Normal Form shapes:
    /// a single terminal, or exactly two non-terminals.
    pub fn is_cnf(&self) -> bool {
        (self.is_final() && self.rhs.len() == 1)
            || (self.rhs.len() == 2 && self.rhs.iter().all(Symbol::is_non_terminal))
    }

    /// The terminals appearing on the right-hand side, in order.
    pub fn generated_terminals(&self) -> Vec<&Terminal> {
        self.rhs
            .iter()
            .filter_map(|symbol| match symbol {
                Symbol::Terminal(terminal) => Some(terminal),
                Symbol::NonTerminal(_) => None,
            })
            .collect()
    }

    /// The non-terminals appearing on the right-hand side, in order.
    pub fn generated_non_terminals(&self) -> Vec<&NonTerminal> {
        self.rhs
            .iter()
            .filter_map(|symbol| match symbol {
                Symbol::NonTerminal(non_terminal) => Some(non_terminal),
                Symbol::Terminal(_) => None,
            })
            .collect()
    }

    /// Whether this production alone derives the empty string, judged against the
    /// grammar's nullable set.
    pub fn generates_empty(&self, grammar: &Grammar) -> bool {
        let nullables = grammar.nullable_nonterminals();
        self.rhs.iter().all(|symbol| match symbol {
            Symbol::NonTerminal(non_terminal) => nullables.contains(non_terminal),
            Symbol::Terminal(_) => false,
        })
    }
}

// The chain trace is reconstruction metadata; production identity is pattern and rhs.
impl PartialEq for Production {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.rhs == other.rhs
    }
}
impl Eq for Production {}

impl Hash for Production {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pattern.hash(state);
        self.rhs.hash(state);
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ->", self.pattern)?;
        if self.rhs.is_empty() {
            write!(f, " ''")?;
        }
        for symbol in &self.rhs {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn nt(name: &str) -> NonTerminal {
        NonTerminal::new(name)
    }

    #[test]
    fn epsilon_literals_are_stripped() {
        let p = Production::new(
            nt("a"),
            vec![
                Symbol::Terminal(Terminal::literal("")),
                Symbol::Terminal(Terminal::literal("x")),
            ],
        );
        assert_eq!(p.rhs().len(), 1);

        let empty = Production::new(nt("a"), vec![Symbol::Terminal(Terminal::literal(""))]);
        assert!(empty.is_empty());
    }

    #[test]
    fn classification_predicates() {
        let terminal_only = Production::new(nt("a"), vec![Symbol::Terminal(Terminal::literal("x"))]);
        assert!(terminal_only.is_final());
        assert!(terminal_only.is_cnf());

        let pair = Production::new(
            nt("a"),
            vec![
                Symbol::NonTerminal(nt("b")),
                Symbol::NonTerminal(nt("c")),
            ],
        );
        assert!(!pair.is_final());
        assert!(pair.is_cnf());

        let mixed = Production::new(
            nt("a"),
            vec![
                Symbol::Terminal(Terminal::literal("x")),
                Symbol::NonTerminal(nt("b")),
            ],
        );
        assert!(!mixed.is_final());
        assert!(!mixed.is_cnf());
    }

    #[test]
    fn chain_is_not_part_of_identity() {
        let plain = Production::new(nt("a"), vec![Symbol::Terminal(Terminal::literal("x"))]);
        let chained = Production::with_chain(
            nt("a"),
            vec![Symbol::Terminal(Terminal::literal("x"))],
            vec![nt("a"), nt("b")],
        );
        assert_eq!(plain, chained);

        let mut set = HashSet::new();
        set.insert(plain);
        assert!(set.contains(&chained));
    }
}
