//! Transformation of an arbitrary grammar into Chomsky Normal Form.
//!
//! The pipeline applies five passes in strict order: terminal de-mixing, binarization,
//! empty-production elimination, unit-chain elimination and a reachability prune. Each
//! pass is a pure function on the production list; the whole transformation is
//! deterministic, so normalizing the same grammar twice yields the same result.

use crate::{Grammar, NonTerminal, Production, Symbol, Terminal};
use std::collections::{HashMap, HashSet};

pub(crate) fn chomsky_normalized(grammar: &Grammar) -> Grammar {
    let known = grammar.non_terminals();
    let mut productions = grammar.productions().to_vec();
    productions = decompose_terminals(productions);
    productions = binarize(productions);
    productions = eliminate_empty(productions, grammar.start());
    productions = eliminate_chains(productions);
    productions = prune_unreachable(productions, grammar.start());

    // Chain-equivalent duplicates hash alike; the first occurrence keeps its trace.
    let mut seen = HashSet::new();
    productions.retain(|production| seen.insert(production.clone()));

    let mut utility = grammar.utility_nonterminals().clone();
    for production in &productions {
        for non_terminal in
            std::iter::once(production.pattern()).chain(production.generated_non_terminals())
        {
            if !known.contains(non_terminal) {
                utility.insert(non_terminal.clone());
            }
        }
    }
    Grammar::with_utility(productions, grammar.start().clone(), utility)
}

/// Replace every terminal of a mixed production by a fresh non-terminal deriving it.
/// Productions that are a single terminal already have a Chomsky Normal Form shape and
/// pass through unchanged.
fn decompose_terminals(productions: Vec<Production>) -> Vec<Production> {
    let mut result = Vec::new();
    for production in productions {
        let terminal_count = production.generated_terminals().len();
        if terminal_count == 0 || (terminal_count == 1 && production.rhs().len() == 1) {
            result.push(production);
            continue;
        }
        let mut rhs = Vec::with_capacity(production.rhs().len());
        let mut fresh = Vec::new();
        for (offset, symbol) in production.rhs().iter().enumerate() {
            match symbol {
                Symbol::Terminal(terminal) => {
                    let non_terminal = NonTerminal::new(format!(
                        "{}_{:x}_{}",
                        production.pattern().name(),
                        fnv1a(&terminal_payload(terminal)),
                        offset
                    ));
                    rhs.push(Symbol::NonTerminal(non_terminal.clone()));
                    fresh.push(Production::new(
                        non_terminal,
                        vec![Symbol::Terminal(terminal.clone())],
                    ));
                }
                Symbol::NonTerminal(_) => rhs.push(symbol.clone()),
            }
        }
        result.push(Production::new(production.pattern().clone(), rhs));
        result.append(&mut fresh);
    }
    result
}

/// Decompose every production with three or more right-hand side symbols into a spine of
/// two-symbol helper productions.
fn binarize(productions: Vec<Production>) -> Vec<Production> {
    let mut result = Vec::new();
    for production in productions {
        let symbols = production.rhs();
        if symbols.len() < 3 {
            result.push(production);
            continue;
        }
        let count = symbols.len();
        let mut current = production.pattern().clone();
        for offset in 0..count - 2 {
            let helper = NonTerminal::new(format!(
                "{}_{}_{}",
                production.pattern().name(),
                symbol_name(&symbols[offset + 1]),
                offset + 1
            ));
            result.push(Production::new(
                current,
                vec![symbols[offset].clone(), Symbol::NonTerminal(helper.clone())],
            ));
            current = helper;
        }
        result.push(Production::new(
            current,
            vec![symbols[count - 2].clone(), symbols[count - 1].clone()],
        ));
    }
    result
}

/// Remove empty productions by expanding every production into the set of rewritings
/// that drop any combination of its nullable non-terminals. Only the start symbol keeps
/// an empty production, and only when the grammar generates the empty word.
fn eliminate_empty(productions: Vec<Production>, start: &NonTerminal) -> Vec<Production> {
    let can_empty = {
        let mut set: HashSet<NonTerminal> = HashSet::new();
        let mut changed = true;
        while changed {
            changed = false;
            for production in &productions {
                if set.contains(production.pattern()) {
                    continue;
                }
                let all_empty = production.rhs().iter().all(|symbol| match symbol {
                    Symbol::NonTerminal(non_terminal) => set.contains(non_terminal),
                    Symbol::Terminal(_) => false,
                });
                if all_empty {
                    set.insert(production.pattern().clone());
                    changed = true;
                }
            }
        }
        set
    };
    let can_nonempty = {
        let mut set: HashSet<NonTerminal> = HashSet::new();
        let mut changed = true;
        while changed {
            changed = false;
            for production in &productions {
                if set.contains(production.pattern()) || production.rhs().is_empty() {
                    continue;
                }
                // every symbol must derive something, at least one something non-empty
                let derives = production.rhs().iter().all(|symbol| match symbol {
                    Symbol::NonTerminal(n) => can_empty.contains(n) || set.contains(n),
                    Symbol::Terminal(_) => true,
                });
                let nonempty = production.rhs().iter().any(|symbol| match symbol {
                    Symbol::NonTerminal(n) => set.contains(n),
                    Symbol::Terminal(_) => true,
                });
                if derives && nonempty {
                    set.insert(production.pattern().clone());
                    changed = true;
                }
            }
        }
        set
    };

    let mut result = Vec::new();
    for production in &productions {
        if production.rhs().is_empty() {
            continue;
        }
        // optional: may be dropped; absent from both fixed points: always dropped
        // (the non-terminal derives only the empty string)
        let optional_positions: Vec<usize> = production
            .rhs()
            .iter()
            .enumerate()
            .filter_map(|(offset, symbol)| match symbol {
                Symbol::NonTerminal(n) if can_empty.contains(n) && can_nonempty.contains(n) => {
                    Some(offset)
                }
                _ => None,
            })
            .collect();
        let dropped: HashSet<usize> = production
            .rhs()
            .iter()
            .enumerate()
            .filter_map(|(offset, symbol)| match symbol {
                Symbol::NonTerminal(n) if can_empty.contains(n) && !can_nonempty.contains(n) => {
                    Some(offset)
                }
                _ => None,
            })
            .collect();

        for mask in 0u32..(1 << optional_positions.len()) {
            let rhs: Vec<Symbol> = production
                .rhs()
                .iter()
                .enumerate()
                .filter(|(offset, _)| {
                    if dropped.contains(offset) {
                        return false;
                    }
                    match optional_positions.iter().position(|p| p == offset) {
                        Some(bit) => mask & (1 << bit) != 0,
                        None => true,
                    }
                })
                .map(|(_, symbol)| symbol.clone())
                .collect();
            if !rhs.is_empty() {
                result.push(Production::new(production.pattern().clone(), rhs));
            }
        }
    }
    if can_empty.contains(start) {
        result.push(Production::new(start.clone(), vec![]));
    }
    result
}

/// Replace every chain production `a -> b` by copies of the first non-chain productions
/// reachable from `b`, recording the walked path as the chain trace. Cycles in the chain
/// graph terminate the walk without adding anything.
fn eliminate_chains(productions: Vec<Production>) -> Vec<Production> {
    let mut index: HashMap<&NonTerminal, Vec<&Production>> = HashMap::new();
    for production in &productions {
        index.entry(production.pattern()).or_default().push(production);
    }

    let mut result = Vec::new();
    for production in &productions {
        let first_link = match production.rhs() {
            [Symbol::NonTerminal(non_terminal)] => non_terminal,
            _ => {
                result.push(production.clone());
                continue;
            }
        };
        let mut visited: HashSet<&NonTerminal> = HashSet::new();
        visited.insert(production.pattern());
        let mut queue: Vec<(&NonTerminal, Vec<NonTerminal>)> = vec![(
            first_link,
            vec![production.pattern().clone(), first_link.clone()],
        )];
        while let Some((current, path)) = queue.pop() {
            if !visited.insert(current) {
                continue;
            }
            for target in index.get(current).map(|v| v.as_slice()).unwrap_or(&[]) {
                match target.rhs() {
                    [Symbol::NonTerminal(next)] => {
                        if !visited.contains(next) {
                            let mut extended = path.clone();
                            extended.push(next.clone());
                            queue.push((next, extended));
                        }
                    }
                    _ => {
                        result.push(Production::with_chain(
                            production.pattern().clone(),
                            target.rhs().to_vec(),
                            path.clone(),
                        ));
                    }
                }
            }
        }
    }
    result
}

/// Drop every production whose pattern cannot be reached from the start symbol.
fn prune_unreachable(productions: Vec<Production>, start: &NonTerminal) -> Vec<Production> {
    let mut reachable: HashSet<NonTerminal> = HashSet::new();
    {
        let mut index: HashMap<&NonTerminal, Vec<&Production>> = HashMap::new();
        for production in &productions {
            index.entry(production.pattern()).or_default().push(production);
        }
        let mut queue = vec![start.clone()];
        while let Some(current) = queue.pop() {
            if !reachable.insert(current.clone()) {
                continue;
            }
            for production in index.get(&current).map(|v| v.as_slice()).unwrap_or(&[]) {
                for non_terminal in production.generated_non_terminals() {
                    if !reachable.contains(non_terminal) {
                        queue.push(non_terminal.clone());
                    }
                }
            }
        }
    }
    productions
        .into_iter()
        .filter(|production| reachable.contains(production.pattern()))
        .collect()
}

fn symbol_name(symbol: &Symbol) -> String {
    match symbol {
        Symbol::NonTerminal(non_terminal) => non_terminal.name().to_string(),
        Symbol::Terminal(terminal) => format!("{:x}", fnv1a(&terminal_payload(terminal))),
    }
}

fn terminal_payload(terminal: &Terminal) -> String {
    match terminal {
        Terminal::Literal(value) => value.to_string(),
        Terminal::CharacterRange(range) => format!("{}-{}", range.start(), range.end()),
        Terminal::Expression(expression) => expression.pattern().to_string(),
    }
}

fn fnv1a(text: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in text.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
