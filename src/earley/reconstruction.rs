//! Parse-tree reconstruction from a completed Earley chart.
//!
//! Trees are assembled bottom-up on an explicit work stack: a recursive formulation
//! would nest as deeply as the input is long and overflow on big inputs. Results are
//! memoized per `(production, start, end)`, so shared subderivations are built once.

use super::Chart;
use crate::{ParseTree, Production, Symbol, Terminal};
use std::collections::{HashMap, HashSet};
use std::ops::Range;

type ItemKey = (Production, usize, usize);

#[derive(Clone)]
enum Piece {
    Leaf(Range<usize>),
    Item(ItemKey),
}

pub(crate) struct TreeBuilder<'chart> {
    chart: &'chart Chart,
    tokens_by_end: HashMap<usize, Vec<(Terminal, Range<usize>)>>,
    memo: HashMap<ItemKey, Vec<ParseTree>>,
    in_progress: HashSet<ItemKey>,
    all: bool,
}

impl<'chart> TreeBuilder<'chart> {
    pub(crate) fn new(chart: &'chart Chart, all: bool) -> Self {
        let mut tokens_by_end: HashMap<usize, Vec<(Terminal, Range<usize>)>> = HashMap::new();
        for token in chart.tokens.iter().flatten() {
            tokens_by_end.entry(token.1.end).or_default().push(token.clone());
        }
        Self {
            chart,
            tokens_by_end,
            memo: HashMap::new(),
            in_progress: HashSet::new(),
            all,
        }
    }

    /// Build the tree(s) of a completed item spanning `start..end`.
    ///
    /// In single-tree mode every memo entry holds at most one tree and no cross product
    /// is expanded, which keeps the cost polynomial even for ambiguous grammars. In
    /// all-trees mode the full cross product of child alternatives is enumerated.
    pub(crate) fn build(
        &mut self,
        production: Production,
        start: usize,
        end: usize,
    ) -> Vec<ParseTree> {
        let root: ItemKey = (production, start, end);
        let mut stack: Vec<ItemKey> = vec![root.clone()];
        while let Some(key) = stack.last().cloned() {
            if self.memo.contains_key(&key) {
                self.in_progress.remove(&key);
                stack.pop();
                continue;
            }
            self.in_progress.insert(key.clone());
            let tilings = self.enumerate_tilings(&key);
            let mut missing: Vec<ItemKey> = Vec::new();
            for tiling in &tilings {
                for piece in tiling {
                    if let Piece::Item(child) = piece {
                        if !self.memo.contains_key(child)
                            && !self.in_progress.contains(child)
                            && !missing.contains(child)
                        {
                            missing.push(child.clone());
                        }
                    }
                }
            }
            if !missing.is_empty() {
                stack.extend(missing);
                continue;
            }
            let trees = self.assemble(&key, tilings);
            self.memo.insert(key.clone(), trees);
            self.in_progress.remove(&key);
            stack.pop();
        }
        self.memo.get(&root).cloned().unwrap_or_default()
    }

    /// Enumerate the ways the right-hand side symbols of an item can tile its span.
    ///
    /// The walk goes right to left: the children of a node cover its span contiguously,
    /// so the rightmost child must end where the item ends, and each further child ends
    /// where its right neighbour starts. Terminal symbols consume a recorded token
    /// ending at the current budget; non-terminal symbols consume a parsed item.
    fn enumerate_tilings(&self, key: &ItemKey) -> Vec<Vec<Piece>> {
        let (production, start, end) = key;
        let symbols = production.rhs();
        if symbols.is_empty() {
            return if start == end { vec![Vec::new()] } else { Vec::new() };
        }
        let mut results = Vec::new();
        let mut stack: Vec<(usize, usize, Vec<Piece>)> =
            vec![(symbols.len(), *end, Vec::new())];
        while let Some((position, current_end, pieces)) = stack.pop() {
            if position == 0 {
                if current_end == *start {
                    let mut tiling = pieces;
                    tiling.reverse();
                    results.push(tiling);
                }
                continue;
            }
            let leftmost = position == 1;
            match &symbols[position - 1] {
                Symbol::Terminal(terminal) => {
                    if let Some(matches) = self.tokens_by_end.get(&current_end) {
                        for (candidate, range) in matches {
                            if candidate == terminal
                                && range.start >= *start
                                && (!leftmost || range.start == *start)
                            {
                                let mut extended = pieces.clone();
                                extended.push(Piece::Leaf(range.clone()));
                                stack.push((position - 1, range.start, extended));
                            }
                        }
                    }
                }
                Symbol::NonTerminal(non_terminal) => {
                    for item in &self.chart.parsed[current_end] {
                        if item.production.pattern() == non_terminal
                            && item.origin >= *start
                            && (!leftmost || item.origin == *start)
                        {
                            let mut extended = pieces.clone();
                            extended.push(Piece::Item((
                                item.production.clone(),
                                item.origin,
                                current_end,
                            )));
                            stack.push((position - 1, item.origin, extended));
                        }
                    }
                }
            }
        }
        results
    }

    fn assemble(&self, key: &ItemKey, tilings: Vec<Vec<Piece>>) -> Vec<ParseTree> {
        let mut trees = Vec::new();
        'tilings: for tiling in tilings {
            let mut options: Vec<Vec<ParseTree>> = Vec::with_capacity(tiling.len());
            for piece in tiling {
                match piece {
                    Piece::Leaf(range) => options.push(vec![ParseTree::leaf(range)]),
                    Piece::Item(child) => match self.memo.get(&child) {
                        Some(children) if !children.is_empty() => options.push(children.clone()),
                        // a cyclic or unrealizable child: this tiling yields nothing
                        _ => continue 'tilings,
                    },
                }
            }
            cross_product(&options, &mut |children| {
                trees.push(ParseTree::node(key.0.pattern().clone(), children));
            });
            if !self.all && !trees.is_empty() {
                break;
            }
        }
        if !self.all {
            trees.truncate(1);
        }
        trees
    }
}

fn cross_product(options: &[Vec<ParseTree>], emit: &mut impl FnMut(Vec<ParseTree>)) {
    if options.iter().any(|alternatives| alternatives.is_empty()) {
        return;
    }
    let mut indices = vec![0usize; options.len()];
    loop {
        let children = indices
            .iter()
            .zip(options)
            .map(|(index, alternatives)| alternatives[*index].clone())
            .collect();
        emit(children);
        let mut position = options.len();
        loop {
            if position == 0 {
                return;
            }
            position -= 1;
            indices[position] += 1;
            if indices[position] < options[position].len() {
                break;
            }
            indices[position] = 0;
        }
    }
}
