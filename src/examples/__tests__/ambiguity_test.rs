use crate::examples::arithmetic::arithmetic_grammar;
use crate::examples::brackets::bracket_grammar;
use crate::{
    CykParser, EarleyParser, Grammar, IParser, NonTerminal, ParseTree, Production, Symbol, Terminal,
};

fn ambiguous_sum_grammar() -> Grammar {
    // e -> e '+' e | 'a'
    let e = NonTerminal::new("e");
    Grammar::new(
        vec![
            Production::new(
                e.clone(),
                vec![
                    Symbol::NonTerminal(e.clone()),
                    Symbol::Terminal(Terminal::literal("+")),
                    Symbol::NonTerminal(e.clone()),
                ],
            ),
            Production::new(e.clone(), vec![Symbol::Terminal(Terminal::literal("a"))]),
        ],
        e,
    )
}

fn assert_leaves_tile(tree: &ParseTree, input: &str) {
    let mut pointer = 0;
    for leaf in tree.leaves() {
        assert_eq!(
            leaf.start, pointer,
            "leaves of {} do not cover {:?} contiguously",
            tree, input
        );
        assert!(leaf.end > leaf.start);
        pointer = leaf.end;
    }
    assert_eq!(pointer, input.len(), "leaves of {} stop short of the input", tree);
}

fn collect_keys<'t>(tree: &'t ParseTree, keys: &mut Vec<&'t NonTerminal>) {
    if let Some(key) = tree.key() {
        keys.push(key);
    }
    for child in tree.children() {
        collect_keys(child, keys);
    }
}

#[test]
pub fn derivation_counts_follow_the_catalan_numbers() {
    let grammar = ambiguous_sum_grammar();
    let earley = EarleyParser::new(&grammar);
    let cyk = CykParser::new(&grammar);

    for (input, expected) in [
        ("a", 1),
        ("a+a", 1),
        ("a+a+a", 2),
        ("a+a+a+a", 5),
        ("a+a+a+a+a", 14),
    ] {
        let earley_trees = earley.all_syntax_trees(input).unwrap();
        assert_eq!(earley_trees.len(), expected, "earley on {:?}", input);
        let cyk_trees = cyk.all_syntax_trees(input).unwrap();
        assert_eq!(cyk_trees.len(), expected, "cyk on {:?}", input);

        for tree in earley_trees.iter().chain(&cyk_trees) {
            assert_leaves_tile(tree, input);
        }
    }
}

#[test]
pub fn single_tree_mode_picks_one_of_the_derivations() {
    let grammar = ambiguous_sum_grammar();
    let earley = EarleyParser::new(&grammar);
    let input = "a+a+a+a+a";
    let tree = earley.syntax_tree(input).unwrap();
    let all = earley.all_syntax_trees(input).unwrap();
    assert!(all.contains(&tree));
}

#[test]
pub fn unambiguous_grammars_have_exactly_one_tree() {
    let grammar = arithmetic_grammar();
    let earley = EarleyParser::new(&grammar);
    let cyk = CykParser::new(&grammar);
    for input in ["7", "1+2", "2*(3+4)", "10-2/5"] {
        let earley_trees = earley.all_syntax_trees(input).unwrap();
        assert_eq!(earley_trees.len(), 1, "earley on {:?}", input);
        assert_eq!(earley_trees[0], earley.syntax_tree(input).unwrap());

        let cyk_trees = cyk.all_syntax_trees(input).unwrap();
        assert_eq!(cyk_trees.len(), 1, "cyk on {:?}", input);
        assert_eq!(cyk_trees[0], cyk.syntax_tree(input).unwrap());

        assert_eq!(earley_trees[0], cyk_trees[0]);
    }
}

#[test]
pub fn returned_trees_never_contain_utility_nonterminals() {
    let grammar = bracket_grammar();
    let cyk = CykParser::new(&grammar);
    let original = grammar.non_terminals();
    let utility = cyk.normalized_grammar().utility_nonterminals();
    assert!(!utility.is_empty());

    for input in ["", "()", "([{}])", "[[]]"] {
        for tree in cyk.all_syntax_trees(input).unwrap() {
            let mut keys = Vec::new();
            collect_keys(&tree, &mut keys);
            for key in keys {
                assert!(
                    original.contains(key) && !utility.contains(key),
                    "{} leaked into the tree for {:?}",
                    key,
                    input
                );
            }
            assert_leaves_tile(&tree, input);
        }
    }
}

#[test]
pub fn earley_trees_cover_the_input() {
    let grammar = arithmetic_grammar();
    let earley = EarleyParser::new(&grammar);
    for input in ["1", "12+34", "1+(2*3-4)"] {
        assert_leaves_tile(&earley.syntax_tree(input).unwrap(), input);
    }
}
