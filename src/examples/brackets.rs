use crate::{Grammar, NonTerminal, Production, Symbol, Terminal};

/// Well-balanced round, square and curly brackets:
/// `s -> '(' s ')' | '[' s ']' | '{' s '}' | ε`.
pub fn bracket_grammar() -> Grammar {
    let s = NonTerminal::new("s");
    let pair = |open: &str, close: &str| {
        Production::new(
            s.clone(),
            vec![
                Symbol::Terminal(Terminal::literal(open)),
                Symbol::NonTerminal(s.clone()),
                Symbol::Terminal(Terminal::literal(close)),
            ],
        )
    };
    Grammar::new(
        vec![
            pair("(", ")"),
            pair("[", "]"),
            pair("{", "}"),
            Production::new(s.clone(), vec![]),
        ],
        s,
    )
}
