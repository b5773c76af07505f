use crate::{Grammar, NonTerminal, Production, Symbol, Terminal};

/// Left-recursive arithmetic over the four basic operators with the usual precedence:
///
/// ```text
/// sum     -> sum '+' product | sum '-' product | product
/// product -> product '*' factor | product '/' factor | factor
/// factor  -> '(' sum ')' | number
/// number  -> digit number | digit
/// digit   -> '0' | '1' | ... | '9'
/// ```
pub fn arithmetic_grammar() -> Grammar {
    let sum = NonTerminal::new("sum");
    let product = NonTerminal::new("product");
    let factor = NonTerminal::new("factor");
    let number = NonTerminal::new("number");
    let digit = NonTerminal::new("digit");

    let mut productions = vec![
        Production::new(
            sum.clone(),
            vec![
                Symbol::NonTerminal(sum.clone()),
                Symbol::Terminal(Terminal::literal("+")),
                Symbol::NonTerminal(product.clone()),
            ],
        ),
        Production::new(
            sum.clone(),
            vec![
                Symbol::NonTerminal(sum.clone()),
                Symbol::Terminal(Terminal::literal("-")),
                Symbol::NonTerminal(product.clone()),
            ],
        ),
        Production::new(sum.clone(), vec![Symbol::NonTerminal(product.clone())]),
        Production::new(
            product.clone(),
            vec![
                Symbol::NonTerminal(product.clone()),
                Symbol::Terminal(Terminal::literal("*")),
                Symbol::NonTerminal(factor.clone()),
            ],
        ),
        Production::new(
            product.clone(),
            vec![
                Symbol::NonTerminal(product.clone()),
                Symbol::Terminal(Terminal::literal("/")),
                Symbol::NonTerminal(factor.clone()),
            ],
        ),
        Production::new(product.clone(), vec![Symbol::NonTerminal(factor.clone())]),
        Production::new(
            factor.clone(),
            vec![
                Symbol::Terminal(Terminal::literal("(")),
                Symbol::NonTerminal(sum.clone()),
                Symbol::Terminal(Terminal::literal(")")),
            ],
        ),
        Production::new(factor.clone(), vec![Symbol::NonTerminal(number.clone())]),
        Production::new(
            number.clone(),
            vec![
                Symbol::NonTerminal(digit.clone()),
                Symbol::NonTerminal(number.clone()),
            ],
        ),
        Production::new(number.clone(), vec![Symbol::NonTerminal(digit.clone())]),
    ];
    for value in 0..10 {
        productions.push(Production::new(
            digit.clone(),
            vec![Symbol::Terminal(Terminal::literal(value.to_string().as_str()))],
        ));
    }
    Grammar::new(productions, sum)
}
