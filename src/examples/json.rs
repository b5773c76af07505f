use crate::{Grammar, NonTerminal, Production, Symbol, Terminal};

/// A JSON subset: nullable whitespace, recursive objects and arrays, escaped strings,
/// numbers with fraction and exponent, and the three keyword constants.
///
/// ```text
/// json     -> element
/// element  -> ws value ws
/// value    -> object | array | string | number | 'true' | 'false' | 'null'
/// object   -> '{' ws '}' | '{' members '}'
/// members  -> member | member ',' members
/// member   -> ws string ws ':' element
/// array    -> '[' ws ']' | '[' elements ']'
/// elements -> element | element ',' elements
/// ws       -> /[ \t\n\r]+/ | ε
/// ```
pub fn json_grammar() -> Grammar {
    let json = NonTerminal::new("json");
    let element = NonTerminal::new("element");
    let value = NonTerminal::new("value");
    let object = NonTerminal::new("object");
    let members = NonTerminal::new("members");
    let member = NonTerminal::new("member");
    let array = NonTerminal::new("array");
    let elements = NonTerminal::new("elements");
    let string = NonTerminal::new("string");
    let number = NonTerminal::new("number");
    let ws = NonTerminal::new("ws");

    let string_literal = Terminal::expression(r#""([^"\\]|\\(["\\/bfnrt]|u[0-9a-fA-F]{4}))*""#)
        .unwrap();
    let number_literal = Terminal::expression(r"-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?")
        .unwrap();
    let whitespace = Terminal::expression(r"[ \t\n\r]+").unwrap();

    let productions = vec![
        Production::new(json.clone(), vec![Symbol::NonTerminal(element.clone())]),
        Production::new(
            element.clone(),
            vec![
                Symbol::NonTerminal(ws.clone()),
                Symbol::NonTerminal(value.clone()),
                Symbol::NonTerminal(ws.clone()),
            ],
        ),
        Production::new(value.clone(), vec![Symbol::NonTerminal(object.clone())]),
        Production::new(value.clone(), vec![Symbol::NonTerminal(array.clone())]),
        Production::new(value.clone(), vec![Symbol::NonTerminal(string.clone())]),
        Production::new(value.clone(), vec![Symbol::NonTerminal(number.clone())]),
        Production::new(value.clone(), vec![Symbol::Terminal(Terminal::literal("true"))]),
        Production::new(value.clone(), vec![Symbol::Terminal(Terminal::literal("false"))]),
        Production::new(value.clone(), vec![Symbol::Terminal(Terminal::literal("null"))]),
        Production::new(
            object.clone(),
            vec![
                Symbol::Terminal(Terminal::literal("{")),
                Symbol::NonTerminal(ws.clone()),
                Symbol::Terminal(Terminal::literal("}")),
            ],
        ),
        Production::new(
            object.clone(),
            vec![
                Symbol::Terminal(Terminal::literal("{")),
                Symbol::NonTerminal(members.clone()),
                Symbol::Terminal(Terminal::literal("}")),
            ],
        ),
        Production::new(members.clone(), vec![Symbol::NonTerminal(member.clone())]),
        Production::new(
            members.clone(),
            vec![
                Symbol::NonTerminal(member.clone()),
                Symbol::Terminal(Terminal::literal(",")),
                Symbol::NonTerminal(members.clone()),
            ],
        ),
        Production::new(
            member.clone(),
            vec![
                Symbol::NonTerminal(ws.clone()),
                Symbol::NonTerminal(string.clone()),
                Symbol::NonTerminal(ws.clone()),
                Symbol::Terminal(Terminal::literal(":")),
                Symbol::NonTerminal(element.clone()),
            ],
        ),
        Production::new(
            array.clone(),
            vec![
                Symbol::Terminal(Terminal::literal("[")),
                Symbol::NonTerminal(ws.clone()),
                Symbol::Terminal(Terminal::literal("]")),
            ],
        ),
        Production::new(
            array.clone(),
            vec![
                Symbol::Terminal(Terminal::literal("[")),
                Symbol::NonTerminal(elements.clone()),
                Symbol::Terminal(Terminal::literal("]")),
            ],
        ),
        Production::new(elements.clone(), vec![Symbol::NonTerminal(element.clone())]),
        Production::new(
            elements.clone(),
            vec![
                Symbol::NonTerminal(element.clone()),
                Symbol::Terminal(Terminal::literal(",")),
                Symbol::NonTerminal(elements.clone()),
            ],
        ),
        Production::new(string.clone(), vec![Symbol::Terminal(string_literal)]),
        Production::new(number.clone(), vec![Symbol::Terminal(number_literal)]),
        Production::new(ws.clone(), vec![Symbol::Terminal(whitespace)]),
        Production::new(ws.clone(), vec![]),
    ];
    Grammar::new(productions, json)
}
