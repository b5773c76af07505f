use crate::examples::json::json_grammar;
use crate::{EarleyParser, IParser, NonTerminal, SyntaxErrorReason};
use serde_json::Value as SerdeValue;

const WIDGET: &str = r#"{
  "widget": {
    "debug": "on",
    "window": {
      "title": "Sample Konfabulator Widget",
      "name": "main_window",
      "width": 500
    },
    "text": {
      "data": "Click Here",
      "size": 36.5,
      "style": "bold"
    }
  }
}"#;

#[test]
pub fn widget_document_parses() {
    let parser = EarleyParser::new(&json_grammar());
    assert_eq!(WIDGET.lines().count(), 15);

    match parser.syntax_tree(WIDGET) {
        Ok(tree) => {
            assert_eq!(tree.key(), Some(&NonTerminal::new("json")));
            let mut pointer = 0;
            for leaf in tree.leaves() {
                assert_eq!(leaf.start, pointer);
                pointer = leaf.end;
            }
            assert_eq!(pointer, WIDGET.len());
        }
        Err(err) => {
            println!("Failed part:{}", &WIDGET[err.range.start..]);
            panic!("{:?}", err);
        }
    }
}

#[test]
pub fn truncated_widget_document_reports_the_end() {
    let parser = EarleyParser::new(&json_grammar());
    let truncated = &WIDGET[..WIDGET.len() - 1];
    let error = parser.syntax_tree(truncated).unwrap_err();
    assert_eq!(error.reason, SyntaxErrorReason::UnmatchedPattern);
    assert_eq!(error.range.end, truncated.len());
}

#[test]
pub fn recognition_agrees_with_serde_json() {
    let parser = EarleyParser::new(&json_grammar());
    let documents = [
        WIDGET,
        "{}",
        "[ ]",
        "3",
        "-12.5e-3",
        "[1,2,3]",
        r#"{"a":[true,false,null]}"#,
        r#""hello\nworld""#,
        r#"{"a":{"b":[{}]}}"#,
        "",
        "01",
        "+1",
        "tru",
        "[1,2,]",
        r#"{"a":1"#,
        "{a:1}",
        "[,]",
    ];
    for document in documents {
        let expected = serde_json::from_str::<SerdeValue>(document).is_ok();
        assert_eq!(
            parser.recognizes(document),
            expected,
            "disagreement with serde_json on {:?}",
            document
        );
    }
}

#[test]
pub fn nested_structures_appear_in_the_tree() {
    let parser = EarleyParser::new(&json_grammar());
    let tree = parser
        .syntax_tree(r#"{"quiz":{"answers":["12","42"]}}"#)
        .unwrap();
    let mut objects = 0;
    let mut arrays = 0;
    let mut stack = vec![&tree];
    while let Some(node) = stack.pop() {
        match node.key().map(NonTerminal::name) {
            Some("object") => objects += 1,
            Some("array") => arrays += 1,
            _ => {}
        }
        stack.extend(node.children());
    }
    assert_eq!(objects, 2, "expected two nested objects");
    assert_eq!(arrays, 1, "expected one array");
}
