// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::Result;
use regast::*;

const MODULE: &str = r#"
    package a.b.c
    import data.x.y as z
    import data.u.i
    p = [1,2,{"foo":3}] :- r[x] = 1, not q[x]
    r[y] = v :- i[1] = y, v = i[2]
    q[x] :- a=[true,false,null,{"x":[1,2,3]}], a[i] = x
"#;

#[test]
fn module_json_round_trip() -> Result<()> {
    let module = parse_module("test.rego", MODULE)?;
    let json = module.to_json_str()?;

    let decoded = Module::from_json_str(&json)?;
    assert_eq!(decoded, module);

    // The serde entry points go through the same decoder.
    let via_serde: Module = serde_json::from_str(&json)?;
    assert_eq!(via_serde, module);
    assert_eq!(via_serde.to_json_str()?, json);
    Ok(())
}

#[test]
fn expression_indices_survive() -> Result<()> {
    let body = parse_body("x = 1, y = 2, not z")?;
    let decoded = Body::from_json_str(&body.to_json_str()?)?;
    let indices: Vec<u32> = decoded.iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert!(decoded[2].negated);
    Ok(())
}

#[test]
fn decoded_terms_render_like_parsed_ones() -> Result<()> {
    for text in [
        r#"a.b[0]["c d"][x]"#,
        r#"{"a": [1, 2.5, -3], b: {}}"#,
        "[null, true, false, \"\\u00e9\"]",
        "123456789012345678901234567890",
    ] {
        let term = parse_term(text)?;
        let decoded = Term::from_json_str(&term.to_json_str()?)?;
        assert_eq!(decoded, term, "{text}");
        assert_eq!(decoded.to_string(), term.to_string());
    }
    Ok(())
}

#[test]
fn bad_expressions() {
    let cases = [
        (
            r#"{"Negated": 100, "Terms": {"Value": "foo", "Type": "string"}, "Index": 0}"#,
            "ast: unable to unmarshal Negated field with type: number (expected true or false)",
        ),
        (
            r#"{"Terms": ["foo"], "Index": 0}"#,
            "ast: unable to unmarshal term at Terms[0]",
        ),
        (
            r#"{"Terms": "bad value", "Index": 0}"#,
            r#"ast: unable to unmarshal Terms field with type: string (expected {"Value": ..., "Type": ...} or [{"Value": ..., "Type": ...}, ...])"#,
        ),
        (
            r#"{"Terms": {"Value": "foo", "Type": "string"}}"#,
            "ast: unable to unmarshal Index field with type: absent (expected integer)",
        ),
    ];

    for (json, expected) in cases {
        match Expr::from_json_str(json) {
            Ok(e) => panic!("decoded {e} from {json}"),
            Err(err) => assert!(
                err.to_string().starts_with(expected),
                "`{err}` does not start with `{expected}`"
            ),
        }
    }
}

#[test]
fn negated_is_checked_first() {
    let json = r#"{"Negated": "yes", "Terms": "bad value"}"#;
    assert_eq!(
        decode_expr(&serde_json::from_str(json).unwrap()),
        Err(CodecError::Negated {
            actual: JsonType::String
        })
    );
}

#[test]
fn bad_modules() {
    let cases = [
        r#"{"Package": {"Path": []}}"#,
        r#"{"Package": {"Path": [{"Value": "a", "Type": "string"}]}}"#,
        r#"{"Package": {"Path": [{"Value": "data", "Type": "var"}]}, "Rules": {}}"#,
        r#"{"Package": {"Path": [{"Value": "data", "Type": "var"}]},
            "Imports": [{"Path": {"Value": 1, "Type": "number"}}]}"#,
        r#"{"Package": {"Path": [{"Value": "data", "Type": "var"}]},
            "Rules": [{"Name": "p"}]}"#,
        r#"{"Package": {"Path": [{"Value": "data", "Type": "var"},
                                 {"Value": "a-b", "Type": "string"}]}}"#,
        r#"{"Package": {"Path": [{"Value": "data", "Type": "var"},
                                 {"Value": 1, "Type": "number"}]}}"#,
        r#"{"Package": {"Path": [{"Value": "data", "Type": "var"},
                                 {"Value": "a", "Type": "string"},
                                 {"Value": "b", "Type": "var"}]}}"#,
        r#"{"Package": {"Path": [{"Value": "data", "Type": "var"},
                                 {"Value": "a", "Type": "string"}]},
            "Rules": [{"Name": "p", "Body": []}]}"#,
        r#"{"Package": {"Path": [{"Value": "data", "Type": "var"},
                                 {"Value": "a", "Type": "string"}]},
            "Rules": [{"Name": "p", "Body": [{"Terms": {"Value": "true", "Type": "var"},
                                              "Index": 0}]}]}"#,
        "[]",
        "{",
    ];
    for json in cases {
        assert!(Module::from_json_str(json).is_err(), "{json}");
    }
}

#[test]
fn decoded_modules_render_to_parseable_text() -> Result<()> {
    let json = r#"{
        "Package": {"Path": [{"Value": "data", "Type": "var"},
                             {"Value": "a", "Type": "string"},
                             {"Value": "b c", "Type": "string"}]},
        "Imports": [{"Path": {"Value": [{"Value": "data", "Type": "var"},
                                        {"Value": "x-y", "Type": "string"}],
                              "Type": "ref"},
                     "Alias": "xy"}],
        "Rules": [{"Name": "p",
                   "Value": {"Value": 0.30000000000000000001, "Type": "number"},
                   "Body": [{"Terms": [{"Value": "=", "Type": "var"},
                                       {"Value": "v", "Type": "var"},
                                       {"Value": 1e-3, "Type": "number"}],
                             "Index": 0}]}]
    }"#;
    let module = Module::from_json_str(json)?;
    let text = module.to_string();
    assert_eq!(
        text,
        "package a[\"b c\"]\n\nimport data[\"x-y\"] as xy\n\np = 0.30000000000000000001 :- eq(v, 0.001)\n"
    );
    assert_eq!(parse_module("decoded.rego", &text)?, module);
    Ok(())
}

#[test]
fn numbers_keep_their_precision() -> Result<()> {
    let precise = parse_term("0.30000000000000000001")?;
    assert_ne!(precise, parse_term("0.3")?);
    assert_eq!(precise.to_string(), "0.30000000000000000001");
    assert_eq!(Term::from_json_str(&precise.to_json_str()?)?, precise);

    assert_ne!(
        parse_term("1000000000000000000001.5")?,
        parse_term("1000000000000000000001")?
    );
    assert_eq!(parse_term("2.50")?, parse_term("25e-1")?);
    Ok(())
}
