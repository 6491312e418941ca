// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::Result;
use regast::*;

fn ref_term(base: &str, keys: Vec<Term>) -> Term {
    Term::reference(Term::var(base), keys)
}

#[test]
fn package_equality() {
    let pkg = |keys: [&str; 2]| Package {
        path: Ref::new(vec![
            Term::var("foo"),
            Term::string(keys[0]),
            Term::string(keys[1]),
        ]),
    };
    assert_eq!(pkg(["bar", "baz"]), pkg(["bar", "baz"]));
    assert_ne!(pkg(["bar", "baz"]), pkg(["qux", "baz"]));
}

#[test]
fn import_equality() {
    let path = || ref_term("bar", vec![Term::var("baz"), Term::var("qux")]);
    let imports = [
        Import {
            path: Term::var("foo"),
            alias: Some(Var::new("bar")),
        },
        Import {
            path: Term::var("foo"),
            alias: None,
        },
        Import {
            path: path(),
            alias: Some(Var::new("corge")),
        },
        Import {
            path: path(),
            alias: None,
        },
    ];

    for (i, a) in imports.iter().enumerate() {
        for (j, b) in imports.iter().enumerate() {
            assert_eq!(i == j, a == b, "{a} vs {b}");
        }
    }
    assert_eq!(imports[2], imports[2].clone());
}

#[test]
fn import_rendering() {
    let imp = Import {
        path: ref_term("bar", vec![Term::string("baz"), Term::string("qux")]),
        alias: Some(Var::new("corge")),
    };
    assert_eq!(imp.to_string(), "import bar.baz.qux as corge");
    let imp = Import {
        path: Term::var("foo"),
        alias: None,
    };
    assert_eq!(imp.to_string(), "import foo");
}

#[test]
fn expr_equality() {
    assert_eq!(Expr::new(Term::boolean(true)), Expr::new(Term::boolean(true)));
    assert_ne!(Expr::new(Term::boolean(true)), Expr::new(Term::string("true")));

    let r = || ref_term("foo", vec![Term::string("bar"), Term::var("i")]);
    let obj = |first: Term| {
        Expr::new(Term::object(vec![(
            r(),
            Term::array(vec![first, Term::null()]),
        )]))
    };
    assert_eq!(obj(Term::number(1u64)), obj(Term::number(1u64)));
    assert_ne!(obj(Term::number(1u64)), obj(Term::string("1")));

    let eq = |lhs: &str, negated: bool| {
        let e = Expr::call(vec![Term::var("="), Term::var(lhs), r()]);
        if negated {
            e.negate()
        } else {
            e
        }
    };
    assert_eq!(eq("x", true), eq("x", true));
    assert_ne!(eq("x", true), eq("x", false));
    assert_ne!(eq("x", true), eq("y", true));
}

#[test]
fn rule_equality() {
    assert_eq!(Rule::default(), Rule::default());

    let named = |n: &str| Rule {
        name: Var::new(n),
        ..Rule::default()
    };
    assert_eq!(named("p"), named("p"));
    assert_ne!(named("p"), named("q"));

    let keyed = |k: &str| Rule {
        key: Some(Term::var(k)),
        ..Rule::default()
    };
    assert_eq!(keyed("x"), keyed("x"));
    assert_ne!(keyed("x"), keyed("y"));

    let valued = |v: &str| Rule {
        value: Some(Term::var(v)),
        ..Rule::default()
    };
    assert_eq!(valued("x"), valued("x"));
    assert_ne!(valued("x"), valued("y"));
}

#[test]
fn rule_body_equality() {
    let t = || Expr::call(vec![Term::boolean(true)]);
    let f = || Expr::call(vec![Term::boolean(false)]);
    let rule = |exprs: Vec<Expr>| Rule {
        body: Body::new(exprs),
        ..Rule::default()
    };

    assert_eq!(rule(vec![t()]), rule(vec![t()]));
    assert_eq!(rule(vec![t(), t()]), rule(vec![t(), t()]));
    assert_ne!(rule(vec![t()]), rule(vec![f()]));
    assert_ne!(rule(vec![t(), f()]), rule(vec![f(), t()]));
}

#[test]
fn body_is_ground() -> Result<()> {
    assert!(!parse_body("a.b[0] = 1, a = [1,2,x]")?.is_ground());
    assert!(parse_body("1 = 1, [\"a\"] != {}")?.is_ground());
    Ok(())
}

#[test]
fn locations_do_not_affect_equality() -> Result<()> {
    let parsed = parse_term("[1, {\"a\": b}]")?;
    let built = Term::array(vec![
        Term::number(1u64),
        Term::object(vec![(Term::string("a"), Term::var("b"))]),
    ]);
    assert!(parsed.location.is_some());
    assert_eq!(parsed, built);
    Ok(())
}

#[test]
fn vars_are_collected() -> Result<()> {
    let body = parse_body("x = a[i], count(y, n)")?;
    let vars = body.vars();
    let names: Vec<&str> = vars.iter().map(Var::as_str).collect();
    assert_eq!(names, vec!["a", "i", "n", "x", "y"]);
    Ok(())
}

#[test]
fn debug_output_handles_multibyte_text() -> Result<()> {
    let term = parse_term(&format!("[\"{}\"]", "é".repeat(40)))?;
    let dbg = format!("{term:?}");
    assert!(dbg.contains(&format!("[\\\"{}...", "é".repeat(30))), "{dbg}");
    Ok(())
}
