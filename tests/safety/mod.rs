// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::{bail, Result};
use regast::*;
use serde::{Deserialize, Serialize};
use test_generator::test_resources;

#[derive(Serialize, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct TestCase {
    note: String,
    // A single expression, or several separated by commas.
    expr: String,
    #[serde(default)]
    safe: Vec<String>,
    outputs: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct YamlTest {
    cases: Vec<TestCase>,
}

fn yaml_test_impl(file: &str) -> Result<()> {
    println!("\nrunning {file}");

    let yaml_str = std::fs::read_to_string(file)?;
    let test: YamlTest = serde_yaml::from_str(&yaml_str)?;

    for case in &test.cases {
        print!("\ncase {} ", case.note);
        let body = parse_body(&case.expr)?;
        let safe: VarSet = case.safe.iter().map(String::as_str).collect();
        let expected: VarSet = case.outputs.iter().map(String::as_str).collect();

        let outputs = match body.len() {
            1 => body[0].output_vars(&safe),
            _ => body.output_vars(&safe),
        };

        if outputs != expected {
            bail!(
                "{}: missing output vars: {}, extra output vars: {}",
                case.note,
                expected.diff(&outputs),
                outputs.diff(&expected)
            );
        }
        println!("passed");
    }

    Ok(())
}

fn yaml_test(file: &str) -> Result<()> {
    match yaml_test_impl(file) {
        Ok(_) => Ok(()),
        Err(e) => {
            // If Err is returned, it doesn't always get printed by cargo test.
            // Therefore, panic with the error.
            panic!("{}", e);
        }
    }
}

#[test_resources("tests/safety/**/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}
