// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::{anyhow, bail, Result};
use regast::*;
use serde::{Deserialize, Serialize};
use test_generator::test_resources;

macro_rules! my_assert_eq {
    ($left:expr, $right:expr, $($arg:tt)+) => {
	match (&($left), &($right)) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
		    return Err(anyhow!("mismatch:\nleft  = {}\nright = {}\n{}",
		     		       &$left, &$right, format_args!($($arg)+)));
                }
            }
	}
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct TestCase {
    note: String,
    rego: String,
    // Expected canonical rendering of the module.
    rendered: Option<String>,
    error: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct YamlTest {
    cases: Vec<TestCase>,
}

fn check_round_trips(module: &Module) -> Result<()> {
    let text = module.to_string();
    let reparsed = parse_module("rendered.rego", &text)?;
    my_assert_eq!(reparsed, *module, "text round trip of\n{text}");

    let json = module.to_json_str()?;
    let decoded = Module::from_json_str(&json)?;
    my_assert_eq!(decoded, *module, "wire round trip of\n{json}");
    Ok(())
}

fn yaml_test_impl(file: &str) -> Result<()> {
    println!("\nrunning {file}");

    let yaml_str = std::fs::read_to_string(file)?;
    let test: YamlTest = serde_yaml::from_str(&yaml_str)?;

    for case in &test.cases {
        print!("\ncase {} ", case.note);
        match parse_module("case.rego", &case.rego) {
            Ok(module) => {
                if let Some(error) = &case.error {
                    bail!("{}: expected error `{error}` but parsing succeeded", case.note);
                }
                if let Some(rendered) = &case.rendered {
                    my_assert_eq!(module.to_string(), *rendered, "{}", case.note);
                }
                check_round_trips(&module)?;
            }
            Err(actual) => match &case.error {
                Some(expected) if actual.to_string().contains(expected.as_str()) => (),
                Some(expected) => bail!(
                    "{}: error `{actual}` does not contain `{expected}`",
                    case.note
                ),
                None => return Err(actual),
            },
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

#[test_resources("tests/parser/**/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}
