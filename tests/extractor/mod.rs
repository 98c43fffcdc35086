// Copyright (c) The schemoose authors.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::{bail, Result};
use schemoose::{Engine, Language, ModelEntry, Value};
use serde::{Deserialize, Serialize};
use test_generator::test_resources;
use walkdir::WalkDir;

// Process an expected value specified in yaml to interpret special encodings.
pub fn process_value(v: &Value) -> Result<Value> {
    match v {
        // Handle Unresolved encoded as the string "#unresolved"
        Value::String(s) if s.as_ref() == "#unresolved" => Ok(Value::Unresolved),

        // Recursively process arrays
        Value::Array(items) => {
            let mut array_value = Value::new_array();
            let array = array_value.as_array_mut()?;
            for item in items.iter() {
                array.push(process_value(item)?);
            }
            Ok(array_value)
        }

        // Recursively process objects
        Value::Object(fields) => {
            let mut object_value = Value::new_object();
            let object = object_value.as_object_mut()?;
            for (key, value) in fields.iter() {
                object.insert(key.clone(), process_value(value)?);
            }
            Ok(object_value)
        }

        // Simple variants
        _ => Ok(v.clone()),
    }
}

fn display_values(c: &Value, e: &Value) -> Result<String> {
    Ok(format!(
        "\ncomputed = {}\nexpected = {}\n",
        serde_json::to_string_pretty(c)?,
        serde_json::to_string_pretty(e)?
    ))
}

// Helper function to match computed and expected values.
// On mismatch, prints the failing sub-value instead of the whole value.
fn match_values_impl(computed: &Value, expected: &Value) -> Result<()> {
    match (&computed, &expected) {
        (Value::Array(a1), Value::Array(a2)) => {
            if a1.len() != a2.len() {
                bail!(
                    "array length mismatch: {} != {}{}",
                    a1.len(),
                    a2.len(),
                    display_values(computed, expected)?
                );
            }

            for (idx, v1) in a1.iter().enumerate() {
                match_values_impl(v1, &a2[idx])?;
            }
            Ok(())
        }

        (Value::Object(o1), Value::Object(o2)) => {
            if o1.len() != o2.len() {
                bail!(
                    "object length mismatch: {} != {}{}",
                    o1.len(),
                    o2.len(),
                    display_values(computed, expected)?
                );
            }

            // Key order is part of the contract; entries are compared
            // pairwise in insertion order.
            let mut itr2 = o2.iter();
            for (k1, v1) in o1.iter() {
                let (k2, v2) = itr2.next().unwrap();
                if k1 != k2 {
                    bail!(
                        "object key mismatch: {k1} != {k2}{}",
                        display_values(computed, expected)?
                    );
                }
                match_values_impl(v1, v2)?;
            }
            Ok(())
        }

        (Value::Number(n1), Value::Number(n2)) if n1 == n2 => Ok(()),
        (Value::String(s1), Value::String(s2)) if s1 == s2 => Ok(()),
        (Value::Bool(b1), Value::Bool(b2)) if b1 == b2 => Ok(()),
        (Value::Null, Value::Null) => Ok(()),
        (Value::Unresolved, Value::Unresolved) => Ok(()),

        _ => bail!("value mismatch: {}", display_values(computed, expected)?),
    }
}

fn match_values(computed: &Value, expected: &Value) -> Result<()> {
    match match_values_impl(computed, expected) {
        Ok(()) => Ok(()),
        Err(e) => bail!("\nmismatch in {}{}", display_values(computed, expected)?, e),
    }
}

// Rebuild extraction results as a plain value so that unresolved schemas
// compare structurally instead of through their serialized stand-in.
fn entries_to_value(entries: &[ModelEntry]) -> Result<Value> {
    let mut list_value = Value::new_array();
    let list = list_value.as_array_mut()?;
    for entry in entries {
        let mut entry_value = Value::new_object();
        let object = entry_value.as_object_mut()?;
        object.insert("model".to_string(), Value::from(entry.model.as_str()));
        object.insert(
            "jsSchemaName".to_string(),
            Value::from(entry.js_schema_name.as_str()),
        );
        object.insert("schema".to_string(), entry.schema.clone());
        object.insert("nodeId".to_string(), Value::from(entry.node_id as i64));
        list.push(entry_value);
    }
    Ok(list_value)
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
struct TestCase {
    note: String,
    source: String,
    typescript: Option<bool>,
    models: Option<Value>,
    error: Option<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
struct YamlTest {
    cases: Vec<TestCase>,
}

fn case_language(case: &TestCase) -> Language {
    match case.typescript {
        Some(true) => Language::TypeScript,
        _ => Language::JavaScript,
    }
}

fn yaml_test_impl(file: &str) -> Result<()> {
    println!("\nrunning {file}");

    let yaml_str = std::fs::read_to_string(file)?;
    let test: YamlTest = serde_yaml::from_str(&yaml_str)?;

    for case in &test.cases {
        print!("\ncase {} ", case.note);

        let mut engine = Engine::new();
        engine.set_language(case_language(case));

        match engine.extract(&case.source) {
            Ok(entries) => {
                if let Some(e) = &case.error {
                    bail!("error `{}` not raised by extraction.", e);
                }
                if let Some(models) = &case.models {
                    let expected = process_value(models)?;
                    match_values(&entries_to_value(&entries)?, &expected)?;
                }
            }
            Err(actual) => match &case.error {
                Some(expected) => {
                    let actual = actual.to_string();
                    if !actual.contains(expected) {
                        bail!(
                            "Error message\n`{}\n`\ndoes not contain `{}`",
                            actual,
                            expected
                        );
                    }
                    println!("{actual}");
                }
                _ => return Err(actual),
            },
        }

        println!("passed");
    }

    println!("{} cases passed.", test.cases.len());
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

#[test_resources("tests/extractor/**/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}

#[test]
fn all_case_files_are_well_formed() -> Result<()> {
    for entry in WalkDir::new("tests/extractor/cases")
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.path().extension().map_or(false, |e| e == "yaml") {
            let yaml_str = std::fs::read_to_string(entry.path())?;
            let test: YamlTest = serde_yaml::from_str(&yaml_str)?;
            for case in &test.cases {
                if case.models.is_none() && case.error.is_none() {
                    bail!(
                        "case `{}` in {} asserts nothing",
                        case.note,
                        entry.path().display()
                    );
                }
            }
        }
    }
    Ok(())
}

#[test]
fn extraction_is_deterministic() -> Result<()> {
    let source = r#"
        const mongoose = require("mongoose");
        const userSchema = new mongoose.Schema({ name: String, age: Number });
        module.exports = mongoose.model("User", userSchema);
    "#;

    // Unrelated code around a registration must not disturb the result.
    let engine = Engine::new();
    let first = engine.extract(source)?;
    let second = engine.extract(source)?;
    assert_eq!(first.len(), second.len());
    match_values(&entries_to_value(&first)?, &entries_to_value(&second)?)
}
