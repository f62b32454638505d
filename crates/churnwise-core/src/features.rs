//! Lenient feature alignment.
//!
//! Maps a caller-supplied `name -> value` mapping onto the classifier's
//! ordered schema. Absent features become `0.0`; unknown inputs are ignored.
//! Neither case is an error. Zero-filling can quietly skew predictions for
//! sparse inputs, so [`Alignment`] reports both lists for the caller to log.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// One value per schema entry, in schema order.
    pub values: Vec<f64>,
    /// Schema features absent from the input, in schema order.
    pub missing: Vec<String>,
    /// Input names not in the schema, sorted.
    pub ignored: Vec<String>,
}

impl Alignment {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

pub fn align(input: &HashMap<String, f64>, schema: &[String]) -> Alignment {
    let mut values = Vec::with_capacity(schema.len());
    let mut missing = Vec::new();

    for name in schema {
        match input.get(name) {
            Some(v) => values.push(*v),
            None => {
                values.push(0.0);
                missing.push(name.clone());
            }
        }
    }

    let mut ignored: Vec<String> = input
        .keys()
        .filter(|k| !schema.contains(*k))
        .cloned()
        .collect();
    ignored.sort();

    Alignment {
        values,
        missing,
        ignored,
    }
}
