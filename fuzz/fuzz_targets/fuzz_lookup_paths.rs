//! Fuzz target for nested lookup insertion, navigation, and coercion.
//!
//! Goal: The lookup should **never panic** on any sequence of operations.
//! Empty paths and bad coercions may return errors, but panics are
//! unacceptable.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_lookup_paths
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use rulegate_engine::{LookupValue, NestedLookup};

#[derive(Arbitrary, Debug)]
enum ValueSpec {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl From<ValueSpec> for LookupValue {
    fn from(spec: ValueSpec) -> Self {
        match spec {
            ValueSpec::Int(v) => LookupValue::from(v),
            ValueSpec::Float(v) => LookupValue::from(v),
            ValueSpec::Bool(v) => LookupValue::from(v),
            ValueSpec::Str(v) => LookupValue::from(v),
        }
    }
}

/// Structured input: insertions interleaved with navigation reads.
#[derive(Arbitrary, Debug)]
struct LookupInput {
    inserts: Vec<(Vec<String>, ValueSpec)>,
    reads: Vec<Vec<String>>,
}

fuzz_target!(|input: LookupInput| {
    // Limit input size to avoid OOM and keep fuzzing fast
    if input.inserts.len() > 50 || input.reads.len() > 50 {
        return;
    }
    if input
        .inserts
        .iter()
        .map(|(path, _)| path)
        .chain(input.reads.iter())
        .any(|path| path.len() > 8 || path.iter().any(|key| key.len() > 64))
    {
        return;
    }

    let lookup = NestedLookup::<String>::default();

    for (path, value) in input.inserts {
        // Errors (empty paths) are fine; panics are not.
        let _ = lookup.insert(path, LookupValue::from(value));
    }

    for path in input.reads {
        let mut node = lookup.at(path.first().cloned().unwrap_or_default());
        for key in path.into_iter().skip(1) {
            let next = node.at(key);
            node = next;
        }
        // Coercions must never panic, whatever is stored.
        let _ = node.as_i64();
        let _ = node.as_f64();
        let _ = node.as_bool();
        let _ = node.as_str();
        let _ = node.is_defined(String::new());
    }
});
