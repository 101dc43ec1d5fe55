#![no_main]

use libfuzzer_sys::fuzz_target;
use taxa::query::{parse_query, ModifierRegistry, ParsedModifier};

fuzz_target!(|data: &str| {
    // Tokenizing and resolving arbitrary input must never panic
    let registry = ModifierRegistry::with_builtins();
    let query = parse_query(data);
    for token in &query.modifiers {
        let parsed = ParsedModifier::parse(token);
        assert!(!parsed.values.is_empty());
        let _ = registry.resolve(parsed);
    }
});
