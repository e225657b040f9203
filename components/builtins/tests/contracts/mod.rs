//! Contract tests for native registration

use builtins::{install, NativeRegistry, NATIVES};
use core_types::{NativeFn, Value};
use std::collections::HashMap;

#[derive(Default)]
struct Globals(HashMap<String, NativeFn>);

impl NativeRegistry for Globals {
    fn define_native(&mut self, name: &str, function: NativeFn) {
        self.0.insert(name.to_string(), function);
    }
}

#[test]
fn contract_install_registers_every_native() {
    let mut globals = Globals::default();
    install(&mut globals);
    assert_eq!(globals.0.len(), NATIVES.len());
    for (name, _) in NATIVES {
        assert!(globals.0.contains_key(*name));
    }
}

#[test]
fn contract_natives_return_values() {
    let mut globals = Globals::default();
    install(&mut globals);
    let clock = globals.0["clock"];
    assert!(matches!(clock(&[]), Value::Number(_)));
}
