//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use graphbind::{accessors, Introspectable, Value};
use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness. Set `RUST_LOG` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `Id` is a public field; `Name` lives in restricted storage behind a
/// getter and a setter.
#[derive(Debug, Clone, Default, PartialEq, Introspectable)]
#[introspect(accessors)]
#[allow(non_snake_case)]
pub struct Person {
    pub Id: i64,
    _Name: String,
}

#[accessors]
impl Person {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            Id: id,
            _Name: name.to_string(),
        }
    }

    pub fn get_name(&self) -> String {
        self._Name.clone()
    }

    pub fn set_name(&mut self, name: String) {
        self._Name = name;
    }
}

pub fn snake_source() -> Value {
    Value::map([
        ("id_model", Value::from(1)),
        ("client_name", Value::from("Joao")),
        ("age", Value::from(49)),
    ])
}
