use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::content::{SceneGraph, Value};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariableError {
    #[error("variable {name} was never declared")]
    Undeclared { name: String },
    #[error("variable {name} is declared more than once")]
    Duplicate { name: String },
}

/// Scripted state. The key set is fixed when the registry is built; writes to
/// names outside it are rejected.
#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    values: HashMap<String, Value>,
}

impl VariableRegistry {
    pub fn new<I, K>(declarations: I) -> Result<Self, VariableError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut values = HashMap::new();
        for (name, value) in declarations {
            let name = name.into();
            if values.contains_key(&name) {
                return Err(VariableError::Duplicate { name });
            }
            values.insert(name, value);
        }
        Ok(Self { values })
    }

    pub fn from_graph(graph: &SceneGraph) -> Result<Self, VariableError> {
        Self::new(
            graph
                .variables
                .iter()
                .map(|decl| (decl.name.as_str(), decl.value.clone())),
        )
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&Value, VariableError> {
        self.values
            .get(name)
            .ok_or_else(|| VariableError::Undeclared {
                name: name.to_string(),
            })
    }

    pub fn set(&mut self, name: &str, value: Value) -> Result<(), VariableError> {
        let slot = self
            .values
            .get_mut(name)
            .ok_or_else(|| VariableError::Undeclared {
                name: name.to_string(),
            })?;
        debug!(variable = %name, value = %value, "variable_set");
        *slot = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::GraphBuilder;

    fn registry() -> VariableRegistry {
        VariableRegistry::new([
            ("coins", Value::from(0)),
            ("name", Value::from("")),
            ("met_guard", Value::from(false)),
        ])
        .expect("registry")
    }

    #[test]
    fn get_after_set_returns_written_value() {
        let mut variables = registry();
        for (name, value) in [
            ("coins", Value::from(7)),
            ("name", Value::from("Ada")),
            ("met_guard", Value::from(true)),
        ] {
            variables.set(name, value.clone()).expect("declared");
            assert_eq!(variables.get(name), Ok(&value));
        }
    }

    #[test]
    fn set_on_undeclared_name_is_rejected_without_inserting() {
        let mut variables = registry();
        let result = variables.set("coin", Value::from(1));
        assert_eq!(
            result,
            Err(VariableError::Undeclared {
                name: "coin".to_string()
            })
        );
        assert!(!variables.has("coin"));
        assert_eq!(variables.len(), 3);
    }

    #[test]
    fn get_on_undeclared_name_is_an_error() {
        let variables = registry();
        assert!(variables.has("coins"));
        assert!(matches!(
            variables.get("gems"),
            Err(VariableError::Undeclared { .. })
        ));
    }

    #[test]
    fn duplicate_declarations_are_rejected() {
        let result = VariableRegistry::new([("a", Value::from(1)), ("a", Value::from(2))]);
        assert!(matches!(result, Err(VariableError::Duplicate { .. })));
    }

    #[test]
    fn registry_is_seeded_from_graph_declarations() {
        let mut builder = GraphBuilder::new();
        builder.variable("coins", 3).variable("door_open", true);
        let graph = builder.build().expect("graph");

        let variables = VariableRegistry::from_graph(&graph).expect("registry");
        assert_eq!(variables.get("coins").map(Value::as_int), Ok(3));
        assert_eq!(variables.get("door_open").map(Value::as_bool), Ok(true));
    }
}
