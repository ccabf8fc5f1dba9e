//! Global function table.

use ccc_ast::types::TypeName;
use ccc_source::Location;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionEntry {
    pub name: String,
    pub return_type: TypeName,
    pub param_types: Vec<TypeName>,
    /// Location of the definition once the body has been analyzed.
    pub definition_loc: Option<Location>,
}

impl FunctionEntry {
    pub fn has_definition(&self) -> bool {
        self.definition_loc.is_some()
    }
}

/// Maps function names to signatures and tracks the function whose body is being analyzed.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    functions: HashMap<String, FunctionEntry>,
    current: Option<String>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a signature. A name can be declared any number of times: the first signature is
    /// kept and later ones are not cross-checked against it.
    /// Returns `false` if the name was already registered.
    pub fn add_function(&mut self, name: &str, return_type: TypeName, param_types: Vec<TypeName>) -> bool {
        if self.functions.contains_key(name) {
            return false;
        }
        self.functions.insert(
            name.to_string(),
            FunctionEntry {
                name: name.to_string(),
                return_type,
                param_types,
                definition_loc: None,
            },
        );
        true
    }

    /// Marks `name` as defined at `loc`. Returns `false` if `name` was never declared.
    pub fn define_function(&mut self, name: &str, loc: Location) -> bool {
        match self.functions.get_mut(name) {
            Some(entry) => {
                entry.definition_loc = Some(loc);
                true
            }
            None => false,
        }
    }

    pub fn is_function_defined(&self, name: &str) -> bool {
        self.functions
            .get(name)
            .map_or(false, FunctionEntry::has_definition)
    }

    pub fn get_function(&self, name: &str) -> Option<&FunctionEntry> {
        self.functions.get(name)
    }

    pub fn enter_function_definition(&mut self, name: &str) {
        self.current = Some(name.to_string());
    }

    pub fn exit_function_definition(&mut self) {
        self.current = None;
    }

    pub fn is_in_function_definition(&self) -> bool {
        self.current.is_some()
    }

    /// The function whose body is currently being analyzed.
    pub fn current_function(&self) -> Option<&FunctionEntry> {
        self.current
            .as_deref()
            .and_then(|name| self.functions.get(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionEntry> {
        self.functions.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_signature_wins() {
        let mut table = FunctionTable::new();
        assert!(table.add_function("f", TypeName::Int, vec![TypeName::Int]));
        assert!(!table.add_function("f", TypeName::Float, vec![]));

        let entry = table.get_function("f").unwrap();
        assert_eq!(entry.return_type, TypeName::Int);
        assert_eq!(entry.param_types, vec![TypeName::Int]);
        assert!(!entry.has_definition());
    }

    #[test]
    fn definition_cursor() {
        let mut table = FunctionTable::new();
        table.add_function("main", TypeName::Int, vec![]);
        assert!(!table.is_in_function_definition());

        table.enter_function_definition("main");
        assert!(table.is_in_function_definition());
        assert_eq!(table.current_function().map(|f| f.name.as_str()), Some("main"));

        assert!(table.define_function("main", Location::new(1, 1)));
        table.exit_function_definition();
        assert!(table.current_function().is_none());
        assert!(table.is_function_defined("main"));
        assert!(!table.define_function("nope", Location::default()));
    }
}
