//! Scoped symbol table.

use ccc_ast::types::TypeName;
use ccc_source::Location;
use std::collections::HashMap;

/// A declared variable.
///
/// `H` is whatever the owning pass needs to attach to the name: the analyzer uses `()`, the code
/// generator stores the stack slot backing the variable.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolEntry<H> {
    pub name: String,
    pub ty: TypeName,
    pub loc: Location,
    pub handle: H,
}

pub type Scope<H> = HashMap<String, SymbolEntry<H>>;

/// A stack of scopes. Lookups walk from the innermost scope outwards.
///
/// The table is created with one (outermost) scope which can never be popped.
#[derive(Debug, Clone)]
pub struct SymbolTable<H> {
    innermost: Scope<H>,
    /// Enclosing scopes, outermost first.
    enclosing: Vec<Scope<H>>,
}

impl<H> Default for SymbolTable<H> {
    fn default() -> Self {
        Self {
            innermost: Scope::new(),
            enclosing: Vec::new(),
        }
    }
}

impl<H> SymbolTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scopes currently on the stack (at least `1`).
    pub fn depth(&self) -> usize {
        self.enclosing.len() + 1
    }

    pub fn push_scope(&mut self) {
        let outer = std::mem::take(&mut self.innermost);
        self.enclosing.push(outer);
    }

    /// Discards the innermost scope and returns its entries.
    /// Returns `None` without doing anything if only the outermost scope is left.
    pub fn pop_scope(&mut self) -> Option<Scope<H>> {
        let outer = self.enclosing.pop()?;
        Some(std::mem::replace(&mut self.innermost, outer))
    }

    /// Adds a symbol to the innermost scope.
    /// Returns `false` if the name is already declared in that scope. Names from outer scopes may be shadowed.
    ///
    /// # Params
    /// * `name` - The name of the variable.
    /// * `ty` - The declared type.
    /// * `loc` - Where the declaration appears.
    /// * `handle` - Pass specific data attached to the symbol.
    pub fn add_symbol(&mut self, name: &str, ty: TypeName, loc: Location, handle: H) -> bool {
        if self.innermost.contains_key(name) {
            return false;
        }
        self.innermost.insert(
            name.to_string(),
            SymbolEntry {
                name: name.to_string(),
                ty,
                loc,
                handle,
            },
        );
        true
    }

    /// Binds `name` in the innermost scope, replacing any entry with the same name in that scope.
    pub fn set_symbol(&mut self, name: &str, ty: TypeName, loc: Location, handle: H) {
        self.innermost.insert(
            name.to_string(),
            SymbolEntry {
                name: name.to_string(),
                ty,
                loc,
                handle,
            },
        );
    }

    /// Resolves `name`, innermost scope first.
    pub fn get_symbol(&self, name: &str) -> Option<&SymbolEntry<H>> {
        std::iter::once(&self.innermost)
            .chain(self.enclosing.iter().rev())
            .find_map(|scope| scope.get(name))
    }

    /// Resolves `name` in the innermost scope only.
    pub fn get_in_current_scope(&self, name: &str) -> Option<&SymbolEntry<H>> {
        self.innermost.get(name)
    }
}
