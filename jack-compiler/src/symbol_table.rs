//! Identifier resolution for Jack code generation.
//!
//! Two flat scopes: the class scope holds `static` and `field` symbols
//! for the lifetime of one class, the subroutine scope holds `arg` and
//! `var` symbols and is cleared by `start_subroutine`. Lookups consult
//! the subroutine scope first. Indices are dense per kind: each kind
//! counts 0, 1, 2, ... independently.

use std::collections::HashMap;

use crate::ast::Type;
use crate::error::CompileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Static,
    Field,
    Arg,
    Var,
}

/// One resolved identifier; the name is the map key.
#[derive(Debug, Clone, PartialEq)]
pub struct JackSymbol {
    pub ty: Type,
    pub kind: SymbolKind,
    pub index: u16,
}

pub struct SymbolTable {
    class_name: String,
    class_scope: HashMap<String, JackSymbol>,
    subroutine_scope: HashMap<String, JackSymbol>,
    static_index: u16,
    field_index: u16,
    arg_index: u16,
    var_index: u16,
}

impl SymbolTable {
    #[must_use]
    pub fn new(class_name: &str) -> Self {
        SymbolTable {
            class_name: class_name.to_string(),
            class_scope: HashMap::new(),
            subroutine_scope: HashMap::new(),
            static_index: 0,
            field_index: 0,
            arg_index: 0,
            var_index: 0,
        }
    }

    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Clears the subroutine scope and its counters; class-scope symbols
    /// and counters persist.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope.clear();
        self.arg_index = 0;
        self.var_index = 0;
    }

    /// Inserts a symbol at the next index of its kind. Redeclaring a
    /// name within its scope is an error.
    pub fn define(&mut self, name: &str, ty: Type, kind: SymbolKind) -> Result<(), CompileError> {
        let (scope, counter) = match kind {
            SymbolKind::Static => (&mut self.class_scope, &mut self.static_index),
            SymbolKind::Field => (&mut self.class_scope, &mut self.field_index),
            SymbolKind::Arg => (&mut self.subroutine_scope, &mut self.arg_index),
            SymbolKind::Var => (&mut self.subroutine_scope, &mut self.var_index),
        };

        if scope.contains_key(name) {
            return Err(CompileError::semantic(format!(
                "duplicate declaration of '{name}'"
            )));
        }

        let index = *counter;
        *counter += 1;
        scope.insert(name.to_string(), JackSymbol { ty, kind, index });
        Ok(())
    }

    /// Number of symbols of `kind` in its owning scope.
    #[must_use]
    pub fn var_count(&self, kind: SymbolKind) -> u16 {
        match kind {
            SymbolKind::Static => self.static_index,
            SymbolKind::Field => self.field_index,
            SymbolKind::Arg => self.arg_index,
            SymbolKind::Var => self.var_index,
        }
    }

    /// Resolves a name: subroutine scope first, then class scope.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&JackSymbol> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    /// The kind of a name, or `None` when it is not a symbol. The `None`
    /// case is how a call receiver is recognized as a class name.
    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<SymbolKind> {
        self.get(name).map(|s| s.kind)
    }

    /// The declared type of a defined name; unknown names are an error.
    pub fn type_of(&self, name: &str) -> Result<&Type, CompileError> {
        self.get(name)
            .map(|s| &s.ty)
            .ok_or_else(|| unknown(name, &self.class_name))
    }

    /// The index of a defined name; unknown names are an error.
    pub fn index_of(&self, name: &str) -> Result<u16, CompileError> {
        self.get(name)
            .map(|s| s.index)
            .ok_or_else(|| unknown(name, &self.class_name))
    }
}

fn unknown(name: &str, class_name: &str) -> CompileError {
    CompileError::semantic(format!("unknown identifier '{name}' in class {class_name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_indices_per_kind() {
        let mut table = SymbolTable::new("Point");
        table
            .define("x", Type::Int, SymbolKind::Field)
            .unwrap();
        table
            .define("y", Type::Int, SymbolKind::Field)
            .unwrap();
        table
            .define("count", Type::Int, SymbolKind::Static)
            .unwrap();

        assert_eq!(table.index_of("x").unwrap(), 0);
        assert_eq!(table.index_of("y").unwrap(), 1);
        // Static counts independently of field.
        assert_eq!(table.index_of("count").unwrap(), 0);

        assert_eq!(table.var_count(SymbolKind::Field), 2);
        assert_eq!(table.var_count(SymbolKind::Static), 1);
    }

    #[test]
    fn test_subroutine_scope_shadows_class_scope() {
        let mut table = SymbolTable::new("Point");
        table
            .define("value", Type::Int, SymbolKind::Field)
            .unwrap();
        table
            .define("value", Type::Boolean, SymbolKind::Var)
            .unwrap();

        assert_eq!(table.kind_of("value"), Some(SymbolKind::Var));
        assert_eq!(table.type_of("value").unwrap(), &Type::Boolean);
    }

    #[test]
    fn test_start_subroutine_resets_only_subroutine_state() {
        let mut table = SymbolTable::new("Point");
        table
            .define("x", Type::Int, SymbolKind::Field)
            .unwrap();
        table
            .define("a", Type::Int, SymbolKind::Arg)
            .unwrap();
        table
            .define("t", Type::Int, SymbolKind::Var)
            .unwrap();

        table.start_subroutine();

        assert_eq!(table.kind_of("a"), None);
        assert_eq!(table.kind_of("t"), None);
        assert_eq!(table.var_count(SymbolKind::Arg), 0);
        assert_eq!(table.var_count(SymbolKind::Var), 0);

        // Class scope persists, counters included.
        assert_eq!(table.kind_of("x"), Some(SymbolKind::Field));
        assert_eq!(table.var_count(SymbolKind::Field), 1);

        // Fresh subroutine symbols restart at index 0.
        table
            .define("b", Type::Int, SymbolKind::Arg)
            .unwrap();
        assert_eq!(table.index_of("b").unwrap(), 0);
    }

    #[test]
    fn test_method_this_slot_shifts_args() {
        let mut table = SymbolTable::new("Point");
        table
            .define("this", Type::ClassName("Point".to_string()), SymbolKind::Arg)
            .unwrap();
        table
            .define("other", Type::ClassName("Point".to_string()), SymbolKind::Arg)
            .unwrap();

        assert_eq!(table.index_of("this").unwrap(), 0);
        assert_eq!(table.index_of("other").unwrap(), 1);
    }

    #[test]
    fn test_unknown_name_is_error() {
        let table = SymbolTable::new("Point");
        assert_eq!(table.kind_of("ghost"), None);
        assert!(table.type_of("ghost").is_err());
        assert!(table.index_of("ghost").is_err());
    }

    #[test]
    fn test_duplicate_declaration_is_error() {
        let mut table = SymbolTable::new("Point");
        table
            .define("x", Type::Int, SymbolKind::Var)
            .unwrap();
        assert!(table.define("x", Type::Int, SymbolKind::Var).is_err());
    }
}
