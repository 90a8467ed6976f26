//! Lexical scopes for the analyzer. A scope is pushed when a function body,
//! loop body or block is entered and popped when it is left, so the innermost
//! scope is always the one for the code being analyzed.

use hashbrown::HashMap;

use super::{error::SemanticError, hir::EntityId, ty::Type};
use crate::frontend::intern::InternedSymbol;

/// What a name in scope refers to
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Entity(EntityId),
    Type(Type),
}

/// How a new scope relates to the one enclosing it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Inherits the loop and function of the enclosing scope
    Block,
    /// The body of a loop
    Loop,
    /// The body of the given function. Loops outside of the function do not
    /// reach into it.
    Function(EntityId),
}

#[derive(Debug)]
struct Scope {
    bindings: HashMap<InternedSymbol, Binding>,
    in_loop: bool,
    function: Option<EntityId>,
}

#[derive(Debug)]
pub struct ScopeStack {
    /// Index 0 is the root scope holding the standard library
    stack: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            stack: vec![Scope {
                bindings: HashMap::new(),
                in_loop: false,
                function: None,
            }],
        }
    }

    fn current(&self) -> &Scope {
        self.stack
            .last()
            .expect("The root scope is never popped")
    }

    /// Creates a new scope nested in the current one
    pub fn push_scope(&mut self, kind: ScopeKind) {
        let parent = self.current();

        let (in_loop, function) = match kind {
            ScopeKind::Block => (parent.in_loop, parent.function),
            ScopeKind::Loop => (true, parent.function),
            ScopeKind::Function(function) => (false, Some(function)),
        };

        log::trace!("entering {kind:?} scope at depth {}", self.stack.len());

        self.stack.push(Scope {
            bindings: HashMap::new(),
            in_loop,
            function,
        });
    }

    /// Destroys the current scope
    pub fn pop_scope(&mut self) {
        assert!(self.stack.len() > 1, "Attempted to pop the root scope");

        self.stack.pop();
    }

    /// Binds a name in the current scope. Shadowing is not allowed, so the name
    /// must not be visible from any enclosing scope either.
    pub fn add(&mut self, symbol: InternedSymbol, binding: Binding) -> Result<(), SemanticError> {
        if self.sees(symbol) {
            return Err(SemanticError::DuplicateDeclaration(
                symbol.value().to_owned(),
            ));
        }

        if let Some(scope) = self.stack.last_mut() {
            scope.bindings.insert(symbol, binding);
        }

        Ok(())
    }

    /// Traverses the scope stack from innermost to outermost looking for a
    /// binding
    pub fn lookup(&self, symbol: InternedSymbol) -> Result<&Binding, SemanticError> {
        self.stack
            .iter()
            .rev()
            .find_map(|scope| scope.bindings.get(&symbol))
            .ok_or_else(|| SemanticError::UndeclaredIdentifier(symbol.value().to_owned()))
    }

    /// Resolves a name written in type position. A name bound to an entity
    /// names no type, so it is reported as undeclared.
    pub fn lookup_type(&self, symbol: InternedSymbol) -> Result<&Type, SemanticError> {
        match self.lookup(symbol)? {
            Binding::Type(ty) => Ok(ty),
            Binding::Entity(_) => Err(SemanticError::UndeclaredIdentifier(
                symbol.value().to_owned(),
            )),
        }
    }

    pub fn sees(&self, symbol: InternedSymbol) -> bool {
        self.stack
            .iter()
            .any(|scope| scope.bindings.contains_key(&symbol))
    }

    pub fn in_loop(&self) -> bool {
        self.current().in_loop
    }

    /// The function whose body is being analyzed, if any
    pub fn function(&self) -> Option<EntityId> {
        self.current().function
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
