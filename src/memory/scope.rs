//! Scopes and storage duration
//!
//! This module provides the variable environments for execution:
//! - [`ScopeManager`]: the global scope plus one [`Frame`] per active call
//! - [`Frame`]: a function's stack of block scopes
//! - [`Variable`]: a value with its declared type and const flag
//!
//! # Lookup
//!
//! Names resolve innermost block first, then outward through the current
//! frame, then the global scope. Caller frames are never visible to callees.
//! Declaring a name that already exists in the *current* scope fails;
//! shadowing an outer name is allowed.
//!
//! # Statics
//!
//! A static local lives in its own scope, created the first time its
//! declaration runs and never popped. Every later execution of the
//! declaration only binds the name to that storage, so recursive activations
//! and pointers that escape the function all see one object.

use super::pointer::{read_path, value_at, write_path, Place};
use super::value::Value;
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::tree::ast::NodeId;
use crate::tree::types::TypeSpec;
use rustc_hash::FxHashMap;

/// Identity of one scope instance; never reused within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScopeId(pub u64);

/// A declared variable
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub value: Value,
    pub var_type: TypeSpec,
    pub is_const: bool,
}

impl Variable {
    /// `const T *p` qualifies the pointee, so only non-pointer consts are
    /// write-protected.
    pub fn new(value: Value, var_type: TypeSpec) -> Self {
        Variable {
            value,
            is_const: var_type.is_const && var_type.pointer_depth == 0,
            var_type,
        }
    }
}

#[derive(Debug, Clone)]
struct Scope {
    id: ScopeId,
    vars: FxHashMap<String, Variable>,
    // Names bound to static storage
    aliases: FxHashMap<String, ScopeId>,
}

impl Scope {
    fn new(id: ScopeId) -> Self {
        Scope {
            id,
            vars: FxHashMap::default(),
            aliases: FxHashMap::default(),
        }
    }

    fn binds(&self, name: &str) -> bool {
        self.vars.contains_key(name) || self.aliases.contains_key(name)
    }
}

/// Activation record for a function call
#[derive(Debug, Clone)]
pub struct Frame {
    scopes: Vec<Scope>,
}

/// The global scope, the call stack and static storage
#[derive(Debug, Clone)]
pub struct ScopeManager {
    global: Scope,
    frames: Vec<Frame>,
    statics: FxHashMap<NodeId, Scope>,
    next_scope: u64,
}

impl Default for ScopeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeManager {
    pub fn new() -> Self {
        ScopeManager {
            global: Scope::new(ScopeId(0)),
            frames: Vec::new(),
            statics: FxHashMap::default(),
            next_scope: 1,
        }
    }

    fn fresh_scope(&mut self) -> Scope {
        let id = ScopeId(self.next_scope);
        self.next_scope += 1;
        Scope::new(id)
    }

    /// Push a new frame for a function call
    pub fn push_frame(&mut self) {
        let scope = self.fresh_scope();
        self.frames.push(Frame {
            scopes: vec![scope],
        });
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Enter a block scope in the current frame
    pub fn push_scope(&mut self) {
        let scope = self.fresh_scope();
        if let Some(frame) = self.frames.last_mut() {
            frame.scopes.push(scope);
        }
    }

    /// Exit the current block scope
    pub fn pop_scope(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            // The frame's outermost scope belongs to pop_frame
            if frame.scopes.len() > 1 {
                frame.scopes.pop();
            }
        }
    }

    /// Call depth (number of active frames)
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    fn current_scope_mut(&mut self) -> &mut Scope {
        match self.frames.last_mut().and_then(|f| f.scopes.last_mut()) {
            Some(scope) => scope,
            None => &mut self.global,
        }
    }

    fn check_unbound(&mut self, name: &str) -> RuntimeResult<()> {
        if self.current_scope_mut().binds(name) {
            return Err(RuntimeError::DuplicateDeclaration {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Declare a variable in the current scope
    pub fn declare(&mut self, name: &str, var: Variable) -> RuntimeResult<ScopeId> {
        self.check_unbound(name)?;
        let scope = self.current_scope_mut();
        scope.vars.insert(name.to_string(), var);
        Ok(scope.id)
    }

    /// Create the storage of static declaration `node` and bind `name` to it
    /// in the current scope
    pub fn declare_static(&mut self, node: NodeId, name: &str, var: Variable) -> RuntimeResult<ScopeId> {
        self.check_unbound(name)?;
        let mut storage = self.fresh_scope();
        let id = storage.id;
        storage.vars.insert(name.to_string(), var);
        self.statics.insert(node, storage);
        self.current_scope_mut()
            .aliases
            .insert(name.to_string(), id);
        Ok(id)
    }

    /// Bind `name` to the existing storage of static `node`. Returns `false`
    /// when the declaration has not run yet.
    pub fn bind_static(&mut self, node: NodeId, name: &str) -> RuntimeResult<bool> {
        let Some(id) = self.statics.get(&node).map(|s| s.id) else {
            return Ok(false);
        };
        self.check_unbound(name)?;
        self.current_scope_mut()
            .aliases
            .insert(name.to_string(), id);
        Ok(true)
    }

    fn visible_scopes(&self) -> impl Iterator<Item = &Scope> {
        self.frames
            .last()
            .into_iter()
            .flat_map(|f| f.scopes.iter().rev())
            .chain(std::iter::once(&self.global))
    }

    /// Scope that owns the nearest visible `name`, following static bindings
    pub fn scope_of(&self, name: &str) -> Option<ScopeId> {
        self.visible_scopes().find_map(|s| {
            if s.vars.contains_key(name) {
                Some(s.id)
            } else {
                s.aliases.get(name).copied()
            }
        })
    }

    /// Find the nearest visible variable named `name`
    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        let scope = self.scope_of(name)?;
        self.variable_in(scope, name)
    }

    pub fn read(&self, name: &str) -> RuntimeResult<Value> {
        self.lookup(name)
            .map(|var| var.value.clone())
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    pub fn write(&mut self, name: &str, value: Value) -> RuntimeResult<()> {
        let scope = self
            .scope_of(name)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
            })?;
        self.write_place(&Place::new(scope, name), value)
    }

    fn all_scopes(&self) -> impl Iterator<Item = &Scope> {
        std::iter::once(&self.global)
            .chain(self.frames.iter().flat_map(|f| f.scopes.iter()))
            .chain(self.statics.values())
    }

    /// Variable `name` owned by a specific (possibly non-visible) scope.
    /// `None` once that scope has been popped.
    pub fn variable_in(&self, scope: ScopeId, name: &str) -> Option<&Variable> {
        self.all_scopes()
            .find(|s| s.id == scope)
            .and_then(|s| s.vars.get(name))
    }

    pub fn variable_in_mut(&mut self, scope: ScopeId, name: &str) -> Option<&mut Variable> {
        if self.global.id == scope {
            return self.global.vars.get_mut(name);
        }
        self.frames
            .iter_mut()
            .flat_map(|f| f.scopes.iter_mut())
            .chain(self.statics.values_mut())
            .find(|s| s.id == scope)
            .and_then(|s| s.vars.get_mut(name))
    }

    fn place_variable(&self, place: &Place) -> RuntimeResult<&Variable> {
        self.variable_in(place.scope, &place.name)
            .ok_or_else(|| RuntimeError::DanglingPointer {
                target: place.name.clone(),
            })
    }

    /// Borrow the value stored at a place. Text characters are not places
    /// in their own right; use [`ScopeManager::read_place`] for those.
    pub fn place_value(&self, place: &Place) -> RuntimeResult<&Value> {
        value_at(&self.place_variable(place)?.value, &place.path)
    }

    pub fn read_place(&self, place: &Place) -> RuntimeResult<Value> {
        read_path(&self.place_variable(place)?.value, &place.path)
    }

    /// Store into a place, rejecting writes to const variables
    pub fn write_place(&mut self, place: &Place, value: Value) -> RuntimeResult<()> {
        let var = self
            .variable_in_mut(place.scope, &place.name)
            .ok_or_else(|| RuntimeError::DanglingPointer {
                target: place.name.clone(),
            })?;
        if var.is_const {
            return Err(RuntimeError::ConstModification {
                var: place.name.clone(),
            });
        }
        write_path(&mut var.value, &place.path, value)
    }

    /// Declared type of the variable behind a place
    pub fn place_variable_type(&self, place: &Place) -> RuntimeResult<&TypeSpec> {
        Ok(&self.place_variable(place)?.var_type)
    }
}
