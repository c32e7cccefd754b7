//! Name resolution: a stack of frames mapping names to what they refer
//! to, searched innermost-first.

use crate::types::TypeId;
use std::collections::HashMap;

/// What a name in scope refers to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemInfo {
    pub is_struct: bool,
    pub is_pointer: bool,
    pub is_optional: bool,
    pub is_function: bool,
    pub is_module: bool,
    pub type_id: TypeId,
}

impl ItemInfo {
    pub fn variable(type_id: TypeId, is_pointer: bool, is_optional: bool) -> Self {
        Self {
            type_id,
            is_pointer,
            is_optional,
            ..Default::default()
        }
    }

    pub fn function(return_type: TypeId) -> Self {
        Self {
            is_function: true,
            type_id: return_type,
            ..Default::default()
        }
    }

    pub fn module() -> Self {
        Self {
            is_module: true,
            ..Default::default()
        }
    }

    pub fn struct_type(type_id: TypeId) -> Self {
        Self {
            is_struct: true,
            type_id,
            ..Default::default()
        }
    }
}

/// A stack of name-to-[`ItemInfo`] frames. Entering a block pushes a new
/// frame; leaving it pops one. Lookups walk from the top of the stack
/// down, so an inner binding shadows an outer one of the same name.
pub struct Scope {
    frames: Vec<HashMap<String, ItemInfo>>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    pub fn begin(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn end(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.frames.iter().rev().any(|frame| frame.contains_key(name))
    }

    pub fn get(&self, name: &str) -> Option<&ItemInfo> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn add(&mut self, name: impl Into<String>, info: ItemInfo) {
        self.frames.last_mut().expect("scope always has a frame").insert(name.into(), info);
    }

    pub fn add_variable(&mut self, name: impl Into<String>, type_id: TypeId, is_pointer: bool, is_optional: bool) {
        self.add(name, ItemInfo::variable(type_id, is_pointer, is_optional));
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}
