// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Block scopes of the body currently being resolved.

use indexmap::IndexMap;

use crate::tree::NodeId;

/// One open code block.
#[derive(Debug)]
pub struct Frame {
    pub scope_id: u32,
    /// Locals declared directly in this block, in declaration order.
    pub locals: IndexMap<String, NodeId>,
}

/// Stack of open blocks inside one function or event body.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, scope_id: u32) {
        self.frames.push(Frame {
            scope_id,
            locals: IndexMap::new(),
        });
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Look a local up from the innermost block outward.
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.locals.get(name).copied())
    }

    /// Define a local in the innermost block. Returns the existing declaration
    /// if the name is already taken in that exact block.
    pub fn define(&mut self, name: &str, decl: NodeId) -> Result<(), NodeId> {
        let Some(frame) = self.frames.last_mut() else {
            return Ok(());
        };
        if let Some(&existing) = frame.locals.get(name) {
            return Err(existing);
        }
        frame.locals.insert(name.to_string(), decl);
        Ok(())
    }

    /// Whether a block with this id is currently open.
    pub fn is_open(&self, scope_id: u32) -> bool {
        self.frames.iter().any(|f| f.scope_id == scope_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn innermost_binding_wins() {
        let mut scopes = ScopeStack::new();
        scopes.push(1);
        scopes.define("x", NodeId(10)).unwrap();
        scopes.push(2);
        scopes.define("x", NodeId(20)).unwrap();
        assert_eq!(scopes.lookup("x"), Some(NodeId(20)));
        let frame = scopes.pop().unwrap();
        assert_eq!(frame.scope_id, 2);
        assert_eq!(scopes.lookup("x"), Some(NodeId(10)));
    }

    #[test]
    fn redefinition_in_same_block_is_rejected() {
        let mut scopes = ScopeStack::new();
        scopes.push(1);
        scopes.define("x", NodeId(1)).unwrap();
        assert_eq!(scopes.define("x", NodeId(2)), Err(NodeId(1)));
    }

    #[test]
    fn open_blocks_are_tracked() {
        let mut scopes = ScopeStack::new();
        scopes.push(1);
        scopes.push(3);
        assert!(scopes.is_open(1));
        assert!(scopes.is_open(3));
        assert!(!scopes.is_open(2));
        scopes.clear();
        assert!(!scopes.is_open(1));
        assert_eq!(scopes.lookup("x"), None);
    }
}
