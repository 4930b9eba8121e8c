//! Lexical scope stack shared by the evaluator and the generator.

use std::collections::HashMap;

use crate::evaluator::Value;
use crate::types::TypeTag;

/// What is known about a name at compile time.
///
/// `value` is `None` for names that only have a runtime value, such as
/// function parameters or bindings of a `spawn`.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub value: Option<Value>,
    pub tag: Option<TypeTag>,
}

impl Entry {
    pub fn known(value: Value, tag: Option<TypeTag>) -> Self {
        Entry {
            value: Some(value),
            tag,
        }
    }

    pub fn runtime(tag: Option<TypeTag>) -> Self {
        Entry { value: None, tag }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Module-level constants. Always the bottom frame.
    Global,
    /// Body of a function being emitted.
    Function,
    /// Activation of a function during constant evaluation.
    Call,
    /// Branch arm of `if`, `match` or `receive`.
    Block,
}

#[derive(Debug, Clone)]
pub struct Frame {
    kind: FrameKind,
    owner: Option<String>,
    entries: HashMap<String, Entry>,
}

impl Frame {
    fn new(kind: FrameKind, owner: Option<String>) -> Self {
        Frame {
            kind,
            owner,
            entries: HashMap::new(),
        }
    }
}

/// Frames searched innermost first.
#[derive(Debug, Clone)]
pub struct Scopes {
    frames: Vec<Frame>,
}

impl Default for Scopes {
    fn default() -> Self {
        Self::new()
    }
}

impl Scopes {
    pub fn new() -> Self {
        Scopes {
            frames: vec![Frame::new(FrameKind::Global, None)],
        }
    }

    pub fn enter(&mut self, kind: FrameKind) {
        self.frames.push(Frame::new(kind, None));
    }

    pub fn enter_function(&mut self, name: &str) {
        self.frames
            .push(Frame::new(FrameKind::Function, Some(name.to_string())));
    }

    /// Leave the innermost frame. The global frame is never popped.
    pub fn leave(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Start a call activation: every frame above the globals is set
    /// aside so the callee sees only globals and its own parameters.
    #[must_use = "the suspended frames must be handed back to `leave_call`"]
    pub fn enter_call(&mut self, name: &str) -> Vec<Frame> {
        let suspended = self.frames.split_off(1);
        self.frames
            .push(Frame::new(FrameKind::Call, Some(name.to_string())));
        suspended
    }

    /// Drop the callee frames and put the caller's frames back.
    pub fn leave_call(&mut self, suspended: Vec<Frame>) {
        self.frames.truncate(1);
        self.frames.extend(suspended);
    }

    /// Bind a name in the innermost frame.
    pub fn define(&mut self, name: impl ToString, entry: Entry) {
        if let Some(frame) = self.frames.last_mut() {
            frame.entries.insert(name.to_string(), entry);
        }
    }

    pub fn resolve(&self, name: &str) -> Option<&Entry> {
        self.resolve_with_kind(name).map(|(_, entry)| entry)
    }

    /// Resolve a name together with the kind of frame that binds it.
    pub fn resolve_with_kind(&self, name: &str) -> Option<(FrameKind, &Entry)> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.entries.get(name).map(|entry| (frame.kind, entry)))
    }

    /// Name of the innermost function or call being processed.
    pub fn current_function(&self) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.owner.as_deref())
    }
}

#[cfg(test)]
impl Scopes {
    pub fn is_global_level(&self) -> bool {
        self.frames.len() == 1
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
