//! Compile environment.
//!
//! Frames live in an arena and link to their parent by index, so pushing
//! and popping a scope never invalidates anything issued inside it. Every
//! bound name gets a fresh [`VarId`]; the [`Binding`] for each ID is kept in
//! a side table for the whole compilation, which is what the renaming pass
//! reads once lowering is done.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tempy_diagnostic::Diagnostic;
use tempy_ir::{SyntaxNode, VarId};

use crate::{Premise, TranslateResult, Translator};

/// Rewrites a macro invocation into a replacement node, which is then
/// translated from scratch.
pub type MacroExpander = Rc<dyn Fn(&SyntaxNode) -> Result<SyntaxNode, Diagnostic>>;

/// Takes over translation of an invocation entirely.
pub type MacroConverter = Rc<dyn Fn(&mut Translator, &SyntaxNode, Premise) -> TranslateResult>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Toplevel,
    Function,
    Let,
    Lambda,
}

impl FrameKind {
    /// Whether the frame becomes its own host function.
    pub fn is_host_function(self) -> bool {
        !matches!(self, FrameKind::Let)
    }
}

/// Index of a frame in the environment's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameId(u32);

impl FrameId {
    pub const TOPLEVEL: FrameId = FrameId(0);

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Frame {
    kind: FrameKind,
    parent: Option<FrameId>,
    names: FxHashMap<String, VarId>,
}

/// Where a variable was introduced.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HintSource {
    Local,
    Argument,
    Function,
    Closure,
    Let,
}

/// Whether a variable is visible to user code or a lowering temporary.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Usage {
    Local,
    Immediate,
}

/// Naming metadata kept for the renaming pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hint {
    pub original_name: String,
    pub source: HintSource,
    pub usage: Usage,
}

#[derive(Clone)]
pub enum Binding {
    Variable(Hint),
    GlobalBuiltin(String),
    RuntimeExternal(String),
    MacroExpander(MacroExpander),
    MacroConverter(MacroConverter),
}

impl Binding {
    pub fn hint(&self) -> Option<&Hint> {
        match self {
            Binding::Variable(hint) => Some(hint),
            _ => None,
        }
    }

    pub fn is_macro(&self) -> bool {
        matches!(self, Binding::MacroExpander(_) | Binding::MacroConverter(_))
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Variable(hint) => f.debug_tuple("Variable").field(hint).finish(),
            Binding::GlobalBuiltin(name) => f.debug_tuple("GlobalBuiltin").field(name).finish(),
            Binding::RuntimeExternal(name) => f.debug_tuple("RuntimeExternal").field(name).finish(),
            Binding::MacroExpander(_) => f.write_str("MacroExpander(..)"),
            Binding::MacroConverter(_) => f.write_str("MacroConverter(..)"),
        }
    }
}

/// Scoped identifier table for one compilation.
#[derive(Clone, Debug)]
pub struct CompileEnv {
    frames: Vec<Frame>,
    current: FrameId,
    globals: FxHashMap<String, VarId>,
    /// Indexed by `VarId`.
    bindings: Vec<Binding>,
}

impl Default for CompileEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl CompileEnv {
    /// An environment holding only the toplevel frame.
    pub fn new() -> Self {
        CompileEnv {
            frames: vec![Frame {
                kind: FrameKind::Toplevel,
                parent: None,
                names: FxHashMap::default(),
            }],
            current: FrameId::TOPLEVEL,
            globals: FxHashMap::default(),
            bindings: Vec::new(),
        }
    }

    fn issue(&mut self, binding: Binding) -> VarId {
        let Ok(raw) = u32::try_from(self.bindings.len()) else {
            unreachable!("more than u32::MAX bindings in one compilation");
        };
        self.bindings.push(binding);
        VarId::new(raw)
    }

    fn variable(&mut self, name: &str, source: HintSource, usage: Usage) -> VarId {
        self.issue(Binding::Variable(Hint {
            original_name: name.to_string(),
            source,
            usage,
        }))
    }

    // Frames

    pub fn current_frame(&self) -> FrameId {
        self.current
    }

    pub fn current_kind(&self) -> FrameKind {
        self.frames[self.current.index()].kind
    }

    pub fn push_frame(&mut self, kind: FrameKind) -> FrameId {
        let Ok(raw) = u32::try_from(self.frames.len()) else {
            unreachable!("more than u32::MAX frames in one compilation");
        };
        self.frames.push(Frame {
            kind,
            parent: Some(self.current),
            names: FxHashMap::default(),
        });
        self.current = FrameId(raw);
        self.current
    }

    /// Return to the parent frame. The popped frame stays in the arena.
    pub fn pop_frame(&mut self) {
        if let Some(parent) = self.frames[self.current.index()].parent {
            self.current = parent;
        }
    }

    fn chain(&self) -> impl Iterator<Item = &Frame> {
        std::iter::successors(Some(&self.frames[self.current.index()]), |frame| {
            frame.parent.map(|parent| &self.frames[parent.index()])
        })
    }

    /// Whether the current frame is nested in a host function other than
    /// the module function.
    pub fn in_function(&self) -> bool {
        self.chain()
            .any(|frame| matches!(frame.kind, FrameKind::Function | FrameKind::Lambda))
    }

    // Binding

    /// Bind `binding` globally under `name`, replacing any previous global.
    pub fn bind_global(&mut self, name: &str, binding: Binding) -> VarId {
        let id = self.issue(binding);
        self.globals.insert(name.to_string(), id);
        id
    }

    /// Bind `name` to a fresh variable in the current frame (`:=`).
    pub fn define(&mut self, name: &str, source: HintSource) -> VarId {
        let id = self.variable(name, source, Usage::Local);
        self.frames[self.current.index()]
            .names
            .insert(name.to_string(), id);
        id
    }

    /// The variable `name` already names in the current frame, or a fresh
    /// one bound there. Keeps one ID per name for repeated definitions.
    pub fn ensure_local(&mut self, name: &str, source: HintSource) -> VarId {
        match self.frames[self.current.index()].names.get(name) {
            Some(&id) if self.bindings[id.index()].hint().is_some() => id,
            _ => self.define(name, source),
        }
    }

    /// Resolve the target of `name = ...`: the variable already visible in
    /// the current host function, or a fresh one in the current frame.
    pub fn assign(&mut self, name: &str, source: HintSource) -> VarId {
        let mut existing = None;
        for frame in self.chain() {
            if let Some(&id) = frame.names.get(name) {
                existing = Some(id);
                break;
            }
            if frame.kind.is_host_function() {
                break;
            }
        }
        match existing {
            Some(id) if self.bindings[id.index()].hint().is_some() => id,
            _ => self.define(name, source),
        }
    }

    /// A lowering temporary; lives in no frame.
    pub fn fresh_immediate(&mut self) -> VarId {
        self.variable("_imd", HintSource::Local, Usage::Immediate)
    }

    /// A named variable that lives in no frame, so user code cannot see it.
    pub fn fresh_hidden(&mut self, name: &str, source: HintSource) -> VarId {
        self.variable(name, source, Usage::Local)
    }

    // Lookup

    /// Walk the frames outward, then the globals.
    pub fn lookup(&self, name: &str) -> Option<VarId> {
        self.chain()
            .find_map(|frame| frame.names.get(name).copied())
            .or_else(|| self.globals.get(name).copied())
    }

    pub fn binding(&self, id: VarId) -> Option<&Binding> {
        self.bindings.get(id.index())
    }

    pub fn lookup_binding(&self, name: &str) -> Option<(VarId, &Binding)> {
        let id = self.lookup(name)?;
        self.binding(id).map(|binding| (id, binding))
    }

    pub fn hint(&self, id: VarId) -> Option<&Hint> {
        self.binding(id).and_then(Binding::hint)
    }

    pub fn is_immediate(&self, id: VarId) -> bool {
        self.hint(id).is_some_and(|hint| hint.usage == Usage::Immediate)
    }

    /// Names bound directly in `frame`, in binding order.
    pub fn frame_names(&self, frame: FrameId) -> Vec<(&str, VarId)> {
        let mut names: Vec<(&str, VarId)> = self.frames[frame.index()]
            .names
            .iter()
            .map(|(name, &id)| (name.as_str(), id))
            .collect();
        names.sort_by_key(|&(_, id)| id);
        names
    }

    /// Number of IDs issued so far.
    pub fn id_count(&self) -> usize {
        self.bindings.len()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
