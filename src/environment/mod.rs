//! Scope frames.
//!
//! Every frame lives in one arena owned by [`Environment`] and is addressed by
//! a generational [`FrameRef`]. A frame is released by the construct that
//! created it once that construct finishes, unless a closure has captured it.
//! A captured frame whose construct has finished is detached: it stays until
//! [`Environment::collect`] finds that no live value refers to it any more.
//! Collection runs between top-level statements and whenever enough frames
//! have been detached since the last run.
mod native;

pub use native::{NativeRead, NativeWrite};

use crate::value::{Function, NativeFunction, Value};
use compact_str::{CompactString, ToCompactString};
use std::{
    collections::HashMap,
    sync::{Arc, Weak},
};

/// Detached frames tolerated before a collection runs.
const MIN_COLLECT_THRESHOLD: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRef {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// The outermost frame. It has no parent and is never freed.
    Global,
    /// The frame of one function activation.
    Call,
    /// A block, branch or loop iteration inside an activation.
    Block,
}

#[derive(Debug)]
struct Frame {
    values: HashMap<CompactString, Value>,
    parent: Option<FrameRef>,
    kind: FrameKind,
    pinned: bool,
    /// Set once the construct that opened the frame has finished.
    released: bool,
}

#[derive(Debug)]
pub struct Environment {
    slots: Vec<Option<Frame>>,
    generation: Vec<u32>,
    vacant: Vec<u32>,
    global: FrameRef,
    /// Every function that captured a frame and may still be alive.
    closures: Vec<Weak<Function>>,
    /// Pinned frames whose construct has finished.
    detached: Vec<FrameRef>,
    collect_threshold: usize,
}

impl Environment {
    pub fn new() -> Self {
        let mut globals = HashMap::new();

        // Inject native functions here
        let natives: [Arc<dyn NativeFunction>; 2] = [Arc::new(NativeRead), Arc::new(NativeWrite)];
        for native in natives {
            globals.insert(
                native.get_name().to_compact_string(),
                Value::NativeFunction(native),
            );
        }

        let mut environment = Self {
            slots: Vec::new(),
            generation: Vec::new(),
            vacant: Vec::new(),
            global: FrameRef {
                index: 0,
                generation: 0,
            },
            closures: Vec::new(),
            detached: Vec::new(),
            collect_threshold: MIN_COLLECT_THRESHOLD,
        };
        environment.global = environment.allocate(Frame {
            values: globals,
            parent: None,
            kind: FrameKind::Global,
            pinned: true,
            released: false,
        });
        environment
    }

    pub fn global(&self) -> FrameRef {
        self.global
    }

    /// Opens a child frame chained to `parent`.
    pub fn new_scope(&mut self, parent: FrameRef, kind: FrameKind) -> FrameRef {
        self.allocate(Frame {
            values: HashMap::new(),
            parent: Some(parent),
            kind,
            pinned: false,
            released: false,
        })
    }

    /// Frees a frame whose construct has finished, unless a closure captured it.
    ///
    /// A captured frame is detached instead and left to [`Environment::collect`].
    pub fn release(&mut self, frame: FrameRef) {
        let Some(scope) = self.get_mut(frame) else {
            return;
        };
        if !scope.pinned {
            self.free(frame.index as usize);
            return;
        }
        scope.released = true;
        self.detached.push(frame);
        if self.detached.len() >= self.collect_threshold {
            self.collect(&[]);
        }
    }

    /// Pins the closure frame of `function` and all of its ancestors so they
    /// outlive their constructs.
    pub fn capture(&mut self, function: &Arc<Function>) {
        self.closures.push(Arc::downgrade(function));
        let mut current = Some(function.closure);
        while let Some(handle) = current {
            let Some(scope) = self.get_mut(handle) else {
                break;
            };
            if scope.pinned {
                break;
            }
            scope.pinned = true;
            current = scope.parent;
        }
    }

    /// Looks `name` up in `frame` and then in each of its ancestors.
    pub fn access(&self, frame: FrameRef, name: &str) -> Option<Value> {
        let mut current = Some(frame);
        while let Some(handle) = current {
            let scope = self.get(handle)?;
            if let Some(value) = scope.values.get(name) {
                return Some(value.clone());
            }
            current = scope.parent;
        }
        None
    }

    /// Binds `name` in `frame` itself, shadowing any outer binding.
    pub fn declare(&mut self, frame: FrameRef, name: &str, value: Value) {
        if let Some(scope) = self.get_mut(frame) {
            scope.values.insert(name.to_compact_string(), value);
        }
    }

    /// Updates the nearest binding of `name` within the current activation.
    ///
    /// Block frames are searched outward up to and including the first call or
    /// global frame. If no binding is found there, the name is declared in `frame`.
    pub fn assign(&mut self, frame: FrameRef, name: &str, value: Value) {
        let mut current = Some(frame);
        while let Some(handle) = current {
            let Some(scope) = self.get_mut(handle) else {
                break;
            };
            if let Some(slot) = scope.values.get_mut(name) {
                *slot = value;
                return;
            }
            if scope.kind != FrameKind::Block {
                break;
            }
            current = scope.parent;
        }
        self.declare(frame, name, value);
    }

    /// Frees every detached frame that no live value can reach.
    ///
    /// The roots are the global frame, every frame whose construct is still
    /// running, `roots`, and any function held outside of the frames (an
    /// argument being passed or a value being returned). The latter are found
    /// by comparing a function's reference count with the number of frame
    /// bindings that hold it. Reachability follows parent links and the
    /// closures of function values.
    pub fn collect(&mut self, roots: &[Value]) -> usize {
        let mut bound: HashMap<*const Function, usize> = HashMap::new();
        for scope in self.slots.iter().flatten() {
            for value in scope.values.values() {
                if let Value::Function(function) = value {
                    *bound.entry(Arc::as_ptr(function)).or_default() += 1;
                }
            }
        }

        let mut pending = vec![self.global];
        pending.extend(roots.iter().filter_map(Value::get_closure));
        for (index, slot) in self.slots.iter().enumerate() {
            if slot.as_ref().is_some_and(|scope| !scope.released) {
                pending.push(FrameRef {
                    index: index as u32,
                    generation: self.generation[index],
                });
            }
        }
        self.closures.retain(|function| function.strong_count() > 0);
        for function in self.closures.iter() {
            let held_by_frames = bound.get(&function.as_ptr()).copied().unwrap_or(0);
            if function.strong_count() > held_by_frames {
                pending.extend(function.upgrade().map(|function| function.closure));
            }
        }

        let mut markers = vec![false; self.slots.len()];
        while let Some(handle) = pending.pop() {
            let Some(scope) = self.get(handle) else {
                continue;
            };
            let index = handle.index as usize;
            if markers[index] {
                continue;
            }
            markers[index] = true;
            pending.extend(scope.parent);
            pending.extend(scope.values.values().filter_map(Value::get_closure));
        }

        let mut reclaimed = 0;
        for handle in std::mem::take(&mut self.detached) {
            if !self.is_live(handle) {
                continue;
            }
            if markers[handle.index as usize] {
                self.detached.push(handle);
            } else {
                self.free(handle.index as usize);
                reclaimed += 1;
            }
        }
        self.collect_threshold = MIN_COLLECT_THRESHOLD.max(2 * self.detached.len());
        tracing::trace!(reclaimed, live = self.live_frames(), "collected frames");
        reclaimed
    }

    pub fn live_frames(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_live(&self, frame: FrameRef) -> bool {
        self.get(frame).is_some()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    fn allocate(&mut self, frame: Frame) -> FrameRef {
        match self.vacant.pop() {
            Some(index) => {
                self.slots[index as usize] = Some(frame);
                FrameRef {
                    index,
                    generation: self.generation[index as usize],
                }
            }
            None => {
                self.slots.push(Some(frame));
                self.generation.push(0);
                FrameRef {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        }
    }

    fn free(&mut self, index: usize) {
        self.slots[index] = None;
        // Outstanding handles to this slot become stale.
        self.generation[index] = self.generation[index].wrapping_add(1);
        self.vacant.push(index as u32);
    }

    fn get(&self, handle: FrameRef) -> Option<&Frame> {
        let index = handle.index as usize;
        if self.generation.get(index) != Some(&handle.generation) {
            return None;
        }
        self.slots.get(index)?.as_ref()
    }

    fn get_mut(&mut self, handle: FrameRef) -> Option<&mut Frame> {
        let index = handle.index as usize;
        if self.generation.get(index) != Some(&handle.generation) {
            return None;
        }
        self.slots.get_mut(index)?.as_mut()
    }
}
