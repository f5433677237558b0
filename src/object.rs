/*
 * Kernel Object Header & Registry
 *
 * spec.md §1 puts the generic kernel-object registry (naming,
 * enumeration, allocation) out of scope as an external collaborator.
 * What every thread and sync object actually embeds, per spec.md §3, is
 * a small typed header: object class, fixed-capacity name, and whether
 * the object's memory is caller-owned (static) or kernel-owned (heap).
 *
 * The registry itself is reduced, in this safe reimplementation, to
 * name -> tag lookup: the original C registry's generic allocation
 * bookkeeping is replaced by Rust ownership (a statically-initialized
 * object is a plain value the caller owns; a heap-created one is a
 * `Box` the thread/object table owns and frees on delete). A minimal
 * concrete `Registry` is provided rather than a trait — there is only
 * one sensible way to do name lookup over a small fixed set of object
 * kinds, so introducing a seam here would be speculative.
 */

use alloc::collections::BTreeMap;
use heapless::String as FixedString;

/// Maximum object name length, matching the teacher's fixed-width
/// name fields (`heapless::String` rather than a heap `String` — names
/// are short and looked up from interrupt context).
pub const OBJECT_NAME_CAP: usize = 16;

pub type ObjectName = FixedString<OBJECT_NAME_CAP>;

/// Kind of kernel object. Used both by the object header and by the
/// registry to disambiguate same-named objects of different kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ObjectClass {
    Thread,
    Semaphore,
    Mutex,
    EventFlags,
    Mailbox,
    MessageQueue,
}

/// Header embedded in every thread and every synchronization object.
#[derive(Debug, Clone)]
pub struct ObjectHeader {
    pub class: ObjectClass,
    pub name: ObjectName,
    /// `true` for statically initialized objects (`init`/`detach`),
    /// `false` for heap-created ones (`create`/`delete`).
    pub is_static: bool,
}

impl ObjectHeader {
    pub fn new(class: ObjectClass, name: &str, is_static: bool) -> Self {
        let mut fixed = ObjectName::new();
        // Truncate rather than fail: a name that doesn't fit is a
        // caller mistake, not a runtime condition worth propagating.
        let _ = fixed.push_str(&name[..name.len().min(OBJECT_NAME_CAP)]);
        Self {
            class,
            name: fixed,
            is_static,
        }
    }
}

/// Opaque tag a registry entry resolves to. The registry does not know
/// what concrete type a tag refers to — callers that `find()` an object
/// already know, from its class, which table to look it up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObjectTag(pub u64);

/// Name -> tag lookup table for `find()`/enumeration.
#[derive(Default)]
pub struct Registry {
    entries: BTreeMap<(ObjectClass, ObjectName), ObjectTag>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, class: ObjectClass, name: ObjectName, tag: ObjectTag) {
        self.entries.insert((class, name), tag);
    }

    pub fn remove(&mut self, class: ObjectClass, name: &ObjectName) {
        self.entries.remove(&(class, name.clone()));
    }

    pub fn find(&self, class: ObjectClass, name: &str) -> Option<ObjectTag> {
        let mut fixed = ObjectName::new();
        let _ = fixed.push_str(&name[..name.len().min(OBJECT_NAME_CAP)]);
        self.entries.get(&(class, fixed)).copied()
    }
}
