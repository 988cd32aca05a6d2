//! Hierarchy trait + in-memory implementation
//!
//! Dispatch follows class-file rules: lookup walks the superclass chain from
//! the concrete receiver type; interface/abstract targets never dispatch
//! directly. Subtyping covers both extends and implements edges.

use super::types::{ClassInfo, MethodInfo};
use crate::shared::models::{MethodId, Selector, TypeId, TypeName};
use rustc_hash::{FxHashMap, FxHashSet};

/// Type and method resolution consumed by the engine.
///
/// Implementations must be pure: repeated queries with equal arguments
/// return equal results for the lifetime of one construction.
pub trait ClassHierarchy {
    /// Resolve a type name to its interned handle
    fn type_id(&self, name: &TypeName) -> Option<TypeId>;

    fn class(&self, ty: TypeId) -> &ClassInfo;

    fn method(&self, method: MethodId) -> &MethodInfo;

    /// Method lookup along the superclass chain starting at `ty`
    fn lookup_method(&self, ty: TypeId, selector: &Selector) -> Option<MethodId>;

    /// `sub <: sup` over extends and implements edges (reflexive)
    fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool;

    /// Concrete types assignable to `ty`, including `ty` itself if concrete
    fn concrete_subtypes(&self, ty: TypeId) -> Vec<TypeId>;

    /// The single dispatch target for a concrete receiver type, if any
    fn dispatch_target(&self, selector: &Selector, receiver: TypeId) -> Option<MethodId> {
        self.lookup_method(receiver, selector)
    }

    /// All targets a virtual call declared against `declared` could reach
    fn possible_targets(&self, declared: TypeId, selector: &Selector) -> Vec<MethodId> {
        let mut out = Vec::new();
        for ty in self.concrete_subtypes(declared) {
            if let Some(m) = self.dispatch_target(selector, ty) {
                if !out.contains(&m) {
                    out.push(m);
                }
            }
        }
        out
    }
}

/// Hierarchy assembled in memory by `HierarchyBuilder`
#[derive(Debug, Default)]
pub struct InMemoryHierarchy {
    classes: Vec<ClassInfo>,
    methods: Vec<MethodInfo>,
    by_name: FxHashMap<TypeName, TypeId>,
    declared: FxHashMap<(TypeId, Selector), MethodId>,

    /// Direct subtype edges (extends + implements), child lists per type
    children: Vec<Vec<TypeId>>,
}

impl InMemoryHierarchy {
    fn supers_of(&self, ty: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        let info = &self.classes[ty.index()];
        info.superclass.into_iter().chain(info.interfaces.iter().copied())
    }
}

impl ClassHierarchy for InMemoryHierarchy {
    fn type_id(&self, name: &TypeName) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    fn class(&self, ty: TypeId) -> &ClassInfo {
        &self.classes[ty.index()]
    }

    fn method(&self, method: MethodId) -> &MethodInfo {
        &self.methods[method.index()]
    }

    fn lookup_method(&self, ty: TypeId, selector: &Selector) -> Option<MethodId> {
        let mut cursor = Some(ty);
        while let Some(t) = cursor {
            if let Some(&m) = self.declared.get(&(t, selector.clone())) {
                return Some(m);
            }
            cursor = self.classes[t.index()].superclass;
        }
        None
    }

    fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        if sub == sup {
            return true;
        }
        // DFS over extends + implements edges
        let mut seen = FxHashSet::default();
        let mut stack = vec![sub];
        while let Some(t) = stack.pop() {
            if t == sup {
                return true;
            }
            if seen.insert(t) {
                stack.extend(self.supers_of(t));
            }
        }
        false
    }

    fn concrete_subtypes(&self, ty: TypeId) -> Vec<TypeId> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        let mut stack = vec![ty];
        while let Some(t) = stack.pop() {
            if !seen.insert(t) {
                continue;
            }
            if self.classes[t.index()].is_concrete() {
                out.push(t);
            }
            stack.extend(self.children[t.index()].iter().copied());
        }
        out.sort_unstable();
        out
    }
}

/// Programmatic hierarchy assembly for fixtures and drivers
#[derive(Debug, Default)]
pub struct HierarchyBuilder {
    classes: Vec<ClassInfo>,
    methods: Vec<MethodInfo>,
    by_name: FxHashMap<TypeName, TypeId>,
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(
        &mut self,
        name: impl Into<TypeName>,
        superclass: Option<TypeId>,
        interfaces: Vec<TypeId>,
    ) -> TypeId {
        self.insert_class(name, superclass, interfaces, false, false)
    }

    pub fn add_interface(&mut self, name: impl Into<TypeName>) -> TypeId {
        self.insert_class(name, None, Vec::new(), true, true)
    }

    pub fn add_abstract_class(
        &mut self,
        name: impl Into<TypeName>,
        superclass: Option<TypeId>,
        interfaces: Vec<TypeId>,
    ) -> TypeId {
        self.insert_class(name, superclass, interfaces, false, true)
    }

    fn insert_class(
        &mut self,
        name: impl Into<TypeName>,
        superclass: Option<TypeId>,
        interfaces: Vec<TypeId>,
        is_interface: bool,
        is_abstract: bool,
    ) -> TypeId {
        let name = name.into();
        debug_assert!(
            !self.by_name.contains_key(&name),
            "duplicate class {name}"
        );
        let id = TypeId(self.classes.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.classes.push(ClassInfo {
            name,
            superclass,
            interfaces,
            is_interface,
            is_abstract,
            methods: Vec::new(),
        });
        id
    }

    pub fn add_method(
        &mut self,
        declaring: TypeId,
        selector: Selector,
        is_static: bool,
        param_types: Vec<TypeName>,
    ) -> MethodId {
        self.insert_method(declaring, selector, is_static, false, param_types)
    }

    pub fn add_abstract_method(
        &mut self,
        declaring: TypeId,
        selector: Selector,
        param_types: Vec<TypeName>,
    ) -> MethodId {
        self.insert_method(declaring, selector, false, true, param_types)
    }

    fn insert_method(
        &mut self,
        declaring: TypeId,
        selector: Selector,
        is_static: bool,
        is_abstract: bool,
        param_types: Vec<TypeName>,
    ) -> MethodId {
        let id = MethodId(self.methods.len() as u32);
        self.methods.push(MethodInfo {
            declaring,
            selector,
            is_static,
            is_abstract,
            is_public: true,
            param_types,
        });
        self.classes[declaring.index()].methods.push(id);
        id
    }

    pub fn build(self) -> InMemoryHierarchy {
        let mut children: Vec<Vec<TypeId>> = vec![Vec::new(); self.classes.len()];
        for (idx, class) in self.classes.iter().enumerate() {
            let child = TypeId(idx as u32);
            if let Some(sup) = class.superclass {
                children[sup.index()].push(child);
            }
            for &iface in &class.interfaces {
                children[iface.index()].push(child);
            }
        }

        let mut declared = FxHashMap::default();
        for (idx, method) in self.methods.iter().enumerate() {
            declared.insert(
                (method.declaring, method.selector.clone()),
                MethodId(idx as u32),
            );
        }

        InMemoryHierarchy {
            classes: self.classes,
            methods: self.methods,
            by_name: self.by_name,
            declared,
            children,
        }
    }
}
