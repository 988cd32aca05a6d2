//! Shared program fixtures
//!
//! Hand-assembled scopes standing in for classfile input: a hierarchy, a
//! method store, and an entrypoint list per scenario.

use callgraph_core::{
    AnalysisOptions, BuildResult, CallGraphBuilder, CancelToken, ClassHierarchy, DispatchKind,
    FieldRef, HierarchyBuilder, InMemoryHierarchy, IrBuilder, LifecycleRegistry, MethodId,
    MethodStore, NodeId, Selector, StartInfo, TypeId,
};
use std::collections::HashMap;
use std::sync::Arc;

pub struct Fixture {
    pub hierarchy: Arc<InMemoryHierarchy>,
    pub store: Arc<MethodStore>,
    pub entrypoints: Vec<MethodId>,
    pub methods: HashMap<&'static str, MethodId>,
    pub types: HashMap<&'static str, TypeId>,
    pub lifecycle: Option<LifecycleRegistry>,
}

impl Fixture {
    pub fn build(self, options: AnalysisOptions) -> BuildResult {
        self.try_build(options).expect("construction failed")
    }

    pub fn try_build(self, options: AnalysisOptions) -> callgraph_core::Result<BuildResult> {
        let hierarchy: Arc<dyn ClassHierarchy> = self.hierarchy.clone();
        let mut builder = CallGraphBuilder::new(hierarchy, self.store.clone(), options);
        if let Some(lifecycle) = self.lifecycle {
            builder = builder.with_lifecycle(lifecycle);
        }
        builder.build(&self.entrypoints, &CancelToken::new())
    }

    pub fn method(&self, name: &str) -> MethodId {
        self.methods[name]
    }
}

/// Scenario A: `main` statically calls one non-overridden method
///
/// ```text
/// class Main {
///     static void main() { greet(); }
///     static void greet() {}
/// }
/// ```
pub fn hello_world() -> Fixture {
    let mut hb = HierarchyBuilder::new();
    let object = hb.add_class("Object", None, vec![]);
    let main_class = hb.add_class("Main", Some(object), vec![]);
    let main = hb.add_method(main_class, Selector::nullary("main"), true, vec![]);
    let greet = hb.add_method(main_class, Selector::nullary("greet"), true, vec![]);

    let mut store = MethodStore::new();
    let mut b = IrBuilder::new(main, 0);
    b.invoke(
        "Main",
        Selector::nullary("greet"),
        DispatchKind::Static,
        None,
        vec![],
        None,
    );
    b.ret(None);
    store.insert(main, b.finish());

    let mut b = IrBuilder::new(greet, 0);
    b.ret(None);
    store.insert(greet, b.finish());

    Fixture {
        hierarchy: Arc::new(hb.build()),
        store: Arc::new(store),
        entrypoints: vec![main],
        methods: HashMap::from([("main", main), ("greet", greet)]),
        types: HashMap::from([("Object", object), ("Main", main_class)]),
        lifecycle: None,
    }
}

/// Scenario B: one interface, two implementations, receivers merged through
/// an identity helper
///
/// ```text
/// interface Speaker { void speak(); }
/// class A implements Speaker { void speak() {} }
/// class B implements Speaker { void speak() {} }
/// class Main {
///     static void main() {
///         Speaker ha = wrap(new A());
///         Speaker hb = wrap(new B());
///         ha.speak();
///     }
///     static Speaker wrap(Speaker s) { return s; }
/// }
/// ```
pub fn two_impls() -> Fixture {
    let wrap_sel = Selector::new("wrap", "(LSpeaker;)LSpeaker;");
    let speak_sel = Selector::nullary("speak");

    let mut hb = HierarchyBuilder::new();
    let object = hb.add_class("Object", None, vec![]);
    let speaker = hb.add_interface("Speaker");
    hb.add_abstract_method(speaker, speak_sel.clone(), vec![]);
    let a = hb.add_class("A", Some(object), vec![speaker]);
    let b_ty = hb.add_class("B", Some(object), vec![speaker]);
    let a_speak = hb.add_method(a, speak_sel.clone(), false, vec![]);
    let b_speak = hb.add_method(b_ty, speak_sel.clone(), false, vec![]);
    let main_class = hb.add_class("Main", Some(object), vec![]);
    let main = hb.add_method(main_class, Selector::nullary("main"), true, vec![]);
    let wrap = hb.add_method(main_class, wrap_sel.clone(), true, vec!["Speaker".into()]);

    let mut store = MethodStore::new();

    let mut b = IrBuilder::new(main, 0);
    let va = b.fresh_var();
    let vb = b.fresh_var();
    let ha = b.fresh_var();
    let hb_var = b.fresh_var();
    b.new_instance(va, "A");
    b.new_instance(vb, "B");
    b.invoke(
        "Main",
        wrap_sel.clone(),
        DispatchKind::Static,
        None,
        vec![va],
        Some(ha),
    );
    b.invoke(
        "Main",
        wrap_sel.clone(),
        DispatchKind::Static,
        None,
        vec![vb],
        Some(hb_var),
    );
    b.invoke(
        "Speaker",
        speak_sel.clone(),
        DispatchKind::Interface,
        Some(ha),
        vec![],
        None,
    );
    b.ret(None);
    store.insert(main, b.finish());

    let mut b = IrBuilder::new(wrap, 1);
    b.ret(Some(b.param(0)));
    store.insert(wrap, b.finish());

    for speak in [a_speak, b_speak] {
        let mut b = IrBuilder::new(speak, 1);
        b.ret(None);
        store.insert(speak, b.finish());
    }

    Fixture {
        hierarchy: Arc::new(hb.build()),
        store: Arc::new(store),
        entrypoints: vec![main],
        methods: HashMap::from([
            ("main", main),
            ("wrap", wrap),
            ("A.speak", a_speak),
            ("B.speak", b_speak),
        ]),
        types: HashMap::from([("Speaker", speaker), ("A", a), ("B", b_ty)]),
        lifecycle: None,
    }
}

/// Heterogeneous containers: two boxes, two element types
///
/// ```text
/// class Box { Object value;
///     void put(Object v) { this.value = v; }
///     Object get() { return this.value; } }
/// class Main {
///     static void main() {
///         Box b1 = new Box(); // elements declared A
///         Box b2 = new Box(); // elements declared B
///         b1.put(new A()); b2.put(new B());
///         Object x = b1.get();
///     }
/// }
/// ```
pub fn containers() -> Fixture {
    let put_sel = Selector::new("put", "(LObject;)V");
    let get_sel = Selector::new("get", "()LObject;");
    let value_field = FieldRef::new("Box", "value");

    let mut hb = HierarchyBuilder::new();
    let object = hb.add_class("Object", None, vec![]);
    let a = hb.add_class("A", Some(object), vec![]);
    let b_ty = hb.add_class("B", Some(object), vec![]);
    let box_ty = hb.add_class("Box", Some(object), vec![]);
    let put = hb.add_method(box_ty, put_sel.clone(), false, vec!["Object".into()]);
    let get = hb.add_method(box_ty, get_sel.clone(), false, vec![]);
    let main_class = hb.add_class("Main", Some(object), vec![]);
    let main = hb.add_method(main_class, Selector::nullary("main"), true, vec![]);

    let mut store = MethodStore::new();

    let mut b = IrBuilder::new(main, 0);
    let b1 = b.fresh_var();
    let b2 = b.fresh_var();
    let va = b.fresh_var();
    let vb = b.fresh_var();
    let x = b.fresh_var();
    b.new_container(b1, "Box", "A");
    b.new_container(b2, "Box", "B");
    b.new_instance(va, "A");
    b.new_instance(vb, "B");
    b.invoke("Box", put_sel.clone(), DispatchKind::Virtual, Some(b1), vec![va], None);
    b.invoke("Box", put_sel.clone(), DispatchKind::Virtual, Some(b2), vec![vb], None);
    b.invoke("Box", get_sel.clone(), DispatchKind::Virtual, Some(b1), vec![], Some(x));
    b.ret(None);
    store.insert(main, b.finish());

    let mut b = IrBuilder::new(put, 2);
    b.put_field(b.param(0), value_field.clone(), b.param(1));
    b.ret(None);
    store.insert(put, b.finish());

    let mut b = IrBuilder::new(get, 1);
    let tmp = b.fresh_var();
    b.get_field(tmp, b.param(0), value_field.clone());
    b.ret(Some(tmp));
    store.insert(get, b.finish());

    Fixture {
        hierarchy: Arc::new(hb.build()),
        store: Arc::new(store),
        entrypoints: vec![main],
        methods: HashMap::from([("main", main), ("put", put), ("get", get)]),
        types: HashMap::from([("Box", box_ty), ("A", a), ("B", b_ty)]),
        lifecycle: None,
    }
}

/// Scenario C: a launcher whose component target is ambiguous
///
/// `Framework.start` may hand control to either component; the lifecycle
/// interpreter must pick one deterministically and diagnose the ambiguity.
pub fn lifecycle(ambiguous: bool) -> Fixture {
    let start_sel = Selector::new("start", "(LRequest;)V");
    let on_create = Selector::nullary("onCreate");
    let on_start = Selector::nullary("onStart");

    let mut hb = HierarchyBuilder::new();
    let object = hb.add_class("Object", None, vec![]);
    let request = hb.add_class("Request", Some(object), vec![]);
    let alpha = hb.add_class("AlphaComponent", Some(object), vec![]);
    let beta = hb.add_class("BetaComponent", Some(object), vec![]);
    let alpha_create = hb.add_method(alpha, on_create.clone(), false, vec![]);
    let alpha_start = hb.add_method(alpha, on_start.clone(), false, vec![]);
    let beta_create = hb.add_method(beta, on_create.clone(), false, vec![]);
    let beta_start = hb.add_method(beta, on_start.clone(), false, vec![]);
    let framework = hb.add_class("Framework", Some(object), vec![]);
    let start = hb.add_method(framework, start_sel.clone(), true, vec!["Request".into()]);
    let main_class = hb.add_class("Main", Some(object), vec![]);
    let main = hb.add_method(main_class, Selector::nullary("main"), true, vec![]);

    let mut store = MethodStore::new();
    let mut b = IrBuilder::new(main, 0);
    let r = b.fresh_var();
    b.new_instance(r, "Request");
    b.invoke(
        "Framework",
        start_sel.clone(),
        DispatchKind::Static,
        None,
        vec![r],
        None,
    );
    b.ret(None);
    store.insert(main, b.finish());

    // lifecycle phase bodies are ordinary stored methods
    for m in [alpha_create, alpha_start, beta_create, beta_start] {
        let mut b = IrBuilder::new(m, 1);
        b.ret(None);
        store.insert(m, b.finish());
    }
    // `start` itself is NOT stored: the interpreter synthesizes it

    let mut registry = LifecycleRegistry::new();
    registry.register_starter(
        start_sel,
        StartInfo {
            possible: if ambiguous {
                vec![beta, alpha]
            } else {
                vec![alpha]
            },
            phases: vec![on_create, on_start],
        },
    );

    Fixture {
        hierarchy: Arc::new(hb.build()),
        store: Arc::new(store),
        entrypoints: vec![main],
        methods: HashMap::from([
            ("main", main),
            ("start", start),
            ("Alpha.onCreate", alpha_create),
            ("Alpha.onStart", alpha_start),
            ("Beta.onCreate", beta_create),
            ("Beta.onStart", beta_start),
        ]),
        types: HashMap::from([
            ("AlphaComponent", alpha),
            ("BetaComponent", beta),
            ("Request", request),
        ]),
        lifecycle: Some(registry),
    }
}

/// Mutual recursion: `main → ping → pong → ping`
pub fn recursion() -> Fixture {
    let mut hb = HierarchyBuilder::new();
    let object = hb.add_class("Object", None, vec![]);
    let main_class = hb.add_class("Main", Some(object), vec![]);
    let main = hb.add_method(main_class, Selector::nullary("main"), true, vec![]);
    let ping = hb.add_method(main_class, Selector::nullary("ping"), true, vec![]);
    let pong = hb.add_method(main_class, Selector::nullary("pong"), true, vec![]);

    let mut store = MethodStore::new();
    for (method, callee) in [(main, "ping"), (ping, "pong"), (pong, "ping")] {
        let mut b = IrBuilder::new(method, 0);
        b.invoke(
            "Main",
            Selector::nullary(callee),
            DispatchKind::Static,
            None,
            vec![],
            None,
        );
        b.ret(None);
        store.insert(method, b.finish());
    }

    Fixture {
        hierarchy: Arc::new(hb.build()),
        store: Arc::new(store),
        entrypoints: vec![main],
        methods: HashMap::from([("main", main), ("ping", ping), ("pong", pong)]),
        types: HashMap::new(),
        lifecycle: None,
    }
}

/// Entrypoint with an interface-typed parameter: the root seeds one
/// argument instance per concrete implementor
pub fn interface_entry() -> Fixture {
    let speak_sel = Selector::nullary("speak");
    let handle_sel = Selector::new("handle", "(LSpeaker;)V");

    let mut hb = HierarchyBuilder::new();
    let object = hb.add_class("Object", None, vec![]);
    let speaker = hb.add_interface("Speaker");
    hb.add_abstract_method(speaker, speak_sel.clone(), vec![]);
    let a = hb.add_class("A", Some(object), vec![speaker]);
    let b_ty = hb.add_class("B", Some(object), vec![speaker]);
    let a_speak = hb.add_method(a, speak_sel.clone(), false, vec![]);
    let b_speak = hb.add_method(b_ty, speak_sel.clone(), false, vec![]);
    let main_class = hb.add_class("Main", Some(object), vec![]);
    let handle = hb.add_method(main_class, handle_sel, true, vec!["Speaker".into()]);

    let mut store = MethodStore::new();
    let mut b = IrBuilder::new(handle, 1);
    b.invoke(
        "Speaker",
        speak_sel,
        DispatchKind::Interface,
        Some(b.param(0)),
        vec![],
        None,
    );
    b.ret(None);
    store.insert(handle, b.finish());

    for speak in [a_speak, b_speak] {
        let mut b = IrBuilder::new(speak, 1);
        b.ret(None);
        store.insert(speak, b.finish());
    }

    Fixture {
        hierarchy: Arc::new(hb.build()),
        store: Arc::new(store),
        entrypoints: vec![handle],
        methods: HashMap::from([
            ("handle", handle),
            ("A.speak", a_speak),
            ("B.speak", b_speak),
        ]),
        types: HashMap::from([("Speaker", speaker), ("A", a), ("B", b_ty)]),
        lifecycle: None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Assertion helpers
// ═══════════════════════════════════════════════════════════════════════════

/// Nodes carrying the given method, at any context
pub fn nodes_of(result: &BuildResult, method: MethodId) -> Vec<NodeId> {
    result
        .call_graph
        .iter()
        .filter(|(_, n)| n.method() == method)
        .map(|(id, _)| id)
        .collect()
}

/// Every edge (and node) of the more precise squashed graph must appear in
/// the less precise one
pub fn assert_squash_subset(more_precise: &BuildResult, less_precise: &BuildResult) {
    let sub = more_precise.call_graph.squash();
    let sup = less_precise.call_graph.squash();
    for n in sub.nodes() {
        assert!(
            sup.contains_node(n),
            "method {n} reachable only in the more precise graph"
        );
    }
    for (from, to, _) in sub.all_edges() {
        assert!(
            sup.contains_edge(from, to),
            "edge {from} -> {to} present only in the more precise graph"
        );
    }
}

/// Stable identity signature for idempotence comparisons
pub fn graph_signature(result: &BuildResult) -> Vec<String> {
    let mut signature: Vec<String> = result
        .call_graph
        .iter()
        .flat_map(|(_, node)| {
            let from = format!("{}@{}", node.method(), node.context());
            node.sites().flat_map(move |(pc, targets)| {
                let from = from.clone();
                let graph = &result.call_graph;
                targets.iter().map(move |&t| {
                    let callee = graph.node(t);
                    format!("{from} --{pc}--> {}@{}", callee.method(), callee.context())
                })
            })
        })
        .collect();
    signature.sort();
    signature
}
