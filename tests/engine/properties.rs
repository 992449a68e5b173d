//! Property tests for the executor
//!
//! Random element trees are rendered as markup and run through models whose
//! expected output can be computed directly from the tree.

use proptest::prelude::*;

use tagflow::engine::ModelBuilder;

use crate::support::{Log, compile, run, starts};

#[derive(Clone, Debug)]
struct Tree {
    name: &'static str,
    children: Vec<Tree>,
}

impl Tree {
    fn render(&self, out: &mut String) {
        if self.children.is_empty() {
            out.push_str(&format!("<{}/>", self.name));
            return;
        }
        out.push_str(&format!("<{}>", self.name));
        for child in &self.children {
            child.render(out);
        }
        out.push_str(&format!("</{}>", self.name));
    }

    fn preorder<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(self.name);
        for child in &self.children {
            child.preorder(out);
        }
    }

    /// Counts elements named `child` whose parent is named `parent`.
    fn count_children(&self, parent: &str, child: &str) -> usize {
        self.children
            .iter()
            .map(|c| {
                usize::from(self.name == parent && c.name == child) + c.count_children(parent, child)
            })
            .sum()
    }
}

fn name() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("a"), Just("b"), Just("c")]
}

fn tree() -> impl Strategy<Value = Tree> {
    let leaf = name().prop_map(|name| Tree {
        name,
        children: Vec::new(),
    });
    leaf.prop_recursive(4, 32, 4, |inner| {
        (name(), prop::collection::vec(inner, 0..4))
            .prop_map(|(name, children)| Tree { name, children })
    })
}

fn xml(tree: &Tree) -> String {
    let mut out = String::new();
    tree.render(&mut out);
    out
}

fn names(log: &Log) -> Vec<&str> {
    log.iter().map(|entry| &entry[2..]).collect()
}

proptest! {
    #[test]
    fn descendant_sees_every_element_in_order(tree in tree()) {
        let model = compile(|b| {
            b.descendant().attach(starts("h"));
        });
        let log = run(&model, &xml(&tree)).unwrap();
        let mut expected = Vec::new();
        tree.preorder(&mut expected);
        prop_assert_eq!(names(&log), expected);
    }

    #[test]
    fn named_descendant_counts_every_occurrence(tree in tree()) {
        let model = compile(|b| {
            b.descendant_named("a").attach(starts("h"));
        });
        let log = run(&model, &xml(&tree)).unwrap();
        let mut all = Vec::new();
        tree.preorder(&mut all);
        prop_assert_eq!(log.len(), all.iter().filter(|n| **n == "a").count());
    }

    #[test]
    fn descendant_then_element_sees_children_of_named_parents(tree in tree()) {
        let model = compile(|b| {
            b.descendant_named("b").element("c").attach(starts("h"));
        });
        let log = run(&model, &xml(&tree)).unwrap();
        prop_assert_eq!(log.len(), tree.count_children("b", "c"));
    }

    #[test]
    fn redeclaring_a_path_reuses_its_state(path in prop::collection::vec(name(), 1..6)) {
        let mut builder = ModelBuilder::<Log>::new();
        let first = builder.elements(path.clone()).build_state();
        let second = builder.elements(path.clone()).build_state();
        prop_assert_eq!(first, second);
        let model = builder.build().unwrap();
        // sink, root, one state per step
        prop_assert_eq!(model.state_count(), path.len() + 2);
    }
}
