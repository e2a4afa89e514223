//! Minimal arena tree used by the unit tests.

use crate::options::VOID_ELEMENTS;
use crate::tree::{HostTree, NodeKind};

#[derive(Debug, Clone)]
enum Data {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Slot {
    data: Data,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Node 0 is an element named `root`.
#[derive(Debug, Clone)]
pub(crate) struct TestTree {
    slots: Vec<Slot>,
}

impl TestTree {
    pub(crate) fn new() -> Self {
        let mut tree = Self { slots: Vec::new() };
        tree.create_element("root");
        tree
    }

    pub(crate) fn root(&self) -> usize {
        0
    }

    /// Number of nodes ever allocated, attached or not.
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// `depth` elements named `tag`, each the only child of the previous one,
    /// below the root. The innermost holds the text `x`.
    pub(crate) fn nested(tag: &str, depth: usize) -> Self {
        let mut tree = Self::new();
        let mut parent = tree.root();
        for _ in 0..depth {
            let node = tree.create_element(tag);
            tree.append_child(parent, node);
            parent = node;
        }
        let text = tree.create_text("x");
        tree.append_child(parent, text);
        tree
    }

    /// Parse a tiny HTML subset: tags with quoted or bare attributes and text.
    pub(crate) fn parse(html: &str) -> Self {
        let mut tree = Self::new();
        let mut open = vec![0];
        let mut rest = html;

        while !rest.is_empty() {
            let parent = *open.last().unwrap();
            if let Some(after) = rest.strip_prefix("</") {
                let end = after.find('>').unwrap();
                open.pop();
                rest = &after[end + 1..];
            } else if let Some(after) = rest.strip_prefix('<') {
                let end = after.find('>').unwrap();
                let (tag, attributes) = parse_tag(&after[..end]);
                let node = tree.create_element(&tag);
                if let Data::Element { attributes: slot, .. } = &mut tree.slots[node].data {
                    *slot = attributes;
                }
                tree.append_child(parent, node);
                if !VOID_ELEMENTS.contains(&tag.to_lowercase().as_str()) {
                    open.push(node);
                }
                rest = &after[end + 1..];
            } else {
                let end = rest.find('<').unwrap_or(rest.len());
                let node = tree.create_text(&rest[..end]);
                tree.append_child(parent, node);
                rest = &rest[end..];
            }
        }
        tree
    }

    pub(crate) fn create_text(&mut self, text: &str) -> usize {
        self.alloc(Data::Text(text.to_string()))
    }

    pub(crate) fn set_attribute(&mut self, node: usize, name: &str, value: &str) {
        if let Data::Element { attributes, .. } = &mut self.slots[node].data {
            match attributes.iter_mut().find(|(n, _)| n == name) {
                Some((_, v)) => *v = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    /// Serialize the children of the root.
    pub(crate) fn render(&self) -> String {
        let mut out = String::new();
        for &child in &self.slots[0].children {
            self.render_node(child, &mut out);
        }
        out
    }

    fn render_node(&self, node: usize, out: &mut String) {
        let slot = &self.slots[node];
        match &slot.data {
            Data::Text(text) => out.push_str(text),
            Data::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push_str(&format!(" {}=\"{}\"", name, value));
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.to_lowercase().as_str()) && slot.children.is_empty() {
                    return;
                }
                for &child in &slot.children {
                    self.render_node(child, out);
                }
                out.push_str(&format!("</{}>", tag));
            }
        }
    }

    fn alloc(&mut self, data: Data) -> usize {
        self.slots.push(Slot {
            data,
            parent: None,
            children: Vec::new(),
        });
        self.slots.len() - 1
    }
}

fn parse_tag(source: &str) -> (String, Vec<(String, String)>) {
    let source = source.trim_end_matches('/').trim();
    let (tag, mut rest) = source.split_once(' ').unwrap_or((source, ""));
    let mut attributes = Vec::new();

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let name_end = rest.find(|c: char| c == '=' || c == ' ').unwrap_or(rest.len());
        let name = rest[..name_end].to_string();
        rest = &rest[name_end..];
        if let Some(after) = rest.strip_prefix("=\"") {
            let end = after.find('"').unwrap();
            attributes.push((name, after[..end].to_string()));
            rest = &after[end + 1..];
        } else {
            attributes.push((name, String::new()));
        }
    }
    (tag.to_string(), attributes)
}

impl HostTree for TestTree {
    type Id = usize;

    fn contains(&self, node: usize) -> bool {
        node < self.slots.len()
    }

    fn kind(&self, node: usize) -> NodeKind {
        match self.slots[node].data {
            Data::Element { .. } => NodeKind::Element,
            Data::Text(_) => NodeKind::Text,
        }
    }

    fn tag_name(&self, node: usize) -> Option<String> {
        match &self.slots[node].data {
            Data::Element { tag, .. } => Some(tag.clone()),
            Data::Text(_) => None,
        }
    }

    fn text(&self, node: usize) -> Option<String> {
        match &self.slots[node].data {
            Data::Text(text) => Some(text.clone()),
            Data::Element { .. } => None,
        }
    }

    fn parent(&self, node: usize) -> Option<usize> {
        self.slots[node].parent
    }

    fn children(&self, node: usize) -> Vec<usize> {
        self.slots[node].children.clone()
    }

    fn create_element(&mut self, tag: &str) -> usize {
        self.alloc(Data::Element {
            tag: tag.to_string(),
            attributes: Vec::new(),
        })
    }

    fn append_child(&mut self, parent: usize, child: usize) {
        self.detach(child);
        self.slots[parent].children.push(child);
        self.slots[child].parent = Some(parent);
    }

    fn insert_before(&mut self, parent: usize, child: usize, reference: usize) {
        self.detach(child);
        let position = self.slots[parent]
            .children
            .iter()
            .position(|c| *c == reference)
            .unwrap_or(self.slots[parent].children.len());
        self.slots[parent].children.insert(position, child);
        self.slots[child].parent = Some(parent);
    }

    fn detach(&mut self, node: usize) {
        if let Some(parent) = self.slots[node].parent.take() {
            self.slots[parent].children.retain(|c| *c != node);
        }
    }

    fn attribute_names(&self, node: usize) -> Vec<String> {
        match &self.slots[node].data {
            Data::Element { attributes, .. } => attributes.iter().map(|(n, _)| n.clone()).collect(),
            Data::Text(_) => Vec::new(),
        }
    }

    fn remove_attribute(&mut self, node: usize, name: &str) {
        if let Data::Element { attributes, .. } = &mut self.slots[node].data {
            attributes.retain(|(n, _)| n != name);
        }
    }

    fn class_tokens(&self, node: usize) -> Vec<String> {
        match &self.slots[node].data {
            Data::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n == "class")
                .map(|(_, v)| v.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            Data::Text(_) => Vec::new(),
        }
    }

    fn remove_class(&mut self, node: usize, token: &str) {
        let remaining: Vec<String> = self
            .class_tokens(node)
            .into_iter()
            .filter(|t| t != token)
            .collect();
        self.set_attribute(node, "class", &remaining.join(" "));
    }
}
