//! Arena-backed document tree.
//!
//! Nodes live in a flat arena and are addressed by `NodeId`. Each entry owns
//! its ordered child list; the parent link is a non-owning index used only for
//! navigation and never to drop or duplicate a subtree. Detaching a node keeps
//! it allocated in the arena, so callers can hold detached subtrees (the media
//! side-table does) and splice them back in later.
//!
//! Canonical forms:
//! - Element names are stored ASCII-uppercase.
//! - Attribute names are stored ASCII-lowercase and are unique per element
//!   (a later write to the same name, in any case, overwrites the value).

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
pub enum NodeData {
    /// Root of a parsed fragment; never a child of anything.
    Fragment,
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
    Cdata(String),
}

#[derive(Debug)]
struct Entry {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Default)]
pub struct Document {
    nodes: Vec<Entry>,
}

impl Document {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Entry {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn entry(&self, node: NodeId) -> &Entry {
        &self.nodes[node.index()]
    }

    fn entry_mut(&mut self, node: NodeId) -> &mut Entry {
        &mut self.nodes[node.index()]
    }

    // -- Construction --

    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeData::Fragment)
    }

    pub fn create_element(&mut self, name: &str, attributes: &[(&str, &str)]) -> NodeId {
        let node = self.alloc(NodeData::Element {
            name: name.to_ascii_uppercase(),
            attributes: Vec::with_capacity(attributes.len()),
        });
        for (attr_name, value) in attributes {
            self.set_attribute(node, attr_name, value);
        }
        node
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Comment(text.to_string()))
    }

    pub fn create_cdata(&mut self, data: &str) -> NodeId {
        self.alloc(NodeData::Cdata(data.to_string()))
    }

    /// Clones an element's name and attributes without its children.
    /// Non-element nodes clone their textual payload.
    pub fn clone_shallow(&mut self, node: NodeId) -> NodeId {
        let data = match &self.entry(node).data {
            NodeData::Fragment => NodeData::Fragment,
            NodeData::Element { name, attributes } => NodeData::Element {
                name: name.clone(),
                attributes: attributes.clone(),
            },
            NodeData::Text(text) => NodeData::Text(text.clone()),
            NodeData::Comment(text) => NodeData::Comment(text.clone()),
            NodeData::Cdata(data) => NodeData::Cdata(data.clone()),
        };
        self.alloc(data)
    }

    // -- Inspection --

    pub fn data(&self, node: NodeId) -> &NodeData {
        &self.entry(node).data
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.entry(node).data, NodeData::Element { .. })
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.entry(node).data {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_element_named(&self, node: NodeId, name: &str) -> bool {
        self.tag_name(node)
            .is_some_and(|tag| tag.eq_ignore_ascii_case(name))
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.entry(node).parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.entry(node).children
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.entry(node).children.first().copied()
    }

    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.entry(node).children.last().copied()
    }

    pub fn has_children(&self, node: NodeId) -> bool {
        !self.entry(node).children.is_empty()
    }

    fn position_in_parent(&self, node: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.entry(node).parent?;
        let position = self
            .entry(parent)
            .children
            .iter()
            .position(|&child| child == node)?;
        Some((parent, position))
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let (parent, position) = self.position_in_parent(node)?;
        self.entry(parent).children.get(position + 1).copied()
    }

    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let (parent, position) = self.position_in_parent(node)?;
        position
            .checked_sub(1)
            .map(|prev| self.entry(parent).children[prev])
    }

    // -- Mutation --

    /// Removes `node` from its parent's child list. The node stays allocated
    /// and keeps its own children.
    pub fn detach(&mut self, node: NodeId) {
        if let Some((parent, position)) = self.position_in_parent(node) {
            self.entry_mut(parent).children.remove(position);
        }
        self.entry_mut(node).parent = None;
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(parent != child, "node cannot be its own child");
        self.detach(child);
        self.entry_mut(parent).children.push(child);
        self.entry_mut(child).parent = Some(parent);
    }

    /// Inserts `new` immediately before `reference` under `reference`'s
    /// parent. No-op if `reference` is detached.
    pub fn insert_before(&mut self, new: NodeId, reference: NodeId) {
        let Some((parent, position)) = self.position_in_parent(reference) else {
            debug_assert!(false, "insert_before reference has no parent");
            return;
        };
        self.detach(new);
        // Detaching `new` may have shifted the reference position.
        let position = self
            .position_in_parent(reference)
            .map(|(_, p)| p)
            .unwrap_or(position);
        self.entry_mut(parent).children.insert(position, new);
        self.entry_mut(new).parent = Some(parent);
    }

    /// Inserts `new` immediately after `reference` under `reference`'s
    /// parent. No-op if `reference` is detached.
    pub fn insert_after(&mut self, new: NodeId, reference: NodeId) {
        let Some((parent, position)) = self.position_in_parent(reference) else {
            debug_assert!(false, "insert_after reference has no parent");
            return;
        };
        self.detach(new);
        let position = self
            .position_in_parent(reference)
            .map(|(_, p)| p)
            .unwrap_or(position);
        self.entry_mut(parent).children.insert(position + 1, new);
        self.entry_mut(new).parent = Some(parent);
    }

    /// Replaces `old` with `new` in `old`'s parent. `old` is detached but
    /// stays allocated.
    pub fn replace_child(&mut self, new: NodeId, old: NodeId) {
        self.insert_before(new, old);
        self.detach(old);
    }

    /// Detaches every child of `node`.
    pub fn remove_children(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.entry_mut(node).children);
        for child in children {
            self.entry_mut(child).parent = None;
        }
    }

    // -- Attributes --

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.entry(node).data {
            NodeData::Element { attributes, .. } => attributes
                .iter()
                .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let NodeData::Element { attributes, .. } = &mut self.entry_mut(node).data else {
            debug_assert!(false, "set_attribute on a non-element");
            return;
        };
        match attributes
            .iter_mut()
            .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value.to_string(),
            None => attributes.push((name.to_ascii_lowercase(), value.to_string())),
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let NodeData::Element { attributes, .. } = &mut self.entry_mut(node).data {
            attributes.retain(|(attr, _)| !attr.eq_ignore_ascii_case(name));
        }
    }

    pub fn attributes(&self, node: NodeId) -> &[(String, String)] {
        match &self.entry(node).data {
            NodeData::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    // -- Class helpers --

    pub fn has_class(&self, node: NodeId, class_name: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class_name))
    }

    pub fn add_class(&mut self, node: NodeId, class_name: &str) {
        if self.has_class(node, class_name) {
            return;
        }
        let mut classes = self.attribute(node, "class").unwrap_or("").to_string();
        if !classes.is_empty() {
            classes.push(' ');
        }
        classes.push_str(class_name);
        self.set_attribute(node, "class", &classes);
    }

    pub fn remove_class(&mut self, node: NodeId, class_name: &str) {
        let Some(classes) = self.attribute(node, "class") else {
            return;
        };
        let remaining: Vec<&str> = classes
            .split_ascii_whitespace()
            .filter(|c| *c != class_name)
            .collect();
        if remaining.is_empty() {
            self.remove_attribute(node, "class");
        } else {
            let joined = remaining.join(" ");
            self.set_attribute(node, "class", &joined);
        }
    }

    // -- Traversal and queries --

    /// Preorder descendants of `root`, excluding `root` itself.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Snapshot of descendant elements matching `name` (case-insensitive),
    /// in document order. A snapshot, not a live list: callers mutate the
    /// tree while iterating it.
    pub fn elements_by_tag_name(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&node| self.is_element_named(node, name))
            .collect()
    }

    /// Finds the first element under `root` (inclusive) whose `id` attribute
    /// equals `id`. Detached subtrees are not searched unless rooted at
    /// `root`.
    pub fn element_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        if self.attribute(root, "id") == Some(id) {
            return Some(root);
        }
        self.descendants(root)
            .into_iter()
            .find(|&node| self.attribute(node, "id") == Some(id))
    }

    /// Whether any element in the arena, attached or not, carries `id`.
    /// Used for identifier collision checks, which must be conservative
    /// across detached subtrees.
    pub fn id_in_use(&self, id: &str) -> bool {
        self.nodes.iter().any(|entry| match &entry.data {
            NodeData::Element { attributes, .. } => attributes
                .iter()
                .any(|(name, value)| name == "id" && value == id),
            _ => false,
        })
    }

    /// Concatenated text and CDATA content of `node`'s subtree.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            match &self.entry(current).data {
                NodeData::Text(text) | NodeData::Cdata(text) => out.push_str(text),
                _ => stack.extend(self.children(current).iter().rev().copied()),
            }
        }
        out
    }

    /// Replaces `node`'s children with a single text node.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) {
        self.remove_children(node);
        let text_node = self.create_text(text);
        self.append_child(node, text_node);
    }
}
