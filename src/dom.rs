//! DOM capabilities the extraction engine needs from a rendered page.
//!
//! The engine only ever asks for tag names, attributes, text content and
//! parent/child links, so any tree offering those can be scraped: the
//! `scraper` document used in production, or the [`memory`] tree used to
//! build synthetic pages in tests.

use scraper::{ElementRef, Html};

pub trait DomElement: Copy {
    /// Lower-case tag name.
    fn tag_name(&self) -> &str;
    fn attribute(&self, name: &str) -> Option<&str>;
    /// Concatenated text of all descendant text nodes, untrimmed.
    fn text_content(&self) -> String;
    fn parent_element(&self) -> Option<Self>;
    fn element_children(&self) -> Vec<Self>;

    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    /// Nearest ancestor with the given tag, not including `self`.
    fn closest(&self, tag: &str) -> Option<Self> {
        let mut current = self.parent_element();
        while let Some(element) = current {
            if element.tag_name() == tag {
                return Some(element);
            }
            current = element.parent_element();
        }
        None
    }

    fn has_ancestor(&self, predicate: impl Fn(&Self) -> bool) -> bool {
        let mut current = self.parent_element();
        while let Some(element) = current {
            if predicate(&element) {
                return true;
            }
            current = element.parent_element();
        }
        false
    }

    /// First descendant in document order matching `predicate`, not including `self`.
    ///
    /// Walks with an explicit stack; rendered pages can nest arbitrarily deep.
    fn find_descendant(&self, predicate: &dyn Fn(&Self) -> bool) -> Option<Self> {
        let mut stack: Vec<Self> = self.element_children().into_iter().rev().collect();
        while let Some(element) = stack.pop() {
            if predicate(&element) {
                return Some(element);
            }
            stack.extend(element.element_children().into_iter().rev());
        }
        None
    }
}

pub trait DomDocument {
    type Element<'a>: DomElement
    where
        Self: 'a;

    fn elements(&self) -> Vec<Self::Element<'_>>;
}

impl<'a> DomElement for ElementRef<'a> {
    fn tag_name(&self) -> &str {
        self.value().name()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn text_content(&self) -> String {
        self.text().collect()
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent().and_then(ElementRef::wrap)
    }

    fn element_children(&self) -> Vec<Self> {
        self.children().filter_map(ElementRef::wrap).collect()
    }

    fn find_descendant(&self, predicate: &dyn Fn(&Self) -> bool) -> Option<Self> {
        self.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|e| predicate(e))
    }
}

impl DomDocument for Html {
    type Element<'a> = ElementRef<'a>;

    fn elements(&self) -> Vec<ElementRef<'_>> {
        self.root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .collect()
    }
}

pub mod memory {
    //! A minimal arena-backed DOM for building pages by hand.

    use super::{DomDocument, DomElement};

    #[derive(Debug, Clone)]
    enum Node {
        Element {
            tag: String,
            attributes: Vec<(String, String)>,
            parent: Option<usize>,
            children: Vec<usize>,
        },
        Text(String),
    }

    /// An in-memory document rooted at an `html` element.
    #[derive(Debug, Clone)]
    pub struct MemoryDocument {
        nodes: Vec<Node>,
    }

    #[derive(Debug, Clone, Copy)]
    pub struct MemoryElement<'a> {
        document: &'a MemoryDocument,
        id: usize,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NodeId(usize);

    impl Default for MemoryDocument {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MemoryDocument {
        pub fn new() -> Self {
            Self {
                nodes: vec![Node::Element {
                    tag: "html".to_string(),
                    attributes: Vec::new(),
                    parent: None,
                    children: Vec::new(),
                }],
            }
        }

        pub fn root(&self) -> NodeId {
            NodeId(0)
        }

        pub fn append_element(&mut self, parent: NodeId, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
            let id = self.nodes.len();
            self.nodes.push(Node::Element {
                tag: tag.to_ascii_lowercase(),
                attributes: attributes
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                parent: Some(parent.0),
                children: Vec::new(),
            });
            self.push_child(parent, id);
            NodeId(id)
        }

        pub fn append_text(&mut self, parent: NodeId, text: &str) {
            let id = self.nodes.len();
            self.nodes.push(Node::Text(text.to_string()));
            self.push_child(parent, id);
        }

        fn push_child(&mut self, parent: NodeId, child: usize) {
            if let Some(Node::Element { children, .. }) = self.nodes.get_mut(parent.0) {
                children.push(child);
            }
        }

        fn collect_text(&self, id: usize, out: &mut String) {
            let mut stack = vec![id];
            while let Some(id) = stack.pop() {
                match &self.nodes[id] {
                    Node::Text(text) => out.push_str(text),
                    Node::Element { children, .. } => stack.extend(children.iter().rev()),
                }
            }
        }

        fn collect_elements(&self) -> Vec<MemoryElement<'_>> {
            let mut out = Vec::new();
            let mut stack = vec![0];
            while let Some(id) = stack.pop() {
                if let Node::Element { children, .. } = &self.nodes[id] {
                    out.push(MemoryElement { document: self, id });
                    stack.extend(children.iter().rev());
                }
            }
            out
        }
    }

    impl<'a> MemoryElement<'a> {
        fn node(&self) -> &'a Node {
            &self.document.nodes[self.id]
        }
    }

    impl DomElement for MemoryElement<'_> {
        fn tag_name(&self) -> &str {
            match self.node() {
                Node::Element { tag, .. } => tag,
                Node::Text(_) => "",
            }
        }

        fn attribute(&self, name: &str) -> Option<&str> {
            match self.node() {
                Node::Element { attributes, .. } => attributes
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value.as_str()),
                Node::Text(_) => None,
            }
        }

        fn text_content(&self) -> String {
            let mut out = String::new();
            self.document.collect_text(self.id, &mut out);
            out
        }

        fn parent_element(&self) -> Option<Self> {
            match self.node() {
                Node::Element { parent: Some(parent), .. } => Some(MemoryElement {
                    document: self.document,
                    id: *parent,
                }),
                _ => None,
            }
        }

        fn element_children(&self) -> Vec<Self> {
            match self.node() {
                Node::Element { children, .. } => children
                    .iter()
                    .filter(|&&child| matches!(self.document.nodes[child], Node::Element { .. }))
                    .map(|&child| MemoryElement { document: self.document, id: child })
                    .collect(),
                Node::Text(_) => Vec::new(),
            }
        }
    }

    impl DomDocument for MemoryDocument {
        type Element<'a> = MemoryElement<'a>;

        fn elements(&self) -> Vec<MemoryElement<'_>> {
            self.collect_elements()
        }
    }
}
