//! # Score Tree
//!
//! The arena that owns every element of a score and links them into a strict tree.
//!
//! ## Ownership
//! - `Score` owns all nodes in a `Vec<Node>`; a [`NodeId`] is an index into it
//! - A node owns its children through an ordered list of ids
//! - The parent link is a plain `Option<NodeId>`, used for upward queries only
//!
//! Nodes are never removed, so an id stays valid for the lifetime of its score.
//! `add_child` is the only way to link nodes, which keeps the parent links
//! consistent and makes parent cycles impossible to build.
//!
//! ## Ancestor Queries
//! [`Score::find_ancestor`] walks parent links for at most `max_depth` hops
//! (1 = the parent only). Running past the bound is the same as not finding
//! anything.
//!
//! ## Example
//! ```rust
//! use score_context::{Chord, DurationValue, Element, ElementRole, Note, PitchName, Score};
//!
//! let (mut score, layer) = Score::with_layer();
//! let chord = score.add_child(layer, Chord::new(DurationValue::Half).into())?;
//! let note = score.add_child(chord, Note::new(PitchName::E, 4, DurationValue::Quarter).into())?;
//!
//! assert_eq!(score.find_ancestor(note, ElementRole::Chord, 1), Some(chord));
//! assert_eq!(score.find_ancestor(note, ElementRole::Beam, 8), None);
//! # Ok::<(), score_context::ScoreError>(())
//! ```

use std::collections::HashMap;

use crate::error::ScoreError;
use crate::model::{Element, ElementRole, Layer, Measure, StemDirection};
use crate::note::{Note, TieRelation};

/// Index of a node in its score's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// A node of the score tree
#[derive(Debug, Clone)]
pub struct Node {
    xml_id: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub element: Element,
}

impl Node {
    pub fn xml_id(&self) -> &str {
        &self.xml_id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn role(&self) -> ElementRole {
        self.element.role()
    }
}

/// A complete score: an arena of nodes rooted at a section
#[derive(Debug, Clone)]
pub struct Score {
    nodes: Vec<Node>,
    ids: HashMap<String, NodeId>,
    next_serial: usize,
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Score {
    /// Create an empty score holding only its root section
    pub fn new() -> Self {
        let mut score = Self {
            nodes: Vec::new(),
            ids: HashMap::new(),
            next_serial: 0,
        };
        let xml_id = score.generate_id(ElementRole::Section);
        score.push_node(xml_id, None, Element::Section);
        score
    }

    /// Create a score with one measure holding layer 1, and return that layer.
    ///
    /// Convenient for single-voice material.
    pub fn with_layer() -> (Self, NodeId) {
        let mut score = Self::new();
        let root = score.root();
        // The section accepts a measure and the measure a layer, so these cannot fail
        let measure = score.push_child(root, Element::Measure(Measure { n: Some(1) }));
        let layer = score.push_child(measure, Element::Layer(Layer::new(1)));
        (score, layer)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append `element` as the last child of `parent`, with a generated id.
    ///
    /// # Errors
    /// - [`ScoreError::InvalidChildKind`] if the parent's role does not permit the element's role
    /// - [`ScoreError::UnknownNode`] if `parent` is not part of this score
    pub fn add_child(&mut self, parent: NodeId, element: Element) -> Result<NodeId, ScoreError> {
        self.check_child(parent, &element)?;
        let xml_id = self.generate_id(element.role());
        Ok(self.attach(parent, xml_id, element))
    }

    /// Append `element` under `parent` with a caller-supplied id
    pub fn add_child_with_id(
        &mut self,
        parent: NodeId,
        element: Element,
        xml_id: impl Into<String>,
    ) -> Result<NodeId, ScoreError> {
        let xml_id = xml_id.into();
        self.check_child(parent, &element)?;
        if self.ids.contains_key(&xml_id) {
            return Err(ScoreError::DuplicateId(xml_id));
        }
        Ok(self.attach(parent, xml_id, element))
    }

    fn check_child(&self, parent: NodeId, element: &Element) -> Result<(), ScoreError> {
        let parent_role = self.try_node(parent)?.role();
        let child_role = element.role();
        if !parent_role.permits(child_role) {
            return Err(ScoreError::InvalidChildKind {
                parent: parent_role,
                child: child_role,
            });
        }
        // Under editorial wrappers the nearest real container decides
        let container = self.content_role(parent);
        if !container.permits(child_role) {
            return Err(ScoreError::InvalidChildKind {
                parent: container,
                child: child_role,
            });
        }
        Ok(())
    }

    /// Role of `id`, or of its nearest ancestor that is not an editorial wrapper
    fn content_role(&self, id: NodeId) -> ElementRole {
        let mut current = Some(id);
        while let Some(node) = current.and_then(|id| self.get(id)) {
            if node.role() != ElementRole::Editorial {
                return node.role();
            }
            current = node.parent;
        }
        ElementRole::Editorial
    }

    fn push_child(&mut self, parent: NodeId, element: Element) -> NodeId {
        let xml_id = self.generate_id(element.role());
        self.attach(parent, xml_id, element)
    }

    fn attach(&mut self, parent: NodeId, xml_id: String, element: Element) -> NodeId {
        let id = self.push_node(xml_id, Some(parent), element);
        self.nodes[parent.0].children.push(id);
        id
    }

    fn push_node(&mut self, xml_id: String, parent: Option<NodeId>, element: Element) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.ids.insert(xml_id.clone(), id);
        self.nodes.push(Node {
            xml_id,
            parent,
            children: Vec::new(),
            element,
        });
        id
    }

    fn generate_id(&mut self, role: ElementRole) -> String {
        loop {
            let candidate = format!("{}-{}", role.id_prefix(), self.next_serial);
            self.next_serial += 1;
            // Skip serials already taken by explicit ids
            if !self.ids.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn try_node(&self, id: NodeId) -> Result<&Node, ScoreError> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| ScoreError::UnknownNode(format!("#{}", id.0)))
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.get(id).map(|node| &node.element)
    }

    pub(crate) fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id.0).map(|node| &mut node.element)
    }

    pub fn role(&self, id: NodeId) -> Option<ElementRole> {
        self.get(id).map(Node::role)
    }

    pub fn xml_id(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(Node::xml_id)
    }

    pub fn find_by_id(&self, xml_id: &str) -> Option<NodeId> {
        self.ids.get(xml_id).copied()
    }

    /// Children of `id` in tree order (empty for unknown ids)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    pub fn note(&self, id: NodeId) -> Option<&Note> {
        self.element(id).and_then(Element::as_note)
    }

    pub fn note_mut(&mut self, id: NodeId) -> Option<&mut Note> {
        self.element_mut(id).and_then(Element::as_note_mut)
    }

    /// Set the drawing stem direction computed by layout for a beam
    pub fn set_beam_drawing_stem_dir(&mut self, beam: NodeId, dir: StemDirection) -> Result<(), ScoreError> {
        let xml_id = self.try_node(beam)?.xml_id.clone();
        let beam = self
            .element_mut(beam)
            .and_then(Element::as_beam_mut)
            .ok_or_else(|| ScoreError::UnknownNode(format!("'{}' is not a beam", xml_id)))?;
        beam.set_drawing_stem_dir(dir);
        Ok(())
    }

    /// Find the nearest ancestor of `id` with the given role, looking at most
    /// `max_depth` levels up.
    pub fn find_ancestor(&self, id: NodeId, role: ElementRole, max_depth: usize) -> Option<NodeId> {
        let mut current = self.parent(id);
        let mut depth = 0;
        while let Some(ancestor) = current {
            depth += 1;
            if depth > max_depth {
                return None;
            }
            if self.role(ancestor) == Some(role) {
                return Some(ancestor);
            }
            current = self.parent(ancestor);
        }
        None
    }

    /// All nodes below `id` in tree (pre-)order, `id` excluded
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            result.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        result
    }

    /// All notes of the score in reading order
    pub fn notes(&self) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|id| self.role(*id) == Some(ElementRole::Note))
            .collect()
    }

    /// Verify that every parent lists each of its children exactly once.
    pub fn check_parent_links(&self) -> Result<(), ScoreError> {
        for (index, node) in self.nodes.iter().enumerate() {
            let Some(parent) = node.parent else {
                continue;
            };
            let count = self
                .children(parent)
                .iter()
                .filter(|child| child.0 == index)
                .count();
            if count != 1 {
                return Err(ScoreError::BrokenParentLink {
                    id: node.xml_id.clone(),
                    count,
                });
            }
        }
        Ok(())
    }

    /// The tie relation started by `note`, if any
    pub fn tie_of(&self, note: NodeId) -> Option<&TieRelation> {
        self.note(note).and_then(Note::drawing_tie)
    }

    /// All bound tie relations, in reading order of their start notes
    pub fn tie_relations(&self) -> Vec<TieRelation> {
        self.notes()
            .into_iter()
            .filter_map(|id| self.tie_of(id).copied())
            .filter(TieRelation::is_bound)
            .collect()
    }

    /// Drop every tie relation, open or bound
    pub fn reset_ties(&mut self) {
        for node in &mut self.nodes {
            if let Element::Note(note) = &mut node.element {
                note.reset_drawing_tie();
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn corrupt_children_for_test(&mut self, parent: NodeId, children: Vec<NodeId>) {
        self.nodes[parent.0].children = children;
    }
}
