use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Class,
    Note,
    Actor,
    UseCase,
}

/// A node-like visual object on the diagram: a class box, a note, an actor
/// or a use case. Position is the top-left corner in absolute pixels.
#[derive(Debug, Clone)]
pub struct Shape {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: ShapeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Inheritance,
    Realization,
    Association,
    Aggregation,
    Composition,
    NoteLink,
}

impl LinkKind {
    /// Inheritance and interface realization drive the level hierarchy;
    /// every other relation is placed after leveling.
    pub fn is_hierarchical(self) -> bool {
        matches!(self, LinkKind::Inheritance | LinkKind::Realization)
    }
}

/// A link-like visual object referencing two shapes by id.
///
/// For hierarchical links `from` is the child (the subclass or the class
/// realizing an interface) and `to` is the parent. Anchors and control
/// points are absolute coordinates rewritten by the layout engine.
#[derive(Debug, Clone)]
pub struct Link {
    pub from: String,
    pub to: String,
    pub kind: LinkKind,
    pub source_anchor: (f32, f32),
    pub dest_anchor: (f32, f32),
    pub control_points: Vec<(f32, f32)>,
}

impl Link {
    pub fn new(from: &str, to: &str, kind: LinkKind) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            kind,
            source_anchor: (0.0, 0.0),
            dest_anchor: (0.0, 0.0),
            control_points: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagram {
    pub shapes: BTreeMap<String, Shape>,
    pub links: Vec<Link>,
}

impl Diagram {
    pub fn new() -> Self {
        Self {
            shapes: BTreeMap::new(),
            links: Vec::new(),
        }
    }

    /// Insert a shape if the id is new, otherwise update its extent.
    pub fn ensure_shape(&mut self, id: &str, width: f32, height: f32, kind: ShapeKind) {
        let entry = self.shapes.entry(id.to_string()).or_insert(Shape {
            id: id.to_string(),
            x: 0.0,
            y: 0.0,
            width,
            height,
            kind,
        });
        entry.width = width;
        entry.height = height;
        entry.kind = kind;
    }

    pub fn add_link(&mut self, from: &str, to: &str, kind: LinkKind) {
        self.links.push(Link::new(from, to, kind));
    }
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}
