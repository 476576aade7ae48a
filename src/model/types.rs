//! Rust types for loaded blueprint assets.
//!
//! These types are the serde target for exported blueprint JSON. They carry
//! only the structural facts the validators need: node kinds, pin types,
//! class origins and the member variables of generated classes.

use serde::{Deserialize, Serialize};

use crate::report::Severity;

// =============================================================================
// CLASSES & TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClassOrigin {
    /// Compiled into the engine or a code module.
    Native,
    /// Produced by compiling a blueprint.
    BlueprintGenerated,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRef {
    pub name: String,
    pub origin: ClassOrigin,
    #[serde(default)]
    pub is_abstract: bool,
}

impl ClassRef {
    pub fn native(name: impl Into<String>) -> Self {
        ClassRef {
            name: name.into(),
            origin: ClassOrigin::Native,
            is_abstract: false,
        }
    }

    pub fn blueprint(name: impl Into<String>) -> Self {
        ClassRef {
            name: name.into(),
            origin: ClassOrigin::BlueprintGenerated,
            is_abstract: false,
        }
    }

    pub fn abstract_blueprint(name: impl Into<String>) -> Self {
        ClassRef {
            is_abstract: true,
            ..ClassRef::blueprint(name)
        }
    }

    pub fn is_blueprint_generated(&self) -> bool {
        self.origin == ClassOrigin::BlueprintGenerated
    }
}

/// Target of a pin's sub-category object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TypeRef {
    Class(ClassRef),
    Struct { name: String },
    Enum { name: String },
}

impl TypeRef {
    pub fn as_class(&self) -> Option<&ClassRef> {
        match self {
            TypeRef::Class(class) => Some(class),
            TypeRef::Struct { .. } | TypeRef::Enum { .. } => None,
        }
    }
}

// =============================================================================
// PINS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PinCategory {
    Exec,
    Boolean,
    Byte,
    Int,
    Int64,
    Real,
    Name,
    String,
    Text,
    Struct,
    Enum,
    Object,
    Class,
    SoftObject,
    SoftClass,
    Interface,
    Delegate,
    Wildcard,
}

impl PinCategory {
    /// Categories whose value refers to an object or class.
    pub fn is_object_like(self) -> bool {
        matches!(
            self,
            PinCategory::Object | PinCategory::Class | PinCategory::SoftObject | PinCategory::SoftClass
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinType {
    pub category: PinCategory,
    #[serde(default)]
    pub sub_category_object: Option<TypeRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PinDirection {
    Input,
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub direction: PinDirection,
    pub pin_type: PinType,
}

impl Pin {
    pub fn new(id: impl Into<String>, category: PinCategory, target: Option<TypeRef>) -> Self {
        let id = id.into();
        Pin {
            name: id.clone(),
            id,
            display_name: None,
            direction: PinDirection::Input,
            pin_type: PinType {
                category,
                sub_category_object: target,
            },
        }
    }

    pub fn object(id: impl Into<String>, class: ClassRef) -> Self {
        Pin::new(id, PinCategory::Object, Some(TypeRef::Class(class)))
    }

    /// Name shown to users; unnamed pins yield an empty string.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PropertyType {
    Bool,
    Int,
    Float,
    String,
    Name,
    Text,
    Struct {
        name: String,
    },
    Enum {
        name: String,
    },
    Object {
        class: ClassRef,
    },
    WeakObject {
        class: ClassRef,
    },
    LazyObject {
        class: ClassRef,
    },
    SoftObject {
        class: ClassRef,
    },
    #[serde(rename_all = "camelCase")]
    Class {
        class: ClassRef,
        meta_class: ClassRef,
    },
    #[serde(rename_all = "camelCase")]
    SoftClass {
        class: ClassRef,
        meta_class: ClassRef,
    },
    Array {
        inner: Box<PropertyType>,
    },
    Set {
        inner: Box<PropertyType>,
    },
    Map {
        key: Box<PropertyType>,
        value: Box<PropertyType>,
    },
}

impl PropertyType {
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            PropertyType::Array { .. } | PropertyType::Set { .. } | PropertyType::Map { .. }
        )
    }

    /// Effective target class of an object- or class-valued field.
    ///
    /// Class-valued fields resolve to their metaclass. Every other type,
    /// containers included, yields `None`.
    pub fn object_target(&self) -> Option<&ClassRef> {
        match self {
            PropertyType::Object { class }
            | PropertyType::WeakObject { class }
            | PropertyType::LazyObject { class }
            | PropertyType::SoftObject { class } => Some(class),
            PropertyType::Class { meta_class, .. } | PropertyType::SoftClass { meta_class, .. } => {
                Some(meta_class)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: PropertyType,
}

impl Property {
    pub fn new(name: impl Into<String>, ty: PropertyType) -> Self {
        Property {
            name: name.into(),
            ty,
        }
    }
}

/// A structural type whose own fields can be enumerated: a generated class or
/// a function's local-variable cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructScope {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl StructScope {
    /// Own fields that hold an object or class reference, paired with the
    /// class they resolve to. Container fields are skipped.
    pub fn object_fields(&self) -> impl Iterator<Item = (&Property, &ClassRef)> {
        self.properties
            .iter()
            .filter_map(|p| p.ty.object_target().map(|class| (p, class)))
    }
}

// =============================================================================
// NODES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberReference {
    #[serde(default)]
    pub parent_class: Option<String>,
    pub member_name: String,
}

impl MemberReference {
    /// `"<Owner>.<Member>"`, with `None` standing in for an unresolved owner.
    pub fn qualified_name(&self) -> String {
        format!(
            "{}.{}",
            self.parent_class.as_deref().unwrap_or("None"),
            self.member_name
        )
    }
}

/// Concrete node kind, resolved once when the node is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeKind {
    CallFunction {
        function: MemberReference,
    },
    #[serde(rename_all = "camelCase")]
    DynamicCast {
        #[serde(default)]
        target_type: Option<ClassRef>,
    },
    #[serde(rename_all = "camelCase")]
    CustomEvent {
        event_name: String,
    },
    #[serde(rename_all = "camelCase")]
    FunctionEntry {
        #[serde(default)]
        local_variables: Option<StructScope>,
    },
    FunctionResult,
    #[serde(rename_all = "camelCase")]
    Literal {
        #[serde(default)]
        object_ref: Option<String>,
    },
    Select,
    Comment {
        #[serde(default)]
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Other {
        class_name: String,
    },
}

/// Payload-free tag of a [`NodeKind`], used where configuration names node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeClass {
    CallFunction,
    DynamicCast,
    CustomEvent,
    FunctionEntry,
    FunctionResult,
    Literal,
    Select,
    Comment,
    Other,
}

impl NodeKind {
    pub fn class(&self) -> NodeClass {
        match self {
            NodeKind::CallFunction { .. } => NodeClass::CallFunction,
            NodeKind::DynamicCast { .. } => NodeClass::DynamicCast,
            NodeKind::CustomEvent { .. } => NodeClass::CustomEvent,
            NodeKind::FunctionEntry { .. } => NodeClass::FunctionEntry,
            NodeKind::FunctionResult => NodeClass::FunctionResult,
            NodeKind::Literal { .. } => NodeClass::Literal,
            NodeKind::Select => NodeClass::Select,
            NodeKind::Comment { .. } => NodeClass::Comment,
            NodeKind::Other { .. } => NodeClass::Other,
        }
    }
}

/// Compiler-message state rendered by the graph editor as an error glyph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeError {
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default)]
    pub pins: Vec<Pin>,
    /// Written only by the node validator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<NodeError>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        let id = id.into();
        Node {
            title: id.clone(),
            id,
            kind,
            pins: Vec::new(),
            error: None,
        }
    }

    pub fn with_pins(mut self, pins: Vec<Pin>) -> Self {
        self.pins = pins;
        self
    }

    pub fn class(&self) -> NodeClass {
        self.kind.class()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&NodeError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(NodeError {
            severity: Severity::Error,
            message: message.into(),
        });
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

// =============================================================================
// GRAPHS & BLUEPRINTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GraphKind {
    /// Ubergraph page.
    EventGraph,
    /// Event graph kept in the blueprint's separate event-graph list.
    Event,
    Function,
    Macro,
    Delegate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    pub name: String,
    pub kind: GraphKind,
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Bumped on every change notification so open editor views can refresh.
    #[serde(skip)]
    revision: u64,
}

impl Graph {
    pub fn new(name: impl Into<String>, kind: GraphKind, nodes: Vec<Node>) -> Self {
        Graph {
            name: name.into(),
            kind,
            nodes,
            revision: 0,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn notify_graph_changed(&mut self) {
        self.revision += 1;
        tracing::debug!(graph = %self.name, revision = self.revision, "graph changed");
    }

    pub fn find_node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    /// Removes the node at `index` if its id is `node_id`.
    pub fn remove_node_at(&mut self, index: usize, node_id: &str) -> Option<Node> {
        if self.nodes.get(index)?.id != node_id {
            return None;
        }
        Some(self.nodes.remove(index))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub name: String,
    /// Object path of the asset, e.g. `/Game/Characters/BP_Hero.BP_Hero`.
    pub path: String,
    #[serde(default)]
    pub parent_class: Option<ClassRef>,
    #[serde(default)]
    pub graphs: Vec<Graph>,
    #[serde(default)]
    pub generated_class: StructScope,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub timelines: Vec<String>,
}

impl Blueprint {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        let name = name.into();
        Blueprint {
            generated_class: StructScope {
                name: format!("{}_C", name),
                properties: Vec::new(),
            },
            name,
            path: path.into(),
            parent_class: None,
            graphs: Vec::new(),
            components: Vec::new(),
            timelines: Vec::new(),
        }
    }

    /// A blueprint with no executable graph content and no declared
    /// variables. There is nothing in it for the graph validator to inspect.
    pub fn is_data_only(&self) -> bool {
        self.graphs.iter().all(|g| g.nodes.is_empty()) && self.generated_class.properties.is_empty()
    }

    pub fn asset_data(&self) -> AssetData {
        AssetData {
            object_path: self.path.clone(),
            asset_class: "Blueprint".into(),
            is_top_level: true,
        }
    }
}

// =============================================================================
// ASSET METADATA
// =============================================================================

/// Registry metadata for an asset, available without loading it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetData {
    pub object_path: String,
    pub asset_class: String,
    #[serde(default = "default_top_level")]
    pub is_top_level: bool,
}

fn default_top_level() -> bool {
    true
}

impl AssetData {
    /// Short asset name: the last path segment without its object suffix.
    pub fn asset_name(&self) -> &str {
        let last = self.object_path.rsplit('/').next().unwrap_or(&self.object_path);
        last.split('.').next().unwrap_or(last)
    }

    /// Package path, i.e. the object path without the `.Object` suffix.
    pub fn package_name(&self) -> &str {
        match self.object_path.rsplit_once('.') {
            Some((package, _)) => package,
            None => &self.object_path,
        }
    }
}

/// An object loaded from the registry.
#[derive(Debug, Clone)]
pub enum LoadedObject {
    Blueprint(Blueprint),
    Other { class_name: String },
}

impl LoadedObject {
    pub fn as_blueprint(&self) -> Option<&Blueprint> {
        match self {
            LoadedObject::Blueprint(bp) => Some(bp),
            LoadedObject::Other { .. } => None,
        }
    }

    pub fn as_blueprint_mut(&mut self) -> Option<&mut Blueprint> {
        match self {
            LoadedObject::Blueprint(bp) => Some(bp),
            LoadedObject::Other { .. } => None,
        }
    }
}
