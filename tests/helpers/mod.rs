use blueprint_validator::config::ValidatorConfig;
use blueprint_validator::model::*;
use blueprint_validator::validate::BlueprintGraphValidator;

// =============================================================================
// Validator builders
// =============================================================================

pub const BANNED: &str = "MyActorClass.GetAllActorsOfClass";

/// Default config plus one banned function.
pub fn config() -> ValidatorConfig {
    ValidatorConfig {
        banned_functions: vec![BANNED.into()],
        ..ValidatorConfig::default()
    }
}

pub fn validator() -> BlueprintGraphValidator {
    BlueprintGraphValidator::new(config())
}

/// Config with every rule category switched off.
pub fn all_off() -> ValidatorConfig {
    ValidatorConfig {
        validate_banned_functions: false,
        validate_blueprint_casts: false,
        validate_function_pins: false,
        validate_function_local_variables: false,
        validate_blueprint_variables: false,
        ..config()
    }
}

// =============================================================================
// Node builders
// =============================================================================

pub fn call(id: &str, owner: &str, function: &str) -> Node {
    Node::new(
        id,
        NodeKind::CallFunction {
            function: MemberReference {
                parent_class: Some(owner.into()),
                member_name: function.into(),
            },
        },
    )
}

pub fn banned_call(id: &str) -> Node {
    let (owner, function) = BANNED.split_once('.').unwrap();
    call(id, owner, function)
}

pub fn cast(id: &str, target: Option<ClassRef>) -> Node {
    Node::new(id, NodeKind::DynamicCast { target_type: target })
}

pub fn entry(id: &str, locals: Vec<Property>) -> Node {
    Node::new(
        id,
        NodeKind::FunctionEntry {
            local_variables: Some(StructScope {
                name: format!("{}_Locals", id),
                properties: locals,
            }),
        },
    )
}

pub fn custom_event(id: &str) -> Node {
    Node::new(id, NodeKind::CustomEvent { event_name: id.into() })
}

pub fn bp_pin(id: &str) -> Pin {
    Pin::object(id, ClassRef::blueprint("BP_Enemy_C"))
}

pub fn native_pin(id: &str) -> Pin {
    Pin::object(id, ClassRef::native("Actor"))
}

pub fn object_var(name: &str, class: ClassRef) -> Property {
    Property::new(name, PropertyType::Object { class })
}

// =============================================================================
// Blueprint builders
// =============================================================================

pub fn blueprint(name: &str, graphs: Vec<Graph>) -> Blueprint {
    let mut bp = Blueprint::new(name, format!("/Game/Test/{0}.{0}", name));
    bp.graphs = graphs;
    bp
}

pub fn event_graph(nodes: Vec<Node>) -> Graph {
    Graph::new("EventGraph", GraphKind::EventGraph, nodes)
}

pub fn function_graph(name: &str, nodes: Vec<Node>) -> Graph {
    Graph::new(name, GraphKind::Function, nodes)
}
