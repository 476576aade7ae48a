//! Rule predicates shared by the node and property validators.
//!
//! All predicates are pure. A reference that cannot be resolved is treated
//! as safe.

use crate::model::{ClassRef, Pin};

pub const BANNED_FUNCTION_MESSAGE: &str = "Function {0} is banned due to performance reasons.";
pub const DYNAMIC_CAST_MESSAGE: &str =
    "Dynamic cast to non-abstract blueprint type is prohibited because it creates a hard reference.";
pub const PIN_MESSAGE: &str =
    "Pin of an blueprint type is prohibited because it creates a hard reference.";
pub const PROPERTY_MESSAGE: &str =
    "Detected blueprint property with a type of a blueprint generated class.";

/// A class that would be hard-loaded by anything referencing it: blueprint
/// generated and instantiable.
pub fn is_hard_reference_class(class: Option<&ClassRef>) -> bool {
    match class {
        Some(class) => class.is_blueprint_generated() && !class.is_abstract,
        None => false,
    }
}

/// True when an object-like pin targets a hard-reference class.
pub fn pin_declares_hard_reference(pin: &Pin) -> bool {
    if !pin.pin_type.category.is_object_like() {
        return false;
    }
    let target = pin
        .pin_type
        .sub_category_object
        .as_ref()
        .and_then(|t| t.as_class());
    is_hard_reference_class(target)
}

/// Index of the first banned entry equal to `qualified_name`, in list order.
pub fn find_banned_function(qualified_name: &str, banned: &[String]) -> Option<usize> {
    banned.iter().position(|entry| entry == qualified_name)
}

pub fn is_function_banned(qualified_name: &str, banned: &[String]) -> bool {
    find_banned_function(qualified_name, banned).is_some()
}

pub fn banned_function_message(qualified_name: &str) -> String {
    BANNED_FUNCTION_MESSAGE.replace("{0}", qualified_name)
}
