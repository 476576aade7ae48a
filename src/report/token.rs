//! Activation tokens: passive records that let a message-log UI jump to the
//! pin, node or blueprint a diagnostic is about.
//!
//! The validators only build tokens. Activation is owned by whatever UI
//! registers a [`TokenActivationHandler`] with a [`TokenDispatcher`] at startup.

use serde::{Deserialize, Serialize};

use crate::error::ValidatorError;
use crate::model::{AssetData, Node, Pin};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ActivationToken {
    #[serde(rename_all = "camelCase")]
    Pin {
        blueprint: String,
        node_id: String,
        pin_id: String,
        display_text: String,
        fail_reason: String,
    },
    #[serde(rename_all = "camelCase")]
    Node {
        blueprint: String,
        node_id: String,
        display_text: String,
        fail_reason: String,
    },
    #[serde(rename_all = "camelCase")]
    Asset {
        blueprint: String,
        display_text: String,
    },
}

impl ActivationToken {
    pub fn for_pin(pin: &Pin, node: &Node, blueprint: &str, fail_reason: &str) -> Self {
        let display_text = match pin.display_name() {
            "" => "<Unnamed>".to_string(),
            name => name.to_string(),
        };
        ActivationToken::Pin {
            blueprint: blueprint.to_string(),
            node_id: node.id.clone(),
            pin_id: pin.id.clone(),
            display_text,
            fail_reason: fail_reason.to_string(),
        }
    }

    pub fn for_node(node: &Node, blueprint: &str, fail_reason: &str) -> Self {
        ActivationToken::Node {
            blueprint: blueprint.to_string(),
            node_id: node.id.clone(),
            display_text: node.title.clone(),
            fail_reason: fail_reason.to_string(),
        }
    }

    /// Token for a message about the asset as a whole.
    pub fn for_asset(asset: &AssetData) -> Self {
        ActivationToken::Asset {
            blueprint: asset.object_path.clone(),
            display_text: asset.asset_name().to_string(),
        }
    }

    pub fn blueprint(&self) -> &str {
        match self {
            ActivationToken::Pin { blueprint, .. }
            | ActivationToken::Node { blueprint, .. }
            | ActivationToken::Asset { blueprint, .. } => blueprint,
        }
    }

    pub fn node_id(&self) -> Option<&str> {
        match self {
            ActivationToken::Pin { node_id, .. } | ActivationToken::Node { node_id, .. } => {
                Some(node_id)
            }
            ActivationToken::Asset { .. } => None,
        }
    }

    pub fn pin_id(&self) -> Option<&str> {
        match self {
            ActivationToken::Pin { pin_id, .. } => Some(pin_id),
            _ => None,
        }
    }

    pub fn display_text(&self) -> &str {
        match self {
            ActivationToken::Pin { display_text, .. }
            | ActivationToken::Node { display_text, .. }
            | ActivationToken::Asset { display_text, .. } => display_text,
        }
    }

    pub fn fail_reason(&self) -> Option<&str> {
        match self {
            ActivationToken::Pin { fail_reason, .. } | ActivationToken::Node { fail_reason, .. } => {
                Some(fail_reason)
            }
            ActivationToken::Asset { .. } => None,
        }
    }
}

/// Implemented by the UI collaborator: open the owning blueprint's editor and
/// jump to the token's pin or node.
pub trait TokenActivationHandler: Send + Sync {
    fn activate(&self, token: &ActivationToken);
}

/// Routes token activations to the single registered handler.
#[derive(Default)]
pub struct TokenDispatcher {
    handler: Option<Box<dyn TokenActivationHandler>>,
}

impl TokenDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the handler. Only one registration is accepted.
    pub fn register(&mut self, handler: Box<dyn TokenActivationHandler>) -> Result<(), ValidatorError> {
        if self.handler.is_some() {
            return Err(ValidatorError::HandlerAlreadyRegistered);
        }
        self.handler = Some(handler);
        Ok(())
    }

    pub fn is_registered(&self) -> bool {
        self.handler.is_some()
    }

    /// Forward an activation. Returns `false` when no handler is installed.
    pub fn activate(&self, token: &ActivationToken) -> bool {
        match &self.handler {
            Some(handler) => {
                handler.activate(token);
                true
            }
            None => {
                tracing::debug!(blueprint = token.blueprint(), "token activated with no handler registered");
                false
            }
        }
    }
}

impl std::fmt::Debug for TokenDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenDispatcher")
            .field("registered", &self.is_registered())
            .finish()
    }
}
