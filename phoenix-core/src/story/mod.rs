//! Branching dialogue: pack model and interpreter.

mod interpreter;
mod pack;

use thiserror::Error;

pub use interpreter::InterpreterState;
pub use pack::{
    Choice, DialogueNode, Effect, EffectOp, Hook, NarrationNode, Node, StoryPack, VarBag, VarValue,
};

/// Authoring and traversal failures. These signal broken content and are
/// never silently ignored.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("story pack is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("start node '{0}' is not defined in the pack")]
    StartNodeMissing(String),
    #[error("node '{0}' is not defined in the pack")]
    NodeNotFound(String),
    #[error("node '{node}' has no choice '{choice}'")]
    InvalidChoice { node: String, choice: String },
    #[error("node '{0}' is not a narration node")]
    NotNarration(String),
    #[error("choice '{choice}' on node '{node}' applies '{op}' to '{var}' with a non-numeric value")]
    EffectValueMismatch {
        node: String,
        choice: String,
        var: String,
        op: &'static str,
    },
}
