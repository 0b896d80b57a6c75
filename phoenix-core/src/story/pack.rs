//! Story pack document model
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;

use super::StoryError;
use crate::numbers::exact_integer;

/// A story variable. Packs may store numbers, strings or booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl VarValue {
    /// Numeric view used by `+=`/`-=`; anything non-numeric counts as 0.
    #[must_use]
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Bool(_) | Self::Text(_) => 0.0,
        }
    }

    /// JSON form used in trace lines. Whole numbers render without a
    /// fractional part, so an authored `5` traces as `5`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => exact_integer(*n).map_or_else(
                || Number::from_f64(*n).map_or(Value::Null, Value::Number),
                Value::from,
            ),
            Self::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n:.2}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Named variable bag carried by the interpreter.
pub type VarBag = BTreeMap<String, VarValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectOp {
    #[serde(rename = "+=")]
    Increment,
    #[serde(rename = "-=")]
    Decrement,
    #[serde(rename = "=")]
    Assign,
}

impl EffectOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Increment => "+=",
            Self::Decrement => "-=",
            Self::Assign => "=",
        }
    }
}

/// A variable mutation applied when a choice is taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub var: String,
    pub op: EffectOp,
    pub value: VarValue,
}

impl Effect {
    /// Apply this effect to `vars` in place.
    pub fn apply(&self, vars: &mut VarBag) {
        let next = match self.op {
            EffectOp::Assign => self.value.clone(),
            EffectOp::Increment | EffectOp::Decrement => {
                let current = vars.get(&self.var).map_or(0.0, VarValue::as_number);
                let delta = self.value.as_number();
                if self.op == EffectOp::Increment {
                    VarValue::Number(current + delta)
                } else {
                    VarValue::Number(current - delta)
                }
            }
        };
        vars.insert(self.var.clone(), next);
    }
}

/// Opaque signal forwarded to the host; the interpreter never reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hook {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub hooks: Vec<Hook>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationNode {
    pub text: Vec<String>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub hooks: Vec<Hook>,
    #[serde(default)]
    pub end: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueNode {
    pub speaker: String,
    pub text: String,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub hooks: Vec<Hook>,
    #[serde(default)]
    pub end: bool,
}

impl DialogueNode {
    #[must_use]
    pub fn choice(&self, choice_id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Narration(NarrationNode),
    Dialogue(DialogueNode),
}

impl Node {
    #[must_use]
    pub fn hooks(&self) -> &[Hook] {
        match self {
            Self::Narration(n) => &n.hooks,
            Self::Dialogue(d) => &d.hooks,
        }
    }

    /// Ends the story: explicit `end`, a narration with no `next`, or a
    /// dialogue with no choices.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Narration(n) => n.end || n.next.is_none(),
            Self::Dialogue(d) => d.end || d.choices.is_empty(),
        }
    }

    /// Every `next` target referenced by this node or its choices.
    fn links(&self) -> Vec<&str> {
        match self {
            Self::Narration(n) => n.next.as_deref().into_iter().collect(),
            Self::Dialogue(d) => d.choices.iter().filter_map(|c| c.next.as_deref()).collect(),
        }
    }
}

/// A declarative branching dialogue graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryPack {
    pub id: String,
    pub version: String,
    pub title: String,
    #[serde(default)]
    pub vars_init: VarBag,
    pub start: String,
    pub nodes: BTreeMap<String, Node>,
}

impl StoryPack {
    /// Parse a pack from JSON without validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not match the pack schema.
    pub fn from_json(json: &str) -> Result<Self, StoryError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    /// Check the invariants the interpreter relies on.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::StartNodeMissing`] when `start` does not resolve,
    /// or [`StoryError::EffectValueMismatch`] when an arithmetic effect
    /// carries a non-numeric value.
    pub fn validate(&self) -> Result<(), StoryError> {
        if !self.nodes.contains_key(&self.start) {
            return Err(StoryError::StartNodeMissing(self.start.clone()));
        }
        for (node_id, node) in &self.nodes {
            let Node::Dialogue(dialogue) = node else {
                continue;
            };
            for choice in &dialogue.choices {
                let bad = choice.effects.iter().find(|e| {
                    e.op != EffectOp::Assign && !matches!(e.value, VarValue::Number(_))
                });
                if let Some(effect) = bad {
                    return Err(StoryError::EffectValueMismatch {
                        node: node_id.clone(),
                        choice: choice.id.clone(),
                        var: effect.var.clone(),
                        op: effect.op.symbol(),
                    });
                }
            }
        }
        Ok(())
    }

    /// `(from, to)` pairs whose target is not a node in this pack.
    #[must_use]
    pub fn dangling_links(&self) -> Vec<(String, String)> {
        self.nodes
            .iter()
            .flat_map(|(from, node)| {
                node.links()
                    .into_iter()
                    .filter(|to| !self.nodes.contains_key(*to))
                    .map(move |to| (from.clone(), to.to_string()))
            })
            .collect()
    }
}
