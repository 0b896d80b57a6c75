//! Dialogue interpreter walking a loaded story pack.
use std::sync::Arc;

use super::StoryError;
use super::pack::{Hook, Node, StoryPack, VarBag};

/// Live traversal of a loaded [`StoryPack`].
///
/// Transitions return a new state and leave `self` untouched, so a host can
/// keep the previous value around for undo or comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpreterState {
    pack: Arc<StoryPack>,
    current: String,
    vars: VarBag,
    log: Vec<String>,
    last_hooks: Vec<Hook>,
}

impl InterpreterState {
    /// Validate `pack` and position the interpreter on its start node.
    ///
    /// # Errors
    ///
    /// Returns an error if the pack fails [`StoryPack::validate`].
    pub fn load(pack: impl Into<Arc<StoryPack>>) -> Result<Self, StoryError> {
        let pack = pack.into();
        pack.validate()?;
        let loaded = format!("Loaded: {} ({})", pack.title, pack.version);
        log::debug!("story '{}' loaded at node '{}'", pack.id, pack.start);
        Ok(Self {
            current: pack.start.clone(),
            vars: pack.vars_init.clone(),
            log: vec![loaded],
            last_hooks: Vec::new(),
            pack,
        })
    }

    /// Parse, validate and load a pack from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the pack is invalid.
    pub fn load_json(json: &str) -> Result<Self, StoryError> {
        Self::load(StoryPack::from_json(json)?)
    }

    #[must_use]
    pub fn pack(&self) -> &StoryPack {
        &self.pack
    }

    #[must_use]
    pub fn current_id(&self) -> &str {
        &self.current
    }

    #[must_use]
    pub fn vars(&self) -> &VarBag {
        &self.vars
    }

    #[must_use]
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Hooks emitted by the most recent transition.
    #[must_use]
    pub fn last_hooks(&self) -> &[Hook] {
        &self.last_hooks
    }

    /// # Errors
    ///
    /// Returns [`StoryError::NodeNotFound`] if a transition followed a link
    /// to a node the pack does not define.
    pub fn current_node(&self) -> Result<&Node, StoryError> {
        self.pack
            .node(&self.current)
            .ok_or_else(|| StoryError::NodeNotFound(self.current.clone()))
    }

    /// Whether the current node ends the story.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::NodeNotFound`] for a dangling current node.
    pub fn is_finished(&self) -> Result<bool, StoryError> {
        Ok(self.current_node()?.is_terminal())
    }

    /// Take choice `choice_id` on the current dialogue node.
    ///
    /// Effects apply in order, then node hooks followed by choice hooks become
    /// [`last_hooks`](Self::last_hooks). A choice without `next` keeps the
    /// current node.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::InvalidChoice`] if the current node is not a
    /// dialogue or has no such choice, and [`StoryError::NodeNotFound`] if
    /// the current node is missing.
    pub fn select_choice(&self, choice_id: &str) -> Result<Self, StoryError> {
        let invalid = || StoryError::InvalidChoice {
            node: self.current.clone(),
            choice: choice_id.to_string(),
        };
        let Node::Dialogue(dialogue) = self.current_node()? else {
            return Err(invalid());
        };
        let choice = dialogue.choice(choice_id).ok_or_else(invalid)?;

        let mut next = self.clone();
        for effect in &choice.effects {
            effect.apply(&mut next.vars);
        }
        next.last_hooks = dialogue
            .hooks
            .iter()
            .chain(&choice.hooks)
            .cloned()
            .collect();

        next.log.push(format!("> {}", choice.text));
        next.log.extend(choice.effects.iter().map(|e| {
            format!("  effect: {} {} {}", e.var, e.op.symbol(), e.value.to_json())
        }));
        next.log.extend(
            choice
                .hooks
                .iter()
                .map(|h| format!("  hook: {} {}", h.kind, h.value)),
        );

        if let Some(target) = &choice.next {
            next.current = target.clone();
        }
        log::debug!(
            "story '{}': choice '{choice_id}' moved '{}' -> '{}'",
            self.pack.id,
            self.current,
            next.current
        );
        Ok(next)
    }

    /// Continue past the current narration node.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::NotNarration`] on a dialogue node and
    /// [`StoryError::NodeNotFound`] if the current node is missing.
    pub fn advance_narration(&self) -> Result<Self, StoryError> {
        let Node::Narration(narration) = self.current_node()? else {
            return Err(StoryError::NotNarration(self.current.clone()));
        };
        let mut next = self.clone();
        next.last_hooks = narration.hooks.clone();
        if let Some(target) = &narration.next {
            next.current = target.clone();
        }
        Ok(next)
    }

    /// Restart from the pack's start node with its original variables.
    #[must_use]
    pub fn reset(&self) -> Self {
        Self {
            pack: Arc::clone(&self.pack),
            current: self.pack.start.clone(),
            vars: self.pack.vars_init.clone(),
            log: vec![format!("Reset: {}", self.pack.title)],
            last_hooks: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::VarValue;

    const PACK: &str = r#"{
        "id": "test", "version": "1.0", "title": "Test Pack",
        "vars_init": { "mood": "calm" },
        "start": "intro",
        "nodes": {
            "intro": { "type": "narration", "text": ["Embers."], "next": "talk",
                       "hooks": [ { "type": "music", "value": "drift" } ] },
            "talk": { "type": "dialogue", "speaker": "Kai", "text": "Well?",
                      "hooks": [ { "type": "a", "value": 1 } ],
                      "choices": [
                        { "id": "trust", "text": "I trust you.",
                          "effects": [ { "var": "trust", "op": "+=", "value": 5 } ],
                          "hooks": [ { "type": "b", "value": { "item": "sigil" } } ] },
                        { "id": "leave", "text": "Goodbye.", "next": "end" }
                      ] },
            "end": { "type": "narration", "text": ["Fin."], "end": true }
        }
    }"#;

    fn at_talk() -> InterpreterState {
        InterpreterState::load_json(PACK)
            .unwrap()
            .advance_narration()
            .unwrap()
    }

    #[test]
    fn load_seeds_state() {
        let state = InterpreterState::load_json(PACK).unwrap();
        assert_eq!(state.current_id(), "intro");
        assert_eq!(state.log(), ["Loaded: Test Pack (1.0)"]);
        assert!(state.last_hooks().is_empty());
    }

    #[test]
    fn narration_emits_hooks_and_advances() {
        let state = at_talk();
        assert_eq!(state.current_id(), "talk");
        assert_eq!(state.last_hooks()[0].kind, "music");
    }

    #[test]
    fn dead_end_choice_stays_and_accumulates() {
        let once = at_talk().select_choice("trust").unwrap();
        assert_eq!(once.current_id(), "talk");
        assert_eq!(once.vars()["trust"], VarValue::Number(5.0));
        let twice = once.select_choice("trust").unwrap();
        assert_eq!(twice.vars()["trust"], VarValue::Number(10.0));
    }

    #[test]
    fn node_hooks_precede_choice_hooks() {
        let state = at_talk().select_choice("trust").unwrap();
        let kinds: Vec<&str> = state.last_hooks().iter().map(|h| h.kind.as_str()).collect();
        assert_eq!(kinds, ["a", "b"]);
    }

    #[test]
    fn trace_lines_cover_choice_effects_and_hooks() {
        let state = at_talk().select_choice("trust").unwrap();
        assert_eq!(
            &state.log()[1..],
            [
                "> I trust you.",
                "  effect: trust += 5",
                "  hook: b {\"item\":\"sigil\"}",
            ]
        );
    }

    #[test]
    fn effect_and_hook_values_trace_alike() {
        let json = PACK.replace(
            "\"value\": { \"item\": \"sigil\" }",
            "\"value\": 5",
        );
        let state = InterpreterState::load_json(&json)
            .unwrap()
            .advance_narration()
            .unwrap()
            .select_choice("trust")
            .unwrap();
        assert_eq!(state.log()[2], "  effect: trust += 5");
        assert_eq!(state.log()[3], "  hook: b 5");
    }

    #[test]
    fn fractional_and_text_effects_keep_their_json_form() {
        let json = PACK.replace(
            "{ \"var\": \"trust\", \"op\": \"+=\", \"value\": 5 }",
            "{ \"var\": \"trust\", \"op\": \"-=\", \"value\": 0.5 }, \
             { \"var\": \"mood\", \"op\": \"=\", \"value\": \"wary\" }",
        );
        let state = InterpreterState::load_json(&json)
            .unwrap()
            .advance_narration()
            .unwrap()
            .select_choice("trust")
            .unwrap();
        assert_eq!(state.log()[2], "  effect: trust -= 0.5");
        assert_eq!(state.log()[3], "  effect: mood = \"wary\"");
        assert_eq!(state.vars()["trust"], VarValue::Number(-0.5));
    }

    #[test]
    fn wrong_transitions_fail_loudly() {
        let start = InterpreterState::load_json(PACK).unwrap();
        assert!(matches!(
            start.select_choice("trust"),
            Err(StoryError::InvalidChoice { .. })
        ));
        let talk = at_talk();
        assert!(matches!(
            talk.select_choice("fly"),
            Err(StoryError::InvalidChoice { .. })
        ));
        assert!(matches!(
            talk.advance_narration(),
            Err(StoryError::NotNarration(_))
        ));
    }

    #[test]
    fn reset_restores_pack_values() {
        let played = at_talk().select_choice("trust").unwrap();
        let reset = played.reset();
        assert_eq!(reset.current_id(), "intro");
        assert_eq!(reset.vars(), &reset.pack().vars_init);
        assert!(!reset.vars().contains_key("trust"));
        assert_eq!(reset.log(), ["Reset: Test Pack"]);
        assert!(reset.last_hooks().is_empty());
    }

    #[test]
    fn terminal_node_is_finished() {
        let done = at_talk().select_choice("leave").unwrap();
        assert!(done.is_finished().unwrap());
        let stays = done.advance_narration().unwrap();
        assert_eq!(stays.current_id(), "end");
    }

    #[test]
    fn dangling_link_surfaces_on_arrival() {
        let json = PACK.replace("\"next\": \"end\"", "\"next\": \"nowhere\"");
        let state = InterpreterState::load_json(&json).unwrap();
        assert_eq!(
            state.pack().dangling_links(),
            [("talk".to_string(), "nowhere".to_string())]
        );
        let lost = state
            .advance_narration()
            .unwrap()
            .select_choice("leave")
            .unwrap();
        assert!(matches!(lost.current_node(), Err(StoryError::NodeNotFound(_))));
    }

    #[test]
    fn missing_start_is_rejected() {
        let json = PACK.replace("\"start\": \"intro\"", "\"start\": \"void\"");
        assert!(matches!(
            InterpreterState::load_json(&json),
            Err(StoryError::StartNodeMissing(_))
        ));
    }

    #[test]
    fn non_numeric_increment_is_rejected() {
        let json = PACK.replace("\"value\": 5", "\"value\": \"five\"");
        assert!(matches!(
            InterpreterState::load_json(&json),
            Err(StoryError::EffectValueMismatch { .. })
        ));
    }
}
