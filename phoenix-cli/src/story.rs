//! Scripted playthroughs of a story pack.

use colored::Colorize;
use phoenix_core::story::{Hook, Node};
use phoenix_core::{InterpreterState, StoryError};
use std::io::Write;

/// One visited node and what happened there.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryStep {
    pub node_id: String,
    pub speaker: Option<String>,
    pub lines: Vec<String>,
    pub choice: Option<String>,
    pub hooks: Vec<Hook>,
}

#[derive(Debug, Clone)]
pub struct StoryTranscript {
    pub steps: Vec<StoryStep>,
    pub finished: bool,
    pub unused_choices: Vec<String>,
    pub state: InterpreterState,
}

/// Walk the story from its current node, answering dialogue nodes with
/// `choices` in order.
///
/// Narration nodes advance on their own. The walk stops at a terminal node
/// or when a dialogue node needs a choice the script no longer has.
///
/// # Errors
///
/// Returns the interpreter error for an unknown choice or a dangling link.
pub fn run_script(
    start: InterpreterState,
    choices: &[String],
) -> Result<StoryTranscript, StoryError> {
    let mut state = start;
    let mut steps = Vec::new();
    let mut script = choices.iter();

    let finished = loop {
        let node_id = state.current_id().to_string();
        let terminal = state.is_finished()?;
        match state.current_node()?.clone() {
            Node::Narration(narration) => {
                state = state.advance_narration()?;
                steps.push(StoryStep {
                    node_id,
                    speaker: None,
                    lines: narration.text,
                    choice: None,
                    hooks: state.last_hooks().to_vec(),
                });
                if terminal {
                    break true;
                }
            }
            Node::Dialogue(dialogue) => {
                if terminal {
                    steps.push(StoryStep {
                        node_id,
                        speaker: Some(dialogue.speaker),
                        lines: vec![dialogue.text],
                        choice: None,
                        hooks: dialogue.hooks,
                    });
                    break true;
                }
                let Some(choice_id) = script.next() else {
                    break false;
                };
                let step = StoryStep {
                    node_id,
                    speaker: Some(dialogue.speaker),
                    lines: vec![dialogue.text],
                    choice: Some(choice_id.clone()),
                    hooks: Vec::new(),
                };
                state = state.select_choice(choice_id)?;
                steps.push(StoryStep {
                    hooks: state.last_hooks().to_vec(),
                    ..step
                });
            }
        }
    };

    log::debug!(
        "story '{}' stopped at '{}' after {} steps",
        state.pack().id,
        state.current_id(),
        steps.len()
    );
    Ok(StoryTranscript {
        steps,
        finished,
        unused_choices: script.cloned().collect(),
        state,
    })
}

pub fn write_transcript<W: Write + ?Sized>(
    writer: &mut W,
    transcript: &StoryTranscript,
) -> std::io::Result<()> {
    for step in &transcript.steps {
        match &step.speaker {
            Some(speaker) => {
                for line in &step.lines {
                    writeln!(writer, "{}: {line}", speaker.bright_yellow().bold())?;
                }
            }
            None => {
                for line in &step.lines {
                    writeln!(writer, "{}", line.italic())?;
                }
            }
        }
        if let Some(choice) = &step.choice {
            writeln!(writer, "  -> {}", choice.green())?;
        }
        for hook in &step.hooks {
            writeln!(writer, "  [hook] {} {}", hook.kind.cyan(), hook.value)?;
        }
    }

    writeln!(writer)?;
    writeln!(writer, "{}", "Trace".bright_cyan().bold())?;
    for line in transcript.state.log() {
        writeln!(writer, "{line}")?;
    }

    writeln!(writer)?;
    writeln!(writer, "{}", "Variables".bright_cyan().bold())?;
    for (name, value) in transcript.state.vars() {
        writeln!(writer, "  {name} = {value}")?;
    }

    writeln!(writer)?;
    if transcript.finished {
        writeln!(writer, "{}", "The End.".bright_green())?;
    } else {
        writeln!(
            writer,
            "{} at '{}'",
            "Awaiting a choice".yellow(),
            transcript.state.current_id()
        )?;
    }
    if !transcript.unused_choices.is_empty() {
        writeln!(
            writer,
            "Unused choices: {}",
            transcript.unused_choices.join(", ")
        )?;
    }
    Ok(())
}
