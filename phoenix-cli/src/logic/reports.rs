use anyhow::Result;
use colored::Colorize;
use phoenix_core::{UpgradeKey, format_amount};
use std::io::Write;
use std::time::Duration;

use super::SimulationSummary;

pub fn generate_console_report<W: Write + ?Sized>(
    writer: &mut W,
    summaries: &[SimulationSummary],
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Idle Session Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "=======================".cyan())?;
    writeln!(writer, "Sessions: {}", summaries.len())?;
    writeln!(writer, "Wall time: {total_duration:?}")?;
    writeln!(writer)?;

    for summary in summaries {
        let state = &summary.final_state;
        writeln!(
            writer,
            "🔥 {} (seed {})",
            summary.strategy.label().bold(),
            summary.seed
        )?;
        writeln!(
            writer,
            "   Simulated: {:.1} min over {} frames",
            elapsed_minutes(summary.elapsed_ms),
            summary.frames
        )?;
        writeln!(
            writer,
            "   Sparks: {}  Ash: {}  Rebirths: {}",
            format_amount(state.sparks).yellow(),
            state.phoenix_ash,
            state.rebirths
        )?;
        writeln!(
            writer,
            "   Peak rate: {}/s  Taps: {}  Purchases: {}  Autosaves: {}",
            format_amount(summary.peak_sparks_per_second),
            summary.taps,
            summary.purchases,
            summary.autosaves
        )?;
        writeln!(writer, "   Upgrades: {}", upgrade_line(summary))?;
        for event in &summary.milestones {
            writeln!(writer, "   ✨ {} ({})", event.message.bright_magenta(), event.quest_id)?;
        }
        writeln!(writer)?;
    }

    let best = summaries.iter().max_by(|a, b| {
        let (a, b) = (&a.final_state, &b.final_state);
        a.phoenix_ash
            .cmp(&b.phoenix_ash)
            .then(a.sparks.total_cmp(&b.sparks))
    });
    if let Some(best) = best {
        writeln!(writer, "{}", "⚡ Best Session".bright_yellow().bold())?;
        writeln!(writer, "{}", "==============".yellow())?;
        writeln!(
            writer,
            "{} seed {}: {} ash, {} sparks",
            best.strategy.label().green(),
            best.seed,
            best.final_state.phoenix_ash,
            format_amount(best.final_state.sparks)
        )?;
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(
    writer: &mut W,
    summaries: &[SimulationSummary],
) -> Result<()> {
    let json_output = serde_json::to_string_pretty(summaries)?;
    writeln!(writer, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    writer: &mut W,
    summaries: &[SimulationSummary],
) -> Result<()> {
    writeln!(writer, "# VoidPhoenix Idle Sessions\n")?;
    writeln!(writer, "| Strategy | Seed | Minutes | Sparks | Ash | Rebirths | Purchases |")?;
    writeln!(writer, "|---|---|---|---|---|---|---|")?;
    for summary in summaries {
        let state = &summary.final_state;
        writeln!(
            writer,
            "| {} | {} | {:.1} | {} | {} | {} | {} |",
            summary.strategy.label(),
            summary.seed,
            elapsed_minutes(summary.elapsed_ms),
            format_amount(state.sparks),
            state.phoenix_ash,
            state.rebirths,
            summary.purchases
        )?;
    }

    writeln!(writer, "\n## Upgrades\n")?;
    for summary in summaries {
        writeln!(
            writer,
            "- **{} / {}**: {}",
            summary.strategy.label(),
            summary.seed,
            upgrade_line(summary)
        )?;
    }
    Ok(())
}

fn upgrade_line(summary: &SimulationSummary) -> String {
    UpgradeKey::ALL
        .iter()
        .map(|key| format!("{key} {}", summary.final_state.level(*key)))
        .collect::<Vec<_>>()
        .join(", ")
}

#[allow(clippy::cast_precision_loss)]
fn elapsed_minutes(elapsed_ms: i64) -> f64 {
    elapsed_ms as f64 / 60_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::SessionStrategy;
    use phoenix_core::PlayerState;

    fn sample_summary() -> SimulationSummary {
        let mut final_state = PlayerState::new(0);
        final_state.sparks = 1_500.0;
        final_state.phoenix_ash = 2;
        final_state.upgrades.insert(UpgradeKey::Feather, 4);
        SimulationSummary {
            strategy: SessionStrategy::Efficient,
            seed: 42,
            elapsed_ms: 90_000,
            frames: 450,
            taps: 3,
            purchases: 7,
            rebirths: 1,
            autosaves: 18,
            peak_sparks_per_second: 12.5,
            final_state,
            milestones: Vec::new(),
            decisions: Vec::new(),
        }
    }

    #[test]
    fn markdown_lists_every_session() {
        let mut out = Vec::new();
        generate_markdown_report(&mut out, &[sample_summary()]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("# VoidPhoenix Idle Sessions"));
        assert!(text.contains("| Efficient | 42 | 1.5 | 1.50K | 2 | 1 | 7 |"));
        assert!(text.contains("feather 4"));
    }

    #[test]
    fn json_uses_camel_case_state() {
        let mut out = Vec::new();
        generate_json_report(&mut out, &[sample_summary()]).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed[0]["strategy"], "efficient");
        assert_eq!(parsed[0]["final_state"]["phoenixAsh"], 2);
    }

    #[test]
    fn console_names_the_best_session() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        generate_console_report(&mut out, &[sample_summary()], Duration::from_millis(5)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Best Session"));
        assert!(text.contains("Efficient seed 42: 2 ash, 1.50K sparks"));
    }
}
