use serde_json::json;

use crate::models::{ChatMessage, WorldState};

pub const NO_DIVERGENCE_SENTINEL: &str = "No divergence yet. Standard Earth history.";
pub const NARRATOR_VOICE: &str = "Fenrir";

const SYSTEM_ROLE: &str = "system";

const SIMULATION_PERSONA: &str = "You are Chronos, an expert Historian and Chaos Theory Simulator.
Your task is to simulate alternative history scenarios based on user input.

Constraint: Be historically plausible. Do not allow magic. Focus on geopolitical, social, and economic consequences.
Use Chaos Theory principles: small divergences can lead to large unexpected outcomes (Butterfly Effect).";

const SIMULATION_RULES: &str = "The user will provide a divergence point or an action.
You must predict the outcome.

If this is the first divergence:
- Set the year to the divergence event.
- Describe the immediate outcome.

If continuing:
- Advance time appropriately (immediate aftermath -> 10 years -> 50 years -> 100 years, or as requested).
- Update the Chaos Level (0 = historical baseline, 100 = total collapse/unrecognizable world).
- List key historical deviations (events that happened differently or didn't happen).

You MUST return the response in strict JSON format.";

const SCHEMA_REMINDER: &str = "Respond with a JSON object conforming to this schema. Do not include markdown formatting outside the JSON.";

/// Builds the system instruction for a simulation turn around the caller's
/// current world state, or the no-divergence sentinel when there is none.
pub fn simulation_system_instruction(current_state: Option<&WorldState>) -> String {
    let state_summary = match current_state {
        Some(state) => world_state_json(state),
        None => NO_DIVERGENCE_SENTINEL.to_string(),
    };

    format!(
        "{SIMULATION_PERSONA}\n\nCurrent World State (if any):\n{state_summary}\n\n{SIMULATION_RULES}"
    )
}

fn world_state_json(state: &WorldState) -> String {
    json!({
        "year": state.year,
        "chaos_level": state.chaos_level,
        "deviations": state.deviations,
        "population_mood": state.population_mood,
        "geopolitical_stability": state.geopolitical_stability,
    })
    .to_string()
}

/// Renders prior turns as `ROLE: content` lines followed by the new input.
/// System messages from the client are dropped.
pub fn simulation_turn_prompt(history: &[ChatMessage], input: &str) -> String {
    let mut lines = history
        .iter()
        .filter(|message| message.role != SYSTEM_ROLE)
        .map(|message| format!("{}: {}", message.role.to_uppercase(), message.content))
        .collect::<Vec<_>>();

    lines.push(format!("USER: {input}"));
    lines.push(String::new());
    lines.push(SCHEMA_REMINDER.to_string());
    lines.join("\n")
}

pub fn image_prompt(scenario_description: &str) -> String {
    format!(
        "Create a cinematic, oil-painting style historical illustration of this event: {scenario_description}.\n\
         Style: Retro, vintage, muted parchment tones, highly detailed, dramatic lighting.\n\
         The image should look like it belongs in an old history book."
    )
}

pub fn audio_prompt(narrative: &str) -> String {
    format!(
        "Voice a short, atmospheric, cinematic narration for this historical scene.\n\
         Tone: Deep, serious, historical documentarian.\n\
         Scene: \"{narrative}...\""
    )
}
