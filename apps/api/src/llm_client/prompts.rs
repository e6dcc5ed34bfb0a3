// Shared prompt fragments.
// Each feature module that talks to the model defines its own prompts alongside it;
// only cross-cutting fragments live here.

/// Appended to system prompts whose reply must be machine-readable.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with a single valid JSON object. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Behaviour rules every role-played persona follows.
pub const PERSONA_GOALS: &str = "Goals:
- Stay in character as the student/resident at all times.
- Use short replies (1-4 sentences) in a natural, conversational tone.
- Express realistic emotions (stress, frustration, worry, relief) but do not be melodramatic.
- Do NOT coach the other person; you are the one being helped.
- Avoid giving clinical mental health advice or mentioning self-harm.";
