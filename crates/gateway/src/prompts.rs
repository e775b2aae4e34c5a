//! Prompt templates for script generation.
//!
//! Two variants: the base prompt for a bare briefing, and the inspired
//! variant that embeds the serialized context bundle of the user's
//! prior scripts. Which prior scripts end up in that context is decided
//! by `sf-context`; this module is presentation only.

/// System prompt for uninspired generation.
pub const SYSTEM_PROMPT: &str =
    "You are a creative copywriter specialized in audiovisual scripts for social media ad campaigns.";

/// System prompt when prior-script inspiration is attached.
pub const SYSTEM_PROMPT_INSPIRED: &str =
    "You are a creative copywriter specialized in audiovisual scripts who draws on a user's \
     previous scripts to create unique, on-brand content.";

const BRIEF_STRUCTURE: &str = "\
You are a creative copywriter specialized in audiovisual scripts for short-form social media \
ad campaigns (Instagram/TikTok). Based on the briefing below, write a complete script with \
this structure:

Title (short and creative, up to 6 words)

Suggested duration (e.g. 30s or 45s)

Narrative structure:

Hook: the striking opening images that must grab attention within the first 3 seconds.

Development: an engaging, emotional or playful exploration of the campaign concept, \
highlighting the offered products or services and building a connection with the target \
audience.

Call to action: a direct invitation prompting the desired action (visit the store, buy).

Match language and editing style to the platform and audience, keep the pacing dynamic with \
quick cuts, and keep the tone positive. Do not mention prices, promotions, or competitors.

Write 250 words or more, with a clear presentation of the campaign concept and transitions \
optimized for short video.";

/// Build the generation prompt for a bare briefing.
pub fn base_prompt(briefing: &str) -> String {
    format!("{BRIEF_STRUCTURE}\n\nBase the script on the briefing below:\n{briefing}\n")
}

/// Build the generation prompt with prior-script inspiration attached.
///
/// `context` is the serialized context bundle; callers must only pass a
/// non-empty context (an empty one means "use [`base_prompt`]").
pub fn inspired_prompt(briefing: &str, context: &str) -> String {
    format!(
        "{BRIEF_STRUCTURE}\n\n{context}\nBase the script on the briefing below:\n{briefing}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_prompt_embeds_briefing() {
        let p = base_prompt("sell more socks");
        assert!(p.contains("sell more socks"));
        assert!(p.contains("Call to action"));
    }

    #[test]
    fn inspired_prompt_embeds_context_before_briefing() {
        let p = inspired_prompt("briefing text", "CONTEXT BLOCK");
        let ctx = p.find("CONTEXT BLOCK").unwrap();
        let brief = p.find("briefing text").unwrap();
        assert!(ctx < brief);
    }
}
