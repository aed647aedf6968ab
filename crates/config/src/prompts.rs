//! Prompt templates

use avatar_assistant_core::LanguagePreference;

/// Prefix of the reply substituted for a failed completion
pub const APOLOGY_PREFIX: &str = "I apologize, but I encountered an error: ";

/// Build the fixed system instruction for one turn
pub fn system_prompt(language: LanguagePreference, knowledge_context: &str) -> String {
    format!(
        "You are a professional AI avatar assistant.\n\
         Language preference: {language}\n\
         Personality: Polite, professional, helpful\n\
         \n\
         Knowledge context: {knowledge_context}\n\
         \n\
         Respond naturally and professionally. If responding in Hindi, use proper Devanagari script.\n\
         Keep responses conversational but informative."
    )
}

/// Reply text used when the completion call fails
pub fn apology(error: &str) -> String {
    format!("{}{}", APOLOGY_PREFIX, error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_embeds_inputs() {
        let prompt = system_prompt(LanguagePreference::Hindi, "reset your password here");
        assert!(prompt.starts_with("You are a professional AI avatar assistant."));
        assert!(prompt.contains("Language preference: Hindi\n"));
        assert!(prompt.contains("Knowledge context: reset your password here\n"));
        assert!(prompt.contains("Devanagari"));
    }

    #[test]
    fn test_apology() {
        assert_eq!(
            apology("HTTP 401: bad key"),
            "I apologize, but I encountered an error: HTTP 401: bad key"
        );
    }
}
