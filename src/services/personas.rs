use tracing::warn;

use crate::models::agent::Agent;
use crate::repositories::agents as agents_repo;

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TOP_K: i64 = 40;

/// Resolved writing persona: the system instruction plus sampling settings
/// forwarded to the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaSettings {
    pub system_instruction: String,
    pub temperature: f64,
    pub top_k: i64,
}

impl Default for PersonaSettings {
    fn default() -> Self {
        Self {
            system_instruction: "You are a helpful AI writing assistant.".to_string(),
            temperature: DEFAULT_TEMPERATURE,
            top_k: DEFAULT_TOP_K,
        }
    }
}

pub fn built_in_persona(agent: &str) -> Option<PersonaSettings> {
    match agent {
        "default" => Some(PersonaSettings::default()),
        "creative" => Some(PersonaSettings {
            system_instruction: "You are a creative writer. Use vivid imagery and metaphors."
                .to_string(),
            temperature: 0.9,
            top_k: 40,
        }),
        "professional" => Some(PersonaSettings {
            system_instruction: "You are a professional editor. Use formal and concise language."
                .to_string(),
            temperature: 0.3,
            top_k: 20,
        }),
        _ => None,
    }
}

pub fn persona_from_agent(agent: &Agent) -> PersonaSettings {
    PersonaSettings {
        system_instruction: agent.prompt.clone(),
        temperature: agent.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        top_k: agent.top_k.unwrap_or(DEFAULT_TOP_K),
    }
}

/// Resolve the persona for a request. Anything that is not a built-in name is
/// treated as an agent id and looked up for the current user; an unknown id
/// falls back to the default persona. The second element is the id of the
/// custom agent that matched, if any.
pub async fn resolve_persona_detailed(
    agent: Option<&str>,
    user_id: &str,
) -> (PersonaSettings, Option<String>) {
    let Some(agent) = agent.map(str::trim).filter(|a| !a.is_empty()) else {
        return (PersonaSettings::default(), None);
    };
    if let Some(persona) = built_in_persona(agent) {
        return (persona, None);
    }
    match agents_repo::get_agent_by_id(agent, user_id).await {
        Ok(Some(row)) => {
            let persona = persona_from_agent(&row);
            (persona, Some(row.id))
        }
        Ok(None) => {
            warn!(agent_id = %agent, "unknown agent id; using default persona");
            (PersonaSettings::default(), None)
        }
        Err(err) => {
            warn!(agent_id = %agent, error = %err, "agent lookup failed; using default persona");
            (PersonaSettings::default(), None)
        }
    }
}

pub async fn resolve_persona(agent: Option<&str>, user_id: &str) -> PersonaSettings {
    resolve_persona_detailed(agent, user_id).await.0
}

pub fn compose_prompt(topic: &str, text_type: &str, instructions: Option<&str>) -> String {
    let instructions = instructions
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("None");
    format!("Write a {text_type} about \"{topic}\".\n\nInstructions: {instructions}\n")
}

pub fn compose_translation_prompt(text: &str, target_language: &str) -> String {
    format!(
        "Translate the following text to {target_language}. Maintain the original tone, \
         formatting, and context. Do not add any extra commentary, just return the translated \
         text.\n\nText to translate:\n\"\"\"\n{text}\n\"\"\""
    )
}

pub fn compose_plagiarism_prompt(text: &str) -> String {
    format!(
        "You are an advanced plagiarism and originality checker. Analyze the following text and \
         provide an originality report.\nReturn ONLY a JSON object with the following structure:\n\
         {{\n  \"originalityScore\": number (0-100, where 100 is completely original),\n  \
         \"plagiarismRisk\": \"Low\" | \"Medium\" | \"High\",\n  \"analysis\": \"A brief \
         explanation of the findings, mentioning if it looks AI-generated or matches common \
         patterns.\"\n}}\n\nText to analyze:\n\"\"\"\n{text}\n\"\"\""
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_personas_carry_their_sampling_settings() {
        let creative = built_in_persona("creative").expect("creative");
        assert_eq!(creative.temperature, 0.9);
        assert_eq!(creative.top_k, 40);

        let professional = built_in_persona("professional").expect("professional");
        assert_eq!(professional.temperature, 0.3);
        assert_eq!(professional.top_k, 20);

        assert_eq!(built_in_persona("default"), Some(PersonaSettings::default()));
        assert_eq!(built_in_persona("2fd1c0f4"), None);
    }

    #[test]
    fn custom_agent_falls_back_to_default_sampling() {
        let agent = Agent {
            id: "a1".to_string(),
            user_id: "u1".to_string(),
            name: "Poet".to_string(),
            prompt: "You write only haiku.".to_string(),
            temperature: None,
            top_k: Some(10),
            created_at: String::new(),
            updated_at: String::new(),
        };
        let persona = persona_from_agent(&agent);
        assert_eq!(persona.system_instruction, "You write only haiku.");
        assert_eq!(persona.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(persona.top_k, 10);
    }

    #[test]
    fn prompt_template_matches_expected_shape() {
        let prompt = compose_prompt("the ocean", "poem", Some("  rhyme it  "));
        assert_eq!(
            prompt,
            "Write a poem about \"the ocean\".\n\nInstructions: rhyme it\n"
        );

        let prompt = compose_prompt("Mars", "essay", None);
        assert!(prompt.ends_with("Instructions: None\n"));

        let prompt = compose_prompt("Mars", "essay", Some("   "));
        assert!(prompt.contains("Instructions: None"));
    }

    #[test]
    fn translation_prompt_embeds_language_and_text() {
        let prompt = compose_translation_prompt("Olá", "English");
        assert!(prompt.starts_with("Translate the following text to English."));
        assert!(prompt.contains("\"\"\"\nOlá\n\"\"\""));
    }
}
