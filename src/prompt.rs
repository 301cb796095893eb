//! Prompt Assembly
//!
//! Builds the system prompt and user message for one transformation.
//! Pure string construction, no I/O. The style instruction is keyed by
//! relationship context (unknown keys fall back to `general`), the
//! system template is keyed by perspective.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipContext {
    #[default]
    General,
    Child,
    Business,
    Partner,
    Colleague,
}

impl RelationshipContext {
    /// Unknown keys fall back to `General`.
    pub fn from_key(key: &str) -> Self {
        match key {
            "child" => RelationshipContext::Child,
            "business" => RelationshipContext::Business,
            "partner" => RelationshipContext::Partner,
            "colleague" => RelationshipContext::Colleague,
            _ => RelationshipContext::General,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    /// The user said the conflictual sentence themselves.
    #[default]
    Sender,
    /// The user received the conflictual sentence from someone else.
    Receiver,
}

impl Perspective {
    pub fn from_key(key: &str) -> Self {
        match key {
            "receiver" => Perspective::Receiver,
            _ => Perspective::Sender,
        }
    }
}

/// One user submission. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformRequest {
    pub input_text: String,
    #[serde(default)]
    pub relationship_context: RelationshipContext,
    #[serde(default)]
    pub perspective: Perspective,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPrompt {
    pub system_prompt: String,
    pub user_message: String,
}

const SENDER_TEMPLATE: &str = r#"Du bist ein Coach für Gewaltfreie Kommunikation (GFK) nach Marshall Rosenberg.
Der Nutzer hat eine konfliktgeladene Aussage selbst gesagt und möchte sie in GFK umformulieren.

Formuliere die Aussage in die vier GFK-Komponenten um und bilde daraus zwei
vollständige, natürlich klingende Sätze.

{style}
Antworte ausschließlich mit einem JSON-Objekt mit genau diesen Schlüsseln:
{"observation": "...", "feeling": "...", "need": "...", "request": "...", "variant1": "...", "variant2": "..."}

- observation: konkrete Beobachtung ohne Bewertung
- feeling: das eigene Gefühl in Ich-Form
- need: das dahinterliegende Bedürfnis
- request: eine konkrete, erfüllbare Bitte
- variant1 / variant2: zwei vollständige GFK-Sätze aus allen vier Komponenten
{examples}"#;

const RECEIVER_TEMPLATE: &str = r#"Du bist ein Coach für Gewaltfreie Kommunikation (GFK) nach Marshall Rosenberg.
Der Nutzer hat eine konfliktgeladene Aussage von jemand anderem gehört und möchte
empathisch darauf reagieren.

Formuliere eine empathische Antwort in den vier GFK-Komponenten und bilde daraus
zwei vollständige, natürlich klingende Sätze.

{style}
Antworte ausschließlich mit einem JSON-Objekt mit genau diesen Schlüsseln:
{"observation": "...", "feeling": "...", "need": "...", "request": "...", "variant1": "...", "variant2": "..."}

- observation: was der Nutzer konkret gehört hat, ohne Bewertung
- feeling: das vermutete Gefühl des Gegenübers
- need: das vermutete Bedürfnis des Gegenübers
- request: eine klärende Rückfrage oder Bitte
- variant1 / variant2: zwei vollständige empathische Sätze aus allen vier Komponenten
{examples}"#;

fn style_instruction(context: RelationshipContext) -> &'static str {
    match context {
        RelationshipContext::General => {
            "Stil: neutral und alltagstauglich, per Du, keine Fachbegriffe."
        }
        RelationshipContext::Child => {
            "Stil: einfache, warme Sprache wie gegenüber einem Kind, kurze Sätze, keine Vorwürfe."
        }
        RelationshipContext::Business => {
            "Stil: professionell und respektvoll, per Sie, sachlich ohne kühl zu wirken."
        }
        RelationshipContext::Partner => {
            "Stil: nah und verbindend wie in einer Partnerschaft, per Du, Gefühle dürfen Raum haben."
        }
        RelationshipContext::Colleague => {
            "Stil: kollegial auf Augenhöhe, per Du, lösungsorientiert."
        }
    }
}

/// Worked examples, keyed like the style instruction. Not every context
/// ships with examples.
fn worked_examples(context: RelationshipContext) -> Option<&'static str> {
    match context {
        RelationshipContext::General => Some(
            r#"Beispiel:
Aussage: "Du kommst immer zu spät!"
{"observation": "Mir ist aufgefallen, dass du heute 20 Minuten nach der verabredeten Zeit gekommen bist.", "feeling": "Ich bin frustriert.", "need": "Mir ist Verlässlichkeit wichtig.", "request": "Magst du mir kurz Bescheid geben, wenn es später wird?", "variant1": "Mir ist aufgefallen, dass du heute 20 Minuten nach der verabredeten Zeit gekommen bist. Ich bin frustriert, weil mir Verlässlichkeit wichtig ist. Magst du mir kurz Bescheid geben, wenn es später wird?", "variant2": "Als du heute 20 Minuten später kamst, war ich frustriert, weil mir Verlässlichkeit wichtig ist. Wärst du bereit, mir beim nächsten Mal kurz zu schreiben?"}"#,
        ),
        RelationshipContext::Child => Some(
            r#"Beispiel:
Aussage: "Räum endlich dein Zimmer auf!"
{"observation": "Ich sehe, dass deine Sachen auf dem Boden liegen.", "feeling": "Das macht mich unruhig.", "need": "Ich brauche Ordnung, damit ich mich wohlfühle.", "request": "Magst du deine Sachen vor dem Abendessen wegräumen?", "variant1": "Ich sehe, dass deine Sachen auf dem Boden liegen. Das macht mich unruhig, weil ich Ordnung brauche. Magst du sie vor dem Abendessen wegräumen?", "variant2": "Wenn ich deine Sachen auf dem Boden sehe, werde ich unruhig, weil mir Ordnung wichtig ist. Räumst du sie bitte vor dem Abendessen weg?"}"#,
        ),
        _ => None,
    }
}

/// Pure function of the request: same input, same prompt.
pub fn assemble(request: &TransformRequest) -> AssembledPrompt {
    let template = match request.perspective {
        Perspective::Sender => SENDER_TEMPLATE,
        Perspective::Receiver => RECEIVER_TEMPLATE,
    };

    let examples = match worked_examples(request.relationship_context) {
        Some(text) => format!("\n{}", text),
        None => String::new(),
    };

    let system_prompt = template
        .replace("{style}", style_instruction(request.relationship_context))
        .replace("{examples}", &examples);

    let user_message = format!("Aussage: \"{}\"", request.input_text.trim());

    AssembledPrompt {
        system_prompt,
        user_message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(context: RelationshipContext, perspective: Perspective) -> TransformRequest {
        TransformRequest {
            input_text: "Du hörst nie zu!".to_string(),
            relationship_context: context,
            perspective,
        }
    }

    #[test]
    fn test_unknown_context_falls_back_to_general() {
        assert_eq!(
            RelationshipContext::from_key("roommate"),
            RelationshipContext::General
        );
        assert_eq!(
            RelationshipContext::from_key("child"),
            RelationshipContext::Child
        );
    }

    #[test]
    fn test_perspective_selects_template() {
        let sender = assemble(&request(RelationshipContext::General, Perspective::Sender));
        let receiver = assemble(&request(RelationshipContext::General, Perspective::Receiver));
        assert_ne!(sender.system_prompt, receiver.system_prompt);
        assert!(receiver.system_prompt.contains("empathisch"));
    }

    #[test]
    fn test_style_and_examples_injected() {
        let prompt = assemble(&request(RelationshipContext::Child, Perspective::Sender));
        assert!(prompt.system_prompt.contains("wie gegenüber einem Kind"));
        assert!(prompt.system_prompt.contains("Räum endlich dein Zimmer auf!"));
        assert!(!prompt.system_prompt.contains("{style}"));
        assert!(!prompt.system_prompt.contains("{examples}"));
    }

    #[test]
    fn test_context_without_examples() {
        let prompt = assemble(&request(RelationshipContext::Business, Perspective::Sender));
        assert!(prompt.system_prompt.contains("per Sie"));
        assert!(!prompt.system_prompt.contains("Beispiel:"));
    }

    #[test]
    fn test_user_message_wraps_trimmed_input() {
        let mut req = request(RelationshipContext::General, Perspective::Sender);
        req.input_text = "  Du hörst nie zu!  ".to_string();
        let prompt = assemble(&req);
        assert_eq!(prompt.user_message, "Aussage: \"Du hörst nie zu!\"");
    }
}
