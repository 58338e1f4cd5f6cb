//! Prompt text sent to the generation service.

use inkdeck_core::{CardCandidate, Ink, Style};
use std::fmt::Write;

fn truncate(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

fn card_line(card: &CardCandidate, text_chars: usize) -> String {
    let cost = card
        .cost
        .map(|cost| cost.to_string())
        .unwrap_or_else(|| "?".to_string());
    let subtypes = card.subtypes.iter().cloned().collect::<Vec<_>>().join(", ");
    format!(
        "- {} | cost {cost} | {} | {} | {}",
        card.name,
        card.ink_label(),
        subtypes,
        truncate(&card.text, text_chars)
    )
}

pub fn identity_prompt(
    request: &str,
    distribution: &[(Ink, usize)],
    samples: &[(Ink, Vec<&CardCandidate>)],
) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "You are choosing the two inks for a Lorcana deck.");
    let _ = writeln!(prompt, "Deck request: {request}");
    let _ = writeln!(prompt, "\nInk counts among matching cards:");
    for (ink, count) in distribution {
        let _ = writeln!(prompt, "- {ink}: {count}");
    }
    let _ = writeln!(prompt, "\nSample cards per ink:");
    for (ink, cards) in samples {
        let _ = writeln!(prompt, "{ink}:");
        for card in cards {
            let _ = writeln!(prompt, "  {}", card_line(card, 80));
        }
    }
    let names = Ink::ALL.map(Ink::name).join(", ");
    let _ = writeln!(
        prompt,
        "\nPick exactly two different inks from: {names}.\n\
         Reply with JSON only: {{\"inks\": [\"<ink>\", \"<ink>\"]}}"
    );
    prompt
}

pub fn synergy_prompt(
    request: &str,
    style: Style,
    candidates: &[&CardCandidate],
    size: usize,
    text_chars: usize,
) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "Deck request: {request}");
    let _ = writeln!(prompt, "Play style: {}", style.as_str());
    let _ = writeln!(prompt, "\nCandidate cards (name | cost | ink | subtypes | text):");
    for card in candidates {
        let _ = writeln!(prompt, "{}", card_line(card, text_chars));
    }
    let _ = writeln!(
        prompt,
        "\nChoose up to {size} cards from the list that work well together for this request. \
Favor cards whose abilities interact with each other over cards that are merely strong alone. \
Only use names exactly as listed and do not invent or quote example cards.\n\
Reply with a JSON array of card names only."
    );
    prompt
}

/// Current state of the iterative builder rendered for the next turn.
pub struct AgentView<'a> {
    pub request: &'a str,
    pub identity: &'a str,
    pub target: u32,
    pub total: u32,
    pub deck: Vec<(&'a str, u32)>,
    pub candidates: Vec<&'a CardCandidate>,
    pub feedback: Option<&'a str>,
    pub turn: u32,
    pub max_turns: u32,
}

pub fn agent_prompt(view: &AgentView<'_>) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "You are building a {}-card Lorcana deck in {} for: {}",
        view.target, view.identity, view.request
    );
    let _ = writeln!(prompt, "Turn {} of {}.", view.turn, view.max_turns);
    let _ = writeln!(prompt, "\nDeck so far ({} of {} cards):", view.total, view.target);
    if view.deck.is_empty() {
        let _ = writeln!(prompt, "(empty)");
    }
    for (name, count) in &view.deck {
        let _ = writeln!(prompt, "- {count}x {name}");
    }
    let _ = writeln!(prompt, "\nKnown legal cards (name | cost | ink | subtypes | text):");
    for card in &view.candidates {
        let _ = writeln!(prompt, "{} | max {}", card_line(card, 80), card.max_copies);
    }
    if let Some(feedback) = view.feedback {
        let _ = writeln!(prompt, "\nNote: {feedback}");
    }
    let _ = writeln!(
        prompt,
        "\nReply with exactly one JSON action:\n\
{{\"action\": \"search\", \"query\": \"<text>\"}}\n\
{{\"action\": \"add_cards\", \"cards\": [{{\"name\": \"<name>\", \"count\": <n>}}]}}\n\
{{\"action\": \"finalize\"}}"
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_text_is_truncated() {
        let card = CardCandidate::new("Hook", Some(4), &[Ink::Ruby])
            .with_text("a".repeat(200))
            .with_subtypes(&["Pirate"]);
        let line = card_line(&card, 120);
        assert!(line.starts_with("- Hook | cost 4 | Ruby | Pirate | "));
        assert!(line.ends_with("..."));
        assert!(line.len() < 200);
    }

    #[test]
    fn identity_prompt_lists_vocabulary() {
        let prompt = identity_prompt("pirates", &[(Ink::Ruby, 3)], &[]);
        assert!(prompt.contains("- Ruby: 3"));
        assert!(prompt.contains("Amber, Amethyst, Emerald, Ruby, Sapphire, Steel"));
    }
}
