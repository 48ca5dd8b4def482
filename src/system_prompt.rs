//! System instruction construction from portfolio content
//!
//! Builds the fixed background context sent with every completion request:
//! who the owner is, what they know, where they worked, and what they built,
//! followed by the rules that keep the assistant on topic.

use crate::portfolio::Portfolio;
use std::fmt::Write;

/// Rules appended after the portfolio data
const GUARDRAILS: &str = r"If a user asks about something not in this data (like general knowledge, math, or history unrelated to the portfolio), politely redirect them back to discussing the portfolio.
Keep answers concise (under 3 sentences usually) unless asked for details.";

/// Build the system instruction for the portfolio's chat assistant.
///
/// The output is deterministic for a given portfolio, so it is built once at
/// startup and shared by every request.
pub fn build_system_instruction(portfolio: &Portfolio) -> String {
    let owner = &portfolio.owner;
    let mut prompt = String::new();

    let _ = writeln!(prompt, "You are an AI assistant for the portfolio of {owner}.");
    let _ = writeln!(
        prompt,
        "Your goal is to answer visitor questions specifically about {owner}'s background, skills, and projects in a professional yet friendly tone."
    );
    let _ = writeln!(prompt, "\nHere is the context about {owner}:");

    let _ = writeln!(prompt, "\nBio:\n{}", portfolio.about.trim());

    prompt.push_str("\nSkills:\n");
    for skill in &portfolio.skills {
        let _ = writeln!(prompt, "- {} ({}%)", skill.name, skill.level);
    }

    prompt.push_str("\nExperience:\n");
    for entry in &portfolio.experience {
        let _ = writeln!(
            prompt,
            "- {} at {} ({}): {}",
            entry.role, entry.company, entry.period, entry.description
        );
    }

    prompt.push_str("\nProjects:\n");
    for project in &portfolio.projects {
        let _ = writeln!(prompt, "- {}: {}", project.title, project.description);
    }

    prompt.push('\n');
    prompt.push_str(GUARDRAILS);
    prompt
}
