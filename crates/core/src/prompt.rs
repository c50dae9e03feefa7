//! Voice-agent system prompt synthesized from the published site content.

use std::fmt::Write;

use crate::content::model::{SiteContent, PAGES};

/// Build the system prompt handed to the voice agent.
///
/// Uses the home page copy as the business description and appends every
/// custom section grouped by page, in document order. Markup is stripped.
pub fn build_system_prompt(content: &SiteContent) -> String {
    let home = &content.home;
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "You are the friendly phone receptionist for a business that describes itself as \"{}\".",
        plain_text(&home.hero_title)
    );
    push_paragraph(&mut prompt, &home.hero_subtitle);

    let _ = writeln!(prompt, "\n## About the business");
    push_paragraph(&mut prompt, &home.about_title);
    push_paragraph(&mut prompt, &home.about_text);

    for page in PAGES {
        let mut sections = content.sections_for_page(page).peekable();
        if sections.peek().is_none() {
            continue;
        }
        let _ = writeln!(prompt, "\n## {} page", capitalize(page));
        for section in sections {
            let _ = writeln!(prompt, "### {}", plain_text(&section.title));
            push_paragraph(&mut prompt, &section.content);
        }
    }

    let _ = writeln!(prompt, "\n## How to handle calls");
    prompt.push_str(
        "- Greet the caller warmly and keep answers short and conversational.\n\
         - Answer questions using only the information above; if you do not know, say so and offer a callback.\n\
         - Offer to book an appointment, and confirm the caller's name, phone number, and preferred time before ending the call.\n",
    );
    prompt
}

fn push_paragraph(prompt: &mut String, raw: &str) {
    let text = plain_text(raw);
    if !text.is_empty() {
        prompt.push_str(&text);
        prompt.push('\n');
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Strip tags and common entities left by the rich-text editor, collapsing whitespace.
pub fn plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
