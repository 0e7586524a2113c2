//! Prompt construction for the analysis tiers and the chatbot

use crate::gateway::ChatMessage;

/// Structured-tier prompt: the model must answer with a bare JSON object
pub fn structured_analysis(document: &str) -> Vec<ChatMessage> {
    let prompt = format!(
        r#"Analyze these terms and conditions and provide your response ONLY as valid JSON.

TERMS:
{document}

Respond with ONLY this JSON structure (no other text):
{{
    "summary": "2-3 sentence overview",
    "findings": [
        {{"title": "Issue name", "description": "Explanation", "flag": "critical", "category": "privacy"}},
        {{"title": "Another issue", "description": "Details", "flag": "warning", "category": "payment"}},
        {{"title": "Good point", "description": "Description", "flag": "good", "category": "usage"}}
    ]
}}

Flag definitions:
- critical: Data selling, no refunds, binding arbitration, unclear liability
- warning: Vague terms, data sharing, limited rights
- good: Clear policies, user protections, transparency

Category must be one of: privacy, payment, security, liability, usage, legal, general.

Respond with JSON only. No markdown, no explanations."#
    );

    vec![
        ChatMessage::system(
            "You must respond with ONLY valid JSON. No markdown formatting, no explanations, just raw JSON.",
        ),
        ChatMessage::user(prompt),
    ]
}

/// Fallback-tier prompt: labeled line blocks instead of JSON
pub fn line_format_analysis(document: &str) -> Vec<ChatMessage> {
    let prompt = format!(
        r#"Analyze these terms and conditions. List 3-5 key concerns or good points.

TERMS:
{document}

Use exactly this format:

SUMMARY: <one or two sentence overview>

FINDING 1: <short title>
<why it matters, one or two sentences>
FLAG: <critical, warning or good>
CATEGORY: <privacy, payment, security, liability, usage, legal or general>

FINDING 2: ...

Be concise."#
    );

    vec![
        ChatMessage::system("You are a legal analyst. Be concise and clear."),
        ChatMessage::user(prompt),
    ]
}

/// Chatbot system prompt embedding the (already clipped) document
pub fn chat_system(document: &str) -> ChatMessage {
    ChatMessage::system(format!(
        r#"You are a helpful AI assistant that answers questions about terms and conditions.

You have access to the following terms and conditions document:

{document}

Your role:
- Answer questions clearly and concisely
- Reference specific sections when relevant
- Explain complex legal terms in simple language
- If asked about something not in the terms, say so
- Be helpful and user-friendly

Always base your answers on the provided terms and conditions."#
    ))
}
