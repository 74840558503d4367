//! # Prompt Templates
//!
//! Prompts sent to the language model for query translation, answering and
//! fact extraction.

/// Prompt that turns a question into one knowledge-base query call.
#[must_use]
pub fn translation(question: &str) -> String {
    format!(
        "You are a MeTTa query translator for a healthcare knowledge system.
Convert the user's question into a MeTTa function call.
Only output the MeTTa expression. No explanations.

Available functions:
- (getCauses $symptom)
- (getSymptoms $condition)
- (getTreatment $condition)
- (getPrevention $condition)
- (explain-cause $condition $symptom)

Examples:
\"What causes chest pain?\" -> (getCauses ChestPain)
\"How is malaria treated?\" -> (getTreatment Malaria)
\"What are the symptoms of anxiety?\" -> (getSymptoms Anxiety)
\"Why does HeartAttack cause chest pain?\" -> (explain-cause HeartAttack ChestPain)

Question: {question}
->"
    )
}

/// Prompt that asks for an answer grounded in `facts`.
#[must_use]
pub fn answer(history: &str, question: &str, facts: &str) -> String {
    format!(
        "Conversation history:
{history}

Current question: {question}
Relevant facts: {facts}

Provide a clear, natural language answer. Be concise and avoid giving medical advice.
If the facts are insufficient, say 'I don't have enough information.'"
    )
}

/// Prompt that extracts one fact from a free-text statement.
#[must_use]
pub fn suggestion(statement: &str) -> String {
    format!(
        "Extract a valid MeTTa-style fact from this statement:
\"{statement}\"
Only output the MeTTa expression. No explanations.
Example: (causes LongCovid ChestPain)"
    )
}
