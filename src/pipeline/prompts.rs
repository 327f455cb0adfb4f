//! Prompt templates for the two completion passes and the topic gate.
//!
//! Slots are filled with `format!`, so each slot is substituted exactly once
//! and braces inside user text are never re-expanded.

/// First pass: answer from the knowledge-base context.
pub fn draft_prompt(context: &str, query: &str) -> String {
    format!(
        "You are an AI Doctor assistant.
Use the following context from the knowledge base to answer the user's health-related question.
If the question is not health related, still give a helpful and correct answer.

Context (from the knowledge base):
{context}

Question:
{query}

Raw Answer:
"
    )
}

/// Second pass: merge the draft with fresh web context.
pub fn refine_prompt(raw_answer: &str, extra_context: &str) -> String {
    format!(
        "You are a knowledgeable medical AI.
Refine and expand the raw answer using both:
1. The raw answer from another model (based on the knowledge base)
2. Additional verified context from a web search

Requirements:
- Make the answer accurate and fact-checked
- Clear and concise
- Easy to understand for a patient
- Structured: use steps or bullet points if needed
- Include a short summary at the end
- Professional but friendly tone

Raw Answer:
{raw_answer}

Extra Web Context:
{extra_context}

Final Refined Answer:
"
    )
}

pub fn topic_prompt(question: &str) -> String {
    format!(
        "You are a classifier. Determine if the following question is related to
health, medicine, diseases, symptoms, treatments, or healthcare.
Answer only with YES or NO.

Question: \"{question}\"
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_prompt_places_context_before_question() {
        let prompt = draft_prompt("Symptoms: cough -> Disease: Flu", "Why do I cough?");
        let context_at = prompt.find("Symptoms: cough -> Disease: Flu").unwrap();
        let question_at = prompt.find("Why do I cough?").unwrap();
        assert!(context_at < question_at);
        assert!(prompt.trim_end().ends_with("Raw Answer:"));
    }

    #[test]
    fn slot_values_are_not_re_expanded() {
        let prompt = draft_prompt("{query}", "literal {context}");
        assert_eq!(prompt.matches("{query}").count(), 1);
        assert_eq!(prompt.matches("literal {context}").count(), 1);
    }

    #[test]
    fn refine_prompt_carries_draft_and_web_context() {
        let prompt = refine_prompt("Raw: rest.", "Snippet one\nSnippet two");
        assert!(prompt.contains("Raw Answer:\nRaw: rest.\n"));
        assert!(prompt.contains("Extra Web Context:\nSnippet one\nSnippet two\n"));
        assert!(prompt.contains("Include a short summary at the end"));
    }

    #[test]
    fn topic_prompt_quotes_the_question() {
        assert!(topic_prompt("Is aspirin safe?").contains("Question: \"Is aspirin safe?\""));
    }
}
