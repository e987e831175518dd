use crate::services::emotion_analyzer::EmotionalContext;

/// Short natural-language summary of why the results were chosen.
pub fn explain(query: &str, context: &EmotionalContext) -> String {
    let mut explanation = format!(
        "Based on your query '{}', I detected that you might be feeling ",
        query
    );

    if !context.emotions.is_empty() {
        let emotions: Vec<&str> = context.emotions.iter().map(|e| e.as_str()).collect();
        explanation.push_str(&format!("{}. ", emotions.join(", ")));
    }

    if context.is_negative() {
        explanation.push_str(
            "Since you seem to need some comfort, I'm recommending foods that can help boost your mood. ",
        );
    } else if query.to_lowercase().contains("jumpy") {
        explanation.push_str(
            "Since you're feeling jumpy, I'm suggesting calming foods that might help you relax. ",
        );
    }

    explanation.push_str("Here are my top recommendations with reasoning:");
    explanation
}
