//! Questions offered on the welcome screen

/// Starter questions, in display order
pub const SUGGESTED_QUESTIONS: [&str; 6] = [
    "What's the weather like today?",
    "Explain quantum computing simply",
    "Write a creative story",
    "Help me plan a workout routine",
    "What are the latest tech trends?",
    "Explain machine learning basics",
];

/// Suggestion by its 1-based number as displayed.
pub fn suggestion(number: usize) -> Option<&'static str> {
    number
        .checked_sub(1)
        .and_then(|i| SUGGESTED_QUESTIONS.get(i))
        .copied()
}
