//! Keyword knowledge filter
//!
//! A line is relevant when any whitespace-delimited query token appears in it,
//! ignoring case. No ranking, stemming or deduplication.

use avatar_assistant_config::constants::knowledge::MAX_SNIPPET_LINES;

/// Return the first relevant corpus lines joined by `\n`, or `""` when none match
pub fn search_knowledge_base(query: &str, corpus: &str) -> String {
    if corpus.is_empty() {
        return String::new();
    }

    let tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if tokens.is_empty() {
        return String::new();
    }

    corpus
        .split('\n')
        .filter(|line| {
            let line = line.to_lowercase();
            tokens.iter().any(|token| line.contains(token.as_str()))
        })
        .take(MAX_SNIPPET_LINES)
        .collect::<Vec<_>>()
        .join("\n")
}
