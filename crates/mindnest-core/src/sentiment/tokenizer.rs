//! Word tokenizer for the classifier.

/// Function words carrying no sentiment. Negations are not listed.
const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "am", "an", "and", "are", "as", "at", "be", "been", "being", "but",
    "by", "did", "do", "does", "for", "from", "had", "has", "have", "he", "her", "him", "his",
    "i", "i'm", "if", "in", "into", "is", "it", "its", "it's", "me", "my", "myself", "of", "on",
    "or", "our", "she", "so", "than", "that", "the", "their", "them", "then", "there", "these",
    "they", "this", "those", "to", "today", "too", "us", "was", "we", "were", "what", "when",
    "which", "while", "who", "with", "you", "your",
];

/// Lower-cased alphanumeric tokens with stop words removed.
///
/// Apostrophes inside a word are kept so that contractions such as
/// "don't" survive as a single token.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|word| word.trim_matches('\''))
        .filter(|word| !word.is_empty() && !STOP_WORDS.contains(word))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_splits_on_punctuation() {
        assert_eq!(
            tokenize("Feeling GREAT, truly-great!"),
            vec!["feeling", "great", "truly", "great"]
        );
    }

    #[test]
    fn drops_stop_words_but_keeps_negations() {
        assert_eq!(tokenize("I am not happy"), vec!["not", "happy"]);
        assert_eq!(tokenize("I don't feel good"), vec!["don't", "feel", "good"]);
    }

    #[test]
    fn empty_and_symbol_only_text_has_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ... !!! ''").is_empty());
    }

    #[test]
    fn keeps_non_ascii_words() {
        assert_eq!(tokenize("Très bien"), vec!["très", "bien"]);
    }
}
