pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Maximal runs of alphanumeric characters, lowercased, in document order.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlphanumericTokenizer;

impl Tokenizer for AlphanumericTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|ch: char| !ch.is_alphanumeric())
            .filter(|run| !run.is_empty())
            .map(str::to_lowercase)
            .collect()
    }
}
