// "Stuff" strategy: every retrieved passage goes into the prompt verbatim
use crate::vector_db::RetrievedPassage;

const PASSAGE_SEPARATOR: &str = "\n\n";

/// Join passage texts with a blank line between them
pub fn stuff_passages(passages: &[RetrievedPassage]) -> String {
    passages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(PASSAGE_SEPARATOR)
}
