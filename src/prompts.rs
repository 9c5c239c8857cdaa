/// Prompt used to decide whether a caption contains a recipe.
///
/// Loaded from `prompts/detect.txt` at compile time using the `include_str!`
/// macro, making it easy to edit without dealing with Rust string syntax.
pub const DETECTION_PROMPT: &str = include_str!("prompts/detect.txt");

/// Prompt used to extract the full structured recipe from a caption.
pub const EXTRACTION_PROMPT: &str = include_str!("prompts/extract.txt");

/// System prompt for the detection pass.
pub const DETECTION_SYSTEM_PROMPT: &str =
    "You are an expert at identifying recipe content in social media posts.";

/// System prompt for the extraction pass.
pub const EXTRACTION_SYSTEM_PROMPT: &str =
    "You are an expert chef and recipe analyzer. Extract structured recipe data with accurate English translations.";

/// Interpolate a caption into a prompt template.
pub fn with_caption(template: &str, caption: &str) -> String {
    template.replace("{caption}", caption)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_are_embedded() {
        assert!(DETECTION_PROMPT.contains("{caption}"));
        assert!(DETECTION_PROMPT.contains("Ingredient lists"));
        assert!(EXTRACTION_PROMPT.contains("{caption}"));
        assert!(EXTRACTION_PROMPT.contains("TRANSLATION RULE"));
    }

    #[test]
    fn test_with_caption_interpolates() {
        let prompt = with_caption(EXTRACTION_PROMPT, "2 eggs and flour");
        assert!(prompt.contains("2 eggs and flour"));
        assert!(!prompt.contains("{caption}"));
    }
}
