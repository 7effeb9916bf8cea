//! # Prompt assembly
//!
//! Renders ranked results into the context block the generation prompt
//! consumes, and selects the system prompt for the current mood. Both
//! operations are pure; the output is opaque prose for the model with no
//! parse-back contract.

use crate::{mood::Mood, ranker::SearchResult};

/// Base instruction set, always present regardless of mood.
const BASE_PROMPT: &str = "\
You are a friendly and helpful restaurant menu assistant. Your role is to help customers find items from the menu and answer their questions.

IMPORTANT RULES:
1. ONLY recommend items that are in the provided menu context below
2. DO NOT make up or suggest items that are not in the menu
3. If asked about something not in the menu, politely say it's not available
4. Be conversational, warm, and helpful
5. If asked about prices, ingredients, or details, provide accurate information from the menu
6. ALL PRICES ARE IN INR (Indian Rupees). Always mention prices as \"₹X\" or \"Rs. X\" or \"INR X\"
7. If the customer's question is unclear, ask for clarification
8. Make recommendations based on what's actually available in the menu
9. Keep responses concise but friendly";

/// Select the system prompt for the current mood: the mood's tone preamble
/// (if any) followed by the base instructions.
pub fn system_prompt(mood: Option<Mood>) -> String {
    match mood {
        Some(mood) => format!("{}\n\n{}", mood.tone_preamble(), BASE_PROMPT),
        None => BASE_PROMPT.to_string(),
    }
}

/// Render ranked results as a bounded text block, one item per block in rank
/// order, blocks separated by a blank line. Absent fields are omitted, with
/// no placeholders.
pub fn format_context(results: &[SearchResult<'_>]) -> String {
    let mut blocks = Vec::with_capacity(results.len());

    for (ordinal, result) in results.iter().enumerate() {
        let metadata = &result.record.metadata;
        let mut lines = Vec::new();

        if let Some(name) = &metadata.name {
            lines.push(format!("Item {}: {}", ordinal + 1, name));
        }
        if let Some(category) = &metadata.category {
            lines.push(format!("Category: {category}"));
        }
        if let Some(price) = &metadata.price {
            lines.push(format!("Price: ₹{price}"));
        }
        if let Some(details) = &metadata.original_data {
            if let Some(description) = &details.description {
                lines.push(format!("Description: {description}"));
            }
            if let Some(ingredients) = &details.ingredients {
                lines.push(format!("Ingredients: {}", ingredients.joined()));
            }
            if let Some(allergens) = &details.allergens {
                lines.push(format!("Allergens: {}", allergens.joined()));
            }
            if let Some(dietary) = &details.dietary_info {
                lines.push(format!("Dietary: {}", dietary.joined()));
            }
        }

        blocks.push(lines.join("\n"));
    }

    blocks.join("\n\n")
}

/// Build the final user message: the question, the optional mood annotation,
/// the formatted context, and the answer-only-from-context instruction, with
/// an extra mood-tailoring sentence when a mood is active.
pub fn build_user_message(question: &str, mood: Option<Mood>, context: &str) -> String {
    let mut content = format!("Customer question: {question}");

    if let Some(mood) = mood {
        content.push_str(&format!("\n(Customer mood: {mood})"));
    }

    content.push_str(&format!(
        "\n\nAvailable menu items:\n{context}\n\nPlease answer the customer's question based \
         ONLY on the menu items listed above. Be friendly and conversational."
    ));

    if let Some(mood) = mood {
        content.push_str(&format!(" Tailor your recommendations to their {mood} mood."));
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldText, ItemDetails, ItemMetadata, ItemRecord};

    fn record(metadata: ItemMetadata) -> ItemRecord {
        ItemRecord {
            vector: vec![],
            metadata,
        }
    }

    #[test]
    fn system_prompt_without_mood_is_base_only() {
        let prompt = system_prompt(None);
        assert!(prompt.starts_with("You are a friendly and helpful restaurant menu assistant"));
        assert!(!prompt.contains("empathetic"));
    }

    #[test]
    fn system_prompt_with_mood_prepends_tone() {
        let prompt = system_prompt(Some(Mood::Sad));
        assert!(prompt.starts_with("You are a warm, empathetic restaurant assistant"));
        assert!(prompt.contains("\n\nYou are a friendly and helpful restaurant menu assistant"));
    }

    #[test]
    fn format_full_record() {
        let full = record(ItemMetadata {
            name: Some("Tomato Soup".into()),
            category: Some("Soup".into()),
            price: Some("180".into()),
            original_data: Some(ItemDetails {
                description: Some("A hearty bowl".into()),
                ingredients: Some(FieldText::List(vec!["tomato".into(), "basil".into()])),
                allergens: Some(FieldText::Text("none".into())),
                dietary_info: Some(FieldText::List(vec!["vegan".into()])),
            }),
        });
        let results = [SearchResult {
            record: &full,
            score: 0.9,
        }];
        assert_eq!(
            format_context(&results),
            "Item 1: Tomato Soup\n\
             Category: Soup\n\
             Price: ₹180\n\
             Description: A hearty bowl\n\
             Ingredients: tomato, basil\n\
             Allergens: none\n\
             Dietary: vegan"
        );
    }

    #[test]
    fn absent_fields_are_omitted_and_blocks_blank_line_separated() {
        let first = record(ItemMetadata {
            name: Some("Masala Chai".into()),
            ..ItemMetadata::default()
        });
        let second = record(ItemMetadata {
            category: Some("Dessert".into()),
            price: Some("250".into()),
            ..ItemMetadata::default()
        });
        let results = [
            SearchResult {
                record: &first,
                score: 0.8,
            },
            SearchResult {
                record: &second,
                score: 0.7,
            },
        ];
        assert_eq!(
            format_context(&results),
            "Item 1: Masala Chai\n\nCategory: Dessert\nPrice: ₹250"
        );
    }

    #[test]
    fn user_message_without_mood() {
        let content = build_user_message("What soups do you have?", None, "Item 1: Tomato Soup");
        assert!(content.starts_with("Customer question: What soups do you have?"));
        assert!(content.contains("Available menu items:\nItem 1: Tomato Soup"));
        assert!(!content.contains("Customer mood"));
        assert!(!content.contains("Tailor your recommendations"));
    }

    #[test]
    fn user_message_with_mood() {
        let content = build_user_message("anything warm?", Some(Mood::Sad), "Item 1: Tomato Soup");
        assert!(content.contains("(Customer mood: sad)"));
        assert!(content.ends_with("Tailor your recommendations to their sad mood."));
    }
}
