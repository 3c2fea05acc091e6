//! Tagged tokens and the annotated-text ("nerText") form exchanged with clients.
//!
//! In annotated text, tokens are separated by single spaces. An entity span is
//! written as its surface pieces joined with `=` followed by `/LABEL`:
//!
//! ```text
//! 玉=ねぎ/F を 薄切り/Ac に する
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{RecipeError, Result};

/// Recipe named-entity labels produced by the entity model.
pub mod label {
    pub const FOOD: &str = "F";
    pub const TOOL: &str = "T";
    pub const DURATION: &str = "D";
    pub const QUANTITY: &str = "Q";
    pub const ACTION_BY_CHEF: &str = "Ac";
    pub const ACTION_BY_FOOD: &str = "Af";
    pub const STATE_OF_FOOD: &str = "Sf";
    pub const STATE_OF_TOOL: &str = "St";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    /// Concatenated surface form.
    pub surface: String,
    /// Segmentation pieces of an entity span; empty for single-piece tokens.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pieces: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub position: usize,
}

impl TaggedToken {
    pub fn plain(surface: impl Into<String>, position: usize) -> Self {
        Self {
            surface: surface.into(),
            pieces: Vec::new(),
            label: None,
            position,
        }
    }

    pub fn entity(pieces: Vec<String>, label: impl Into<String>, position: usize) -> Self {
        let surface = pieces.concat();
        let pieces = if pieces.len() > 1 { pieces } else { Vec::new() };
        Self {
            surface,
            pieces,
            label: Some(label.into()),
            position,
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.label() == Some(label)
    }

    /// `"<position>-<surface>"`, the identifier edges are keyed by.
    pub fn composite_id(&self) -> String {
        format!("{}-{}", self.position, self.surface)
    }

    fn render(&self) -> String {
        match &self.label {
            Some(label) if self.pieces.is_empty() => format!("{}/{label}", self.surface),
            Some(label) => format!("{}/{label}", self.pieces.join("=")),
            None => self.surface.clone(),
        }
    }
}

/// Parse annotated text into ordered tokens. Positions follow token order.
pub fn parse_annotated(text: &str) -> Vec<TaggedToken> {
    text.split_whitespace()
        .enumerate()
        .map(|(position, unit)| match split_label(unit) {
            Some((body, label)) => {
                let pieces = body.split('=').map(str::to_string).collect();
                TaggedToken::entity(pieces, label, position)
            }
            None => TaggedToken::plain(unit, position),
        })
        .collect()
}

/// Render tokens back into annotated text.
pub fn render_annotated(tokens: &[TaggedToken]) -> String {
    tokens
        .iter()
        .map(TaggedToken::render)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Labels start with an ASCII uppercase letter, so fractions like `1/2` stay plain.
fn split_label(unit: &str) -> Option<(&str, &str)> {
    let (body, label) = unit.rsplit_once('/')?;
    let starts_upper = label.chars().next().is_some_and(|c| c.is_ascii_uppercase());
    if body.is_empty() || !starts_upper || !label.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some((body, label))
}

/// Tagged tokens as accepted in request bodies: either annotated text or a
/// token array as returned by `/ner`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NerText {
    Annotated(String),
    Tokens(Vec<TaggedToken>),
}

impl NerText {
    /// Positions identify graph nodes, so a token array must not repeat one.
    pub fn into_tokens(self) -> Result<Vec<TaggedToken>> {
        match self {
            NerText::Annotated(text) => Ok(parse_annotated(&text)),
            NerText::Tokens(tokens) => {
                let mut seen = HashSet::with_capacity(tokens.len());
                if let Some(dup) = tokens.iter().find(|t| !seen.insert(t.position)) {
                    return Err(RecipeError::InvalidRecord(format!(
                        "duplicate token position {}",
                        dup.position
                    )));
                }
                Ok(tokens)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entities_and_plain_tokens() {
        let tokens = parse_annotated("玉=ねぎ/F を 切/Ac る");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].surface, "玉ねぎ");
        assert_eq!(tokens[0].pieces, vec!["玉", "ねぎ"]);
        assert_eq!(tokens[0].label(), Some("F"));
        assert_eq!(tokens[1], TaggedToken::plain("を", 1));
        assert!(tokens[2].has_label(label::ACTION_BY_CHEF));
        assert_eq!(tokens[3].position, 3);
    }

    #[test]
    fn fractions_are_not_labels() {
        let tokens = parse_annotated("1/2 個");
        assert_eq!(tokens[0].label, None);
        assert_eq!(tokens[0].surface, "1/2");
    }

    #[test]
    fn render_restores_annotated_text() {
        let text = "玉=ねぎ/F を 切/Ac る";
        assert_eq!(render_annotated(&parse_annotated(text)), text);
    }

    #[test]
    fn composite_id_prefixes_position() {
        let token = TaggedToken::entity(vec!["塩".into()], "F", 7);
        assert_eq!(token.composite_id(), "7-塩");
    }

    #[test]
    fn ner_text_accepts_string_or_tokens() {
        let from_text: NerText = serde_json::from_value(serde_json::json!("塩/F を")).unwrap();
        assert_eq!(from_text.into_tokens().unwrap().len(), 2);

        let from_tokens: NerText = serde_json::from_value(serde_json::json!([
            {"surface": "塩", "label": "F", "position": 0}
        ]))
        .unwrap();
        let tokens = from_tokens.into_tokens().unwrap();
        assert_eq!(tokens[0].label(), Some("F"));
    }

    #[test]
    fn token_array_with_repeated_position_is_rejected() {
        let ner: NerText = serde_json::from_value(serde_json::json!([
            {"surface": "塩", "label": "F", "position": 0},
            {"surface": "を", "position": 1},
            {"surface": "振", "label": "Ac", "position": 0}
        ]))
        .unwrap();
        let err = ner.into_tokens().unwrap_err();
        assert!(matches!(err, RecipeError::InvalidRecord(msg) if msg.contains("position 0")));
    }
}
