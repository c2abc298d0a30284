use serde::Serialize;

use crate::protocol::MethodError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextStats {
    pub characters: usize,
    pub words: usize,
    pub lines: usize,
    pub bytes: usize,
}

pub async fn uppercase(s: String) -> Result<String, MethodError> {
    Ok(s.to_uppercase())
}

pub async fn lowercase(s: String) -> Result<String, MethodError> {
    Ok(s.to_lowercase())
}

pub async fn reverse(s: String) -> Result<String, MethodError> {
    Ok(s.chars().rev().collect())
}

pub async fn word_count(s: String) -> Result<usize, MethodError> {
    Ok(s.split_whitespace().count())
}

pub async fn stats(s: String) -> Result<TextStats, MethodError> {
    Ok(TextStats {
        characters: s.chars().count(),
        words: s.split_whitespace().count(),
        lines: s.lines().count(),
        bytes: s.len(),
    })
}

/// Lowercase ASCII alphanumerics joined by single dashes.
pub async fn slugify(s: String) -> Result<String, MethodError> {
    let slug = s
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    Ok(slug)
}
