pub const MAX_IDENTIFIER_LENGTH: usize = 8;

/// Suggests a conforming replacement for an identifier that failed
/// validation: lowercase, underscore-free, at most eight characters.
pub fn shortened_identifier(identifier: &str) -> String {
    let characters_to_remove = identifier.len() as isize - MAX_IDENTIFIER_LENGTH as isize;
    let underscore_count = identifier.matches('_').count() as isize;
    if characters_to_remove <= 0 || underscore_count >= characters_to_remove {
        return remove_underscores(identifier).to_lowercase();
    }

    let word_count = underscore_count + 1;
    if word_count > 2 {
        return abbreviate_underscored_identifier(identifier);
    }

    if identifier.to_lowercase() != identifier && identifier.to_uppercase() != identifier {
        // has a mix of lowercase and uppercase letters so must be using camelCase
        let word_count = 1 + identifier
            .chars()
            .skip(1)
            .filter(|ch| !ch.is_lowercase())
            .count();
        if word_count > 2 {
            return abbreviate_camel_cased_identifier(identifier);
        }
    }

    smart_shorten(&remove_underscores(identifier).to_lowercase())
}

fn abbreviate_underscored_identifier(identifier: &str) -> String {
    let bytes = identifier.as_bytes();
    let mut suggested = identifier[0..1].to_lowercase();
    for i in 0..bytes.len() {
        if bytes[i] == b'_' && i < bytes.len() - 1 {
            suggested.push(bytes[i + 1].to_ascii_lowercase() as char);
        }
    }
    suggested
}

fn abbreviate_camel_cased_identifier(identifier: &str) -> String {
    let mut suggested = identifier[0..1].to_lowercase();
    for ch in identifier.chars().skip(1) {
        if !ch.is_lowercase() {
            suggested.extend(ch.to_lowercase());
        }
    }
    suggested
}

/// Expects an identifier that is already downcased with no underscores.
/// Strips vowels after the first character, then every second character,
/// then truncates, stopping as soon as the length fits.
fn smart_shorten(identifier: &str) -> String {
    let mut characters_to_remove = identifier.len() as isize - MAX_IDENTIFIER_LENGTH as isize;

    let is_vowel = |ch: char| matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u');

    let mut suggested = identifier[0..1].to_string();
    for ch in identifier.chars().skip(1) {
        if is_vowel(ch) && characters_to_remove > 0 {
            characters_to_remove -= 1;
        } else {
            suggested.push(ch);
        }
    }

    if characters_to_remove == 0 {
        return suggested;
    }

    let without_vowels = suggested;
    let mut suggested = without_vowels[0..1].to_string();

    if characters_to_remove > 0 {
        for (i, ch) in without_vowels.chars().skip(1).enumerate() {
            if i % 2 == 1 && characters_to_remove > 0 {
                characters_to_remove -= 1;
            } else {
                suggested.push(ch);
            }
        }
    }

    if characters_to_remove > 0 {
        suggested.truncate(MAX_IDENTIFIER_LENGTH);
    }

    suggested
}

fn remove_underscores(identifier: &str) -> String {
    identifier.replace('_', "")
}
