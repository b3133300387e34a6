use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::constants::{PROFILE_HOST, PROFILE_PREFIX};

/// A rider name split into display parts plus the derived matching forms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedName {
    pub first_name: String,
    pub last_name: String,
    /// Diacritic-free, lower-cased full name used for dedup and team-pattern checks
    pub key: String,
    /// URL-safe form of `key`
    pub slug: String,
}

impl NormalizedName {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn has_surname(&self) -> bool {
        !self.last_name.is_empty()
    }
}

/// Turns noisy scraped name text into a clean identity
pub struct NameNormalizer;

impl NameNormalizer {
    /// Normalize a raw name. Surname-first input ("VAN DER POEL Mathieu") is
    /// reordered before splitting off the first token as the given name.
    pub fn normalize(raw: &str) -> NormalizedName {
        let cleaned = Self::clean(raw);
        let tokens: Vec<&str> = cleaned.split(' ').filter(|t| !t.is_empty()).collect();

        // Surname-first input becomes "<given names> <Surname>"; either way the
        // first token is the first name and the rest is the last name.
        let ordered: Vec<String> = match Self::given_name_start(&tokens) {
            Some(idx) if idx > 0 => tokens[idx..]
                .iter()
                .map(|t| t.to_string())
                .chain(tokens[..idx].iter().map(|t| title_case(t)))
                .collect(),
            _ => tokens.iter().map(|t| t.to_string()).collect(),
        };
        let (first_name, last_name) = match ordered.split_first() {
            Some((first, rest)) => (first.clone(), rest.join(" ")),
            None => (String::new(), String::new()),
        };

        let full = format!("{first_name} {last_name}");
        let key = matching_key(full.trim());
        let slug = slugify(&key);

        NormalizedName {
            first_name,
            last_name,
            key,
            slug,
        }
    }

    /// Strip BOMs, NBSPs and control characters, collapsing whitespace runs.
    pub fn clean(raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut prev_space = false;
        for ch in raw.chars() {
            if ch == '\u{feff}' {
                continue;
            }
            if ch.is_whitespace() {
                if !out.is_empty() && !prev_space {
                    out.push(' ');
                    prev_space = true;
                }
            } else if ch.is_control() {
                continue;
            } else {
                out.push(ch);
                prev_space = false;
            }
        }
        out.trim_end().to_string()
    }

    /// Index of the first token that is not fully upper-case but starts with
    /// an upper-case letter.
    fn given_name_start(tokens: &[&str]) -> Option<usize> {
        if tokens.len() < 2 {
            return None;
        }
        tokens.iter().position(|token| {
            !is_all_upper(token) && token.chars().next().is_some_and(char::is_uppercase)
        })
    }
}

/// At least one cased letter and no lower-case letters
fn is_all_upper(token: &str) -> bool {
    token.chars().any(char::is_uppercase) && !token.chars().any(char::is_lowercase)
}

/// Upper-case a letter that follows a non-letter, lower-case the rest.
/// `O'CONNOR` becomes `O'Connor`, `GALL-MEIER` becomes `Gall-Meier`.
pub fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut prev_letter = false;
    for ch in word.chars() {
        if ch.is_alphabetic() {
            if prev_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(ch);
            prev_letter = false;
        }
    }
    out
}

/// NFD-decompose and drop combining marks: `Pogačar` -> `Pogacar`
pub fn strip_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

pub fn matching_key(full_name: &str) -> String {
    strip_diacritics(full_name).to_lowercase()
}

pub fn slugify(key: &str) -> String {
    key.replace(' ', "-").replace('\'', "")
}

/// Resolve a rider profile path from a URL, an existing path, or the slug.
pub fn profile_path(reference: Option<&str>, slug: &str) -> String {
    let reference = reference.map(str::trim).filter(|r| !r.is_empty());
    if let Some(reference) = reference {
        if let Some((_, path)) = reference.split_once(PROFILE_HOST) {
            let path = path.trim_matches('/');
            if !path.is_empty() {
                return path.to_string();
            }
        }
        if reference.starts_with(PROFILE_PREFIX) {
            return reference.to_string();
        }
    }
    format!("{PROFILE_PREFIX}{slug}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surname_first_is_reordered() {
        let name = NameNormalizer::normalize("POGAČAR Tadej");
        assert_eq!(name.first_name, "Tadej");
        assert_eq!(name.last_name, "Pogačar");
        assert_eq!(name.key, "tadej pogacar");
        assert_eq!(name.slug, "tadej-pogacar");
    }

    #[test]
    fn test_given_name_first_is_unchanged() {
        let name = NameNormalizer::normalize("Tadej Pogačar");
        assert_eq!(name.first_name, "Tadej");
        assert_eq!(name.last_name, "Pogačar");
        assert_eq!(name.full_name(), "Tadej Pogačar");
    }

    #[test]
    fn test_multi_token_surname() {
        let name = NameNormalizer::normalize("VAN DER POEL Mathieu");
        assert_eq!(name.first_name, "Mathieu");
        assert_eq!(name.last_name, "Van Der Poel");

        let name = NameNormalizer::normalize("HALLAND JOHANNESSEN Tobias Svendsen");
        assert_eq!(name.first_name, "Tobias");
        assert_eq!(name.last_name, "Svendsen Halland Johannessen");
        assert_eq!(name.full_name(), "Tobias Svendsen Halland Johannessen");
    }

    #[test]
    fn test_lowercase_particles_stay_in_surname() {
        let name = NameNormalizer::normalize("Wout van Aert");
        assert_eq!(name.first_name, "Wout");
        assert_eq!(name.last_name, "van Aert");
    }

    #[test]
    fn test_noise_is_stripped() {
        let name = NameNormalizer::normalize("\u{feff}\u{a0} Jonas\u{a0}\u{a0}Vingegaard \t\r\n");
        assert_eq!(name.first_name, "Jonas");
        assert_eq!(name.last_name, "Vingegaard");
        assert_eq!(NameNormalizer::clean("Ben\u{0007} Healy"), "Ben Healy");
    }

    #[test]
    fn test_single_token_has_no_surname() {
        let name = NameNormalizer::normalize("Carapaz");
        assert_eq!(name.first_name, "Carapaz");
        assert!(!name.has_surname());

        let empty = NameNormalizer::normalize("   ");
        assert_eq!(empty.full_name(), "");
    }

    #[test]
    fn test_title_case_word_boundaries() {
        assert_eq!(title_case("O'CONNOR"), "O'Connor");
        assert_eq!(title_case("GALL-MEIER"), "Gall-Meier");
        assert_eq!(title_case("ROGLIČ"), "Roglič");
    }

    #[test]
    fn test_slug_drops_apostrophes() {
        let name = NameNormalizer::normalize("Ben O'Connor");
        assert_eq!(name.slug, "ben-oconnor");
        assert_eq!(strip_diacritics("Primož Roglič"), "Primoz Roglic");
    }

    #[test]
    fn test_profile_path_resolution() {
        assert_eq!(
            profile_path(Some("https://www.procyclingstats.com/rider/tadej-pogacar/"), "x"),
            "rider/tadej-pogacar"
        );
        assert_eq!(profile_path(Some("rider/jonas-vingegaard"), "x"), "rider/jonas-vingegaard");
        assert_eq!(profile_path(None, "remco-evenepoel"), "rider/remco-evenepoel");
        assert_eq!(profile_path(Some("  "), "mads-pedersen"), "rider/mads-pedersen");
    }
}
