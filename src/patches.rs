use std::borrow::Cow;

/// Literal corrections for known-bad field values in widely shared decks,
/// consulted before the generic field split. Exact raw value in, exact
/// replacement out; no pattern matching, so the general parse path stays
/// free of deck-specific exceptions.
const FIELD_PATCHES: &[(&str, &str)] = &[
    // Nayr's Japanese Core5000 stores a literal HTML non-breaking space
    // where an empty reading field is meant.
    ("&nbsp;", ""),
];

pub fn apply_patches(raw: &str) -> Cow<'_, str> {
    for (bad, replacement) in FIELD_PATCHES {
        if raw == *bad {
            return Cow::Borrowed(replacement);
        }
    }
    Cow::Borrowed(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_literal_is_replaced() {
        assert_eq!(apply_patches("&nbsp;"), "");
    }

    #[test]
    fn everything_else_passes_through_unchanged() {
        assert_eq!(apply_patches("Front text"), "Front text");
        assert_eq!(apply_patches(""), "");
    }
}
