/// Characters that mark the end of a sentence-sized chunk.
const FLUSH_MARKERS: [char; 4] = ['.', '!', '?', '\n'];

/// Splits a fragment before every uppercase letter that directly follows a
/// lowercase one: `"iPhoneCase"` -> `["i", "Phone", "Case"]`.
pub fn split_word_chunks(fragment: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;

    for (idx, c) in fragment.char_indices() {
        if let Some(p) = prev {
            if p.is_lowercase() && c.is_uppercase() {
                chunks.push(&fragment[start..idx]);
                start = idx;
            }
        }
        prev = Some(c);
    }

    if start < fragment.len() {
        chunks.push(&fragment[start..]);
    }

    chunks
}

/// Reassembles the chunks of [`split_word_chunks`] without a separator.
/// Spacing at the split points is decided later by the cleanup pipeline.
pub fn repair_word_boundaries(fragment: &str) -> String {
    split_word_chunks(fragment).concat()
}

/// Whether the raw fragment closes a sentence or a line.
pub fn is_flush_point(fragment: &str) -> bool {
    fragment.contains(FLUSH_MARKERS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_split_iphone_case() {
        assert_eq!(split_word_chunks("iPhoneCase"), vec!["i", "Phone", "Case"]);
        assert_eq!(repair_word_boundaries("iPhoneCase"), "iPhoneCase");
    }

    #[rstest]
    #[case("", vec![])]
    #[case("lower", vec!["lower"])]
    #[case("USB", vec!["USB"])]
    #[case("ung Galaxy", vec!["ung Galaxy"])]
    #[case("macBookAir", vec!["mac", "Book", "Air"])]
    #[case("größeÄrger", vec!["größe", "Ärger"])]
    fn test_split_word_chunks(#[case] input: &str, #[case] expected: Vec<&str>) {
        assert_eq!(split_word_chunks(input), expected);
        assert_eq!(repair_word_boundaries(input), input);
    }

    #[rstest]
    #[case("Hello.", true)]
    #[case("Really?", true)]
    #[case("Wow!", true)]
    #[case("line\n", true)]
    #[case("Sams", false)]
    #[case("12,5", false)]
    fn test_is_flush_point(#[case] fragment: &str, #[case] expected: bool) {
        assert_eq!(is_flush_point(fragment), expected);
    }
}
