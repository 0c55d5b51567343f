//! Encoding of Confluence `expand` attributes.

/// Normalize a raw expand attribute list into the comma-joined form the
/// Confluence REST API expects.
///
/// Items may be separated by commas or whitespace. Blank items are dropped
/// and duplicates keep their first position. Absent input yields `""`.
pub fn parse_expand_attributes(raw: Option<&str>) -> String {
    let mut attributes: Vec<&str> = Vec::new();
    for item in raw
        .unwrap_or_default()
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|item| !item.is_empty())
    {
        if !attributes.contains(&item) {
            attributes.push(item);
        }
    }
    attributes.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_is_empty() {
        assert_eq!(parse_expand_attributes(None), "");
    }

    #[test]
    fn blank_is_empty() {
        assert_eq!(parse_expand_attributes(Some("  , ,")), "");
    }

    #[test]
    fn commas_and_spaces_are_normalized() {
        assert_eq!(
            parse_expand_attributes(Some("body.storage, version  space")),
            "body.storage,version,space"
        );
    }

    #[test]
    fn duplicates_keep_first_position() {
        assert_eq!(
            parse_expand_attributes(Some("version,space,version")),
            "version,space"
        );
    }
}
