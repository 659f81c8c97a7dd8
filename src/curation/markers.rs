use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PRESS_RELEASE_MARKERS: Regex = Regex::new(
        r"(?i)\b(press release|statement|awards|contract|rfp|solicitation|budget request|official says)\b"
    )
    .expect("press release marker pattern is valid");
}

/// True when the text reads like it was lifted from an official announcement
pub fn has_press_release_language(text: &str) -> bool {
    PRESS_RELEASE_MARKERS.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_release_markers() {
        assert!(has_press_release_language("DoD awards missile defense contract"));
        assert!(has_press_release_language("Statement from the Secretary"));
        assert!(has_press_release_language("Army issues RFP for new radios"));
        assert!(has_press_release_language("FY26 Budget Request released"));
        assert!(has_press_release_language("Navy official says carrier will deploy"));
        assert!(!has_press_release_language("Contractor profits rise"));
        assert!(!has_press_release_language("Analysts weigh shipbuilding delays"));
    }
}
