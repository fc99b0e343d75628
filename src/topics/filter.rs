use tracing::debug;

/// Fixed reply sent instead of contacting the backend.
pub const FORBIDDEN_REPLY: &str = "Not familiar teritory";

/// Agriculture, personal data and definition requests, matched as
/// case-insensitive substrings in this order.
const FORBIDDEN_TOPICS: &[&str] = &[
    "agriculture",
    "farm",
    "farmer",
    "crop",
    "crops",
    "farming",
    "personal",
    "ssn",
    "password",
    "address",
    "private",
    "name",
    "birth",
    "phone",
    "definition",
    "definitions",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Forbidden { term: &'static str },
}

impl Verdict {
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Verdict::Forbidden { .. })
    }
}

/// Denylist check run on every prompt before it is dispatched.
#[derive(Clone, Copy, Debug, Default)]
pub struct TopicFilter;

impl TopicFilter {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, text: &str) -> Verdict {
        let lower = text.to_lowercase();
        match FORBIDDEN_TOPICS
            .iter()
            .copied()
            .find(|term| lower.contains(term))
        {
            Some(term) => {
                debug!(term, "prompt matched forbidden topic");
                Verdict::Forbidden { term }
            }
            None => Verdict::Allowed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_finance_questions() {
        let filter = TopicFilter::new();
        assert_eq!(filter.check("How does inflation affect bonds?"), Verdict::Allowed);
        assert_eq!(filter.check(""), Verdict::Allowed);
    }

    #[test]
    fn test_blocks_case_insensitively() {
        let filter = TopicFilter::new();
        assert_eq!(
            filter.check("What is my SSN used for?"),
            Verdict::Forbidden { term: "ssn" }
        );
        assert!(filter.check("Give me the DEFINITION of a bond").is_forbidden());
    }

    #[test]
    fn test_first_listed_term_wins() {
        let filter = TopicFilter::new();
        // "farming" also contains "farm", which is listed first
        assert_eq!(
            filter.check("farming subsidies"),
            Verdict::Forbidden { term: "farm" }
        );
    }

    #[test]
    fn test_matches_inside_longer_words() {
        let filter = TopicFilter::new();
        assert_eq!(
            filter.check("Which companies were renamed last year?"),
            Verdict::Forbidden { term: "name" }
        );
    }
}
