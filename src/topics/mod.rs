/// Prompt inspection for the finance chat client
///
/// Everything here is pure text processing that runs locally before a
/// prompt leaves the process:
///
/// - `keywords` - keyword extraction and the finance vocabulary
/// - `filter` - the forbidden-topic denylist
pub mod filter;
pub mod keywords;

pub use filter::{FORBIDDEN_REPLY, TopicFilter, Verdict};
pub use keywords::{extract_keywords, finance_terms, is_finance_term};
