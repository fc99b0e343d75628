const MIN_KEYWORD_LEN: usize = 3;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "your", "what", "when", "how", "why",
    "are", "you", "not", "but", "has", "have", "was", "were", "a", "an", "in", "on", "of", "to",
    "is", "it",
];

// Multi-word entries never come out of `extract_keywords`; they are kept so
// the vocabulary can be matched against phrases later.
const FINANCE_TERMS: &[&str] = &[
    "market", "stock", "stocks", "price", "prices", "trade", "trading", "investment", "invest",
    "portfolio", "bond", "bonds", "dividend", "earnings", "inflation", "rate", "rates",
    "interest", "yield", "cpi", "revenue", "cashflow", "valuation", "pe", "eps", "forecast",
    "analyst", "sector", "index", "crypto", "cryptocurrency", "bitcoin", "ethereum",
    "blockchain", "nft", "token", "economy", "economic", "gdp", "unemployment", "jobs",
    "federal", "fed", "treasury", "risk", "volatility", "hedge", "derivative", "option",
    "options", "future", "futures", "fund", "funds", "etf", "etfs", "mutual fund",
    "mutual funds", "tax", "taxes", "irs", "loan", "loans", "mortgage", "mortgages", "credit",
    "debit", "bank", "banks", "banking", "financial", "finance", "account", "accounts",
    "transaction", "transactions", "payment", "payments", "budget", "budgets", "expense",
    "expenses", "savings", "retirement", "401k", "ira", "roth", "roths", "social security",
    "socials", "ssi", "insurance", "insurances", "real estate", "realestate", "property",
    "properties",
];

/// Extract the distinct keywords of a prompt, in order of first occurrence.
///
/// A keyword is a whole word of at least three lowercase ASCII letters that
/// is not a stopword. Word boundaries follow ASCII word characters, so
/// `abc1` or `foo_bar` never yield a keyword.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut keywords: Vec<String> = Vec::new();

    for word in lowered.split(|c: char| !is_word_char(c)) {
        if word.len() < MIN_KEYWORD_LEN || !word.chars().all(|c| c.is_ascii_lowercase()) {
            continue;
        }
        if STOPWORDS.contains(&word) || keywords.iter().any(|existing| existing == word) {
            continue;
        }
        keywords.push(word.to_string());
    }

    keywords
}

pub fn is_finance_term(word: &str) -> bool {
    FINANCE_TERMS.contains(&word)
}

/// The subset of `keywords` that belongs to the finance vocabulary.
pub fn finance_terms(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .filter(|keyword| is_finance_term(keyword))
        .cloned()
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
