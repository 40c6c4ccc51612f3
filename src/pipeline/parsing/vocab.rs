//! Business vocabulary shared by the fuzzy corrector, the domain confidence
//! model, and the line classifier.
//!
//! All entries are lowercase; callers lowercase before matching.

/// Legal-form suffixes that mark a line as a company name.
pub const COMPANY_SUFFIXES: &[&str] = &[
    "pvt", "ltd", "limited", "llp", "llc", "inc", "incorporated", "corp",
    "corporation", "co", "company", "enterprises", "enterprise", "industries",
    "group", "holdings", "ventures",
];

/// Descriptor words that commonly trail an organization name
/// ("Acme Business Services", "InnovateTech Solutions").
pub const BUSINESS_DESCRIPTORS: &[&str] = &[
    "solutions", "services", "technologies", "technology", "systems",
    "consultancy", "consulting", "associates", "agency", "studio", "labs",
    "software", "infotech", "international", "global", "traders", "exports",
    "imports", "logistics", "engineering", "constructions", "developers",
    "marketing", "media", "digital", "business",
];

/// Words that mark a line as a job title.
pub const JOB_TITLE_WORDS: &[&str] = &[
    "director", "manager", "engineer", "executive", "officer", "president",
    "founder", "cofounder", "co-founder", "ceo", "cto", "cfo", "coo", "cmo",
    "chairman", "chairperson", "consultant", "head", "lead", "specialist",
    "analyst", "developer", "designer", "architect", "partner", "proprietor",
    "supervisor", "coordinator", "administrator", "advisor", "accountant",
    "auditor", "secretary", "scientist", "strategist", "principal",
];

/// Street/locality components for address detection.
pub const ADDRESS_WORDS: &[&str] = &[
    "road", "street", "avenue", "ave", "lane", "floor", "building", "block",
    "plot", "sector", "nagar", "colony", "complex", "tower", "plaza",
    "market", "industrial", "estate", "cross", "main", "layout", "phase",
    "suite", "apartment", "house", "near", "opposite", "opp", "behind",
    "district", "tehsil", "po", "ward",
];

/// City names recognized during address merging and vocabulary scoring.
pub const CITY_NAMES: &[&str] = &[
    "mumbai", "delhi", "bangalore", "bengaluru", "chennai", "hyderabad",
    "pune", "kolkata", "ahmedabad", "jaipur", "surat", "lucknow", "kanpur",
    "nagpur", "indore", "bhopal", "patna", "noida", "gurgaon", "gurugram",
    "chandigarh", "kochi", "coimbatore", "vadodara", "ludhiana", "mysore",
    "visakhapatnam", "thane", "nashik", "rajkot", "london", "singapore",
    "dubai", "sydney", "toronto",
];

/// Tokens that appear in noisy OCR of card surroundings (keyboard keys,
/// scanner chrome) and must never be taken for a person name.
pub const NON_CARD_TOKENS: &[&str] = &[
    "shift", "enter", "return", "ctrl", "control", "alt", "tab", "escape",
    "esc", "backspace", "delete", "insert", "home", "end", "pause", "caps",
    "lock", "capslock", "numlock", "scroll", "pgup", "pgdn", "fn", "spacebar",
    "space", "print", "menu",
];

/// Words eligible as fuzzy-correction targets: single words of three or
/// more characters drawn from the company/title/address/city lists.
pub fn correction_vocabulary() -> impl Iterator<Item = &'static str> {
    COMPANY_SUFFIXES
        .iter()
        .chain(BUSINESS_DESCRIPTORS.iter())
        .chain(JOB_TITLE_WORDS.iter())
        .chain(ADDRESS_WORDS.iter())
        .chain(CITY_NAMES.iter())
        .copied()
        .filter(|w| w.len() >= 3 && !w.contains(' ') && !w.contains('-'))
}

fn word_in(line: &str, words: &[&str]) -> bool {
    line.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| words.contains(&token))
}

pub fn has_company_suffix(line: &str) -> bool {
    word_in(line, COMPANY_SUFFIXES)
}

pub fn has_business_descriptor(line: &str) -> bool {
    word_in(line, BUSINESS_DESCRIPTORS)
}

pub fn has_job_title_word(line: &str) -> bool {
    word_in(line, JOB_TITLE_WORDS)
}

pub fn has_address_word(line: &str) -> bool {
    word_in(line, ADDRESS_WORDS)
}

/// First known city mentioned in the line, if any.
pub fn find_city(line: &str) -> Option<&'static str> {
    let lower = line.to_lowercase();
    CITY_NAMES
        .iter()
        .find(|city| {
            lower
                .split(|c: char| !c.is_alphabetic())
                .any(|token| token == **city)
        })
        .copied()
}

/// Whether the whole line is nothing but known non-card tokens
/// ("Shift", "Caps Lock"). Case-insensitive.
pub fn is_non_card_line(line: &str) -> bool {
    let mut tokens = line
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|t| !t.is_empty())
        .peekable();
    if tokens.peek().is_none() {
        return false;
    }
    tokens.all(|t| NON_CARD_TOKENS.contains(&t.as_str()))
}
