//! Priority-ordered field assignment.
//!
//! Extraction walks the classified lines in a fixed field order (email,
//! phone, website, job title, company, name, address), consuming each line
//! it assigns. A consumed line is excluded from every later search, so the
//! pass is a single linear allocation of lines to fields and no line can
//! back two fields. A relaxed second pass re-attempts name and company with
//! loosened constraints, only when the strict pass found nothing; whatever
//! is still unassigned afterwards becomes `notes`, capped.

use std::sync::LazyLock;

use regex::Regex;

use super::classify::{classify_line, LineCategory, EMAIL_RE, PHONE_RE, PIN_RE, URL_RE};
use super::types::ContactFields;
use super::vocab;
use crate::config::ScanConfig;

static SPACED_AT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*@\s*").unwrap());
static SPACED_DOT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\.\s*").unwrap());

/// `wwwsitecom`: a www-prefixed token whose dots the OCR dropped.
static FUSED_WWW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^www\.?([a-z0-9-]+?)\.?(com|net|org|io|co|in|biz)$").unwrap()
});

/// US-style state + zip tail ("CA 90210"), used for address components.
static STATE_ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{2})\s+(\d{5})\b").unwrap());

static COUNTRY_NAMES: &[&str] = &["india", "usa", "united states", "uk", "singapore", "uae", "australia", "canada"];

static INDUSTRY_KEYWORDS: &[&str] = &[
    "electronics", "textiles", "pharmaceuticals", "automotive", "construction",
    "hospitality", "logistics", "software", "hardware", "furniture", "packaging",
];

/// Convert fused multi-line OCR text into a structured field map.
pub fn extract_fields(text: &str, config: &ScanConfig) -> ContactFields {
    Extractor::new(text).run(config)
}

struct Extractor<'a> {
    lines: Vec<&'a str>,
    categories: Vec<LineCategory>,
    used: Vec<bool>,
    fields: ContactFields,
}

impl<'a> Extractor<'a> {
    fn new(text: &'a str) -> Self {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let categories = lines.iter().map(|l| classify_line(l)).collect();
        let used = vec![false; lines.len()];
        Self {
            lines,
            categories,
            used,
            fields: ContactFields::default(),
        }
    }

    fn run(mut self, config: &ScanConfig) -> ContactFields {
        self.discard_labels();
        self.extract_emails();
        self.extract_phones();
        self.extract_websites();
        self.extract_job_title();
        self.extract_company();
        self.extract_name();
        self.extract_address();

        // Relaxed second pass: recall over precision, and only when the
        // strict pass came up empty for the field.
        if self.fields.name.is_none() {
            self.relaxed_name();
        }
        if self.fields.company.is_none() {
            self.relaxed_company();
        }

        self.extract_supplements();
        self.collect_notes(config.max_notes);
        self.fields
    }

    fn unused_with(&self, category: LineCategory) -> Vec<usize> {
        (0..self.lines.len())
            .filter(|&i| !self.used[i] && self.categories[i] == category)
            .collect()
    }

    fn take(&mut self, i: usize) -> &'a str {
        self.used[i] = true;
        self.lines[i]
    }

    fn discard_labels(&mut self) {
        for i in self.unused_with(LineCategory::Label) {
            self.take(i);
        }
    }

    fn extract_emails(&mut self) {
        for i in self.unused_with(LineCategory::Email) {
            if self.fields.email.is_some() && self.fields.secondary_email.is_some() {
                break;
            }
            let Some(email) = repair_email(self.lines[i]) else {
                continue;
            };
            self.take(i);
            if self.fields.email.is_none() {
                self.fields.email = Some(email);
            } else {
                self.fields.secondary_email = Some(email);
            }
        }
    }

    fn extract_phones(&mut self) {
        for i in self.unused_with(LineCategory::Phone) {
            if self.fields.mobile.is_some() && self.fields.secondary_phone.is_some() {
                break;
            }
            let Some(m) = PHONE_RE.find(self.lines[i]) else {
                continue;
            };
            let number = normalize_phone(m.as_str());
            self.take(i);
            if self.fields.mobile.is_none() {
                self.fields.mobile = Some(number);
            } else {
                self.fields.secondary_phone = Some(number);
            }
        }
    }

    fn extract_websites(&mut self) {
        for i in self.unused_with(LineCategory::Website) {
            let Some(url) = repair_website(self.lines[i]) else {
                continue;
            };
            let lower = url.to_lowercase();
            if lower.contains("linkedin") {
                if self.fields.linkedin.is_none() {
                    self.take(i);
                    self.fields.linkedin = Some(url);
                }
            } else if lower.contains("twitter") || lower.contains("//x.com") {
                if self.fields.twitter.is_none() {
                    self.take(i);
                    self.fields.twitter = Some(url);
                }
            } else if lower.contains("instagram") {
                if self.fields.instagram.is_none() {
                    self.take(i);
                    self.fields.instagram = Some(url);
                }
            } else if self.fields.website.is_none() {
                self.take(i);
                self.fields.website = Some(url);
            }
        }
    }

    fn extract_job_title(&mut self) {
        if let Some(&i) = self.unused_with(LineCategory::JobTitle).first() {
            let line = self.take(i);
            self.fields.job_title = Some(line.to_string());
        }
    }

    fn extract_company(&mut self) {
        let Some(&i) = self.unused_with(LineCategory::Company).first() else {
            return;
        };
        let mut company = self.take(i).to_string();

        if is_descriptor_only(&company)
            && i > 0
            && !self.used[i - 1]
            && self.categories[i - 1] == LineCategory::Unknown
        {
            // "InnovateTech" / "Business Services" split across two lines:
            // the descriptor line pulls the organization name above it in.
            let prefix = self.take(i - 1);
            company = format!("{prefix} {company}");
        } else if i + 1 < self.lines.len()
            && !self.used[i + 1]
            && is_descriptor_continuation(self.lines[i + 1])
        {
            let suffix = self.take(i + 1);
            company = format!("{company} {suffix}");
        }

        self.fields.company = Some(company);
    }

    fn extract_name(&mut self) {
        if let Some(&i) = self.unused_with(LineCategory::Name).first() {
            self.assign_name(i);
        }
    }

    fn assign_name(&mut self, i: usize) {
        let name = self.take(i).to_string();
        let parts: Vec<&str> = name.split_whitespace().collect();
        match parts.as_slice() {
            [first] => {
                self.fields.first_name = Some((*first).to_string());
            }
            [first, last] => {
                self.fields.first_name = Some((*first).to_string());
                self.fields.last_name = Some((*last).to_string());
            }
            [first, middle @ .., last] => {
                self.fields.first_name = Some((*first).to_string());
                self.fields.middle_name = Some(middle.join(" "));
                self.fields.last_name = Some((*last).to_string());
            }
            [] => {}
        }
        self.fields.name = Some(name);
    }

    fn extract_address(&mut self) {
        let Some(&i) = self.unused_with(LineCategory::Address).first() else {
            return;
        };
        let mut parts = vec![self.take(i)];

        // Merge forward while following lines still read as locality:
        // a known city name or a 6-digit postal code.
        let mut j = i + 1;
        while j < self.lines.len()
            && !self.used[j]
            && (vocab::find_city(self.lines[j]).is_some() || PIN_RE.is_match(self.lines[j]))
        {
            parts.push(self.take(j));
            j += 1;
        }

        let address = parts.join(", ");

        if let Some(city) = vocab::find_city(&address) {
            self.fields.city = Some(capitalize(city));
        }
        if let Some(pin) = PIN_RE.find(&address) {
            self.fields.postal_code = Some(pin.as_str().to_string());
        }
        if let Some(caps) = STATE_ZIP_RE.captures(&address) {
            self.fields.state = Some(caps[1].to_string());
            if self.fields.postal_code.is_none() {
                self.fields.postal_code = Some(caps[2].to_string());
            }
        }
        let lower = address.to_lowercase();
        if let Some(country) = COUNTRY_NAMES.iter().find(|c| lower.contains(*c)) {
            self.fields.country = Some(capitalize(country));
        }

        self.fields.address = Some(address);
    }

    /// Loosened name detection: 2-3 alphabetic words, any casing, no
    /// business vocabulary, still never a non-card token line.
    fn relaxed_name(&mut self) {
        for i in self.unused_with(LineCategory::Unknown) {
            let line = self.lines[i];
            let words: Vec<&str> = line.split_whitespace().collect();
            let alphabetic = words.iter().all(|w| {
                w.chars().all(|c| c.is_alphabetic() || c == '.' || c == '\'' || c == '-')
            });
            if (2..=3).contains(&words.len())
                && alphabetic
                && !vocab::is_non_card_line(line)
                && !has_business_vocabulary(line)
            {
                self.assign_name(i);
                return;
            }
        }
    }

    /// Loosened company detection: a short leftover line with a substantial
    /// capitalized token.
    fn relaxed_company(&mut self) {
        for i in self.unused_with(LineCategory::Unknown) {
            let line = self.lines[i];
            let words: Vec<&str> = line.split_whitespace().collect();
            let has_capitalized_token = words
                .iter()
                .any(|w| w.len() >= 3 && w.chars().next().is_some_and(|c| c.is_uppercase()));
            if (1..=4).contains(&words.len())
                && has_capitalized_token
                && !vocab::is_non_card_line(line)
            {
                let line = self.take(i);
                self.fields.company = Some(line.to_string());
                return;
            }
        }
    }

    /// Keyword supplements for the extended schema: services/dealer lines
    /// and certification mentions, recognized before falling through to
    /// notes.
    fn extract_supplements(&mut self) {
        for i in 0..self.lines.len() {
            if self.used[i] {
                continue;
            }
            let lower = self.lines[i].to_lowercase();

            if self.fields.certifications.is_none()
                && (lower.contains("iso ") || lower.contains("certified"))
            {
                let line = self.take(i);
                self.fields.certifications = Some(line.to_string());
                continue;
            }

            if self.fields.services.is_none()
                && ["dealers in", "deals in", "suppliers of", "specialists in", "all types of"]
                    .iter()
                    .any(|kw| lower.contains(kw))
            {
                if let Some(keyword) = INDUSTRY_KEYWORDS.iter().find(|k| lower.contains(*k)) {
                    self.fields.industry = Some(capitalize(keyword));
                }
                let line = self.take(i);
                self.fields.services = Some(line.to_string());
            }
        }
    }

    fn collect_notes(&mut self, max_notes: usize) {
        for i in 0..self.lines.len() {
            if self.used[i] {
                continue;
            }
            if self.fields.notes.len() >= max_notes {
                break;
            }
            let line = self.take(i);
            self.fields.notes.push(line.to_string());
        }
    }
}

fn has_business_vocabulary(line: &str) -> bool {
    vocab::has_job_title_word(line)
        || vocab::has_company_suffix(line)
        || vocab::has_business_descriptor(line)
        || vocab::has_address_word(line)
        || vocab::find_city(line).is_some()
}

/// Every alphabetic token is a descriptor or legal suffix, meaning the line
/// is a trailing company descriptor rather than a full company name.
fn is_descriptor_only(line: &str) -> bool {
    let mut any = false;
    for token in line
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty() && t.chars().any(|c| c.is_alphabetic()))
    {
        any = true;
        if !vocab::BUSINESS_DESCRIPTORS.contains(&token) && !vocab::COMPANY_SUFFIXES.contains(&token)
        {
            return false;
        }
    }
    any
}

fn is_descriptor_continuation(line: &str) -> bool {
    line.split_whitespace().count() <= 3
        && vocab::has_business_descriptor(line)
        && !vocab::has_job_title_word(line)
}

/// Collapse OCR whitespace around `@` and dots, then pull the address.
pub(crate) fn repair_email(line: &str) -> Option<String> {
    let compact = SPACED_AT_RE.replace_all(line, "@");
    let compact = SPACED_DOT_RE.replace_all(&compact, ".");
    EMAIL_RE.find(&compact).map(|m| m.as_str().to_string())
}

/// Pull a URL-ish token, restore dots the OCR dropped, normalize the scheme.
pub(crate) fn repair_website(line: &str) -> Option<String> {
    let token = line
        .split_whitespace()
        .find(|t| {
            let lower = t.to_lowercase();
            lower.starts_with("www") || lower.contains("http") || URL_RE.is_match(&lower)
        })?
        .trim_matches(|c: char| matches!(c, ',' | ';' | ')' | '('));

    let mut url = token.to_string();
    if let Some(caps) = FUSED_WWW_RE.captures(&url.to_lowercase()) {
        url = format!("www.{}.{}", &caps[1], &caps[2]);
    }
    if !url.to_lowercase().starts_with("http") {
        url = format!("https://{url}");
    }
    Some(url)
}

pub(crate) fn normalize_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> ContactFields {
        extract_fields(text, &ScanConfig::default())
    }

    #[test]
    fn clean_card_round_trip() {
        let fields = extract(
            "Rahul Sharma\nAcme Widgets Pvt Ltd\nrahul@acmewidgets.com\n9876543210\nwww.acmewidgets.com",
        );
        assert_eq!(fields.name.as_deref(), Some("Rahul Sharma"));
        assert_eq!(fields.company.as_deref(), Some("Acme Widgets Pvt Ltd"));
        assert_eq!(fields.email.as_deref(), Some("rahul@acmewidgets.com"));
        assert_eq!(fields.mobile.as_deref(), Some("9876543210"));
        assert_eq!(
            fields.website.as_deref(),
            Some("https://www.acmewidgets.com")
        );
        assert!(fields.job_title.is_none());
        assert!(fields.address.is_none());
        assert!(fields.notes.is_empty(), "notes: {:?}", fields.notes);
    }

    #[test]
    fn full_scenario_card() {
        let fields = extract(
            "Sarah Johnson\nMarketing Director\nInnovateTech Solutions\nsarah.johnson@innovatetech.com\n+1-555-987-6543\nwww.innovatetech.com\n456 Innovation Ave, Tech City, CA 90210",
        );
        assert_eq!(fields.name.as_deref(), Some("Sarah Johnson"));
        assert_eq!(fields.job_title.as_deref(), Some("Marketing Director"));
        assert!(fields.company.as_deref().unwrap().contains("InnovateTech Solutions"));
        assert_eq!(
            fields.email.as_deref(),
            Some("sarah.johnson@innovatetech.com")
        );
        assert!(fields.mobile.as_deref().unwrap().contains("5559876543"));
        assert!(fields.website.as_deref().unwrap().starts_with("https://"));
        assert!(fields.address.as_deref().unwrap().contains("456 Innovation Ave"));
        assert_eq!(fields.state.as_deref(), Some("CA"));
        assert_eq!(fields.postal_code.as_deref(), Some("90210"));
        assert_eq!(fields.first_name.as_deref(), Some("Sarah"));
        assert_eq!(fields.last_name.as_deref(), Some("Johnson"));
    }

    #[test]
    fn phone_only_populates_only_mobile() {
        let fields = extract("9876543210");
        assert_eq!(fields.mobile.as_deref(), Some("9876543210"));
        assert!(fields.name.is_none(), "name must not default to the phone line");
        assert!(fields.email.is_none());
        assert!(fields.company.is_none());
        assert!(fields.website.is_none());
        assert!(fields.address.is_none());
        assert!(fields.notes.is_empty());
    }

    #[test]
    fn no_line_feeds_two_fields() {
        let fields = extract(
            "Director of Operations, Acme Pvt Ltd\nRavi Kumar\nravi@acme.in\n9876543210",
        );
        // The combined title/company line has a job-title word, so the
        // classifier routes it to job_title; company must not reuse it.
        assert_eq!(
            fields.job_title.as_deref(),
            Some("Director of Operations, Acme Pvt Ltd")
        );
        assert!(fields.company.is_none());
        assert_eq!(fields.name.as_deref(), Some("Ravi Kumar"));
    }

    #[test]
    fn consumed_lines_partition_across_fields() {
        let text = "Ravi Kumar\nDirector\nAcme Pvt Ltd\nravi@acme.in\n9876543210\nwww.acme.in\nMG Road Bangalore 560001\nassorted leftovers here maybe";
        let fields = extract(text);
        let assigned: Vec<&str> = [
            fields.name.as_deref(),
            fields.job_title.as_deref(),
            fields.company.as_deref(),
            fields.address.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();

        for line in text.lines() {
            let hits = assigned.iter().filter(|v| v.contains(line)).count();
            assert!(hits <= 1, "line {line:?} appears in {hits} fields");
        }
        assert_eq!(fields.notes, vec!["assorted leftovers here maybe"]);
    }

    #[test]
    fn label_lines_are_discarded_not_noted() {
        let fields = extract("Email:\nsarah@acme.com\nPhone:\n9876543210");
        assert_eq!(fields.email.as_deref(), Some("sarah@acme.com"));
        assert_eq!(fields.mobile.as_deref(), Some("9876543210"));
        assert!(fields.notes.is_empty());
    }

    #[test]
    fn spaced_out_email_is_repaired() {
        let fields = extract("sarah . johnson @ innovatetech . com");
        assert_eq!(
            fields.email.as_deref(),
            Some("sarah.johnson@innovatetech.com")
        );
    }

    #[test]
    fn fused_website_is_repaired() {
        assert_eq!(
            repair_website("wwwsitecom").as_deref(),
            Some("https://www.site.com")
        );
        let fields = extract("wwwinnovatetechcom");
        assert_eq!(
            fields.website.as_deref(),
            Some("https://www.innovatetech.com")
        );
    }

    #[test]
    fn second_email_and_phone_fill_secondary_slots() {
        let fields = extract(
            "sales@acme.in\nsupport@acme.in\n+91 98765 43210\n080 4012 3456",
        );
        assert_eq!(fields.email.as_deref(), Some("sales@acme.in"));
        assert_eq!(fields.secondary_email.as_deref(), Some("support@acme.in"));
        assert_eq!(fields.mobile.as_deref(), Some("+919876543210"));
        assert_eq!(fields.secondary_phone.as_deref(), Some("08040123456"));
    }

    #[test]
    fn company_descriptor_merges_backward() {
        let fields = extract("Meridian\nBusiness Services\nRavi Kumar");
        assert_eq!(
            fields.company.as_deref(),
            Some("Meridian Business Services")
        );
        assert_eq!(fields.name.as_deref(), Some("Ravi Kumar"));
    }

    #[test]
    fn company_short_descriptor_merges_forward() {
        let fields = extract("Acme Widgets Pvt Ltd\nTrading Solutions\nRavi Kumar");
        assert_eq!(
            fields.company.as_deref(),
            Some("Acme Widgets Pvt Ltd Trading Solutions")
        );
        assert_eq!(fields.name.as_deref(), Some("Ravi Kumar"));
    }

    #[test]
    fn long_lines_do_not_merge_into_company() {
        let fields = extract("Acme Widgets Pvt Ltd\nTotal Logistics Solutions ride along");
        // Second line has too many words to be a descriptor continuation.
        assert_eq!(fields.company.as_deref(), Some("Acme Widgets Pvt Ltd"));
    }

    #[test]
    fn address_merges_forward_on_city_or_pin() {
        let fields = extract("Plot 12, Industrial Estate\nBangalore 560001\nRavi Kumar");
        let address = fields.address.unwrap();
        assert!(address.contains("Plot 12"));
        assert!(address.contains("Bangalore 560001"));
        assert_eq!(fields.city.as_deref(), Some("Bangalore"));
        assert_eq!(fields.postal_code.as_deref(), Some("560001"));
        assert_eq!(fields.name.as_deref(), Some("Ravi Kumar"));
    }

    #[test]
    fn address_does_not_merge_unrelated_lines() {
        let fields = extract("12 Station Road\nquality first always promise");
        assert_eq!(fields.address.as_deref(), Some("12 Station Road"));
        assert_eq!(fields.notes, vec!["quality first always promise"]);
    }

    #[test]
    fn relaxed_name_pass_rescues_lowercase_names() {
        let fields = extract("ravi kumar\nravi@acme.in");
        assert_eq!(fields.name.as_deref(), Some("ravi kumar"));
    }

    #[test]
    fn relaxed_passes_skip_keyboard_tokens() {
        let fields = extract("Caps Lock\n9876543210");
        assert!(fields.name.is_none());
        assert_eq!(fields.mobile.as_deref(), Some("9876543210"));
        // The keyboard line may survive as a note, but never as a name.
        assert!(fields.company.is_none());
    }

    #[test]
    fn notes_are_capped() {
        let text = (0..10)
            .map(|i| format!("leftover miscellaneous blurb number {i} of many"))
            .collect::<Vec<_>>()
            .join("\n");
        let fields = extract(&text);
        assert_eq!(fields.notes.len(), ScanConfig::default().max_notes);
    }

    #[test]
    fn social_handles_split_from_website() {
        let fields = extract(
            "www.acme.in\nlinkedin.com/in/ravikumar\ntwitter.com/ravikumar",
        );
        assert_eq!(fields.website.as_deref(), Some("https://www.acme.in"));
        assert!(fields.linkedin.as_deref().unwrap().contains("linkedin.com/in/ravikumar"));
        assert!(fields.twitter.as_deref().unwrap().contains("twitter.com"));
    }

    #[test]
    fn services_and_certifications_supplements() {
        let fields = extract(
            "Acme Traders\nDealers in electronics and appliances\nISO 9001 Certified",
        );
        assert!(fields.services.as_deref().unwrap().contains("Dealers in"));
        assert_eq!(fields.industry.as_deref(), Some("Electronics"));
        assert!(fields.certifications.as_deref().unwrap().contains("ISO 9001"));
    }

    #[test]
    fn name_split_populates_parts() {
        let fields = extract("Ravi S. Kumar\nravi@acme.in");
        assert_eq!(fields.first_name.as_deref(), Some("Ravi"));
        assert_eq!(fields.middle_name.as_deref(), Some("S."));
        assert_eq!(fields.last_name.as_deref(), Some("Kumar"));
    }

    #[test]
    fn empty_text_yields_empty_fields() {
        let fields = extract("");
        assert!(fields.has_no_fields());
        assert!(fields.notes.is_empty());
    }
}
