use serde::{Deserialize, Serialize};

/// Structured contact fields extracted from one card scan.
///
/// Every field is either a matched string or absent, never a guessed
/// placeholder (the single legacy exception is documented in
/// [`super::legacy`]). `notes` collects residual lines the classifier could
/// not assign anywhere, capped by `ScanConfig::max_notes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactFields {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,

    pub email: Option<String>,
    pub secondary_email: Option<String>,
    pub mobile: Option<String>,
    pub secondary_phone: Option<String>,

    pub company: Option<String>,
    pub job_title: Option<String>,
    pub website: Option<String>,

    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,

    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,

    pub industry: Option<String>,
    pub services: Option<String>,
    pub certifications: Option<String>,

    pub notes: Vec<String>,
}

impl ContactFields {
    /// True when no field at all was assigned (notes do not count).
    pub fn has_no_fields(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.mobile.is_none()
            && self.company.is_none()
            && self.job_title.is_none()
            && self.website.is_none()
            && self.address.is_none()
            && self.secondary_email.is_none()
            && self.secondary_phone.is_none()
            && self.linkedin.is_none()
            && self.twitter.is_none()
            && self.instagram.is_none()
            && self.services.is_none()
            && self.certifications.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_fields() {
        assert!(ContactFields::default().has_no_fields());
    }

    #[test]
    fn notes_do_not_count_as_fields() {
        let fields = ContactFields {
            notes: vec!["leftover".into()],
            ..Default::default()
        };
        assert!(fields.has_no_fields());
    }

    #[test]
    fn any_assigned_field_counts() {
        let fields = ContactFields {
            mobile: Some("9876543210".into()),
            ..Default::default()
        };
        assert!(!fields.has_no_fields());
    }

    #[test]
    fn serializes_absent_fields_as_null() {
        let json = serde_json::to_value(ContactFields::default()).unwrap();
        assert!(json.get("name").unwrap().is_null());
        assert!(json.get("notes").unwrap().as_array().unwrap().is_empty());
    }
}
