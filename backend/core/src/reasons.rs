//! Reason-code vocabularies the model is instructed to answer with.
//!
//! The vocabularies live in the prompt only. Nothing rejects a code the model
//! invents; callers use [`ReasonVocabulary::contains`] to flag it.

use crate::types::LocationType;

pub const PRESENCE_OF_FACES: &str = "PRESENCE_OF_FACES";
pub const PRESENCE_OF_CAR_LICENCES: &str = "PRESENCE_OF_CAR_LICENCES";
pub const WRONG_LOCATION: &str = "WRONG_LOCATION";

/// Codes used when a location type was supplied.
pub const SITE_REASONS: &[&str] = &[PRESENCE_OF_FACES, PRESENCE_OF_CAR_LICENCES, WRONG_LOCATION];

/// Codes used for the generic content-safety check.
pub const CONTENT_REASONS: &[&str] = &[
    "PRESENCE_OF_SEXUAL_CONTENT",
    "PRESENCE_OF_HATEFUL_CONTENT",
    "PRESENCE_OF_HARASSING_CONTENT",
    "PRESENCE_OF_VIOLENT_CONTENT",
    "PRESENCE_OF_GRAPHIC_CONTENT",
    "PRESENCE_OF_THREATENING_CONTENT",
    "PRESENCE_OF_POLITICAL_CONTENT",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonVocabulary {
    Site,
    Content,
}

impl ReasonVocabulary {
    pub fn for_location(location: Option<&LocationType>) -> Self {
        match location {
            Some(_) => ReasonVocabulary::Site,
            None => ReasonVocabulary::Content,
        }
    }

    pub fn codes(self) -> &'static [&'static str] {
        match self {
            ReasonVocabulary::Site => SITE_REASONS,
            ReasonVocabulary::Content => CONTENT_REASONS,
        }
    }

    pub fn contains(self, code: &str) -> bool {
        self.codes().contains(&code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_selects_site_vocabulary() {
        let loc = LocationType::parse(Some("exterior"));
        assert_eq!(ReasonVocabulary::for_location(loc.as_ref()), ReasonVocabulary::Site);
        assert_eq!(ReasonVocabulary::for_location(None), ReasonVocabulary::Content);
    }

    #[test]
    fn vocabularies_are_disjoint() {
        for code in SITE_REASONS {
            assert!(!ReasonVocabulary::Content.contains(code));
        }
        assert_eq!(CONTENT_REASONS.len(), 7);
    }
}
