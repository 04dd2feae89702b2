//! Deterministic naming for published advertising objects.
//!
//! Creative and ad display names, the tracked call-to-action message,
//! and the tracking id are all derived from the package's external
//! catalog id so that re-publishing the same key produces the same
//! names and inbound replies can be attributed without a mapping table.

use crate::types::DbId;

/// Display name for a creative or ad.
///
/// Convention: `{title} - {external_id} - V{variant}`
///
/// # Examples
///
/// ```
/// use volare_core::naming::display_name;
///
/// assert_eq!(display_name("Lisbon Getaway", 9001, 2), "Lisbon Getaway - 9001 - V2");
/// ```
pub fn display_name(title: &str, external_id: DbId, variant: i16) -> String {
    format!("{title} - {external_id} - V{variant}")
}

/// Call-to-action message template embedding the external catalog id.
///
/// The id in the message is what lets an inbound reply be traced back
/// to the package. Fixed format, not editable per call.
pub fn cta_message(external_id: DbId) -> String {
    format!("Hi! I'd like to know more about package {external_id}.")
}

/// Tracking id attached to the composite creative.
pub fn tracking_id(external_id: DbId, variant: i16) -> String {
    format!("pkg-{external_id}-v{variant}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_format() {
        assert_eq!(
            display_name("Lisbon Getaway", 9001, 1),
            "Lisbon Getaway - 9001 - V1"
        );
    }

    #[test]
    fn display_name_is_deterministic() {
        assert_eq!(
            display_name("Porto Nights", 42, 3),
            display_name("Porto Nights", 42, 3)
        );
    }

    #[test]
    fn cta_embeds_external_id() {
        assert!(cta_message(9001).contains("9001"));
    }

    #[test]
    fn tracking_id_format() {
        assert_eq!(tracking_id(9001, 5), "pkg-9001-v5");
    }
}
