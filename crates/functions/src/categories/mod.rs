//! One module per service category. Each registers its booking writer and
//! any category-specific estimators or validators, mirroring the function
//! names the assistants call.

pub mod aircon_cleaning;
pub mod aircon_installation;
pub mod aircon_troubleshooting;
pub mod appliance_repair;
pub mod curtain_making;
pub mod electrical;
pub mod home_cleaning;
pub mod laundry;
pub mod locksmith;
pub mod other;
pub mod pest_control;
pub mod plumbing;
pub mod renovation;
pub mod upholstery_cleaning;

/// Confirmation sent after the two cleaning bookings that pre-date the
/// instruction-style replies used everywhere else.
pub(crate) const THANK_YOU_REPLY: &str =
    "Thank you for confirming the details. We will check vendor availability and get back to \
     you as soon as possible with a final confirmation.";

pub(crate) const PRICING_AND_DATE_REPLY: &str =
    "Inform the customer that their booking details have been submitted and that you\u{2019}ll \
     need some time to confirm pricing with vendors and check their availability for the \
     requested service date. Let them know you\u{2019}ll get back to them as soon as possible \
     with a final confirmation.";

pub(crate) const VENDOR_AVAILABILITY_REPLY: &str =
    "Inform the customer that their booking details have been submitted and that you\u{2019}ll \
     need some time to check the vendor\u{2019}s availability. Let them know you\u{2019}ll get \
     back to them as soon as possible with a final confirmation.";

pub(crate) fn not_mentioned() -> String {
    "not mentioned".to_string()
}

pub(crate) fn no_request() -> String {
    "no request".to_string()
}

pub(crate) fn not_mentioned_capitalized() -> String {
    "Not mentioned".to_string()
}

pub(crate) fn no_request_capitalized() -> String {
    "No request".to_string()
}

pub(crate) fn unknown() -> String {
    "Unknown".to_string()
}

/// Price cells hold ranges like `RM100-150`. A span across several rows
/// keeps the low end of the first range and the high end of the last.
pub(crate) fn range_low(cell: &str) -> &str {
    cell.split('-').next().unwrap_or(cell).trim()
}

pub(crate) fn range_high(cell: &str) -> &str {
    cell.splitn(2, '-').nth(1).unwrap_or(cell).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_parts_split_on_first_dash() {
        assert_eq!(range_low("RM100-150"), "RM100");
        assert_eq!(range_high("RM200-250"), "250");
        assert_eq!(range_low("RM80"), "RM80");
        assert_eq!(range_high("RM80"), "RM80");
    }
}
