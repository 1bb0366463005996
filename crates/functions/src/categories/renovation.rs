use serde::Deserialize;

use bookly_core::dates;

use crate::advisories::{validate_against, GENERAL_VALID_DATE_REPLY};
use crate::context::{flexible_string, FunctionContext};
use crate::registry::{typed, FunctionCatalog};

use super::not_mentioned;

pub const BOOKING_RANGE: &str = "renovation!A1:E1";

const CONFIRMATION_REPLY: &str =
    "Inform the customer that their booking details have been submitted and that you\u{2019}ll \
     need some time to confirm pricing with vendors and check their availability for the \
     requested site inspection date. Let them know you\u{2019}ll get back to them as soon as \
     possible with a final confirmation.";

#[derive(Debug, Deserialize)]
pub struct RenovationBooking {
    pub renovation_location: String,
    pub renovation_description: String,
    pub preferred_site_visit_date: String,
    pub preferred_site_visit_time: String,
    #[serde(default = "not_mentioned", deserialize_with = "flexible_string")]
    pub customer_budget: String,
}

impl RenovationBooking {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.preferred_site_visit_date.clone(),
            self.preferred_site_visit_time.clone(),
            self.renovation_location.clone(),
            self.renovation_description.clone(),
            self.customer_budget.clone(),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct DateArgs {
    preferred_site_visit_date: String,
}

pub(crate) fn register(catalog: &mut FunctionCatalog, ctx: &FunctionContext) {
    let booking = ctx.booking();
    catalog.register(
        "save_renovation_booking_information",
        typed("save_renovation_booking_information", move |args: RenovationBooking| {
            let booking = booking.clone();
            async move {
                booking.append(BOOKING_RANGE, args.to_row()).await?;
                Ok(CONFIRMATION_REPLY.to_string())
            }
        }),
    );

    catalog.register(
        "validate_renovation_service_date",
        typed("validate_renovation_service_date", |args: DateArgs| async move {
            Ok(validate_against(
                &dates::RENOVATION_BOOKING,
                &args.preferred_site_visit_date,
                GENERAL_VALID_DATE_REPLY,
            ))
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_has_five_columns() {
        let args: RenovationBooking = serde_json::from_value(serde_json::json!({
            "renovation_location": "Kitchen",
            "renovation_description": "Replace cabinets and countertop",
            "preferred_site_visit_date": "30-Sep-2026",
            "preferred_site_visit_time": "10:00 AM",
        }))
        .unwrap();

        assert_eq!(
            args.to_row(),
            vec![
                "30-Sep-2026",
                "10:00 AM",
                "Kitchen",
                "Replace cabinets and countertop",
                "not mentioned",
            ]
        );
    }
}
