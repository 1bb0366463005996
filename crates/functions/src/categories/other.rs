use serde::Deserialize;

use bookly_core::dates;

use crate::advisories::validate_against;
use crate::context::FunctionContext;
use crate::registry::{typed, FunctionCatalog};

use super::no_request;

pub const BOOKING_RANGE: &str = "others!A1:D1";

const CONFIRMATION_REPLY: &str =
    "Inform the customer that their booking details have been successfully submitted and that \
     you will take some time to identify suitable vendors who can address their issue or \
     provide the requested service. Let them know you\u{2019}ll get back to them as soon as \
     possible with a final confirmation.";

const VALID_DATE_REPLY: &str =
    "Inform the customer that you will try to find suitable vendors who can address their \
     issue or provide the requested service. At the same time, continue to gather all other \
     necessary information from the customer.";

#[derive(Debug, Deserialize)]
pub struct OtherServiceBooking {
    pub preferred_service_date: String,
    pub preferred_service_time: String,
    pub service_description: String,
    #[serde(default = "no_request")]
    pub additional_request: String,
}

impl OtherServiceBooking {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.preferred_service_date.clone(),
            self.preferred_service_time.clone(),
            self.service_description.clone(),
            self.additional_request.clone(),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct DateArgs {
    preferred_service_date: String,
}

pub(crate) fn register(catalog: &mut FunctionCatalog, ctx: &FunctionContext) {
    let booking = ctx.booking();
    catalog.register(
        "save_other_service_booking_information",
        typed("save_other_service_booking_information", move |args: OtherServiceBooking| {
            let booking = booking.clone();
            async move {
                booking.append(BOOKING_RANGE, args.to_row()).await?;
                Ok(CONFIRMATION_REPLY.to_string())
            }
        }),
    );

    catalog.register(
        "validate_other_service_date",
        typed("validate_other_service_date", |args: DateArgs| async move {
            Ok(validate_against(
                &dates::OTHER_SERVICES_BOOKING,
                &args.preferred_service_date,
                VALID_DATE_REPLY,
            ))
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_has_no_budget_column() {
        let args: OtherServiceBooking = serde_json::from_value(serde_json::json!({
            "preferred_service_date": "21-Sep-2026",
            "preferred_service_time": "02:00 PM",
            "service_description": "Gutter cleaning",
        }))
        .unwrap();

        assert_eq!(
            args.to_row(),
            vec!["21-Sep-2026", "02:00 PM", "Gutter cleaning", "no request"]
        );
    }
}
