use serde::Deserialize;

use crate::context::{flexible_string, FunctionContext};
use crate::registry::{typed, FunctionCatalog};

use super::{no_request, not_mentioned};

pub const BOOKING_RANGE: &str = "plumbing!A1:F1";

const CONFIRMATION_REPLY: &str =
    "Let the customer know that their booking details have been submitted and that you'll need \
     some time to confirm pricing with vendors and check their availability for the requested \
     service date. Let them know you\u{2019}ll get back to them as soon as possible with a \
     final confirmation.";

#[derive(Debug, Deserialize)]
pub struct PlumbingBooking {
    pub preferred_service_date: String,
    pub preferred_service_time: String,
    pub property_type: String,
    pub service_description: String,
    #[serde(default = "not_mentioned", deserialize_with = "flexible_string")]
    pub customer_budget: String,
    #[serde(default = "no_request")]
    pub additional_request: String,
}

impl PlumbingBooking {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.preferred_service_date.clone(),
            self.preferred_service_time.clone(),
            self.service_description.clone(),
            self.property_type.clone(),
            self.customer_budget.clone(),
            self.additional_request.clone(),
        ]
    }
}

pub(crate) fn register(catalog: &mut FunctionCatalog, ctx: &FunctionContext) {
    let booking = ctx.booking();
    catalog.register(
        "save_plumbing_booking_information",
        typed("save_plumbing_booking_information", move |args: PlumbingBooking| {
            let booking = booking.clone();
            async move {
                booking.append(BOOKING_RANGE, args.to_row()).await?;
                Ok(CONFIRMATION_REPLY.to_string())
            }
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_precedes_property_type_in_row() {
        let args: PlumbingBooking = serde_json::from_value(serde_json::json!({
            "preferred_service_date": "12-Sep-2026",
            "preferred_service_time": "02:00 PM",
            "property_type": "Landed house",
            "service_description": "Leaking kitchen sink",
            "customer_budget": 200,
        }))
        .unwrap();

        assert_eq!(
            args.to_row(),
            vec![
                "12-Sep-2026",
                "02:00 PM",
                "Leaking kitchen sink",
                "Landed house",
                "200",
                "no request",
            ]
        );
    }
}
