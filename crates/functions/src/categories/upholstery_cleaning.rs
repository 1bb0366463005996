use serde::Deserialize;

use crate::context::{flexible_string, FunctionContext};
use crate::registry::{canned, typed, FunctionCatalog};

use super::{not_mentioned, PRICING_AND_DATE_REPLY};

pub const BOOKING_RANGE: &str = "upholstery_cleaning!A1:G1";

const MEDIA_PROMPT: &str =
    "Ask customers to share the video or photo of their upholstery, so you can check with the \
     vendor and assess the issue more effectively. Kindly ask them to notify you once they \
     have uploaded the video or image.";

#[derive(Debug, Deserialize)]
pub struct UpholsteryCleaningBooking {
    pub upholstery_type: String,
    pub upholstery_material: String,
    pub upholstery_condition: String,
    pub preferred_service_date: String,
    pub preferred_service_time: String,
    #[serde(default = "not_mentioned", deserialize_with = "flexible_string")]
    pub customer_budget: String,
    #[serde(default = "not_mentioned")]
    pub additional_request: String,
}

impl UpholsteryCleaningBooking {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.preferred_service_date.clone(),
            self.preferred_service_time.clone(),
            self.upholstery_type.clone(),
            self.upholstery_material.clone(),
            self.upholstery_condition.clone(),
            self.customer_budget.clone(),
            self.additional_request.clone(),
        ]
    }
}

pub(crate) fn register(catalog: &mut FunctionCatalog, ctx: &FunctionContext) {
    let booking = ctx.booking();
    catalog.register(
        "save_upholstery_cleaning_booking_information",
        typed(
            "save_upholstery_cleaning_booking_information",
            move |args: UpholsteryCleaningBooking| {
                let booking = booking.clone();
                async move {
                    booking.append(BOOKING_RANGE, args.to_row()).await?;
                    Ok(PRICING_AND_DATE_REPLY.to_string())
                }
            },
        ),
    );

    catalog.register("check_upholstery_description_complete", canned(MEDIA_PROMPT));
}
