use serde::Deserialize;

use crate::context::{flexible_string, FunctionContext};
use crate::registry::{canned, typed, FunctionCatalog};

use super::{no_request_capitalized, not_mentioned_capitalized, VENDOR_AVAILABILITY_REPLY};

pub const BOOKING_RANGE: &str = "locksmith!A1:G1";

const MEDIA_PROMPT: &str =
    "Ask customers to share the video or photo of their door knob or lock, so you can check \
     with the vendor and assess the issue more effectively. Kindly ask them to notify you once \
     they have uploaded the video or image. ";

#[derive(Debug, Deserialize)]
pub struct LocksmithBooking {
    pub service_description: String,
    pub service_type: String,
    pub service_address: String,
    pub preferred_service_date: String,
    pub preferred_service_time: String,
    #[serde(default = "not_mentioned_capitalized", deserialize_with = "flexible_string")]
    pub customer_budget: String,
    #[serde(default = "no_request_capitalized")]
    pub additional_request: String,
}

impl LocksmithBooking {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.service_address.clone(),
            self.preferred_service_date.clone(),
            self.preferred_service_time.clone(),
            self.service_type.clone(),
            self.service_description.clone(),
            self.customer_budget.clone(),
            self.additional_request.clone(),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct UrgentArgs {
    preferred_service_date: String,
}

/// Lockouts are the one urgent flow that still ends in a saved booking, so
/// the reply steers the assistant back to the save function.
pub fn urgent_request_reply(preferred_service_date: &str) -> String {
    format!(
        "Tell the customer that since their requested service on {preferred_service_date} is \
         outside our usual booking window, you will check with the vendors for their \
         availability and will get back to them as soon as you have an update. At the same \
         time, make sure the customer reviews and confirms that the booking details are \
         correct, then save the booking using the 'save_locksmith_booking_details' function."
    )
}

pub(crate) fn register(catalog: &mut FunctionCatalog, ctx: &FunctionContext) {
    let booking = ctx.booking();
    catalog.register(
        "save_locksmith_booking_details",
        typed("save_locksmith_booking_details", move |args: LocksmithBooking| {
            let booking = booking.clone();
            async move {
                booking.append(BOOKING_RANGE, args.to_row()).await?;
                Ok(VENDOR_AVAILABILITY_REPLY.to_string())
            }
        }),
    );

    catalog.register("check_service_description_complete", canned(MEDIA_PROMPT));

    catalog.register(
        "check_urgent_locksmith_service_request",
        typed("check_urgent_locksmith_service_request", |args: UrgentArgs| async move {
            Ok(urgent_request_reply(&args.preferred_service_date))
        }),
    );
}
