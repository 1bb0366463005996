use serde::Deserialize;

use crate::context::{flexible_string, FunctionContext};
use crate::registry::{canned, typed, FunctionCatalog};

use super::{no_request, not_mentioned};

pub const BOOKING_RANGE: &str = "electrician!A1:H1";

const CONFIRMATION_REPLY: &str =
    "Inform the customer that their booking details have been submitted and that you\u{2019}ll \
     need some time to confirm the vendor's availability and service price. Assure them \
     you\u{2019}ll follow up as soon as possible with a final confirmation.";

const BULB_REPLACEMENT_REPLY: &str =
    "Price for Bulbs Replacement: minimum 2 bulbs (RM120) + each additional bulb (RM30)";

const TROUBLESHOOTING_REPLY: &str =
    "Let the customers know that you'll need to check with the vendors first to provide an \
     accurate price.If the issue cannot be diagnosed online, we will recommend a \
     troubleshooting session, which will cost RM150. After evaluating the situation, the \
     vendors will offer a detailed quote for the repair. Ask if they are comfortable \
     proceeding with this process.";

const MEDIA_PROMPT: &str =
    "Ask customers to provide a video or photo of the issue or the location where the \
     installation service is needed to help the vendor assess it more effectively and provide \
     an accurate price quote. Kindly ask them to notify you once they have uploaded the video \
     or image. ";

/// The service address is collected during the conversation but the booking
/// worksheet has no column for it, so it is accepted and dropped here.
#[derive(Debug, Deserialize)]
pub struct ElectricalBooking {
    pub preferred_service_date: String,
    pub preferred_service_time: String,
    pub service_type: String,
    pub issue_description: String,
    pub appliance_or_fixture: String,
    pub property_type: String,
    #[serde(default = "not_mentioned", deserialize_with = "flexible_string")]
    pub customer_budget: String,
    #[serde(default = "no_request")]
    pub additional_request: String,
}

impl ElectricalBooking {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.preferred_service_date.clone(),
            self.preferred_service_time.clone(),
            self.service_type.clone(),
            self.issue_description.clone(),
            self.appliance_or_fixture.clone(),
            self.property_type.clone(),
            self.customer_budget.clone(),
            self.additional_request.clone(),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct ServiceTypeArgs {
    #[serde(default = "default_service_type")]
    service_type: String,
}

fn default_service_type() -> String {
    "Other".to_string()
}

pub fn price_by_service_type(service_type: &str) -> String {
    if service_type == "Bulbs Replacement" {
        BULB_REPLACEMENT_REPLY.to_string()
    } else {
        TROUBLESHOOTING_REPLY.to_string()
    }
}

pub(crate) fn register(catalog: &mut FunctionCatalog, ctx: &FunctionContext) {
    let booking = ctx.booking();
    catalog.register(
        "save_electrical_booking_information",
        typed("save_electrical_booking_information", move |args: ElectricalBooking| {
            let booking = booking.clone();
            async move {
                booking.append(BOOKING_RANGE, args.to_row()).await?;
                Ok(CONFIRMATION_REPLY.to_string())
            }
        }),
    );

    catalog.register(
        "estimate_price_by_electrical_service_type",
        typed("estimate_price_by_electrical_service_type", |args: ServiceTypeArgs| async move {
            Ok(price_by_service_type(&args.service_type))
        }),
    );

    catalog.register("check_electrical_issue_description_complete", canned(MEDIA_PROMPT));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulbs_get_fixed_pricing_and_everything_else_defers() {
        assert!(price_by_service_type("Bulbs Replacement").contains("minimum 2 bulbs (RM120)"));
        assert!(price_by_service_type("Wiring Repair").contains("RM150"));
    }

    #[test]
    fn service_address_is_not_persisted() {
        let args: ElectricalBooking = serde_json::from_value(serde_json::json!({
            "service_address": "12 Jalan Ampang",
            "preferred_service_date": "15-Sep-2026",
            "preferred_service_time": "11:00 AM",
            "service_type": "Installation",
            "issue_description": "Install ceiling fan",
            "appliance_or_fixture": "Ceiling fan",
            "property_type": "Condo",
        }))
        .unwrap();

        let row = args.to_row();
        assert_eq!(row.len(), 8);
        assert!(!row.contains(&"12 Jalan Ampang".to_string()));
    }
}
