use serde::Deserialize;

use crate::context::{flexible_string, FunctionContext};
use crate::registry::{canned, typed, FunctionCatalog};

use super::{not_mentioned, VENDOR_AVAILABILITY_REPLY};

pub const BOOKING_RANGE: &str = "curtain_making!A1:G1";

const WINDOW_MEDIA_PROMPT: &str =
    "Ask customers to send you the images or videos of the windows or space where the curtains \
     will be installed so that you can share with the vendor. At the same time, continue to \
     gather all other necessary information from the customer.";

#[derive(Debug, Deserialize)]
pub struct CurtainMakingBooking {
    pub curtain_type: String,
    pub window_dimensions: String,
    pub preferred_site_visit_date: String,
    pub preferred_site_visit_time: String,
    #[serde(default = "not_mentioned")]
    pub material_type: String,
    #[serde(default = "not_mentioned")]
    pub additional_features: String,
    #[serde(default = "not_mentioned", deserialize_with = "flexible_string")]
    pub customer_budget: String,
}

impl CurtainMakingBooking {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.preferred_site_visit_date.clone(),
            self.preferred_site_visit_time.clone(),
            self.curtain_type.clone(),
            self.material_type.clone(),
            self.additional_features.clone(),
            self.window_dimensions.clone(),
            self.customer_budget.clone(),
        ]
    }
}

pub(crate) fn register(catalog: &mut FunctionCatalog, ctx: &FunctionContext) {
    let booking = ctx.booking();
    catalog.register(
        "save_curtain_making_booking_information",
        typed("save_curtain_making_booking_information", move |args: CurtainMakingBooking| {
            let booking = booking.clone();
            async move {
                booking.append(BOOKING_RANGE, args.to_row()).await?;
                Ok(VENDOR_AVAILABILITY_REPLY.to_string())
            }
        }),
    );

    catalog.register("is_curtain_type_selected", canned(WINDOW_MEDIA_PROMPT));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_come_after_features() {
        let args: CurtainMakingBooking = serde_json::from_value(serde_json::json!({
            "curtain_type": "Blackout",
            "window_dimensions": "2m x 1.5m",
            "preferred_site_visit_date": "22-Sep-2026",
            "preferred_site_visit_time": "11:00 AM",
        }))
        .unwrap();

        assert_eq!(
            args.to_row(),
            vec![
                "22-Sep-2026",
                "11:00 AM",
                "Blackout",
                "not mentioned",
                "not mentioned",
                "2m x 1.5m",
                "not mentioned",
            ]
        );
    }
}
