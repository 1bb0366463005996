use serde::Deserialize;

use crate::context::{flexible_string, FunctionContext};
use crate::registry::{typed, FunctionCatalog};

use super::{no_request, not_mentioned, PRICING_AND_DATE_REPLY};

pub const BOOKING_RANGE: &str = "ac_troubleshooting!A1:H1";

#[derive(Debug, Deserialize)]
pub struct AcTroubleshootingBooking {
    pub preferred_service_date: String,
    pub preferred_service_time: String,
    pub issue_description: String,
    pub ac_type: String,
    pub ac_brand: String,
    #[serde(default = "not_mentioned")]
    pub ac_model: String,
    #[serde(default = "not_mentioned", deserialize_with = "flexible_string")]
    pub customer_budget: String,
    #[serde(default = "no_request")]
    pub additional_request: String,
}

impl AcTroubleshootingBooking {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.preferred_service_date.clone(),
            self.preferred_service_time.clone(),
            self.issue_description.clone(),
            self.ac_type.clone(),
            self.ac_brand.clone(),
            self.ac_model.clone(),
            self.customer_budget.clone(),
            self.additional_request.clone(),
        ]
    }
}

pub(crate) fn register(catalog: &mut FunctionCatalog, ctx: &FunctionContext) {
    let booking = ctx.booking();
    catalog.register(
        "save_ac_troubleshooting_booking_details",
        typed("save_ac_troubleshooting_booking_details", move |args: AcTroubleshootingBooking| {
            let booking = booking.clone();
            async move {
                booking.append(BOOKING_RANGE, args.to_row()).await?;
                Ok(PRICING_AND_DATE_REPLY.to_string())
            }
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_defaults_when_omitted() {
        let args: AcTroubleshootingBooking = serde_json::from_value(serde_json::json!({
            "preferred_service_date": "11-Sep-2026",
            "preferred_service_time": "03:00 PM",
            "issue_description": "Not cooling",
            "ac_type": "Wall-mounted",
            "ac_brand": "Daikin",
        }))
        .unwrap();

        let row = args.to_row();
        assert_eq!(row.len(), 8);
        assert_eq!(row[5], "not mentioned");
    }
}
