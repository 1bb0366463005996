use serde::Deserialize;

use crate::context::{flexible_string, FunctionContext, PriceBook};
use crate::registry::{typed, FunctionCatalog, FunctionError};

use super::{no_request_capitalized, not_mentioned_capitalized, unknown, VENDOR_AVAILABILITY_REPLY};

pub const BOOKING_RANGE: &str = "appliance_repair!A1:J1";
pub const PRICE_WORKSHEET: &str = "Appliance Repair";

const CHARGE_COLUMN: &str = "Site Inspection/Troubleshooting Charges";

#[derive(Debug, Deserialize)]
pub struct ApplianceRepairBooking {
    pub appliance_type: String,
    pub issue_description: String,
    pub appliance_functionality: String,
    pub preferred_site_inspection_date: String,
    pub preferred_site_inspection_time: String,
    #[serde(default = "unknown")]
    pub appliance_brand: String,
    #[serde(default = "unknown")]
    pub warranty_status: String,
    #[serde(default = "unknown")]
    pub recent_power_issues: String,
    #[serde(default = "not_mentioned_capitalized", deserialize_with = "flexible_string")]
    pub customer_budget: String,
    #[serde(default = "no_request_capitalized")]
    pub additional_request: String,
}

impl ApplianceRepairBooking {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.preferred_site_inspection_date.clone(),
            self.preferred_site_inspection_time.clone(),
            self.appliance_type.clone(),
            self.appliance_brand.clone(),
            self.issue_description.clone(),
            self.appliance_functionality.clone(),
            self.warranty_status.clone(),
            self.recent_power_issues.clone(),
            self.customer_budget.clone(),
            self.additional_request.clone(),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct InspectionFeeArgs {
    appliance_type: String,
}

fn vendor_capability_reply() -> String {
    "Inform customers that, we will need to determine if any of our vendors are capable of \
     repairing the appliance. Please be advised that this process may take longer than usual \
     to get their reply, which may delay our response time.\n\nApologize for any inconvenience \
     this may cause and appreciate their understanding. Assure them that we will make every \
     effort to provide a prompt response as soon as we receive information from the vendor."
        .to_string()
}

/// Looks up the inspection charge and frames it per appliance class. White
/// goods, water heaters and televisions each get their own script; anything
/// else defers to a vendor-capability check with no charge quoted.
pub async fn site_inspection_fees(
    prices: &PriceBook,
    appliance_type: &str,
) -> Result<String, FunctionError> {
    let table = prices.table(PRICE_WORKSHEET).await?;
    let selection = table.select().eq("Appliance Type", appliance_type);
    let charge = selection.first().and_then(|row| row.get(CHARGE_COLUMN));

    let Some(charge) = charge else {
        return Ok(vendor_capability_reply());
    };

    let reply = match appliance_type.to_lowercase().as_str() {
        "washing machine" | "clothes dryer" | "refrigerator" => format!(
            "Recommend a site inspection to the customer to assess the issue, with a charge of \
             RM {charge}. Explain that during the inspection, the vendor will provide the \
             repair charges on the spot.\n\nAdditionally, mention that the site inspection fee \
             is non-refundable, regardless of whether the issue is resolved, as it covers the \
             cost of the inspection and transportation.\n\nAsk the customer to confirm if they \
             agree with the price, so the service can be scheduled at their convenience. \
             Remind them to reach out if they have any questions or concerns."
        ),
        "water heater" | "water boiler" => format!(
            "Recommend a site inspection to the customer to assess the issue, with a charge of \
             RM {charge}. During the inspection, the vendor will provide the repair charges on \
             the spot.\n\nAsk the customer to confirm if they agree with the price so the \
             service can be scheduled. Remind them to reach out if they have any questions or \
             concerns."
        ),
        "television" => format!(
            "Inform customers that the vendor will charge RM {charge} to pick up the TV and \
             take it to their facility for inspection, a process that usually takes about a \
             week. Once the inspection is complete, the vendor will provide the repair \
             charges.\n\nInstruct the AI to inform the customer that, if they agree with the \
             repair charges, the payment will be collected, and the vendor will proceed with \
             the repair. However, if the customer chooses not to repair the TV, the RM \
             {charge} fee for pickup and inspection will not be refunded.\n\nAsk the customer \
             to confirm if they agree with this arrangement, so the service can be scheduled. \
             Also, remind them to reach out if they have any questions or concerns."
        ),
        _ => vendor_capability_reply(),
    };

    Ok(reply)
}

pub(crate) fn register(catalog: &mut FunctionCatalog, ctx: &FunctionContext) {
    let booking = ctx.booking();
    catalog.register(
        "save_appliance_repair_booking_details",
        typed("save_appliance_repair_booking_details", move |args: ApplianceRepairBooking| {
            let booking = booking.clone();
            async move {
                booking.append(BOOKING_RANGE, args.to_row()).await?;
                Ok(VENDOR_AVAILABILITY_REPLY.to_string())
            }
        }),
    );

    let prices = ctx.prices();
    catalog.register(
        "determine_site_inspection_fees",
        typed("determine_site_inspection_fees", move |args: InspectionFeeArgs| {
            let prices = prices.clone();
            async move { site_inspection_fees(&prices, &args.appliance_type).await }
        }),
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bookly_sheets::InMemorySheetStore;

    use super::*;

    fn prices(store: Arc<InMemorySheetStore>) -> PriceBook {
        FunctionContext {
            store,
            booking_spreadsheet_id: "booking".to_string(),
            price_list_spreadsheet_id: "prices".to_string(),
            policy: Arc::new(crate::registry::tests_support::NoPolicy),
        }
        .prices()
    }

    fn fixture_rows() -> Vec<Vec<String>> {
        let raw = [
            vec!["Appliance Type", CHARGE_COLUMN],
            vec!["Washing Machine", "80"],
            vec!["Water Heater", "60"],
            vec!["Television", "100"],
        ];
        raw.into_iter()
            .map(|row| row.into_iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn optional_fields_default_to_unknown() {
        let args: ApplianceRepairBooking = serde_json::from_value(serde_json::json!({
            "appliance_type": "Refrigerator",
            "issue_description": "Not cooling",
            "appliance_functionality": "Partially working",
            "preferred_site_inspection_date": "16-Sep-2026",
            "preferred_site_inspection_time": "10:00 AM",
        }))
        .unwrap();

        let row = args.to_row();
        assert_eq!(row.len(), 10);
        assert_eq!(row[3], "Unknown");
        assert_eq!(row[8], "Not mentioned");
        assert_eq!(row[9], "No request");
    }

    #[tokio::test]
    async fn white_goods_mention_non_refundable_fee() {
        let store = Arc::new(
            InMemorySheetStore::new().with_worksheet(PRICE_WORKSHEET, fixture_rows()),
        );
        let reply = site_inspection_fees(&prices(store), "Washing Machine").await.unwrap();

        assert!(reply.contains("RM 80"));
        assert!(reply.contains("non-refundable"));
    }

    #[tokio::test]
    async fn television_uses_pickup_script() {
        let store = Arc::new(
            InMemorySheetStore::new().with_worksheet(PRICE_WORKSHEET, fixture_rows()),
        );
        let reply = site_inspection_fees(&prices(store), "Television").await.unwrap();

        assert!(reply.contains("pick up the TV"));
        assert!(reply.contains("RM 100"));
    }

    #[tokio::test]
    async fn unlisted_appliance_defers_to_vendor_check() {
        let store = Arc::new(
            InMemorySheetStore::new().with_worksheet(PRICE_WORKSHEET, fixture_rows()),
        );
        let reply = site_inspection_fees(&prices(store), "Bread Maker").await.unwrap();

        assert!(reply.contains("capable of repairing the appliance"));
    }
}
