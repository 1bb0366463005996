use serde::Deserialize;

use crate::context::{flexible_string, FunctionContext, PriceBook};
use crate::registry::{typed, FunctionCatalog, FunctionError};

use super::{no_request, not_mentioned, VENDOR_AVAILABILITY_REPLY};

pub const BOOKING_RANGE: &str = "pest_control!A1:I1";
pub const PRICE_WORKSHEET: &str = "Pest Control";

const PEST_NOT_LISTED_REPLY: &str =
    "The price list does not include the rate for the pest type you mentioned. I\u{2019}ll \
     check with the vendor and update you shortly. Thanks for your patience.";

#[derive(Debug, Deserialize)]
pub struct PestControlBooking {
    pub pest_type: String,
    pub affected_areas: String,
    pub first_notice: String,
    pub entry_point: String,
    pub previous_treatments: String,
    pub preferred_service_date: String,
    pub preferred_service_time: String,
    #[serde(default = "not_mentioned", deserialize_with = "flexible_string")]
    pub customer_budget: String,
    #[serde(default = "no_request")]
    pub additional_request: String,
}

impl PestControlBooking {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.preferred_service_date.clone(),
            self.preferred_service_time.clone(),
            self.pest_type.clone(),
            self.affected_areas.clone(),
            self.first_notice.clone(),
            self.entry_point.clone(),
            self.previous_treatments.clone(),
            self.customer_budget.clone(),
            self.additional_request.clone(),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct PestTypeArgs {
    pest_type: String,
}

pub async fn price_by_pest_type(
    prices: &PriceBook,
    pest_type: &str,
) -> Result<String, FunctionError> {
    let table = prices.table(PRICE_WORKSHEET).await?;
    let price = table.select().eq("Pest Type", pest_type).first().and_then(|row| row.get("Price"));

    Ok(match price {
        Some(price) => format!("The pest control service charge for {pest_type} is RM {price}.\n"),
        None => PEST_NOT_LISTED_REPLY.to_string(),
    })
}

pub(crate) fn register(catalog: &mut FunctionCatalog, ctx: &FunctionContext) {
    let booking = ctx.booking();
    catalog.register(
        "save_pest_control_booking_information",
        typed("save_pest_control_booking_information", move |args: PestControlBooking| {
            let booking = booking.clone();
            async move {
                booking.append(BOOKING_RANGE, args.to_row()).await?;
                Ok(VENDOR_AVAILABILITY_REPLY.to_string())
            }
        }),
    );

    let prices = ctx.prices();
    catalog.register(
        "estimate_price_by_pest_type",
        typed("estimate_price_by_pest_type", move |args: PestTypeArgs| {
            let prices = prices.clone();
            async move { price_by_pest_type(&prices, &args.pest_type).await }
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
            vec!["Pest Type", "Price"],
            vec!["Cockroach", "150"],
            vec!["Termite", "450"],
        ];
        raw.into_iter()
            .map(|row| row.into_iter().map(str::to_string).collect())
            .collect()
    }

    #[tokio::test]
    async fn listed_pest_quotes_its_price() {
        let store = Arc::new(
            InMemorySheetStore::new().with_worksheet(PRICE_WORKSHEET, fixture_rows()),
        );
        let reply = price_by_pest_type(&prices(store), "Cockroach").await.unwrap();

        assert_eq!(
            reply,
            "The pest control service charge for Cockroach is RM 150.\n"
        );
    }

    #[tokio::test]
    async fn unlisted_pest_gets_miss_message() {
        let store = Arc::new(
            InMemorySheetStore::new().with_worksheet(PRICE_WORKSHEET, fixture_rows()),
        );
        let reply = price_by_pest_type(&prices(store), "Scorpion").await.unwrap();

        assert!(reply.starts_with("The price list does not include the rate"));
    }

    #[test]
    fn row_has_nine_columns_in_sheet_order() {
        let args: PestControlBooking = serde_json::from_value(serde_json::json!({
            "pest_type": "Termite",
            "affected_areas": "Kitchen cabinets",
            "first_notice": "Last month",
            "entry_point": "Unknown",
            "previous_treatments": "None",
            "preferred_service_date": "18-Sep-2026",
            "preferred_service_time": "10:00 AM",
        }))
        .unwrap();

        let row = args.to_row();
        assert_eq!(row.len(), 9);
        assert_eq!(row[2], "Termite");
        assert_eq!(row[7], "not mentioned");
    }
}
