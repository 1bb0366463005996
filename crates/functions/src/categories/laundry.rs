use serde::Deserialize;

use crate::context::{flexible_string, FunctionContext, PriceBook};
use crate::registry::{typed, FunctionCatalog, FunctionError};

use super::{no_request, not_mentioned, VENDOR_AVAILABILITY_REPLY};

pub const BOOKING_RANGE: &str = "laundry!A1:S1";
pub const PRICE_WORKSHEET: &str = "Laundry";

pub const ROW_WIDTH: usize = 29;
pub const MAX_ITEMS: usize = 8;

const OTHERS_REPLY: &str =
    "Since the price list does not include a rate for the clothing type the customer \
     mentioned, inform them that you will check with the vendor and provide an update shortly.";

#[derive(Debug, Default, Deserialize)]
pub struct LaundryItem {
    #[serde(default)]
    pub laundry_service_type: String,
    #[serde(default)]
    pub clothing_type: String,
    #[serde(default)]
    pub special_fabrics: String,
}

#[derive(Debug, Deserialize)]
pub struct LaundryBooking {
    #[serde(default)]
    pub laundry_items: Vec<LaundryItem>,
    pub preferred_service_date: String,
    pub preferred_service_time: String,
    #[serde(default = "not_mentioned", deserialize_with = "flexible_string")]
    pub customer_budget: String,
    #[serde(default = "no_request")]
    pub additional_request: String,
}

impl LaundryBooking {
    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![String::new(); ROW_WIDTH];
        row[0] = self.preferred_service_date.clone();
        row[1] = self.preferred_service_time.clone();
        row[2] = self.customer_budget.clone();
        row[3] = self.additional_request.clone();

        for (i, item) in self.laundry_items.iter().take(MAX_ITEMS).enumerate() {
            row[4 + 3 * i] = item.laundry_service_type.clone();
            row[5 + 3 * i] = item.clothing_type.clone();
            row[6 + 3 * i] = item.special_fabrics.clone();
        }

        row
    }
}

#[derive(Debug, Deserialize)]
struct ClothingTypeArgs {
    clothing_type: String,
}

/// Lists every service option for a clothing type along with the ironing
/// surcharge and the 5kg minimum load.
pub async fn price_by_clothing_type(
    prices: &PriceBook,
    clothing_type: &str,
) -> Result<String, FunctionError> {
    if clothing_type == "Others" {
        return Ok(OTHERS_REPLY.to_string());
    }

    let table = prices.table(PRICE_WORKSHEET).await?;
    let selection = table.select().eq("Clothing Type", clothing_type);

    let mut reply = format!(
        "Here are the available laundry service options for '{clothing_type}' for customers to \
         choose from:\n"
    );
    for (position, row) in selection.rows().enumerate() {
        let service_type = row.get("Service Type").unwrap_or_default();
        let price = row.get("Price").unwrap_or_default();
        reply.push_str(&format!("{}. {service_type}: {price}\n", position + 1));
    }

    reply.push_str(
        "Important Note:\n\
         - The ironing service will cost RM3 per piece and will typically take 2-3 days.\n\
         - Inform customers that the minimum load for a normal wash is 5kg. If the customer \
         sends less than 5kg (e.g., 3kg), clarify that the charge will still be based on the \
         5kg minimum load.\n",
    );
    Ok(reply)
}

pub(crate) fn register(catalog: &mut FunctionCatalog, ctx: &FunctionContext) {
    let booking = ctx.booking();
    catalog.register(
        "save_laundry_booking_information",
        typed("save_laundry_booking_information", move |args: LaundryBooking| {
            let booking = booking.clone();
            async move {
                booking.append(BOOKING_RANGE, args.to_row()).await?;
                Ok(VENDOR_AVAILABILITY_REPLY.to_string())
            }
        }),
    );

    let prices = ctx.prices();
    catalog.register(
        "estimate_price_by_clothing_type",
        typed("estimate_price_by_clothing_type", move |args: ClothingTypeArgs| {
            let prices = prices.clone();
            async move { price_by_clothing_type(&prices, &args.clothing_type).await }
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
            vec!["Clothing Type", "Service Type", "Price"],
            vec!["Regular Wear", "Wash & Fold", "RM8/kg"],
            vec!["Regular Wear", "Wash & Iron", "RM12/kg"],
            vec!["Curtains", "Dry Cleaning", "RM25/piece"],
        ];
        raw.into_iter()
            .map(|row| row.into_iter().map(str::to_string).collect())
            .collect()
    }

    #[tokio::test]
    async fn options_are_numbered_per_matching_row() {
        let store = Arc::new(
            InMemorySheetStore::new().with_worksheet(PRICE_WORKSHEET, fixture_rows()),
        );
        let reply = price_by_clothing_type(&prices(store), "Regular Wear").await.unwrap();

        assert!(reply.contains("1. Wash & Fold: RM8/kg\n"));
        assert!(reply.contains("2. Wash & Iron: RM12/kg\n"));
        assert!(reply.contains("minimum load for a normal wash is 5kg"));
    }

    #[tokio::test]
    async fn others_short_circuits_without_reading_prices() {
        let store = Arc::new(InMemorySheetStore::new());
        let reply = price_by_clothing_type(&prices(store), "Others").await.unwrap();

        assert!(reply.starts_with("Since the price list does not include a rate"));
    }

    #[test]
    fn items_occupy_three_cell_blocks_from_offset_four() {
        let args: LaundryBooking = serde_json::from_value(serde_json::json!({
            "laundry_items": [
                {"laundry_service_type": "Wash & Fold", "clothing_type": "Regular Wear", "special_fabrics": "None"},
                {"laundry_service_type": "Dry Cleaning", "clothing_type": "Curtains", "special_fabrics": "Silk"},
            ],
            "preferred_service_date": "20-Sep-2026",
            "preferred_service_time": "09:00 AM",
        }))
        .unwrap();

        let row = args.to_row();
        assert_eq!(row.len(), ROW_WIDTH);
        assert_eq!(row[4], "Wash & Fold");
        assert_eq!(row[6], "None");
        assert_eq!(row[7], "Dry Cleaning");
        assert_eq!(row[9], "Silk");
        assert_eq!(row[10], "");
    }
}
