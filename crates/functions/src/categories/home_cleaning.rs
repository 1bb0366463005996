use serde::Deserialize;

use bookly_core::dates;

use crate::advisories::validate_against;
use crate::context::{flexible_string, FunctionContext, PriceBook};
use crate::registry::{typed, FunctionCatalog, FunctionError};

use super::{no_request, not_mentioned, range_high, range_low, THANK_YOU_REPLY};

pub const BOOKING_RANGE: &str = "home_cleaning!A1:G1";
pub const PRICE_WORKSHEET: &str = "Home Cleaning";

const VALID_DATE_REPLY: &str =
    "The date is valid. Inform the customer that you will check with the vendors for their \
     availability and will get back to them as soon as you have an update. At the same time, \
     continue to gather all other necessary information from the customer.";

const SIZE_NOT_LISTED_REPLY: &str =
    "The price list does not include the rate for the property size you mentioned. \
     I\u{2019}ll check with the vendor and update you shortly. Thanks for your patience.";

#[derive(Debug, Deserialize)]
pub struct HomeCleaningBooking {
    pub property_type: String,
    #[serde(deserialize_with = "flexible_string")]
    pub property_size: String,
    pub cleaning_type: String,
    pub preferred_service_date: String,
    pub preferred_service_time: String,
    #[serde(default = "not_mentioned", deserialize_with = "flexible_string")]
    pub customer_budget: String,
    #[serde(default = "no_request")]
    pub additional_request: String,
}

impl HomeCleaningBooking {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.preferred_service_date.clone(),
            self.preferred_service_time.clone(),
            self.cleaning_type.clone(),
            self.property_type.clone(),
            self.property_size.clone(),
            self.customer_budget.clone(),
            self.additional_request.clone(),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct SizeAndTypeArgs {
    property_size: f64,
    #[serde(default = "default_cleaning_type")]
    cleaning_type: String,
}

fn default_cleaning_type() -> String {
    "Basic Cleaning".to_string()
}

#[derive(Debug, Deserialize)]
struct DateArgs {
    preferred_service_date: String,
}

/// Rough totals per cleaning type, spanning the cheapest and dearest rows.
pub async fn rough_price(prices: &PriceBook) -> Result<String, FunctionError> {
    let table = prices.table(PRICE_WORKSHEET).await?;
    let mut reply = String::new();

    for cleaning_type in ["Basic Cleaning", "Deep Cleaning", "Post-Renovation"] {
        let costs = table.select().eq("Cleaning Type", cleaning_type).values("Total Cost");

        reply.push_str(cleaning_type);
        reply.push_str(": ");
        match costs.as_slice() {
            [] => {}
            [only] => {
                reply.push_str(only);
                reply.push('\n');
            }
            [first, .., last] => {
                if cleaning_type == "Post-Renovation" {
                    reply.push_str(&format!("{first} - {last}\n"));
                } else {
                    reply.push_str(&format!("{} to {}\n", range_low(first), range_high(last)));
                }
            }
        }
    }

    reply.push_str(
        "The exact cleaning fee varies depending on the size of customer's property and their \
         home location.",
    );
    Ok(reply)
}

/// Quotes the row whose property size is the smallest one covering the
/// request, listing the cheapest and priciest crew options for that size.
pub async fn price_by_size_and_type(
    prices: &PriceBook,
    property_size: f64,
    cleaning_type: &str,
) -> Result<String, FunctionError> {
    let table = prices.table(PRICE_WORKSHEET).await?;
    let selection = table
        .select()
        .eq("Cleaning Type", cleaning_type)
        .at_least("Property Size", property_size);

    if selection.is_empty() {
        return Ok(SIZE_NOT_LISTED_REPLY.to_string());
    }

    let cheapest = selection.min_by_number("Manpower Cost");
    let priciest = selection.max_by_number("Manpower Cost");
    let (Some(cheapest), Some(priciest)) = (cheapest, priciest) else {
        return Ok(SIZE_NOT_LISTED_REPLY.to_string());
    };

    let min_cost = cheapest.get("Total Cost").unwrap_or_default();
    let min_workers = cheapest.get("Manpower").unwrap_or_default();
    let max_cost = priciest.get("Total Cost").unwrap_or_default();
    let max_workers = priciest.get("Manpower").unwrap_or_default();

    let mut reply = String::from(
        "Here's the breakdown of the cleaning service provided by one of our popular vendors:\n",
    );
    if min_cost == max_cost {
        reply.push_str(&format!("Cleaning Fees: {min_cost} ({min_workers})\n"));
    } else {
        reply.push_str(&format!(
            "Cleaning Fees: {min_cost} ({min_workers}) or {max_cost} ({max_workers})\n"
        ));
    }

    reply.push_str("Important Note:\n");
    reply.push_str(
        "- The exact cleaning fees may vary depending on the size of your property and your \
         home location.\n",
    );
    reply.push_str("- If you require a ladder, an additional charge of RM 50 will be incurred.\n");

    if cleaning_type == "Basic Cleaning" {
        reply.push_str(
            "- Cleaning tools required extra charges RM 40 (include Floor Cleaner, Toilet Bowl \
             Cleaner, Glass Cleaner and Bleach / Clorox + Vacuum / Broom, Trash Bag, Cloth and \
             Toilet Brush)",
        );
    } else {
        reply.push_str("Cleaning tools are included.");
    }

    Ok(reply)
}

pub(crate) fn register(catalog: &mut FunctionCatalog, ctx: &FunctionContext) {
    let booking = ctx.booking();
    catalog.register(
        "save_home_cleaning_booking_information",
        typed("save_home_cleaning_booking_information", move |args: HomeCleaningBooking| {
            let booking = booking.clone();
            async move {
                booking.append(BOOKING_RANGE, args.to_row()).await?;
                Ok(THANK_YOU_REPLY.to_string())
            }
        }),
    );

    let prices = ctx.prices();
    catalog.register(
        "estimate_rough_price",
        typed("estimate_rough_price", move |_: serde_json::Value| {
            let prices = prices.clone();
            async move { rough_price(&prices).await }
        }),
    );

    let prices = ctx.prices();
    catalog.register(
        "estimate_price_by_size_and_type",
        typed("estimate_price_by_size_and_type", move |args: SizeAndTypeArgs| {
            let prices = prices.clone();
            async move { price_by_size_and_type(&prices, args.property_size, &args.cleaning_type).await }
        }),
    );

    catalog.register(
        "validate_service_date",
        typed("validate_service_date", |args: DateArgs| async move {
            Ok(validate_against(
                &dates::HOME_CLEANING_BOOKING,
                &args.preferred_service_date,
                VALID_DATE_REPLY,
            ))
        }),
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bookly_sheets::InMemorySheetStore;

    use crate::context::PriceBook;

    use super::*;

    fn price_book(store: Arc<InMemorySheetStore>) -> PriceBook {
        let ctx = FunctionContext {
            store,
            booking_spreadsheet_id: "booking".to_string(),
            price_list_spreadsheet_id: "prices".to_string(),
            policy: Arc::new(crate::registry::tests_support::NoPolicy),
        };
        ctx.prices()
    }

    fn fixture_rows() -> Vec<Vec<String>> {
        let raw = [
            vec!["Cleaning Type", "Property Size", "Total Cost", "Manpower", "Manpower Cost"],
            vec!["Basic Cleaning", "800", "RM100-150", "2 workers", "100"],
            vec!["Basic Cleaning", "1200", "RM170-200", "2 workers", "140"],
            vec!["Basic Cleaning", "1200", "RM220-260", "3 workers", "190"],
            vec!["Deep Cleaning", "800", "RM300-380", "3 workers", "260"],
            vec!["Post-Renovation", "800", "RM600", "4 workers", "500"],
            vec!["Post-Renovation", "1600", "RM900", "5 workers", "700"],
        ];
        raw.into_iter()
            .map(|row| row.into_iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn booking_row_follows_sheet_column_order() {
        let args: HomeCleaningBooking = serde_json::from_value(serde_json::json!({
            "property_type": "Condo",
            "property_size": 1000,
            "cleaning_type": "Basic Cleaning",
            "preferred_service_date": "10-Sep-2026",
            "preferred_service_time": "09:00 AM",
        }))
        .unwrap();

        assert_eq!(
            args.to_row(),
            vec![
                "10-Sep-2026",
                "09:00 AM",
                "Basic Cleaning",
                "Condo",
                "1000",
                "not mentioned",
                "no request",
            ]
        );
    }

    #[tokio::test]
    async fn rough_price_spans_cheapest_to_priciest() {
        let store = Arc::new(
            InMemorySheetStore::new().with_worksheet(PRICE_WORKSHEET, fixture_rows()),
        );
        let reply = rough_price(&price_book(store)).await.unwrap();

        assert!(reply.contains("Basic Cleaning: RM100 to 260\n"));
        assert!(reply.contains("Deep Cleaning: RM300-380\n"));
        assert!(reply.contains("Post-Renovation: RM600 - RM900\n"));
    }

    #[tokio::test]
    async fn size_quote_picks_smallest_covering_size() {
        let store = Arc::new(
            InMemorySheetStore::new().with_worksheet(PRICE_WORKSHEET, fixture_rows()),
        );
        let reply = price_by_size_and_type(&price_book(store), 1000.0, "Basic Cleaning")
            .await
            .unwrap();

        // 1200 sqft is the smallest listed size covering 1000 sqft.
        assert!(reply.contains("RM170-200 (2 workers) or RM220-260 (3 workers)"));
        assert!(reply.contains("Cleaning tools required extra charges RM 40"));
    }

    #[tokio::test]
    async fn oversized_property_gets_miss_message() {
        let store = Arc::new(
            InMemorySheetStore::new().with_worksheet(PRICE_WORKSHEET, fixture_rows()),
        );
        let reply = price_by_size_and_type(&price_book(store), 5000.0, "Basic Cleaning")
            .await
            .unwrap();

        assert!(reply.starts_with("The price list does not include the rate"));
    }
}
