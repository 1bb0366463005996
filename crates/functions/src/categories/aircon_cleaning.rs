use serde::Deserialize;

use crate::context::{flexible_string, FunctionContext, PriceBook};
use crate::registry::{canned, typed, FunctionCatalog, FunctionError};

use super::{no_request, not_mentioned, range_high, range_low, THANK_YOU_REPLY};

pub const BOOKING_RANGE: &str = "ac_cleaning!A1:AC1";
pub const PRICE_WORKSHEET: &str = "Aircon Cleaning";

/// The worksheet reserves three columns for each of up to eight units after
/// the five fixed columns, 29 cells in total.
pub const ROW_WIDTH: usize = 29;
pub const MAX_UNITS: usize = 8;

const LABEL_PHOTO_PROMPT: &str =
    "Ask customers to send you a picture of the aircon label so you can identify the HP for \
     them. It's usually located under or beside the aircon. Kindly ask them to notify you once \
     they have uploaded the video or image.";

#[derive(Debug, Default, Deserialize)]
pub struct AcUnit {
    #[serde(default)]
    pub cleaning_type: String,
    #[serde(default)]
    pub ac_type: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub horsepower: String,
}

#[derive(Debug, Deserialize)]
pub struct AirconCleaningBooking {
    #[serde(deserialize_with = "flexible_string")]
    pub number_of_ac_units: String,
    #[serde(default)]
    pub ac_details: Vec<AcUnit>,
    pub preferred_service_date: String,
    pub preferred_service_time: String,
    #[serde(default = "not_mentioned", deserialize_with = "flexible_string")]
    pub customer_budget: String,
    #[serde(default = "no_request")]
    pub additional_request: String,
}

impl AirconCleaningBooking {
    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![String::new(); ROW_WIDTH];
        row[0] = self.preferred_service_date.clone();
        row[1] = self.preferred_service_time.clone();
        row[2] = self.customer_budget.clone();
        row[3] = self.additional_request.clone();
        row[4] = self.number_of_ac_units.clone();

        for (i, unit) in self.ac_details.iter().take(MAX_UNITS).enumerate() {
            row[5 + 3 * i] = unit.cleaning_type.clone();
            row[6 + 3 * i] = unit.ac_type.clone();
            row[7 + 3 * i] = unit.horsepower.clone();
        }

        row
    }
}

#[derive(Debug, Deserialize)]
struct RoughPriceArgs {
    ac_type: String,
}

#[derive(Debug, Deserialize)]
struct ExactPriceArgs {
    ac_type: String,
    horsepower: f64,
    #[serde(default = "default_cleaning_type")]
    cleaning_type: String,
}

fn default_cleaning_type() -> String {
    "Normal Cleaning".to_string()
}

pub async fn rough_price(prices: &PriceBook, ac_type: &str) -> Result<String, FunctionError> {
    let table = prices.table(PRICE_WORKSHEET).await?;
    let mut reply = String::new();

    for cleaning_type in ["Normal Cleaning", "Chemical Cleaning"] {
        let unit_prices = table
            .select()
            .eq("Aircon Type", ac_type)
            .eq("Cleaning Type", cleaning_type)
            .values("Price per Unit (RM)");

        reply.push_str(cleaning_type);
        reply.push_str(" Price Per Unit: ");
        match unit_prices.as_slice() {
            [] => {}
            [only] => {
                reply.push_str(only);
                reply.push('\n');
            }
            [first, .., last] => {
                reply.push_str(&format!("{} to {}\n", range_low(first), range_high(last)));
            }
        }
    }

    reply.push_str(
        "Gas refills will incur an additional charge of RM50 per unit.\n\
         The cleaning fee is determined by the aircon's horsepower and the selected vendor. \
         Please note that vendors offering lower rates may have longer waiting times for \
         service.",
    );
    Ok(reply)
}

/// Quotes the smallest listed horsepower that covers the request.
pub async fn exact_price(
    prices: &PriceBook,
    ac_type: &str,
    horsepower: f64,
    cleaning_type: &str,
) -> Result<String, FunctionError> {
    let table = prices.table(PRICE_WORKSHEET).await?;
    let selection = table
        .select()
        .eq("Aircon Type", ac_type)
        .eq("Cleaning Type", cleaning_type)
        .at_least("Horsepower", horsepower);

    let Some(row) = selection.first() else {
        return Ok(format!(
            "The price list does not include the rate for {horsepower}HP aircon. I\u{2019}ll \
             check with the vendor and update you shortly. Thanks for your patience."
        ));
    };

    let cost = row.get("Price per Unit (RM)").unwrap_or_default();
    Ok(format!(
        "Here's the breakdown of the cleaning service provided by our vendors:\n\
         Cleaning Price per Unit for {horsepower}HP Aircon: {cost}\n\
         Gas refills will incur an additional charge of RM50 per unit.\n\
         Important Note:\n\
         The cleaning fee varies based on the selected vendor. Please note that vendors \
         offering lower rates may have longer waiting times for service."
    ))
}

pub(crate) fn register(catalog: &mut FunctionCatalog, ctx: &FunctionContext) {
    let booking = ctx.booking();
    catalog.register(
        "save_aircon_cleaning_booking_details",
        typed("save_aircon_cleaning_booking_details", move |args: AirconCleaningBooking| {
            let booking = booking.clone();
            async move {
                booking.append(BOOKING_RANGE, args.to_row()).await?;
                Ok(THANK_YOU_REPLY.to_string())
            }
        }),
    );

    let prices = ctx.prices();
    catalog.register(
        "estimate_rough_aircon_cleaning_price",
        typed("estimate_rough_aircon_cleaning_price", move |args: RoughPriceArgs| {
            let prices = prices.clone();
            async move { rough_price(&prices, &args.ac_type).await }
        }),
    );

    let prices = ctx.prices();
    catalog.register(
        "estimate_aircon_cleaning_price",
        typed("estimate_aircon_cleaning_price", move |args: ExactPriceArgs| {
            let prices = prices.clone();
            async move {
                exact_price(&prices, &args.ac_type, args.horsepower, &args.cleaning_type).await
            }
        }),
    );

    catalog.register("is_horsepower_unidentified", canned(LABEL_PHOTO_PROMPT));
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
            vec!["Aircon Type", "Cleaning Type", "Horsepower", "Price per Unit (RM)"],
            vec!["Wall-mounted", "Normal Cleaning", "1", "RM40-60"],
            vec!["Wall-mounted", "Normal Cleaning", "2", "RM70-90"],
            vec!["Wall-mounted", "Chemical Cleaning", "1", "RM130-160"],
            vec!["Wall-mounted", "Chemical Cleaning", "2.5", "RM180-220"],
        ];
        raw.into_iter()
            .map(|row| row.into_iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn row_is_padded_to_twenty_nine_cells() {
        let args: AirconCleaningBooking = serde_json::from_value(serde_json::json!({
            "number_of_ac_units": 2,
            "ac_details": [
                {"cleaning_type": "Normal Cleaning", "ac_type": "Wall-mounted", "horsepower": 1.5},
                {"cleaning_type": "Chemical Cleaning", "ac_type": "Cassette", "horsepower": 2},
            ],
            "preferred_service_date": "10-Sep-2026",
            "preferred_service_time": "10:00 AM",
        }))
        .unwrap();

        let row = args.to_row();
        assert_eq!(row.len(), ROW_WIDTH);
        assert_eq!(row[4], "2");
        assert_eq!(row[5], "Normal Cleaning");
        assert_eq!(row[7], "1.5");
        assert_eq!(row[8], "Chemical Cleaning");
        assert_eq!(row[10], "2");
        assert_eq!(row[11], "");
    }

    #[test]
    fn unit_details_beyond_capacity_are_dropped() {
        let units: Vec<_> = (0..12)
            .map(|i| serde_json::json!({"cleaning_type": format!("u{i}")}))
            .collect();
        let args: AirconCleaningBooking = serde_json::from_value(serde_json::json!({
            "number_of_ac_units": 12,
            "ac_details": units,
            "preferred_service_date": "10-Sep-2026",
            "preferred_service_time": "10:00 AM",
        }))
        .unwrap();

        let row = args.to_row();
        assert_eq!(row.len(), ROW_WIDTH);
        assert_eq!(row[5 + 3 * 7], "u7");
    }

    #[tokio::test]
    async fn exact_price_rounds_up_to_listed_horsepower() {
        let store = Arc::new(
            InMemorySheetStore::new().with_worksheet(PRICE_WORKSHEET, fixture_rows()),
        );
        let reply = exact_price(&prices(store), "Wall-mounted", 1.5, "Normal Cleaning")
            .await
            .unwrap();

        assert!(reply.contains("Cleaning Price per Unit for 1.5HP Aircon: RM70-90"));
    }

    #[tokio::test]
    async fn unlisted_horsepower_gets_miss_message() {
        let store = Arc::new(
            InMemorySheetStore::new().with_worksheet(PRICE_WORKSHEET, fixture_rows()),
        );
        let reply = exact_price(&prices(store), "Wall-mounted", 3.0, "Normal Cleaning")
            .await
            .unwrap();

        assert!(reply.starts_with("The price list does not include the rate for 3HP aircon."));
    }

    #[tokio::test]
    async fn rough_price_covers_both_cleaning_types() {
        let store = Arc::new(
            InMemorySheetStore::new().with_worksheet(PRICE_WORKSHEET, fixture_rows()),
        );
        let reply = rough_price(&prices(store), "Wall-mounted").await.unwrap();

        assert!(reply.contains("Normal Cleaning Price Per Unit: RM40 to 90\n"));
        assert!(reply.contains("Chemical Cleaning Price Per Unit: RM130 to 220\n"));
        assert!(reply.contains("Gas refills"));
    }
}
