use serde::Deserialize;

use crate::context::{flexible_string, FunctionContext};
use crate::registry::{canned, typed, FunctionCatalog};

use super::{no_request, not_mentioned, PRICING_AND_DATE_REPLY};

pub const BOOKING_RANGE: &str = "ac_installation!A1:V1";

pub const ROW_WIDTH: usize = 29;
pub const MAX_UNITS: usize = 8;

const PRICE_GUIDANCE: &str =
    "The labor cost for dismantling ranges from RM150 to RM300 per unit, while installation \
     costs range from RM300 to RM600 per unit. It is recommended that the customer schedule a \
     site visit first, which costs RM80, to allow for a thorough assessment of their setup, \
     including factors such as aircon horsepower, piping requirements, electrical wiring, and \
     site accessibility. This will ensure a more accurate price quote and help prevent any \
     unexpected costs during installation.";

#[derive(Debug, Default, Deserialize)]
pub struct InstallationUnit {
    #[serde(default)]
    pub ac_type: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub horsepower: String,
}

#[derive(Debug, Deserialize)]
pub struct AirconInstallationBooking {
    #[serde(deserialize_with = "flexible_string")]
    pub number_of_ac_units: String,
    #[serde(default)]
    pub ac_details: Vec<InstallationUnit>,
    pub property_type: String,
    pub preferred_site_visit_date: String,
    pub preferred_site_visit_time: String,
    #[serde(default = "not_mentioned", deserialize_with = "flexible_string")]
    pub customer_budget: String,
    #[serde(default = "no_request")]
    pub additional_request: String,
}

impl AirconInstallationBooking {
    /// Six fixed columns, then three reserved per unit with the third left
    /// blank (the cleaning-type slot has no meaning for installations).
    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![String::new(); ROW_WIDTH];
        row[0] = self.preferred_site_visit_date.clone();
        row[1] = self.preferred_site_visit_time.clone();
        row[2] = self.property_type.clone();
        row[3] = self.customer_budget.clone();
        row[4] = self.additional_request.clone();
        row[5] = self.number_of_ac_units.clone();

        for (i, unit) in self.ac_details.iter().take(MAX_UNITS).enumerate() {
            row[6 + 3 * i] = unit.ac_type.clone();
            row[7 + 3 * i] = unit.horsepower.clone();
        }

        row
    }
}

pub(crate) fn register(catalog: &mut FunctionCatalog, ctx: &FunctionContext) {
    let booking = ctx.booking();
    catalog.register(
        "save_aircon_installation_booking_details",
        typed("save_aircon_installation_booking_details", move |args: AirconInstallationBooking| {
            let booking = booking.clone();
            async move {
                booking.append(BOOKING_RANGE, args.to_row()).await?;
                Ok(PRICING_AND_DATE_REPLY.to_string())
            }
        }),
    );

    catalog.register("estimate_aircon_installation_price", canned(PRICE_GUIDANCE));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_start_at_offset_six() {
        let args: AirconInstallationBooking = serde_json::from_value(serde_json::json!({
            "number_of_ac_units": 2,
            "ac_details": [
                {"ac_type": "Wall-mounted", "horsepower": 1},
                {"ac_type": "Cassette", "horsepower": 2.5},
            ],
            "property_type": "Condo",
            "preferred_site_visit_date": "14-Sep-2026",
            "preferred_site_visit_time": "09:30 AM",
        }))
        .unwrap();

        let row = args.to_row();
        assert_eq!(row.len(), ROW_WIDTH);
        assert_eq!(row[5], "2");
        assert_eq!(row[6], "Wall-mounted");
        assert_eq!(row[7], "1");
        assert_eq!(row[8], "");
        assert_eq!(row[9], "Cassette");
        assert_eq!(row[10], "2.5");
    }
}
