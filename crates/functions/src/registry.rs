use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use bookly_sheets::StoreError;

use crate::advisories;
use crate::categories;
use crate::context::FunctionContext;

#[derive(Debug, Error)]
pub enum FunctionError {
    #[error("invalid arguments for `{function}`: {source}")]
    InvalidArguments {
        function: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("policy assistant lookup failed: {0}")]
    Policy(String),
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<String, FunctionError>> + Send>>;
pub type Handler = Arc<dyn Fn(serde_json::Value) -> HandlerFuture + Send + Sync>;

/// Name-to-handler table consulted when a run reports `requires_action`.
/// Names are the wire names the assistants were configured with, so renames
/// here are breaking changes.
#[derive(Clone, Default)]
pub struct FunctionCatalog {
    handlers: HashMap<&'static str, Handler>,
}

impl FunctionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &'static str, handler: Handler) {
        self.handlers.insert(name, handler);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Runs the named function against raw JSON arguments. `None` means the
    /// name is not in the catalog; the caller decides how to react.
    pub async fn invoke(&self, name: &str, arguments: &str) -> Option<Result<String, FunctionError>> {
        let (&name, handler) = self.handlers.get_key_value(name)?;

        let trimmed = arguments.trim();
        let value = if trimmed.is_empty() {
            Ok(serde_json::Value::Object(serde_json::Map::new()))
        } else {
            serde_json::from_str(trimmed)
        };

        let value = match value {
            Ok(value) => value,
            Err(source) => {
                // Argument strings come from the model, so a parse failure is
                // data, not a bug on our side.
                debug!(event_name = "functions.bad_arguments", function = name, "unparsable arguments");
                return Some(Err(FunctionError::InvalidArguments { function: name, source }));
            }
        };

        Some(handler(value).await)
    }
}

/// Adapts a typed async function into a [`Handler`], deserializing the
/// argument object first.
pub(crate) fn typed<A, Fut>(
    name: &'static str,
    f: impl Fn(A) -> Fut + Send + Sync + 'static,
) -> Handler
where
    A: DeserializeOwned,
    Fut: Future<Output = Result<String, FunctionError>> + Send + 'static,
{
    Arc::new(move |value| match serde_json::from_value::<A>(value) {
        Ok(args) => Box::pin(f(args)) as HandlerFuture,
        Err(source) => Box::pin(async move {
            Err(FunctionError::InvalidArguments { function: name, source })
        }) as HandlerFuture,
    })
}

/// Handler for functions that take no arguments and return a fixed reply.
pub(crate) fn canned(reply: &'static str) -> Handler {
    Arc::new(move |_value| Box::pin(async move { Ok(reply.to_string()) }) as HandlerFuture)
}

#[cfg(test)]
pub(crate) mod tests_support {
    use async_trait::async_trait;

    use super::FunctionError;
    use crate::context::PolicyResponder;

    pub(crate) struct NoPolicy;

    #[async_trait]
    impl PolicyResponder for NoPolicy {
        async fn answer(&self, _prompt: &str) -> Result<String, FunctionError> {
            Ok(String::new())
        }
    }
}

/// Builds the full catalog: every category's booking writer and estimators
/// plus the cross-category advisories and date validators.
pub fn standard_catalog(ctx: &FunctionContext) -> FunctionCatalog {
    let mut catalog = FunctionCatalog::new();

    advisories::register(&mut catalog, ctx);
    categories::home_cleaning::register(&mut catalog, ctx);
    categories::plumbing::register(&mut catalog, ctx);
    categories::electrical::register(&mut catalog, ctx);
    categories::aircon_cleaning::register(&mut catalog, ctx);
    categories::aircon_troubleshooting::register(&mut catalog, ctx);
    categories::aircon_installation::register(&mut catalog, ctx);
    categories::appliance_repair::register(&mut catalog, ctx);
    categories::locksmith::register(&mut catalog, ctx);
    categories::pest_control::register(&mut catalog, ctx);
    categories::laundry::register(&mut catalog, ctx);
    categories::other::register(&mut catalog, ctx);
    categories::curtain_making::register(&mut catalog, ctx);
    categories::renovation::register(&mut catalog, ctx);
    categories::upholstery_cleaning::register(&mut catalog, ctx);

    catalog
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bookly_sheets::InMemorySheetStore;

    use super::{standard_catalog, tests_support::NoPolicy, FunctionError};
    use crate::context::FunctionContext;

    fn context() -> FunctionContext {
        FunctionContext {
            store: Arc::new(InMemorySheetStore::new()),
            booking_spreadsheet_id: "booking".to_string(),
            price_list_spreadsheet_id: "prices".to_string(),
            policy: Arc::new(NoPolicy),
        }
    }

    #[test]
    fn catalog_registers_every_assistant_function() {
        let catalog = standard_catalog(&context());

        let expected = [
            "save_home_cleaning_booking_information",
            "estimate_rough_price",
            "estimate_price_by_size_and_type",
            "validate_general_service_date",
            "check_urgent_service_request",
            "check_customer_disagreement_with_price",
            "save_plumbing_booking_information",
            "check_issue_description_complete",
            "save_electrical_booking_information",
            "check_electrical_issue_description_complete",
            "estimate_price_by_electrical_service_type",
            "save_aircon_cleaning_booking_details",
            "estimate_aircon_cleaning_price",
            "estimate_rough_aircon_cleaning_price",
            "is_horsepower_unidentified",
            "save_ac_troubleshooting_booking_details",
            "save_aircon_installation_booking_details",
            "estimate_aircon_installation_price",
            "save_appliance_repair_booking_details",
            "determine_site_inspection_fees",
            "save_locksmith_booking_details",
            "check_service_description_complete",
            "check_urgent_locksmith_service_request",
            "save_pest_control_booking_information",
            "estimate_price_by_pest_type",
            "save_laundry_booking_information",
            "estimate_price_by_clothing_type",
            "save_other_service_booking_information",
            "validate_other_service_date",
            "save_curtain_making_booking_information",
            "is_curtain_type_selected",
            "save_renovation_booking_information",
            "validate_renovation_service_date",
            "save_upholstery_cleaning_booking_information",
            "check_upholstery_description_complete",
            "validate_service_date",
            "is_service_policy_question",
        ];

        for name in expected {
            assert!(catalog.contains(name), "missing function `{name}`");
        }
        assert_eq!(catalog.len(), expected.len());
    }

    #[tokio::test]
    async fn unknown_name_returns_none() {
        let catalog = standard_catalog(&context());
        assert!(catalog.invoke("not_a_function", "{}").await.is_none());
    }

    #[tokio::test]
    async fn empty_argument_string_is_treated_as_empty_object() {
        let catalog = standard_catalog(&context());
        let reply = catalog
            .invoke("check_issue_description_complete", "")
            .await
            .expect("registered")
            .expect("canned reply");
        assert!(reply.contains("video or photo"));
    }

    #[tokio::test]
    async fn malformed_arguments_surface_as_invalid_arguments() {
        let catalog = standard_catalog(&context());
        let result = catalog
            .invoke("check_urgent_service_request", "{not json")
            .await
            .expect("registered");
        let error = result.err().expect("parse failure");
        assert!(matches!(
            error,
            FunctionError::InvalidArguments { function: "check_urgent_service_request", .. }
        ));
        assert!(error.to_string().contains("check_urgent_service_request"));
    }
}
