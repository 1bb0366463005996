//! Cross-category helpers: budget disagreement, urgent requests, media
//! prompts, policy questions and the general-purpose date validator.

use chrono::Local;
use serde::Deserialize;

use bookly_core::dates::{self, DateRule};

use crate::context::{flexible_string, FunctionContext};
use crate::registry::{canned, typed, FunctionCatalog};

pub const GENERAL_VALID_DATE_REPLY: &str =
    "Inform the customer that you will check with the vendors for their availability and will \
     get back to them as soon as you have an update. At the same time, continue to gather all \
     other necessary information from the customer.";

const ISSUE_MEDIA_PROMPT: &str =
    "Ask customers to share the video or photo of their issue, so you can check with the vendor \
     and assess the issue more effectively. Kindly ask them to notify you once they have \
     uploaded the video or image. ";

#[derive(Debug, Deserialize)]
struct BudgetArgs {
    #[serde(deserialize_with = "flexible_string")]
    customer_budget: String,
}

#[derive(Debug, Deserialize)]
struct UrgentRequestArgs {
    preferred_service_date: String,
    preferred_service_time: String,
}

#[derive(Debug, Deserialize)]
struct DateArgs {
    preferred_service_date: String,
}

#[derive(Debug, Deserialize)]
struct PolicyArgs {
    customer_question: String,
}

pub fn budget_disagreement_reply(customer_budget: &str) -> String {
    format!(
        "Tell the customer that you will check vendors who can offer services within their \
         budget (RM {customer_budget}) and will get back to them soon. At the same time, \
         continue to gather other necessary information."
    )
}

pub fn urgent_request_reply(preferred_service_date: &str, preferred_service_time: &str) -> String {
    format!(
        "Tell the customer that since their requested service on {preferred_service_date} at \
         {preferred_service_time} is outside our usual booking window, you will check with the \
         vendors for their availability and will get back to them as soon as you have an \
         update. At the same time, continue to gather all other necessary information from the \
         customer."
    )
}

pub fn policy_question_prompt(customer_question: &str) -> String {
    format!(
        "Please analyze the following customer question: '{customer_question}'. Determine if \
         it relates to our service policy. If it does, provide a professional response based \
         on the relevant service policy. If the question is outside the scope of the service \
         policy, indicate that the query will be passed to our human concierge for further \
         assistance."
    )
}

/// Runs a date rule against today's calendar date.
pub(crate) fn validate_against(rule: &DateRule, raw_date: &str, valid_reply: &str) -> String {
    rule.advise(Local::now().date_naive(), raw_date, valid_reply)
}

pub(crate) fn register(catalog: &mut FunctionCatalog, ctx: &FunctionContext) {
    catalog.register(
        "check_customer_disagreement_with_price",
        typed("check_customer_disagreement_with_price", |args: BudgetArgs| async move {
            Ok(budget_disagreement_reply(&args.customer_budget))
        }),
    );

    catalog.register(
        "check_urgent_service_request",
        typed("check_urgent_service_request", |args: UrgentRequestArgs| async move {
            Ok(urgent_request_reply(&args.preferred_service_date, &args.preferred_service_time))
        }),
    );

    catalog.register("check_issue_description_complete", canned(ISSUE_MEDIA_PROMPT));

    catalog.register(
        "validate_general_service_date",
        typed("validate_general_service_date", |args: DateArgs| async move {
            Ok(validate_against(
                &dates::GENERAL_BOOKING,
                &args.preferred_service_date,
                GENERAL_VALID_DATE_REPLY,
            ))
        }),
    );

    let policy = ctx.policy.clone();
    catalog.register(
        "is_service_policy_question",
        typed("is_service_policy_question", move |args: PolicyArgs| {
            let policy = policy.clone();
            async move { policy.answer(&policy_question_prompt(&args.customer_question)).await }
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_reply_quotes_the_amount() {
        let reply = budget_disagreement_reply("350");
        assert!(reply.contains("(RM 350)"));
        assert!(reply.starts_with("Tell the customer"));
    }

    #[test]
    fn urgent_reply_names_date_and_time() {
        let reply = urgent_request_reply("02-Sep-2026", "10:00 AM");
        assert!(reply.contains("02-Sep-2026 at 10:00 AM"));
    }

    #[test]
    fn policy_prompt_embeds_the_question() {
        let prompt = policy_question_prompt("Do you offer refunds?");
        assert!(prompt.contains("'Do you offer refunds?'"));
        assert!(prompt.contains("human concierge"));
    }
}
