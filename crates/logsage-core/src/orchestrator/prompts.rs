//! Instruction templates for the query-synthesis, repair, and
//! answer-synthesis completion calls.
//!
//! The query template embeds the full schema catalog, the caller's
//! lower-cased resource id as a mandatory literal filter, the current UTC
//! wall-clock time for relative time-range resolution, and worked examples
//! mapping a context sentence to an exact KQL query. The engine's contract
//! at each of these steps is plain text only: one query, or an empty string
//! meaning "cannot answer".

use chrono::{DateTime, Duration, Utc};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

fn stamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Build the query-synthesis instruction.
///
/// `resource_id` must already be lower-cased by the caller; every worked
/// example pins the generated query to it with a `_ResourceId` filter.
pub fn build_query_prompt(
    schema_text: &str,
    resource_id: &str,
    now: DateTime<Utc>,
    context: &str,
) -> String {
    let now_s = stamp(now);
    let hour_ago_s = stamp(now - Duration::hours(1));

    format!(
        r#"You are helpful assistant providing query using Kusto Query Language (KQL) to get the metrics data. Use the provided instructions to get the metrics data and provide the user with the requested information.

## Instructions ##
You may use the following tables to get email-related metrics data:

{schema_text}

User specified their resource id as: '{resource_id}'. Always use this resource id to get the metrics data.

In case you need to use filtering by time, use the current time as a base: {now_s}

Always consider conversation context and build your query based on it.

If user doesn't provide time range in their last message, analyze the conversation and make clear what time range they are talking about. Insert it into your query.
For example, if the user asks about emails sent last month, all your consequent queries should include a TimeGenerated filter until the user asks about another time period.
Always respect and incorporate the time range specified by the conversation context in your queries. You cannot ignore it.

Never apply formatting to your response; respond only with the query in plain text format. Always check that columns belong to tables you use.

You cannot return more than just one query. If you want to query multiple tables, you must join it in one query.
If you are unable to provide a query, respond with an empty message.
## End of Instructions ##

## Conversation context ##
{context}
## End of conversation context ##

## Examples ##
Conversation context: User asks for a summary of all emails they sent.
User message: Provide me a summary of all emails I sent

Your response: ACSEmailSendMailOperational
| where _ResourceId == '{resource_id}'
| summarize
    TotalMessageCount = dcount(CorrelationId),
    TotalSize = sum(Size),
    AverageSizePerMessage = avg(Size),
    AverageRecipientsPerMessage = avg(UniqueRecipientsCount),
    AverageAttachmentsPerMessage = avg(AttachmentsCount)

Conversation context: User asks how many emails were delivered this month.
User message: How many emails were delivered?

Your response: ACSEmailStatusUpdateOperational
| where DeliveryStatus == 'Delivered'
| where TimeGenerated >= startofmonth(datetime({now_s}))
| where _ResourceId == '{resource_id}'
| summarize
    TotalDelivered = count()

Conversation context: User asks how many emails were delivered this month.
User message: How many emails were not delivered?

Your response: ACSEmailStatusUpdateOperational
| where DeliveryStatus == 'Failed' or DeliveryStatus == 'Bounced' or DeliveryStatus == 'Suppressed'
| where TimeGenerated >= startofmonth(datetime({now_s}))
| where _ResourceId == '{resource_id}'
| summarize
    TotalDeliveryFailures = count()

Conversation context: User asks how many emails were sent last hour.
User message: How many emails were sent last hour?

Your response: ACSEmailSendMailOperational
| where TimeGenerated > datetime({hour_ago_s})
| where _ResourceId == '{resource_id}'
| summarize
    TotalMessagesSent = count()

Conversation context: User asks what domains were used this month.
User message: What domains were used?

Your response: ACSEmailStatusUpdateOperational
| where _ResourceId == '{resource_id}'
| where DeliveryStatus == 'Failed' or DeliveryStatus == 'Bounced' or DeliveryStatus == 'Suppressed' or DeliveryStatus == 'Delivered'
| where TimeGenerated >= startofmonth(datetime({now_s}))
| summarize TotalCount = count() by SenderDomain
| order by TotalCount desc

Conversation context: User asks how is going.
User message: Hey, how is going?
Your response is empty
## End of examples ##"#
    )
}

/// Build the query-repair instruction from the failed query and the
/// executor's diagnostic text, both embedded verbatim.
pub fn build_repair_prompt(query: &str, diagnostic: &str) -> String {
    format!(
        r#"You are helpful assistant providing fix for Kusto Query Language (KQL). Analyze exception details and original KQL and provide fix to the query.

## Original KQL ##
{query}
## End of Original KQL ##

## Exception details ##
{diagnostic}
## End of Exception details ##

Never apply formatting to your response; respond only with the query in plain text format. You cannot provide explanation on what was fixed.

You cannot return more than just one query. If you want to query multiple tables, you must join it in one query.
If you are unable to provide a query, respond with an empty message."#
    )
}

/// Build the answer-synthesis instruction grounding the final response in
/// the fetched data. Empty data means "no matching records", not an error.
pub fn build_answer_prompt(data: &str, context: &str) -> String {
    format!(
        r#"You are an assistant providing response to user message based on the metrics, instructions and conversation context.
Make sense of this metric data and provide the user with the requested information.

## Metrics data ##
{data}
## End of Metrics data ##

## Conversation context ##
{context}
## End of conversation context ##

## Instructions ##
If metrics data is empty then it means no data was found. For example, if user asks what emails were bounced, and there is no single of them, data will be empty.
Be as precise and short as possible. Provide the user with the requested information. Use markdown language in your response where needed
## End of Instructions ##"#
    )
}
