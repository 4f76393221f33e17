//! Keyword heuristics for intent and workflow selection.
//!
//! Both are ordered rule lists evaluated top to bottom; the first rule that
//! matches decides the outcome.

use std::sync::Arc;
use tracing::debug;

use super::types::{Intent, Workflow};
use crate::document::Document;

const INTENT_RULES: &[(&[&str], Intent)] = &[
    (&["repair", "fix", "leak", "broken"], Intent::MaintenanceRequest),
    (&["pay", "rent", "autopay"], Intent::RentQuestion),
    (&["renew", "extend", "lease"], Intent::LeaseQuestion),
];

pub struct IntentClassifier;

impl IntentClassifier {
    /// Substring match over the lowercased message
    pub fn classify(message: &str) -> Intent {
        let lowered = message.to_lowercase();

        for (keywords, intent) in INTENT_RULES {
            if let Some(keyword) = keywords.iter().find(|k| lowered.contains(*k)) {
                debug!("Detected {} intent: matched '{}'", intent.as_str(), keyword);
                return *intent;
            }
        }

        Intent::General
    }
}

/// Inputs a workflow rule may inspect
pub struct WorkflowContext<'a> {
    pub intent: Intent,
    pub message: &'a str,
    pub documents: &'a [Arc<Document>],
}

type WorkflowPredicate = fn(&WorkflowContext<'_>) -> bool;

fn always(_: &WorkflowContext<'_>) -> bool {
    true
}

fn mentions_late(ctx: &WorkflowContext<'_>) -> bool {
    ctx.message.to_lowercase().contains("late")
}

fn retrieved_renewal_policy(ctx: &WorkflowContext<'_>) -> bool {
    ctx.documents
        .iter()
        .any(|doc| doc.content.to_lowercase().contains("renewal"))
}

const WORKFLOW_RULES: &[(Intent, WorkflowPredicate, Workflow)] = &[
    (Intent::MaintenanceRequest, always, Workflow::MaintenanceRequest),
    (Intent::RentQuestion, mentions_late, Workflow::RentReminder),
    (Intent::LeaseQuestion, retrieved_renewal_policy, Workflow::RenewalOffer),
];

pub struct WorkflowRules;

impl WorkflowRules {
    /// At most one workflow per message
    pub fn select(ctx: &WorkflowContext<'_>) -> Option<Workflow> {
        WORKFLOW_RULES
            .iter()
            .find(|(intent, predicate, _)| *intent == ctx.intent && predicate(ctx))
            .map(|(_, _, workflow)| *workflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(intent: Intent, message: &'a str, documents: &'a [Arc<Document>]) -> WorkflowContext<'a> {
        WorkflowContext {
            intent,
            message,
            documents,
        }
    }

    #[test]
    fn test_classify_examples() {
        assert_eq!(
            IntentClassifier::classify("There is a leak in my kitchen, please fix it"),
            Intent::MaintenanceRequest
        );
        assert_eq!(IntentClassifier::classify("How do I pay rent online?"), Intent::RentQuestion);
        assert_eq!(IntentClassifier::classify("Can I renew my lease next year?"), Intent::LeaseQuestion);
        assert_eq!(IntentClassifier::classify("Is the gym open on Sunday?"), Intent::General);
        assert_eq!(IntentClassifier::classify(""), Intent::General);
    }

    #[test]
    fn test_first_rule_wins() {
        // maintenance beats rent, rent beats lease
        assert_eq!(
            IntentClassifier::classify("Will you FIX the heater before rent is due?"),
            Intent::MaintenanceRequest
        );
        assert_eq!(
            IntentClassifier::classify("Can I pay to extend my lease?"),
            Intent::RentQuestion
        );
    }

    #[test]
    fn test_maintenance_always_triggers() {
        assert_eq!(
            WorkflowRules::select(&ctx(Intent::MaintenanceRequest, "broken sink", &[])),
            Some(Workflow::MaintenanceRequest)
        );
    }

    #[test]
    fn test_rent_reminder_needs_late() {
        assert_eq!(
            WorkflowRules::select(&ctx(Intent::RentQuestion, "My rent will be LATE", &[])),
            Some(Workflow::RentReminder)
        );
        assert_eq!(WorkflowRules::select(&ctx(Intent::RentQuestion, "How do I pay rent?", &[])), None);
    }

    #[test]
    fn test_renewal_offer_needs_renewal_document() {
        let renewal = vec![Arc::new(Document::new(
            "kb-lease",
            "Lease renewal",
            "Renewal offers go out 60 days before the lease ends.",
        ))];
        let unrelated = vec![Arc::new(Document::new("kb-pets", "Pets", "Two pets per unit."))];

        assert_eq!(
            WorkflowRules::select(&ctx(Intent::LeaseQuestion, "renew?", &renewal)),
            Some(Workflow::RenewalOffer)
        );
        assert_eq!(WorkflowRules::select(&ctx(Intent::LeaseQuestion, "renew?", &unrelated)), None);
        assert_eq!(WorkflowRules::select(&ctx(Intent::LeaseQuestion, "renew?", &[])), None);
    }

    #[test]
    fn test_general_never_triggers() {
        assert_eq!(WorkflowRules::select(&ctx(Intent::General, "late fix renewal", &[])), None);
    }
}
