//! Response generation.
//!
//! [`ResponseGenerator`] turns a [`Classification`] into the markdown-flavoured reply shown in
//! the chat window. Rendering is a pure function of the classification, the utterance, the
//! roster and the clock value handed in at construction.

use crate::analytics::{length_of_stay, one_decimal, percentage, RosterSummary};
use crate::canned::{
    canned_keys, canned_response, BED_MANAGEMENT, DOCUMENTATION, FAMILY_CONTACT, MEDICATION,
    TRANSPORTATION,
};
use crate::constants::CANNED_MATCH_THRESHOLD;
use crate::derived::EnhancedPatient;
use crate::intent::{mentions_patient, Classification, Entity, IntentKind};
use crate::patient::DischargeStatus;
use crate::text_match::TextMatcher;
use chrono::{DateTime, Utc};

/// Display format for calendar dates, e.g. `1/15/2025`.
pub const DATE_FORMAT: &str = "%-m/%-d/%Y";

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Status a roster listing should be narrowed to, if the utterance asks for one.
///
/// `ready`/`can go` win over `pending`/`waiting`, which win over `delayed`/`stuck`.
pub fn roster_filter(lower_input: &str) -> Option<DischargeStatus> {
    if contains_any(lower_input, &["ready", "can go"]) {
        Some(DischargeStatus::Ready)
    } else if contains_any(lower_input, &["pending", "waiting"]) {
        Some(DischargeStatus::Pending)
    } else if contains_any(lower_input, &["delayed", "stuck"]) {
        Some(DischargeStatus::Delayed)
    } else {
        None
    }
}

pub struct ResponseGenerator<'a> {
    patients: &'a [EnhancedPatient],
    matcher: &'a dyn TextMatcher,
    now: DateTime<Utc>,
}

impl<'a> ResponseGenerator<'a> {
    pub fn new(
        patients: &'a [EnhancedPatient],
        matcher: &'a dyn TextMatcher,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            patients,
            matcher,
            now,
        }
    }

    /// Renders the reply for a classified utterance.
    pub fn render(&self, classification: &Classification, input: &str) -> String {
        match classification.intent {
            IntentKind::PatientQuery => self.patient_query(&classification.entities, input),
            IntentKind::StatusRequest => self.status_request(input),
            IntentKind::WorkflowManagement => self.workflow_query(input),
            IntentKind::Analytics => self.analytics_query(input),
            IntentKind::Help => help_text(),
            IntentKind::General => self.fallback(input),
        }
    }

    fn summary(&self) -> RosterSummary {
        RosterSummary::compute(self.patients, self.now)
    }

    fn with_status(&self, status: DischargeStatus) -> Vec<&'a EnhancedPatient> {
        self.patients
            .iter()
            .filter(|p| p.discharge_status == status)
            .collect()
    }

    fn find(&self, id: &str) -> Option<&'a EnhancedPatient> {
        self.patients.iter().find(|p| p.id.as_str() == id)
    }

    // ========================================================================
    // Patient queries
    // ========================================================================

    fn patient_query(&self, entities: &[Entity], input: &str) -> String {
        let from_entity = entities.iter().find_map(|e| match e {
            Entity::Patient(r) => self.find(&r.id),
            _ => None,
        });

        let lower = input.to_lowercase();
        let patient =
            from_entity.or_else(|| self.patients.iter().find(|p| mentions_patient(&lower, p)));

        match patient {
            Some(patient) => self.patient_report(patient, input),
            None => self.roster_listing(roster_filter(&lower)),
        }
    }

    /// Status report when the utterance asks about status, otherwise the general info card.
    pub fn patient_report(&self, patient: &EnhancedPatient, input: &str) -> String {
        let lower = input.to_lowercase();
        let mut out = format!("**{} (Room {})** - ", patient.name, patient.room);

        if contains_any(&lower, &["status", "how", "what"]) {
            out.push_str(&format!(
                "Discharge Status: {}\n\n",
                patient.discharge_status.as_str().to_uppercase()
            ));
            match patient.discharge_status {
                DischargeStatus::Ready => {
                    out.push_str("✅ **All discharge criteria met**\n");
                    out.push_str("- Physician orders: Complete\n");
                    out.push_str("- Medications reconciled: Ready\n");
                    out.push_str("- Patient education: Completed\n");
                    out.push_str("- Transportation: Arranged\n");
                    out.push_str("- Follow-up: Scheduled\n\n");
                    out.push_str("**Ready for immediate discharge** - No barriers identified.");
                }
                DischargeStatus::Pending => {
                    out.push_str("⏳ **Pending Items:**\n");
                    out.push_str(&bullets("- ", &patient.barriers));
                    out.push_str("\n\n✅ **Completed:**\n");
                    out.push_str("- Medical treatment on track\n");
                    out.push_str("- Discharge planning initiated\n\n");
                    out.push_str(&format!("**Next Steps:** {}", patient.next_steps.join(", ")));
                }
                DischargeStatus::Delayed => {
                    out.push_str("🔴 **Delayed Discharge**\n");
                    out.push_str(&format!("**Barriers:** {}\n", patient.barriers.join(", ")));
                    out.push_str(&format!("**Urgency Level:** {}/10\n", patient.urgency));
                    out.push_str(&format!("**Complexity:** {}/10\n\n", patient.complexity));
                    out.push_str(&format!(
                        "**Action Required:** {}",
                        patient.next_steps.join(", ")
                    ));
                }
            }
        } else {
            out.push_str("**General Information:**\n");
            out.push_str(&format!("- Age: {}\n", patient.age));
            out.push_str(&format!("- Diagnosis: {}\n", patient.diagnosis));
            out.push_str(&format!("- Physician: {}\n", patient.physician));
            out.push_str(&format!(
                "- Admission: {}\n",
                patient.admission_date.format(DATE_FORMAT)
            ));
            out.push_str(&format!(
                "- Length of stay: {} days\n",
                length_of_stay(patient.admission_date, self.now)
            ));
            out.push_str(&format!("- Status: {}\n\n", patient.discharge_status));
            out.push_str(&format!("**Keywords:** {}", patient.keywords.join(", ")));
        }

        out
    }

    /// Roster grouped Ready, Pending, Delayed, optionally narrowed to one status.
    pub fn roster_listing(&self, filter: Option<DischargeStatus>) -> String {
        let mut out = String::from("**Patient Discharge Overview:**\n\n");
        let mut total = 0;

        for (status, heading) in [
            (DischargeStatus::Ready, "🟢 **Ready for Discharge"),
            (DischargeStatus::Pending, "🟡 **Pending Discharge"),
            (DischargeStatus::Delayed, "🔴 **Delayed Discharge"),
        ] {
            if filter.is_some_and(|f| f != status) {
                continue;
            }
            let group = self.with_status(status);
            total += group.len();
            if group.is_empty() {
                continue;
            }
            out.push_str(&format!("{heading} ({}):**\n", group.len()));
            for p in group {
                out.push_str(&format!("• {} ({}) - {}\n", p.name, p.room, p.diagnosis));
            }
            out.push('\n');
        }

        out.push_str(&format!("**Total: {total} patients**"));
        out
    }

    // ========================================================================
    // Status requests
    // ========================================================================

    fn status_request(&self, input: &str) -> String {
        let lower = input.to_lowercase();

        if lower.contains("delay") {
            self.delay_analysis()
        } else if contains_any(&lower, &["transport", "pickup"]) {
            self.transportation_status()
        } else if lower.contains("med") {
            self.medication_status()
        } else if let Some(status) = roster_filter(&lower) {
            self.roster_listing(Some(status))
        } else {
            self.general_status()
        }
    }

    fn delay_analysis(&self) -> String {
        let delayed = self.with_status(DischargeStatus::Delayed);
        let average_urgency = if delayed.is_empty() {
            0.0
        } else {
            delayed.iter().map(|p| f64::from(p.urgency)).sum::<f64>() / delayed.len() as f64
        };

        let mut out = String::from("**Discharge Delay Analysis:**\n\n");
        out.push_str(&format!("🔴 **Delayed Patients: {}**\n", delayed.len()));
        out.push_str(&format!(
            "📊 **Average Urgency Level: {:.1}/10**\n\n",
            one_decimal(average_urgency)
        ));
        for p in delayed {
            out.push_str(&format!("**{} ({})**\n", p.name, p.room));
            out.push_str(&format!("- Urgency: {}/10\n", p.urgency));
            out.push_str(&format!("- Complexity: {}/10\n", p.complexity));
            out.push_str(&format!("- Barriers: {}\n", p.barriers.join(", ")));
            out.push_str(&format!("- Next Steps: {}\n\n", p.next_steps.join(", ")));
        }
        out
    }

    fn transportation_status(&self) -> String {
        let ready = self.with_status(DischargeStatus::Ready);
        let pending = self.with_status(DischargeStatus::Pending);

        let mut out = String::from("**Transportation Coordination Status:**\n\n");
        out.push_str(&format!("✅ **Confirmed & Ready ({}):**\n", ready.len()));
        for p in ready {
            out.push_str(&format!("• {} - Transportation arranged\n", p.name));
        }
        out.push_str(&format!("\n⏳ **Pending Coordination ({}):**\n", pending.len()));
        for p in pending {
            // case-sensitive: the built-in barriers are capitalised
            let barrier = p
                .barriers
                .iter()
                .find(|b| b.contains("transport"))
                .copied()
                .unwrap_or("Coordination needed");
            out.push_str(&format!("• {} - {barrier}\n", p.name));
        }
        out
    }

    fn medication_status(&self) -> String {
        let summary = self.summary();
        let mut out = String::from("**Medication Reconciliation Status:**\n\n");
        out.push_str(&format!("✅ **Completed: {} patients**\n", summary.ready));
        out.push_str(&format!("⏳ **In Progress: {} patients**\n", summary.pending));
        out.push_str(&format!("🔴 **Delayed: {} patients**\n\n", summary.delayed));
        out.push_str("**System Notes:**\n");
        out.push_str("- Electronic medication reconciliation active\n");
        out.push_str("- Pharmacy verification in progress\n");
        out.push_str("- Patient education materials prepared");
        out
    }

    fn general_status(&self) -> String {
        let s = self.summary();
        let mut out = String::from("**Overall Discharge Status Summary:**\n\n");
        out.push_str("📊 **Patient Distribution:**\n");
        out.push_str(&format!("• Total: {} patients\n", s.total));
        out.push_str(&format!("• Ready: {} ({:.1}%)\n", s.ready, s.ready_percent));
        out.push_str(&format!("• Pending: {} ({:.1}%)\n", s.pending, s.pending_percent));
        out.push_str(&format!("• Delayed: {} ({:.1}%)\n\n", s.delayed, s.delayed_percent));
        out.push_str("📈 **Metrics:**\n");
        out.push_str(&format!("• Average Urgency: {:.1}/10\n", s.average_urgency));
        out.push_str(&format!("• Average Complexity: {:.1}/10\n", s.average_complexity));
        out.push_str(&format!("• Discharge Efficiency: {:.1}%", s.ready_percent));
        out
    }

    // ========================================================================
    // Workflow
    // ========================================================================

    fn workflow_query(&self, input: &str) -> String {
        let lower = input.to_lowercase();
        let key = if contains_any(&lower, &["transport", "pickup"]) {
            Some(TRANSPORTATION)
        } else if lower.contains("med") {
            Some(MEDICATION)
        } else if contains_any(&lower, &["document", "paperwork"]) {
            Some(DOCUMENTATION)
        } else if contains_any(&lower, &["room", "bed"]) {
            Some(BED_MANAGEMENT)
        } else if contains_any(&lower, &["family", "contact"]) {
            Some(FAMILY_CONTACT)
        } else {
            None
        };

        key.and_then(canned_response)
            .map(str::to_owned)
            .unwrap_or_else(workflow_overview)
    }

    // ========================================================================
    // Analytics
    // ========================================================================

    fn analytics_query(&self, input: &str) -> String {
        let lower = input.to_lowercase();
        if contains_any(&lower, &["how many", "count"]) {
            self.patient_counts()
        } else if contains_any(&lower, &["average", "metrics"]) {
            self.metrics()
        } else if contains_any(&lower, &["today", "now"]) {
            self.today_summary()
        } else {
            self.comprehensive_analytics()
        }
    }

    fn patient_counts(&self) -> String {
        let s = self.summary();
        let mut out = String::from("**Patient Count Summary:**\n\n");
        out.push_str("📊 **Current Census:**\n");
        out.push_str(&format!("• Total patients: {}\n", s.total));
        out.push_str(&format!("• Ready for discharge: {}\n", s.ready));
        out.push_str(&format!("• Pending discharge: {}\n", s.pending));
        out.push_str(&format!("• Delayed discharge: {}\n\n", s.delayed));
        out.push_str("📈 **Discharge Readiness:**\n");
        out.push_str(&format!("• {:.1}% ready for discharge\n", s.ready_percent));
        out.push_str(&format!("• {:.1}% pending items\n", s.pending_percent));
        out.push_str(&format!("• {:.1}% experiencing delays", s.delayed_percent));
        out
    }

    fn metrics(&self) -> String {
        let s = self.summary();
        let mut out = String::from("**Discharge Metrics:**\n\n");
        out.push_str("📊 **Average Scores:**\n");
        out.push_str(&format!("• Urgency Level: {:.1}/10\n", s.average_urgency));
        out.push_str(&format!("• Complexity Level: {:.1}/10\n\n", s.average_complexity));
        out.push_str("🚨 **High Priority Patients:**\n");
        out.push_str(&format!("• High urgency (8+): {} patients\n", s.high_urgency));
        out.push_str(&format!(
            "• High complexity (8+): {} patients\n\n",
            s.high_complexity
        ));
        out.push_str("📈 **Performance Indicators:**\n");
        out.push_str(&format!("• Discharge efficiency: {:.1}%\n", s.ready_percent));
        out.push_str(&format!("• Delay rate: {:.1}%", s.delayed_percent));
        out
    }

    fn today_summary(&self) -> String {
        let ready = self.with_status(DischargeStatus::Ready);
        let pending = self.with_status(DischargeStatus::Pending);
        let delayed = self.with_status(DischargeStatus::Delayed);

        let mut out = format!(
            "**Today's Discharge Summary ({}):**\n\n",
            self.now.format(DATE_FORMAT)
        );
        out.push_str("📅 **Today's Schedule:**\n");
        out.push_str(&format!(
            "• Scheduled discharges: {} patients\n",
            self.patients.len()
        ));
        out.push_str(&format!("• Ready to go: {} patients\n", ready.len()));
        out.push_str(&format!("• Pending items: {} patients\n", pending.len()));
        out.push_str(&format!("• Delayed discharges: {} patients\n\n", delayed.len()));
        out.push_str("⚡ **Immediate Actions:**\n");
        for p in &delayed {
            if let Some(step) = p.next_steps.first() {
                out.push_str(&format!("• {}: {step}\n", p.name));
            }
        }
        out.push_str(&format!(
            "\n🎯 **Goal:** Complete {} discharges by 5 PM",
            ready.len() + pending.len() / 2
        ));
        out
    }

    fn comprehensive_analytics(&self) -> String {
        let s = self.summary();
        let mut out = String::from("**Comprehensive Discharge Analytics:**\n\n");
        out.push_str("📊 **Patient Distribution:**\n");
        out.push_str(&format!("• Total: {} patients\n", s.total));
        out.push_str(&format!("• Ready: {}\n", s.ready));
        out.push_str(&format!("• Pending: {}\n", s.pending));
        out.push_str(&format!("• Delayed: {}\n\n", s.delayed));
        out.push_str("📈 **Performance Metrics:**\n");
        out.push_str(&format!("• Average urgency: {:.1}/10\n", s.average_urgency));
        out.push_str(&format!("• Average complexity: {:.1}/10\n", s.average_complexity));
        out.push_str(&format!("• Discharge readiness: {:.1}%\n\n", s.ready_percent));
        out.push_str("🎯 **Recommendations:**\n");
        out.push_str("• Focus on high-urgency delayed patients\n");
        out.push_str("• Expedite transportation coordination\n");
        out.push_str("• Streamline documentation processes");
        out
    }

    // ========================================================================
    // Fallback
    // ========================================================================

    fn fallback(&self, input: &str) -> String {
        let lower = input.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();

        let relevant = self.patients.iter().find(|p| {
            p.keywords.iter().any(|keyword| {
                words
                    .iter()
                    .any(|word| word.contains(keyword.as_str()) || keyword.contains(word))
            })
        });
        if let Some(patient) = relevant {
            return format!(
                "I understand you're asking about patient discharge information. Let me help you with {}:\n\n{}",
                patient.name,
                self.patient_report(patient, input)
            );
        }

        let keys = canned_keys();
        if let Some(best) = self.matcher.best_match(&lower, &keys) {
            if best.score > CANNED_MATCH_THRESHOLD {
                if let Some(text) = canned_response(keys[best.index]) {
                    return text.to_owned();
                }
            }
        }

        let s = self.summary();
        let mut out = format!(
            "I understand you're asking about \"{input}\". Let me provide you with relevant discharge information:\n\n"
        );
        out.push_str("📊 **Current Status:**\n");
        out.push_str(&format!("• {} patients in discharge planning\n", s.total));
        out.push_str(&format!("• {} ready for discharge\n", s.ready));
        out.push_str(&format!("• {} experiencing delays\n\n", s.delayed));
        out.push_str("💡 **Try asking:**\n");
        out.push_str("• \"Show me ready patients\"\n");
        out.push_str("• \"What delays exist?\"\n");
        out.push_str("• \"Patient status for [name]\"\n");
        out.push_str("• \"Today's discharge summary\"\n\n");
        out.push_str(
            "I'm designed to understand natural healthcare language - feel free to ask specific questions!",
        );
        out
    }
}

fn bullets(prefix: &str, items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("{prefix}{item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn workflow_overview() -> String {
    [
        "**Discharge Workflow Overview:**",
        "",
        "🔄 **Current Workflow Status:**",
        "• 6 patients in discharge planning",
        "• 2 ready for immediate discharge",
        "• 4 with pending workflow items",
        "",
        "📋 **Active Workflows:**",
        "• Transportation coordination: 2 pending",
        "• Medication reconciliation: 3 completed, 3 in progress",
        "• Documentation: 4 complete, 2 pending",
        "• Family communication: 5 contacted, 1 pending",
        "",
        "🎯 **Priority Actions:**",
        "• Resolve Martinez transport issue",
        "• Complete Davis cardiology clearance",
        "• Expedite Brown insurance authorization",
    ]
    .join("\n")
}

/// Fixed help text listing the kinds of questions the assistant understands.
pub fn help_text() -> String {
    [
        "**AI Discharge Assistant - Help Guide**",
        "",
        "🤖 **I'm your intelligent discharge coordinator!**",
        "",
        "📋 **Patient Queries:**",
        "• \"Show me Margaret Johnson's status\"",
        "• \"What's the discharge status for Robert Martinez?\"",
        "• \"Patient list overview\"",
        "• \"Who's ready for discharge?\"",
        "",
        "🚨 **Workflow Management:**",
        "• \"What delays do we have today?\"",
        "• \"Transportation status update\"",
        "• \"Medication reconciliation status\"",
        "• \"Documentation completion\"",
        "",
        "📊 **Analytics & Reports:**",
        "• \"How many patients are ready?\"",
        "• \"Today's discharge summary\"",
        "• \"Average length of stay\"",
        "• \"Discharge metrics\"",
        "",
        "💡 **Smart Features:**",
        "• Natural language understanding",
        "• Context-aware responses",
        "• Intelligent patient matching",
        "• Predictive analytics",
        "",
        "**Just ask me naturally - I understand healthcare terminology!**",
    ]
    .join("\n")
}

/// Percentage label used across the reports, e.g. `33.3%`.
pub fn percent_label(part: usize, whole: usize) -> String {
    format!("{:.1}%", percentage(part, whole))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canned::{PATIENT_READINESS, CANNED_RESPONSES};
    use crate::intent::classify;
    use crate::patient::PatientRegistry;
    use crate::text_match::TokenOverlapMatcher;
    use chrono::TimeZone;

    fn seed() -> Vec<EnhancedPatient> {
        EnhancedPatient::from_registry(&PatientRegistry::seed())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 21, 12, 0, 0).unwrap()
    }

    fn reply(input: &str) -> String {
        let patients = seed();
        let generator = ResponseGenerator::new(&patients, &TokenOverlapMatcher, now());
        generator.render(&classify(input, &patients), input)
    }

    #[test]
    fn ready_patients_lists_exactly_the_ready_group() {
        let text = reply("Show me ready patients");
        assert!(text.starts_with("**Patient Discharge Overview:**"));
        assert!(text.contains("🟢 **Ready for Discharge (2):**"));
        assert!(text.contains("• Margaret Johnson (A-204) - Pneumonia, recovered"));
        assert!(text.contains("• William Thompson (C-205) - Diabetes management"));
        assert!(text.ends_with("**Total: 2 patients**"));
        for other in ["Robert Martinez", "Linda Davis", "Dorothy Wilson", "Charles Brown"] {
            assert!(!text.contains(other), "{other} should not be listed");
        }
    }

    #[test]
    fn ready_patient_status_uses_checklist() {
        let text = reply("Margaret Johnson status");
        assert!(text.starts_with("**Margaret Johnson (Room A-204)** - Discharge Status: READY"));
        assert!(text.contains("✅ **All discharge criteria met**"));
        assert!(text.ends_with("**Ready for immediate discharge** - No barriers identified."));
    }

    #[test]
    fn pending_and_delayed_status_reports() {
        let pending = reply("How is Robert Martinez doing?");
        assert!(pending.contains("Discharge Status: PENDING"));
        assert!(pending.contains("⏳ **Pending Items:**\n- Transportation coordination\n- Equipment delivery"));
        assert!(pending.ends_with(
            "**Next Steps:** Resolve pending items, Coordinate with family, Schedule follow-up"
        ));

        let delayed = reply("what about Linda Davis");
        assert!(delayed.contains("🔴 **Delayed Discharge**"));
        assert!(delayed.contains("**Urgency Level:** 10/10"));
        assert!(delayed.contains("**Complexity:** 4/10"));
    }

    #[test]
    fn general_card_without_status_words() {
        let text = reply("Tell me about William Thompson");
        assert!(text.contains("**General Information:**"));
        assert!(text.contains("- Admission: 1/18/2025"));
        assert!(text.contains("- Length of stay: 4 days"));
        assert!(text.contains("- Status: ready"));
        assert!(text.ends_with("**Keywords:** diabetes, management, william, thompson"));
    }

    #[test]
    fn roster_listing_without_filter_groups_everyone() {
        let patients = seed();
        let generator = ResponseGenerator::new(&patients, &TokenOverlapMatcher, now());
        let text = generator.roster_listing(None);
        let ready = text.find("🟢").unwrap();
        let pending = text.find("🟡").unwrap();
        let delayed = text.find("🔴").unwrap();
        assert!(ready < pending && pending < delayed);
        assert!(text.ends_with("**Total: 6 patients**"));
    }

    #[test]
    fn delay_analysis_lists_delayed_patients() {
        let text = reply("Any delayed discharges?");
        assert!(text.contains("🔴 **Delayed Patients: 2**"));
        assert!(text.contains("📊 **Average Urgency Level: 9.0/10**"));
        assert!(text.contains("**Linda Davis (A-301)**"));
        assert!(text.contains("**Charles Brown (A-105)**"));
    }

    #[test]
    fn transportation_status_request() {
        let text = reply("Transportation coordination status");
        assert!(text.contains("✅ **Confirmed & Ready (2):**"));
        assert!(text.contains("• Robert Martinez - Coordination needed"));
    }

    #[test]
    fn general_status_reports_percentages() {
        let text = reply("discharge status");
        assert!(text.contains("• Ready: 2 (33.3%)"));
        assert!(text.contains("• Average Urgency: 7.2/10"));
        assert!(text.contains("• Discharge Efficiency: 33.3%"));
    }

    #[test]
    fn workflow_queries_return_canned_reports() {
        assert_eq!(reply("bed availability"), canned_response(BED_MANAGEMENT).unwrap());
        assert_eq!(reply("call the family"), canned_response(FAMILY_CONTACT).unwrap());
        assert!(reply("room").starts_with("Current Bed Management Status"));
    }

    #[test]
    fn analytics_branches() {
        assert!(reply("How many patients are ready?").contains("• 33.3% ready for discharge"));
        let metrics = reply("Discharge metrics");
        assert!(metrics.contains("• High urgency (8+): 3 patients"));
        assert!(metrics.ends_with(
            "📈 **Performance Indicators:**\n• Discharge efficiency: 33.3%\n• Delay rate: 33.3%"
        ));
        assert!(!metrics.contains("length of stay"));
        let today = reply("Discharge metrics today");
        assert!(today.starts_with("**Discharge Metrics:**"));
        let summary = reply("today");
        assert!(summary.starts_with("**Today's Discharge Summary (1/21/2025):**"));
        assert!(summary.contains("• Linda Davis: Escalate to physician"));
        assert!(summary.ends_with("Complete 3 discharges by 5 PM"));
        assert!(reply("census overview").starts_with("**Comprehensive Discharge Analytics:**"));
    }

    #[test]
    fn help_text_for_help_intent() {
        assert_eq!(reply("help"), help_text());
    }

    #[test]
    fn fallback_prefers_keyword_matched_patient() {
        let text = reply("pneumonia ward");
        assert!(text.starts_with(
            "I understand you're asking about patient discharge information. Let me help you with Margaret Johnson:"
        ));
        assert!(text.contains("**General Information:**"));

        // a token containing a keyword counts too
        assert!(reply("hips").contains("Let me help you with Robert Martinez:"));
    }

    #[test]
    fn fallback_uses_canned_match_above_threshold() {
        assert_eq!(reply("availability"), canned_response(BED_MANAGEMENT).unwrap());
        assert_eq!(reply("patients patient"), canned_response(PATIENT_READINESS).unwrap());
    }

    #[test]
    fn fallback_snapshot_when_nothing_matches() {
        let text = reply("xyz");
        assert!(text.starts_with("I understand you're asking about \"xyz\"."));
        assert!(text.contains("• 6 patients in discharge planning"));
        assert!(text.contains("• 2 experiencing delays"));
        assert!(!CANNED_RESPONSES.iter().any(|(_, t)| *t == text));
    }

    #[test]
    fn percent_label_formats_one_decimal() {
        assert_eq!(percent_label(2, 6), "33.3%");
        assert_eq!(percent_label(0, 6), "0.0%");
    }
}
