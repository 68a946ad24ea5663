//! Canned coordination reports.
//!
//! Each entry is `(key, report)`. Keys are comma-joined trigger phrases; the fallback matcher
//! scores utterances against the key text as a whole. Order matters for tie-breaking.

pub const PENDING_DISCHARGES: &str = "pending discharges,pending discharge,show pending";
pub const PATIENT_READINESS: &str = "patient readiness,readiness status,ready patients";
pub const DISCHARGE_DELAYS: &str = "delays,discharge delays,delayed discharges";
pub const TRANSPORTATION: &str = "transportation,transport coordination,pickup";
pub const MEDICATION: &str = "medication,medications,med reconciliation";
pub const DOCUMENTATION: &str = "documentation,paperwork,discharge papers";
pub const BED_MANAGEMENT: &str = "room,bed management,bed availability";
pub const FAMILY_CONTACT: &str = "family,contact,notification";

pub static CANNED_RESPONSES: [(&str, &str); 8] = [
    (
        PENDING_DISCHARGES,
        "Current pending discharges:

**Robert Martinez** (Room B-112)
- Status: Pending transportation arrangement
- Expected: Today 3:00 PM
- Issue: Waiting for family coordination

**Dorothy Wilson** (Room B-208)
- Status: Pending equipment delivery
- Expected: Tomorrow 10:00 AM  \n\
- Issue: Walker delivery delayed

**Action needed:** Contact families and medical supply vendor.",
    ),
    (
        PATIENT_READINESS,
        "Patient Discharge Readiness Summary:

**Ready for Discharge (2 patients):**
• Margaret Johnson (A-204) - All criteria met, can discharge now
• William Thompson (C-205) - Documentation complete, family notified

**Pending (2 patients):**  \n\
• Robert Martinez (B-112) - Transportation coordination needed
• Dorothy Wilson (B-208) - Medical equipment pending

**Delayed (2 patients):**
• Linda Davis (A-301) - Awaiting cardiology clearance
• Charles Brown (A-105) - Insurance authorization pending",
    ),
    (
        DISCHARGE_DELAYS,
        "Today's Discharge Delays:

**Linda Davis** (Room A-301)
- Delay: 4 hours
- Reason: Waiting for cardiology final clearance
- Action: Dr. Rodriguez contacted, ETA 1 hour

**Charles Brown** (Room A-105)  \n\
- Delay: 2 hours
- Reason: Insurance prior authorization for home oxygen
- Action: Financial team escalating with insurer

**Average delay today:** 2.5 hours
**Main delay causes:** Medical clearances (40%), Insurance (30%), Transportation (30%)",
    ),
    (
        TRANSPORTATION,
        "Transportation Coordination Status:

**Arranged & Confirmed:**
• Margaret Johnson - Daughter pickup at 2:00 PM
• William Thompson - Medical transport at 4:00 PM

**Pending Coordination:**
• Robert Martinez - Family scheduling conflict, backup transport needed
• Dorothy Wilson - Son pickup tentative for tomorrow AM

**Recommendations:**
- Contact backup transport services for Martinez
- Confirm Wilson pickup time by end of day
- Update patient/family on any changes immediately",
    ),
    (
        MEDICATION,
        "Medication Reconciliation Status:

**Completed:**
✓ Margaret Johnson - 4 medications reconciled, patient educated
✓ William Thompson - 3 medications, pharmacy verified
✓ Dorothy Wilson - 6 medications, complex regimen reviewed

**In Progress:**
⏳ Robert Martinez - Awaiting surgeon's final med orders
⏳ Linda Davis - Cardiology medications under review

**Issues:**
⚠️ Charles Brown - Insurance doesn't cover prescribed oxygen concentrator, seeking alternatives",
    ),
    (
        DOCUMENTATION,
        "Discharge Documentation Status:

**Complete & Ready:**
• Margaret Johnson - All forms signed, copies provided
• William Thompson - Documentation packet prepared

**Incomplete:**
• Robert Martinez - Missing PT evaluation summary
• Dorothy Wilson - Awaiting social work assessment
• Linda Davis - Cardiology discharge summary pending
• Charles Brown - Insurance forms need revision

**System Notes:**
- Electronic discharge summaries auto-generated for completed cases
- Reminder alerts sent to physicians for pending documentation",
    ),
    (
        BED_MANAGEMENT,
        "Current Bed Management Status:

**Discharge Impact:**
- 6 patients scheduled for discharge today
- 4 beds becoming available for admissions
- 2 discharges delayed, beds remain occupied

**Bed Availability:**
• Medical Unit A: 2 beds available after discharges
• Medical Unit B: 1 bed available  \n\
• Medical Unit C: 1 bed available

**ED Holding:**
- 3 patients in ED awaiting medical beds
- Estimated bed turnover: 2 hours after discharge cleaning",
    ),
    (
        FAMILY_CONTACT,
        "Family Communication Status:

**Successfully Contacted:**
• Johnson family - Confirmed 2 PM pickup
• Thompson family - Medical transport arranged, family notified
• Wilson family - Tentative pickup scheduled

**Needs Follow-up:**
• Martinez family - Scheduling conflict, need alternative
• Davis family - Delay notification sent, awaiting response
• Brown family - Insurance issue explained, solutions discussed

**Communication Protocol:**
- Discharge coordinator calls families 2 hours before discharge
- Text notifications sent for any delays
- Emergency contacts updated in system",
    ),
];

/// Looks up a canned report by its key.
pub fn canned_response(key: &str) -> Option<&'static str> {
    CANNED_RESPONSES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, text)| *text)
}

pub fn canned_keys() -> Vec<&'static str> {
    CANNED_RESPONSES.iter().map(|(k, _)| *k).collect()
}
