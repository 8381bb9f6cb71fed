//! Fixed catalog of contingency plans and protocols.
//!
//! Plans are canned but their costs and likelihoods come from the trip.

use super::values::{
    CommunicationPlan, ContingencyAction, ContingencyPlan, EmergencyProtocol, MonitoringTrigger,
    RequiredResources, ResponseTime, Urgency,
};

/// Trip figures the catalog parameterizes plans with.
pub(super) struct PlanContext<'a> {
    pub total_budget: f64,
    pub daily_budget: f64,
    pub largest_transport_leg: f64,
    pub currency: &'a str,
    pub alerts: &'a [String],
}

fn action(action_type: &str, description: impl Into<String>, cost: f64, minutes: u32) -> ContingencyAction {
    ContingencyAction {
        action_type: action_type.to_string(),
        description: description.into(),
        cost,
        time_to_execute_minutes: minutes,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub(super) fn transport_failure(ctx: &PlanContext<'_>, likelihood: f64) -> ContingencyPlan {
    let rebooking = if ctx.largest_transport_leg > 0.0 {
        ctx.largest_transport_leg
    } else {
        ctx.total_budget * 0.05
    };
    ContingencyPlan {
        id: "transport_failure".to_string(),
        trigger_condition: "Scheduled transport delayed over 60 minutes or cancelled".to_string(),
        likelihood,
        impact: 0.4,
        response_time: ResponseTime::Hours,
        primary_action: action(
            "rebook",
            format!("Rebook on the next available departure (up to {:.0} {})", rebooking, ctx.currency),
            rebooking,
            60,
        ),
        backup_actions: vec![
            action("alternate_mode", "Switch to bus or train for the same route", rebooking * 0.5, 90),
            action("reschedule", "Swap the next two days of the itinerary", 0.0, 30),
        ],
        resources: RequiredResources {
            contacts: strings(&["Carrier hotline", "Local taxi service"]),
            documents: strings(&["Booking confirmation", "ID"]),
            tools: strings(&["Ride-hailing app", "Offline maps"]),
        },
        communication: CommunicationPlan {
            notify: strings(&["Next accommodation", "Activity operators for the day"]),
            message: "Travel delayed; updated arrival time to follow".to_string(),
            urgency: Urgency::Medium,
        },
        recovery_steps: strings(&[
            "Confirm the replacement booking",
            "Notify downstream bookings of the new arrival",
            "Shift or drop affected activities",
            "Log the extra cost against the emergency fund",
        ]),
    }
}

pub(super) fn health_emergency(ctx: &PlanContext<'_>, likelihood: f64) -> ContingencyPlan {
    let care = ctx.total_budget * 0.10;
    ContingencyPlan {
        id: "health_emergency".to_string(),
        trigger_condition: "Illness or injury that needs medical attention".to_string(),
        likelihood,
        impact: 0.9,
        response_time: ResponseTime::Immediate,
        primary_action: action(
            "medical_care",
            "Go to the nearest clinic or hospital listed in the trip pack",
            care,
            30,
        ),
        backup_actions: vec![
            action("telemedicine", "Consult a doctor by video call", care * 0.1, 15),
            action("pharmacy", "Visit a pharmacy for minor issues", care * 0.05, 30),
        ],
        resources: RequiredResources {
            contacts: strings(&["Emergency services 112", "Insurance assistance line"]),
            documents: strings(&["Insurance policy", "Medical history summary"]),
            tools: strings(&["First-aid kit"]),
        },
        communication: CommunicationPlan {
            notify: strings(&["Emergency contact", "Insurance provider"]),
            message: "Medical situation in progress; location shared".to_string(),
            urgency: Urgency::Critical,
        },
        recovery_steps: strings(&[
            "Stabilize and follow medical advice",
            "File the insurance claim with receipts",
            "Rest days replace scheduled activities",
            "Rebalance the remaining budget",
        ]),
    }
}

pub(super) fn budget_overrun(
    ctx: &PlanContext<'_>,
    likelihood: f64,
    response_time: ResponseTime,
    emergency_fund: f64,
) -> ContingencyPlan {
    ContingencyPlan {
        id: "budget_overrun".to_string(),
        trigger_condition: "Cumulative spend more than 10% over plan".to_string(),
        likelihood,
        impact: 0.7,
        response_time,
        primary_action: action(
            "cut_spending",
            format!(
                "Cap remaining days at {:.0} {} and drop optional paid activities",
                ctx.daily_budget * 0.8,
                ctx.currency
            ),
            0.0,
            30,
        ),
        backup_actions: vec![
            action("use_fund", "Draw on the emergency fund", emergency_fund, 10),
            action("downgrade", "Move to cheaper accommodation for the remaining nights", 0.0, 120),
        ],
        resources: RequiredResources {
            contacts: Vec::new(),
            documents: strings(&["Expense log"]),
            tools: strings(&["Expense tracking app"]),
        },
        communication: CommunicationPlan {
            notify: strings(&["Traveler"]),
            message: "Spending is running ahead of plan; savings mode is on".to_string(),
            urgency: Urgency::High,
        },
        recovery_steps: strings(&[
            "Review the expense log for the overrun source",
            "Apply tactical savings for the next days",
            "Re-plan the remaining days within budget",
            "Confirm spend is back on plan",
        ]),
    }
}

pub(super) fn weather_disruption(ctx: &PlanContext<'_>, likelihood: f64) -> ContingencyPlan {
    let mut message = "Weather has changed today's plan; indoor alternatives are in place".to_string();
    if !ctx.alerts.is_empty() {
        message.push_str(&format!(" (alerts: {})", ctx.alerts.join("; ")));
    }
    ContingencyPlan {
        id: "weather_disruption".to_string(),
        trigger_condition: "Severe weather warning for a trip day".to_string(),
        likelihood,
        impact: 0.5,
        response_time: ResponseTime::Hours,
        primary_action: action(
            "indoor_swap",
            "Replace outdoor activities with the prepared indoor alternatives",
            ctx.daily_budget * 0.1,
            60,
        ),
        backup_actions: vec![
            action("reschedule", "Move outdoor activities to a clear day", 0.0, 30),
            action("rest_day", "Take a rest day at the accommodation", 0.0, 0),
        ],
        resources: RequiredResources {
            contacts: strings(&["Activity operators"]),
            documents: strings(&["Refund policies"]),
            tools: strings(&["Weather app"]),
        },
        communication: CommunicationPlan {
            notify: strings(&["Activity operators"]),
            message,
            urgency: Urgency::Medium,
        },
        recovery_steps: strings(&[
            "Claim refunds for cancelled bookings",
            "Swap in indoor alternatives",
            "Move outdoor plans to clear days",
            "Update the daily budget",
        ]),
    }
}

pub(super) fn lost_documents(ctx: &PlanContext<'_>) -> ContingencyPlan {
    ContingencyPlan {
        id: "lost_documents".to_string(),
        trigger_condition: "Passport, ID or payment cards lost or stolen".to_string(),
        likelihood: 0.05,
        impact: 0.8,
        response_time: ResponseTime::Immediate,
        primary_action: action(
            "report",
            "Report to police and block cards",
            0.0,
            60,
        ),
        backup_actions: vec![
            action("replace", "Apply for emergency travel documents", ctx.total_budget * 0.02, 1440),
            action("cash", "Use the backup card or emergency cash", 0.0, 15),
        ],
        resources: RequiredResources {
            contacts: strings(&["Embassy or consulate", "Card issuer hotline"]),
            documents: strings(&["Digital copies of passport and ID"]),
            tools: Vec::new(),
        },
        communication: CommunicationPlan {
            notify: strings(&["Emergency contact", "Card issuer"]),
            message: "Documents lost; replacement in progress".to_string(),
            urgency: Urgency::High,
        },
        recovery_steps: strings(&[
            "File the police report",
            "Block and replace cards",
            "Obtain replacement documents",
            "Adjust the itinerary around appointments",
        ]),
    }
}

pub(super) fn accommodation_issue(ctx: &PlanContext<'_>) -> ContingencyPlan {
    ContingencyPlan {
        id: "accommodation_issue".to_string(),
        trigger_condition: "Booking missing, overbooked or unfit on arrival".to_string(),
        likelihood: 0.1,
        impact: 0.5,
        response_time: ResponseTime::Hours,
        primary_action: action(
            "rebook",
            "Book a comparable room nearby",
            ctx.daily_budget * 0.4,
            60,
        ),
        backup_actions: vec![action("escalate", "Escalate to the booking platform for relocation", 0.0, 120)],
        resources: RequiredResources {
            contacts: strings(&["Booking platform support"]),
            documents: strings(&["Booking confirmation"]),
            tools: strings(&["Accommodation booking app"]),
        },
        communication: CommunicationPlan {
            notify: strings(&["Booking platform"]),
            message: "Accommodation unavailable; relocation requested".to_string(),
            urgency: Urgency::Medium,
        },
        recovery_steps: strings(&[
            "Document the issue with photos",
            "Secure alternative lodging",
            "Request a refund or compensation",
            "Update the remaining bookings",
        ]),
    }
}

pub(super) fn emergency_protocols() -> Vec<EmergencyProtocol> {
    vec![
        EmergencyProtocol {
            scenario: "medical_emergency".to_string(),
            immediate_actions: strings(&["Call emergency services", "Administer first aid", "Contact insurance assistance"]),
            emergency_contacts: strings(&["112", "Insurance assistance line"]),
            recovery: "Follow treatment, file the claim, and re-plan remaining days around recovery".to_string(),
        },
        EmergencyProtocol {
            scenario: "security_threat".to_string(),
            immediate_actions: strings(&["Move to a safe location", "Contact local police", "Inform the embassy"]),
            emergency_contacts: strings(&["110", "Embassy duty officer"]),
            recovery: "Stay in safe areas and resume the itinerary only after official clearance".to_string(),
        },
        EmergencyProtocol {
            scenario: "natural_disaster".to_string(),
            immediate_actions: strings(&["Follow local evacuation orders", "Register with the embassy", "Conserve phone battery"]),
            emergency_contacts: strings(&["National disaster agency", "Embassy duty officer"]),
            recovery: "Evacuate or shelter, then arrange the earliest safe return".to_string(),
        },
        EmergencyProtocol {
            scenario: "communication_failure".to_string(),
            immediate_actions: strings(&["Go to the pre-agreed meeting point", "Use a local SIM or public Wi-Fi"]),
            emergency_contacts: strings(&["Accommodation front desk"]),
            recovery: "Restore contact and send a status update to the emergency contact".to_string(),
        },
    ]
}

pub(super) fn monitoring_triggers() -> Vec<MonitoringTrigger> {
    let trigger = |condition: &str, threshold: f64, action: &str, notification: &str| MonitoringTrigger {
        condition: condition.to_string(),
        threshold,
        action: action.to_string(),
        notification: notification.to_string(),
    };
    vec![
        trigger("daily_spend_ratio", 0.8, "activate_budget_overrun", "You have used 80% of today's budget"),
        trigger("activity_completion_rate", 0.5, "reschedule_activities", "Less than half of today's activities are done"),
        trigger("health_score", 0.7, "activate_health_emergency", "Check in: how are you feeling?"),
        trigger("weather_risk", 0.6, "activate_weather_disruption", "Weather risk is high; indoor options are ready"),
        trigger("transport_confidence", 0.8, "activate_transport_failure", "Your next transport leg may be disrupted"),
    ]
}
