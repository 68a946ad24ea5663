use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use discharge_core::assistant::{sending_notice, MISSING_STAFF_NAME_MESSAGE};
use discharge_core::config::roster_path_from_env_value;
use discharge_core::constants::{DEFAULT_MAIL_RELAY_TIMEOUT_MS, DEFAULT_MAIL_RELAY_URL};
use discharge_core::response::percent_label;
use discharge_core::{
    Assistant, ChatCommand, ConversationContext, CoreConfig, DischargeRequest, DischargeStatus,
    DischargeWorkflow, EnhancedPatient, RequestStatus, Role, RosterSummary, Session,
};
use mail_relay::MailRelayClient;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dc")]
#[command(about = "Discharge coordination assistant CLI")]
struct Cli {
    /// Roster YAML file (defaults to DC_PATIENT_ROSTER, then the built-in roster)
    #[arg(long, global = true)]
    roster: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List roster patients
    Patients {
        /// ready, pending or delayed
        #[arg(long)]
        status: Option<String>,
    },
    /// Show one patient
    Patient {
        /// Patient id, e.g. PT001
        id: String,
    },
    /// Ask the assistant a single question
    Ask {
        #[arg(required = true, num_args = 1..)]
        utterance: Vec<String>,
    },
    /// Interactive chat; `exit` or `quit` ends it
    Chat,
    /// Roster summary and insights
    Analytics,
    /// Print a demo session token for a role
    Login {
        /// Doctor, Nurse, "Billing Staff" or Admin
        role: String,
    },
    /// Show the session carried by a token
    Whoami { token: String },
    /// List discharge requests
    Requests {
        /// Pending, Approved, Rejected or Completed
        #[arg(long)]
        status: Option<String>,
        /// Session token; shows what the caller may do
        #[arg(long)]
        token: Option<String>,
    },
    /// Approve a pending discharge request
    Approve {
        id: String,
        #[arg(long)]
        token: String,
    },
    /// Reject a pending discharge request
    Reject {
        id: String,
        #[arg(long)]
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("discharge_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let now = Utc::now();

    let Some(command) = cli.command else {
        println!("Use 'dc --help' for commands");
        return Ok(());
    };

    match command {
        Commands::Patients { status } => {
            let filter = status
                .as_deref()
                .map(str::parse::<DischargeStatus>)
                .transpose()?;
            let assistant = load_assistant(cli.roster, now)?;
            let rows: Vec<String> = assistant
                .patients()
                .iter()
                .filter(|p| filter.map_or(true, |s| p.discharge_status == s))
                .map(patient_row)
                .collect();
            if rows.is_empty() {
                println!("No patients found.");
            }
            for row in rows {
                println!("{row}");
            }
        }
        Commands::Patient { id } => {
            let assistant = load_assistant(cli.roster, now)?;
            let patient = assistant
                .patient(&id)
                .ok_or_else(|| anyhow::anyhow!("patient not found: {id}"))?;
            println!("{}", assistant.responder(now).patient_report(patient, ""));
            println!();
            println!(
                "Urgency {}/10, complexity {}/10",
                patient.urgency, patient.complexity
            );
            println!("Barriers: {}", list_or_none(&patient.barriers));
            println!("Next steps: {}", patient.next_steps.join(", "));
        }
        Commands::Ask { utterance } => {
            let assistant = load_assistant(cli.roster, now)?;
            let relay = relay_client()?;
            let mut context = ConversationContext::default();
            for line in answer(&assistant, &relay, &mut context, &utterance.join(" "), now).await {
                println!("{line}");
            }
        }
        Commands::Chat => {
            let assistant = load_assistant(cli.roster, now)?;
            let relay = relay_client()?;
            chat_loop(&assistant, &relay).await?;
        }
        Commands::Analytics => {
            let assistant = load_assistant(cli.roster, now)?;
            let summary = RosterSummary::compute(assistant.patients(), now);
            println!("{}", analytics_report(&summary));
        }
        Commands::Login { role } => {
            let role: Role = role.parse()?;
            let session = Session::demo_login(role, now);
            println!("Logged in as {} ({})", session.name, role);
            println!("{}", session.to_token()?);
        }
        Commands::Whoami { token } => {
            let session = Session::from_token(&token, now)?;
            println!("Name: {}", session.name);
            println!("Email: {}", session.email);
            println!("Roles: {}", session.roles.join(", "));
            let permissions: Vec<&str> = session.permissions.iter().map(|p| p.as_str()).collect();
            println!("Permissions: {}", permissions.join(", "));
            println!("Logged in: {}", session.login_time.to_rfc3339());
        }
        Commands::Requests { status, token } => {
            let filter = status
                .as_deref()
                .map(str::parse::<RequestStatus>)
                .transpose()?;
            let workflow = DischargeWorkflow::seed();
            for request in workflow.list(filter) {
                println!("{}", request_row(request));
            }
            if let Some(token) = token {
                let session = Session::from_token(&token, now)?;
                println!();
                println!(
                    "{} can approve: {}, can reject: {}",
                    session.name,
                    yes_no(DischargeWorkflow::can_approve(&session)),
                    yes_no(DischargeWorkflow::can_reject(&session))
                );
            }
        }
        Commands::Approve { id, token } => {
            let session = Session::from_token(&token, now)?;
            let mut workflow = DischargeWorkflow::seed();
            let request = workflow.approve(&session, &id, now)?;
            println!("Approved: {}", request_row(request));
        }
        Commands::Reject { id, token } => {
            let session = Session::from_token(&token, now)?;
            let mut workflow = DischargeWorkflow::seed();
            let request = workflow.reject(&session, &id, now)?;
            println!("Rejected: {}", request_row(request));
        }
    }

    Ok(())
}

fn load_assistant(roster: Option<PathBuf>, now: DateTime<Utc>) -> anyhow::Result<Assistant> {
    let path = roster.or_else(|| roster_path_from_env_value(std::env::var("DC_PATIENT_ROSTER").ok()));
    let registry = CoreConfig::new(path)?.load_registry(now.date_naive())?;
    tracing::debug!(patients = registry.len(), "roster loaded");
    Ok(Assistant::new(&registry))
}

fn relay_client() -> anyhow::Result<MailRelayClient> {
    let (url, timeout) = relay_settings(|key| std::env::var(key).ok())?;
    Ok(MailRelayClient::new(&url, timeout)?)
}

fn relay_settings(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<(String, Duration)> {
    let url = lookup("DC_MAIL_RELAY_URL").unwrap_or_else(|| DEFAULT_MAIL_RELAY_URL.into());
    let timeout_ms = match lookup("DC_MAIL_RELAY_TIMEOUT_MS") {
        Some(value) => value.trim().parse::<u64>()?,
        None => DEFAULT_MAIL_RELAY_TIMEOUT_MS,
    };
    Ok((url, Duration::from_millis(timeout_ms)))
}

/// Lines to print for one chat line. Email commands go to the relay; the rest to the assistant.
async fn answer(
    assistant: &Assistant,
    relay: &MailRelayClient,
    context: &mut ConversationContext,
    line: &str,
    now: DateTime<Utc>,
) -> Vec<String> {
    match ChatCommand::parse(line) {
        ChatCommand::SendEmail { staff_name } => {
            let notice = sending_notice(&staff_name);
            let result = relay.send_discharge_email(&staff_name).await;
            vec![notice, mail_relay::chat_message(&result)]
        }
        ChatCommand::MissingStaffName => vec![MISSING_STAFF_NAME_MESSAGE.to_owned()],
        ChatCommand::Query => vec![assistant.process(context, line, now).text],
    }
}

async fn chat_loop(assistant: &Assistant, relay: &MailRelayClient) -> anyhow::Result<()> {
    println!("Discharge assistant ready. Type 'help' for ideas, 'exit' to leave.");
    let stdin = std::io::stdin();
    let mut context = ConversationContext::default();
    let mut input = String::new();

    loop {
        print!("> ");
        std::io::stdout().flush()?;
        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }
        for reply in answer(assistant, relay, &mut context, line, Utc::now()).await {
            println!("{reply}\n");
        }
    }

    Ok(())
}

fn patient_row(patient: &EnhancedPatient) -> String {
    format!(
        "{:<6} {:<18} {:<6} {:<8} urgency {:>2}/10  complexity {:>2}/10",
        patient.id.as_str(),
        patient.name.as_str(),
        patient.room,
        patient.discharge_status.as_str(),
        patient.urgency,
        patient.complexity
    )
}

fn request_row(request: &DischargeRequest) -> String {
    format!(
        "#{} {} ({}, {}) {} [{} priority] requested {} by {}",
        request.id,
        request.patient_name,
        request.patient_id,
        request.room,
        request.status,
        request.priority.as_str(),
        request.request_date,
        request.doctor
    )
}

fn analytics_report(summary: &RosterSummary) -> String {
    let mut out = format!("Patients: {}\n", summary.total);
    for (label, count) in [
        ("Ready", summary.ready),
        ("Pending", summary.pending),
        ("Delayed", summary.delayed),
    ] {
        out.push_str(&format!(
            "  {label:<8} {count} ({})\n",
            percent_label(count, summary.total)
        ));
    }
    out.push_str(&format!("Average urgency: {:.1}/10\n", summary.average_urgency));
    out.push_str(&format!(
        "Average complexity: {:.1}/10\n",
        summary.average_complexity
    ));
    out.push_str(&format!(
        "Average length of stay: {:.1} days\n",
        summary.average_length_of_stay
    ));
    out.push_str(&format!(
        "High urgency: {}, high complexity: {}\n",
        summary.high_urgency, summary.high_complexity
    ));

    let insights = summary.insights();
    if !insights.is_empty() {
        out.push_str("\nInsights:\n");
        for insight in insights {
            out.push_str(&format!(
                "  [{}] {}: {}\n",
                insight.priority.as_str(),
                insight.title,
                insight.message
            ));
        }
    }
    out.trim_end().to_owned()
}

fn list_or_none(items: &[&str]) -> String {
    if items.is_empty() {
        "none".to_owned()
    } else {
        items.join(", ")
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
