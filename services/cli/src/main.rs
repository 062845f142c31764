mod cli;
mod error;
mod infra;
mod telemetry;

use std::collections::HashMap;
use std::sync::Arc;

use clap::Parser;
use concierge::api::{ConciergeApi, HttpConciergeApi};
use concierge::config::AppConfig;
use concierge::session::{require_session, Session, SessionStore};
use concierge::workflows::application::{
    AttachOutcome, ApplicationWorkflow, FormField, ServiceDefinition,
};
use tracing::{info, warn};

use cli::{ApplyArgs, Cli, Command, ServicesArgs, SessionCommand};
use error::CliError;
use infra::{describe_file, ConsoleGateway, FileSessionStore, PathFilePicker};

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        // Session management needs no config or network.
        Command::Session { command } => run_session(&command),
        Command::Services(args) => {
            let (_, api) = connect()?;
            run_services(api.as_ref(), args).await
        }
        Command::Home => {
            let (_, api) = connect()?;
            run_home(api.as_ref()).await
        }
        Command::Wallet => {
            let (_, api) = connect()?;
            run_wallet(api.as_ref()).await
        }
        Command::Applications => {
            let (_, api) = connect()?;
            run_applications(api.as_ref()).await
        }
        Command::Apply(args) => {
            let (config, api) = connect()?;
            run_apply(api, config, args).await
        }
    }
}

fn connect() -> Result<(AppConfig, Arc<HttpConciergeApi>), CliError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let api = Arc::new(HttpConciergeApi::new(&config.api)?);
    Ok((config, api))
}

fn run_session(command: &SessionCommand) -> Result<(), CliError> {
    let store = FileSessionStore::from_env();
    match command {
        SessionCommand::Set { token, user_id } => {
            store.save(&Session {
                token: token.clone(),
                user_id: user_id.clone(),
            })?;
            println!("Session stored.");
        }
        SessionCommand::Show => match store.load()? {
            Some(session) => {
                let user = session.user_id.as_deref().unwrap_or("-");
                println!("Logged in (user id: {user}).");
            }
            None => println!("No session stored."),
        },
        SessionCommand::Clear => {
            store.clear()?;
            println!("Session cleared.");
        }
    }
    Ok(())
}

async fn run_services(api: &dyn ConciergeApi, args: ServicesArgs) -> Result<(), CliError> {
    let services = api.view_services().await?;
    let query = args.search.unwrap_or_default();
    let mut shown = 0;

    for service in services
        .iter()
        .filter(|service| service.matches_search(&query))
    {
        render_service(service);
        shown += 1;
    }

    if shown == 0 {
        println!("No services found");
    }
    Ok(())
}

async fn run_home(api: &dyn ConciergeApi) -> Result<(), CliError> {
    let home = api.home().await?;

    if !home.slider.is_empty() {
        println!("Highlights");
        for item in &home.slider {
            println!("- {}", item.image);
        }
        println!();
    }

    println!("Services");
    for service in &home.service {
        render_service(service);
    }
    Ok(())
}

async fn run_wallet(api: &dyn ConciergeApi) -> Result<(), CliError> {
    let session = require_session(&FileSessionStore::from_env())?;
    let balance = api.wallet_balance(&session).await?;
    println!("Current balance: ₹{balance}");
    Ok(())
}

async fn run_applications(api: &dyn ConciergeApi) -> Result<(), CliError> {
    let session = require_session(&FileSessionStore::from_env())?;
    let applications = api.view_applications(&session).await?;

    if applications.is_empty() {
        println!("No applications yet.");
        return Ok(());
    }

    for application in &applications {
        let name = application.service_name.as_deref().unwrap_or("(unknown service)");
        println!(
            "#{} {} — {}",
            application.id,
            name,
            application.application_status.label()
        );
        if let Some(reason) = &application.reason {
            println!("    Reason: {reason}");
        }
        if let Some(date) = &application.purchase_date {
            println!("    Applied on {date}");
        }
    }
    Ok(())
}

async fn run_apply(
    api: Arc<HttpConciergeApi>,
    config: AppConfig,
    args: ApplyArgs,
) -> Result<(), CliError> {
    let session = require_session(&FileSessionStore::from_env())?;

    let services = api.view_services().await?;
    let service = services
        .into_iter()
        .find(|service| service.id == args.service_id)
        .ok_or(CliError::UnknownService(args.service_id))?;

    info!(service_id = service.id, name = %service.name, "opening application");

    let sources: HashMap<_, _> = args
        .docs
        .iter()
        .map(|doc| (doc.label.clone(), doc.path.clone()))
        .collect();
    let picker = PathFilePicker::new(sources);

    let mut workflow = ApplicationWorkflow::new(
        api,
        Arc::new(ConsoleGateway),
        picker,
        config.checkout,
        session,
        service.clone(),
    );

    {
        let form = workflow.form_mut();
        form.set(FormField::FirstName, args.first_name);
        form.set(FormField::LastName, args.last_name);
        form.set(FormField::Mobile, args.mobile);
        form.set(FormField::Email, args.email);
        form.set(FormField::Address, args.address);
        form.set(FormField::State, args.state);
        form.set(FormField::City, args.city);
        form.set(FormField::Pincode, args.pincode);
        form.set(FormField::Gender, args.gender);
        if let Some(dob) = args.dob {
            form.set_dob(dob);
        }
    }
    workflow.set_payment_mode(args.payment.into());
    workflow.set_use_wallet(args.use_wallet);

    if let Err(err) = workflow.refresh_wallet().await {
        warn!(error = %err, "wallet balance unavailable, continuing without the offset");
        workflow.set_use_wallet(false);
    }

    for label in service.required_documents() {
        match workflow.attach_document(&label).await? {
            AttachOutcome::Attached { .. } => {
                let attached = workflow
                    .attachments()
                    .get(&label)
                    .map(|doc| describe_file(&doc.file))
                    .unwrap_or_default();
                println!("Attached {label}: {attached}");
            }
            AttachOutcome::Cancelled => {
                println!("No file provided for {label} (use --doc \"{label}=<path>\")");
            }
        }
    }

    let success = workflow.submit().await?;

    println!();
    println!("Application submitted for {}.", success.service.name);
    if let Some(message) = success.message {
        println!("{message}");
    }
    println!("Payment reference: {}", success.receipt.payment_id);
    println!("Track progress with `concierge applications`.");
    Ok(())
}

fn render_service(service: &ServiceDefinition) {
    println!("[{}] {} — ₹{}", service.id, service.name, service.fees);
    if let Some(description) = &service.description {
        println!("    {description}");
    }
    let documents = service.required_documents();
    if !documents.is_empty() {
        println!("    Documents: {}", documents.join(", "));
    }
}
