use anyhow::{bail, Result};
use clap::Parser;
use eventhub_client::{EventClient, SubmitError};
use eventhub_form::{
    EventForm, EventSchema, History, OutcomeRouter, SubmitOutcome, Toaster, ValidationErrors,
};
use eventhub_models::{EventId, SubmitMode};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod draft;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("eventhub=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    let config = config::Config::load(&args.config)?;
    let schema = EventSchema {
        max_image_bytes: config.uploads.image_limit(),
    };

    match args.command {
        cli::Command::Validate { draft } => {
            let draft = draft::load_draft(&draft)?;
            match schema.validate(&draft) {
                Ok(_) => {
                    println!("Draft is valid");
                    Ok(())
                }
                Err(errors) => {
                    print_field_errors(&errors);
                    bail!("draft is invalid");
                }
            }
        }
        cli::Command::Submit {
            draft,
            image,
            update,
        } => {
            let mut draft = draft::load_draft(&draft)?;
            if let Some(image) = image {
                draft::attach_image(&mut draft, &image, config.uploads.image_limit()).await?;
            }
            let mode = match update.map(EventId::new) {
                Some(id) if !id.is_routable() => bail!("`{id}` is not a usable event id"),
                Some(id) => SubmitMode::Update(id),
                None => SubmitMode::Create,
            };

            let client = EventClient::with_options(
                &config.api.base_url,
                config.api.timeout(),
                &config.api.user_agent,
            )?;
            let router = OutcomeRouter::new(
                Arc::new(History::default()),
                Arc::new(Toaster::default()),
            )
            .with_notification_duration(config.notifications.duration());
            let form = EventForm::new(client, router.clone(), mode, draft).with_schema(schema);

            tracing::info!(base_url = %config.api.base_url, "submitting event draft");
            match form.submit().await {
                SubmitOutcome::Succeeded { path, .. } => {
                    println!("{path}");
                    Ok(())
                }
                SubmitOutcome::Invalid(errors) => {
                    print_field_errors(&errors);
                    bail!("draft is invalid");
                }
                SubmitOutcome::Failed(err) => {
                    eprintln!("{}", failure_report(&router, form.mode(), &err));
                    bail!("submission failed ({})", err.kind.code());
                }
                SubmitOutcome::AlreadySubmitting | SubmitOutcome::Cancelled => {
                    bail!("submission did not complete");
                }
            }
        }
    }
}

fn failure_report(router: &OutcomeRouter, mode: &SubmitMode, err: &SubmitError) -> String {
    let notification = router.failure_notification(mode, err);
    format!("{} {}", notification.title, notification.description)
}

fn print_field_errors(errors: &ValidationErrors) {
    for (field, messages) in errors.fields() {
        for message in messages {
            eprintln!("{field}: {message}");
        }
    }
}
