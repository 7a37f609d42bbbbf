use clap::{Args, Subcommand};
use serde_json::Value;

use super::{require_login, CommandResult, OutputFormat};
use bookit::blob::BlobStore;
use bookit::credentials::CredentialStore;
use bookit::models::{Appointment, Fields, Identity};
use bookit::store::{Collection, DocumentStore, Scope};
use bookit::sync::BookingClient;

#[derive(Args)]
pub struct AppointmentCommand {
    #[command(subcommand)]
    pub command: AppointmentSubcommand,
}

#[derive(Subcommand)]
pub enum AppointmentSubcommand {
    /// List appointments booked with you
    List {
        /// List every appointment in the collection instead
        #[arg(long)]
        all: bool,

        /// Collection scope when listing all: global or owned
        #[arg(long, default_value = "global")]
        scope: Scope,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Book a new appointment
    Add {
        /// Title of the appointment
        title: String,

        /// Description
        #[arg(long)]
        description: Option<String>,

        /// Service provider id (defaults to you)
        #[arg(long)]
        provider: Option<String>,

        /// Collection scope: global or owned
        #[arg(long, default_value = "global")]
        scope: Scope,
    },

    /// Change fields of an appointment
    Edit {
        /// Appointment id
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New service provider id
        #[arg(long)]
        provider: Option<String>,

        /// Collection scope: global or owned
        #[arg(long, default_value = "global")]
        scope: Scope,
    },

    /// Cancel an appointment
    Delete {
        /// Appointment id
        id: String,

        /// Collection scope: global or owned
        #[arg(long, default_value = "global")]
        scope: Scope,
    },
}

impl AppointmentCommand {
    pub async fn run<D, B, C>(
        &self,
        client: &BookingClient<D, B, C>,
        identity: Option<&Identity>,
    ) -> CommandResult
    where
        D: DocumentStore,
        B: BlobStore,
        C: CredentialStore,
    {
        let identity = require_login(identity)?;

        match &self.command {
            AppointmentSubcommand::List { all, scope, format } => {
                let appointments = if *all {
                    client
                        .fetch_collection(identity, &Collection::Appointments, *scope)
                        .await?;
                    client.state().appointments.as_ref().clone()
                } else {
                    client.get_appointments_for_service_provider(identity).await?
                };
                print_appointments(&appointments, *format)?;
            }
            AppointmentSubcommand::Add {
                title,
                description,
                provider,
                scope,
            } => {
                let data = appointment_fields(
                    Some(title),
                    description.as_deref(),
                    Some(provider.as_deref().unwrap_or(&identity.id)),
                );
                let record = client
                    .add_entity(identity, &Collection::Appointments, *scope, data)
                    .await?;
                println!("Booked appointment: {}", record.id);
            }
            AppointmentSubcommand::Edit {
                id,
                title,
                description,
                provider,
                scope,
            } => {
                let patch =
                    appointment_fields(title.as_deref(), description.as_deref(), provider.as_deref());
                if patch.is_empty() {
                    println!("No changes specified.");
                    return Ok(());
                }
                // Load the slice so the result shows the merged appointment.
                client
                    .fetch_collection(identity, &Collection::Appointments, *scope)
                    .await?;
                let record = client
                    .edit_entity(identity, &Collection::Appointments, *scope, id, patch)
                    .await?;
                let appointment = Appointment::try_from(record)?;
                println!("Updated appointment:\n{}", appointment);
            }
            AppointmentSubcommand::Delete { id, scope } => {
                client
                    .handle_delete(identity, id, &Collection::Appointments, *scope)
                    .await?;
                println!("Deleted appointment: {}", id);
            }
        }
        Ok(())
    }
}

fn appointment_fields(
    title: Option<&str>,
    description: Option<&str>,
    provider: Option<&str>,
) -> Fields {
    let mut fields = Fields::new();
    for (key, value) in [
        ("title", title),
        ("description", description),
        ("service_provider", provider),
    ] {
        if let Some(value) = value {
            fields.insert(key.to_string(), Value::String(value.to_string()));
        }
    }
    fields
}

fn print_appointments(
    appointments: &[Appointment],
    format: OutputFormat,
) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(appointments)?);
        }
        OutputFormat::Text => {
            if appointments.is_empty() {
                println!("No appointments found.");
            } else {
                for appointment in appointments {
                    println!("{}", appointment);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appointment_fields_skips_unset() {
        let fields = appointment_fields(Some("Trim"), None, Some("u1"));

        assert_eq!(fields.len(), 2);
        assert_eq!(fields["title"], "Trim");
        assert_eq!(fields["service_provider"], "u1");
    }
}
