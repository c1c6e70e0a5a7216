//! Command-line interface definition.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

use clinicslots_core::{BookingContext, TimeWindow, TracingOutputFormat, parse_instant};
use clinicslots_service::AvailabilityQuery;

use crate::error::{ClientError, ClientResult};

/// clinicslots - Bookable appointment slots for clinics and doctors
#[derive(Debug, Parser)]
#[command(name = "clinicslots")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CLINICSLOTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log output format (pretty, compact, json)
    #[arg(long, env = "CLINICSLOTS_LOG_FORMAT", default_value = "compact")]
    pub log_format: TracingOutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Query bookable slots and print them as JSON
    Availability(AvailabilityArgs),

    /// Stored token tools
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Booking context and search range for an availability query.
#[derive(Debug, Default, Args)]
pub struct AvailabilityArgs {
    /// Doctor id
    #[arg(long)]
    pub doctor: Option<String>,

    /// Clinic id
    #[arg(long)]
    pub clinic: Option<String>,

    /// Treatment type the slot must accept
    #[arg(long)]
    pub treatment: Option<String>,

    /// Query this scheduler directly, skipping doctor/clinic resolution
    #[arg(long)]
    pub scheduler: Option<i64>,

    /// Appointment length in minutes
    #[arg(long)]
    pub duration: Option<u32>,

    /// Start of the search range (RFC 3339)
    #[arg(long)]
    pub from: Option<String>,

    /// End of the search range (RFC 3339)
    #[arg(long)]
    pub to: Option<String>,
}

impl AvailabilityArgs {
    /// Builds the service query.
    ///
    /// With only one bound given, the other is taken from `now` and
    /// `range_days`.
    pub fn to_query(&self, now: DateTime<Utc>, range_days: i64) -> ClientResult<AvailabilityQuery> {
        let mut context = BookingContext::new();
        if let Some(doctor) = &self.doctor {
            context = context.with_doctor(doctor);
        }
        if let Some(clinic) = &self.clinic {
            context = context.with_clinic(clinic);
        }
        if let Some(treatment) = &self.treatment {
            context = context.with_treatment(treatment);
        }
        if let Some(scheduler) = self.scheduler {
            context = context.with_scheduler(scheduler);
        }

        let mut query = AvailabilityQuery::new(context);
        query.duration_minutes = self.duration;
        query.window = self.window(now, range_days)?;
        Ok(query)
    }

    fn window(&self, now: DateTime<Utc>, range_days: i64) -> ClientResult<Option<TimeWindow>> {
        let from = self.from.as_deref().map(|s| instant("--from", s)).transpose()?;
        let to = self.to.as_deref().map(|s| instant("--to", s)).transpose()?;

        let window = match (from, to) {
            (None, None) => return Ok(None),
            (Some(from), None) => TimeWindow::upcoming(from, range_days),
            (None, Some(to)) => TimeWindow::try_new(now, to)
                .map_err(|e| ClientError::Input(format!("--to: {}", e)))?,
            (Some(from), Some(to)) => {
                TimeWindow::try_new(from, to).map_err(|e| ClientError::Input(e.to_string()))?
            }
        };
        Ok(Some(window))
    }
}

fn instant(flag: &str, raw: &str) -> ClientResult<DateTime<Utc>> {
    parse_instant(raw)
        .ok_or_else(|| ClientError::Input(format!("{}: not an RFC 3339 timestamp: {}", flag, raw)))
}

/// Stored token actions.
#[derive(Debug, Subcommand)]
pub enum TokenAction {
    /// Encrypt a token for the `encrypted_token` setting
    Encrypt {
        /// Plaintext token
        token: String,
    },

    /// Decrypt a stored `encrypted_token` value
    Decrypt {
        /// base64 ciphertext
        ciphertext: String,
    },

    /// Show which token source would be used
    Resolve {
        /// Scheduler being queried
        #[arg(long)]
        scheduler: Option<i64>,

        /// Also print the token value
        #[arg(long)]
        show: bool,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
