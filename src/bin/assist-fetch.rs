// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Synchronous command-line front end over the blocking client.

use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use assist_scraper::config::log_format_from_env;
use assist_scraper::{init_tracing, AgreementQuery, BlockingArticulationClient, ClientConfig};

/// assist-fetch - query the ASSIST articulation API from the shell
#[derive(Parser, Debug)]
#[command(name = "assist-fetch", version, about = "Fetch ASSIST articulation data as JSON")]
struct Cli {
    /// Override the API base URL (defaults to ASSIST_BASE_URL or https://assist.org/api)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Print compact JSON instead of pretty-printed output
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Agreements published by one institution
    InstitutionAgreements {
        institution_id: u64,
    },

    /// Agreement categories between two institutions for an academic year
    AgreementsCategories {
        #[arg(long)]
        receiving: u64,
        #[arg(long)]
        sending: u64,
        #[arg(long)]
        year: u64,
    },

    /// Agreements in one category between two institutions
    Agreements {
        #[arg(long)]
        receiving: u64,
        #[arg(long)]
        sending: u64,
        #[arg(long)]
        year: u64,
        #[arg(long)]
        category: String,
    },

    /// Full articulation agreement for a report key (e.g. 75/113/to/136/Major/...)
    ArticulationAgreements {
        key: String,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    init_tracing(log_format_from_env()?);

    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let client = BlockingArticulationClient::try_new(config)?;

    let value = match cli.command {
        Command::InstitutionAgreements { institution_id } => {
            client.institution_agreements(institution_id)
        }
        Command::AgreementsCategories {
            receiving,
            sending,
            year,
        } => client.agreement_categories(&AgreementQuery::new(receiving, sending, year)),
        Command::Agreements {
            receiving,
            sending,
            year,
            category,
        } => client.agreements(&AgreementQuery::new(receiving, sending, year), &category),
        Command::ArticulationAgreements { key } => client.articulation_agreement(&key),
    }?;

    let rendered = if cli.compact {
        serde_json::to_string(&value)
    } else {
        serde_json::to_string_pretty(&value)
    }
    .context("failed to render JSON")?;

    println!("{rendered}");
    Ok(())
}
