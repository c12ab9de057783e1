use crate::infra::{boarding_service, boarding_store};
use clap::Args;
use staff_boarding::config::AppConfig;
use staff_boarding::error::AppError;
use staff_boarding::workflows::boarding::{Actor, TicketId};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct PreviewArgs {
    /// CSV export of the staff upload template.
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// JSON fixtures with tickets and pay grades. Defaults to BOARDING_FIXTURES.
    #[arg(long)]
    pub(crate) fixtures: Option<PathBuf>,
    /// Recruitment ticket the upload is checked against.
    #[arg(long)]
    pub(crate) ticket: u64,
    /// Id of the acting user.
    #[arg(long)]
    pub(crate) actor: u64,
    #[arg(long, default_value = "recruiter")]
    pub(crate) role: String,
}

pub(crate) fn run_preview(args: PreviewArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = boarding_store(&config.boarding, args.fixtures.as_deref())?;
    let service = boarding_service(store, &config.boarding);

    let upload = BufReader::new(File::open(&args.csv)?);
    let actor = Actor::new(args.actor, args.role);
    let report = service.preview(TicketId(args.ticket), &actor, upload)?;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report).map_err(std::io::Error::from)?;
    writeln!(stdout)?;
    Ok(())
}
