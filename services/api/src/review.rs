use applicant_portal::applicants::{ApplicantRecord, ApplicantRepository, MongoApplicantRepository};
use applicant_portal::config::AppConfig;
use applicant_portal::error::AppError;
use clap::Args;
use std::io::Write;

#[derive(Args, Debug, Default)]
pub(crate) struct ListArgs {
    /// Emit one JSON line instead of pretty-printed output
    #[arg(long)]
    pub(crate) compact: bool,
}

pub(crate) async fn run_list(args: ListArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let repository = MongoApplicantRepository::connect(&config.storage).await?;
    let records = repository.list_newest_first().await?;

    let mut stdout = std::io::stdout().lock();
    write_records(&mut stdout, &records, args.compact)?;
    Ok(())
}

pub(crate) fn write_records<W: Write>(
    writer: &mut W,
    records: &[ApplicantRecord],
    compact: bool,
) -> std::io::Result<()> {
    if compact {
        serde_json::to_writer(&mut *writer, records)?;
    } else {
        serde_json::to_writer_pretty(&mut *writer, records)?;
    }
    writeln!(writer)
}
