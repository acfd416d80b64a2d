use crate::infra::{build_components, open_store, parse_order_by};
use chrono::Utc;
use clap::Args;
use institute_registry::auth::LoginRequest;
use institute_registry::config::AppConfig;
use institute_registry::error::AppError;
use institute_registry::registrations::RegistrationField;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Officer email used to sign in
    #[arg(long)]
    pub(crate) email: String,
    /// Officer password used to sign in
    #[arg(long)]
    pub(crate) password: String,
    /// Destination file (defaults to registrations_<date>.csv in the working directory)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Field to sort rows by, using its form name (defaults to pangalan)
    #[arg(long, value_parser = parse_order_by)]
    pub(crate) order_by: Option<RegistrationField>,
}

pub(crate) async fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = open_store(&config).await?;
    let components = build_components(&config, store);

    let now = Utc::now();
    let login = components
        .gate
        .login(
            LoginRequest {
                email: Some(args.email),
                password: Some(args.password),
            },
            now,
        )
        .await?;

    let order_by = args.order_by.unwrap_or(RegistrationField::FullName);
    let file = components
        .registry
        .export(&login.session, order_by, now.date_naive())
        .await?;

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(&file.filename));
    tokio::fs::write(&path, file.body.as_bytes()).await?;

    println!(
        "Exported {} registration(s) to {}",
        file.records,
        path.display()
    );
    Ok(())
}
