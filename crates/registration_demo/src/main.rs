mod cli;
mod errors;
mod logging;

use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use form_validator::{
    FieldKey, FormHandle, FormRuntime, FormSnapshot, FormValidator, Phase, RegistrationPage,
    ValidatorConfig,
};
use serde::Serialize;
use tracing::info;

use crate::cli::{Cli, Cmd, SubmitArgs};

#[derive(Serialize)]
struct Stage {
    label: &'static str,
    #[serde(flatten)]
    snapshot: FormSnapshot,
}

#[tokio::main]
pub async fn main() -> Result<()> {
    let cli = Cli::parse();
    crate::errors::init()?;
    crate::logging::init(cli.log.as_deref())?;

    let config = ValidatorConfig::load(cli.config.as_deref())?;
    let (args, reset) = match cli.cmd {
        Cmd::Submit(args) => (args, false),
        Cmd::Reset(args) => (args, true),
    };

    let mut page = RegistrationPage::new().classes(&config.form_class, &config.group_class);
    if args.no_form {
        page = page.without_form();
    }
    let lockout = config.lockout_delay();

    let Some(validator) = FormValidator::attach(page.build()?, config) else {
        info!("No registration form on the page; nothing to do");
        return Ok(());
    };

    let (handle, join) = FormRuntime::spawn(validator);
    let stages = drive(&handle, &args, reset, lockout).await?;
    handle.shutdown()?;
    join.await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stages)?);
    } else {
        for stage in &stages {
            println!("== {} ({:?})", stage.label, stage.snapshot.phase);
            println!("{}", stage.snapshot.html);
        }
    }
    Ok(())
}

async fn drive(
    handle: &FormHandle,
    args: &SubmitArgs,
    reset: bool,
    lockout: Duration,
) -> Result<Vec<Stage>> {
    let mut entries = vec![
        (FieldKey::Name, args.name.as_str()),
        (FieldKey::Email, args.email.as_str()),
        (FieldKey::Password, args.password.as_str()),
        (FieldKey::Confirm, args.confirm.as_str()),
    ];
    if let Some(number) = &args.number {
        entries.push((FieldKey::Number, number.as_str()));
    }
    for (field, value) in entries {
        handle.input(field, value)?;
    }

    let mut stages = Vec::new();
    handle.submit()?;
    let submitted = handle.snapshot().await?;
    let locked = submitted.phase == Phase::Locked;
    stages.push(Stage {
        label: "submitted",
        snapshot: submitted,
    });

    // a locked form's controls are disabled, the reset button included
    if args.wait || (reset && locked) {
        tokio::time::sleep(lockout + Duration::from_millis(50)).await;
        stages.push(Stage {
            label: "after lockout",
            snapshot: handle.snapshot().await?,
        });
    }

    if reset {
        handle.reset()?;
        stages.push(Stage {
            label: "reset",
            snapshot: handle.snapshot().await?,
        });
    }
    Ok(stages)
}
