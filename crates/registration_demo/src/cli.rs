// src/cli.rs
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "registration_demo",
    version,
    about = "Fill, submit and reset a registration form"
)]
pub struct Cli {
    /// Validator config file (TOML or JSON5)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `form_validator=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log: Option<String>,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Fill the form and submit it
    Submit(SubmitArgs),
    /// Fill the form, submit it, then press the reset button
    ///
    /// The reset button is disabled while a successful submission is locked,
    /// so a locked form is reset only once the lockout is over.
    Reset(SubmitArgs),
}

#[derive(Args, Clone)]
pub struct SubmitArgs {
    #[arg(long, default_value = "")]
    pub name: String,
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub password: String,
    #[arg(long, default_value = "")]
    pub confirm: String,
    /// Phone number (optional)
    #[arg(long)]
    pub number: Option<String>,

    /// Build the page without the registration form (the validator stays detached)
    #[arg(long)]
    pub no_form: bool,

    /// Print a JSON summary instead of HTML snapshots
    #[arg(long)]
    pub json: bool,

    /// Also print the page once the lockout window is over
    #[arg(long)]
    pub wait: bool,
}
