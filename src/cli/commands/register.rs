use clap::Args;

use crate::cli::utils::output_success;
use crate::cli::{OutputFormat, Session};
use crate::forms::Registration;
use crate::resources::ResourceKind;
use crate::store::ResourceStore;

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long, help = "First name")]
    pub name: String,
    #[arg(long, default_value = "", help = "Surname")]
    pub surname: String,
    #[arg(long, help = "Email address")]
    pub email: String,
    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true, help = "Password")]
    pub password: String,
    #[arg(long, help = "Repeat the password (defaults to --password)")]
    pub confirm: Option<String>,
    #[arg(long, help = "Register an administrator (name must start with 'admin')")]
    pub admin: bool,
}

pub async fn handle(session: &Session, args: &RegisterArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let registration = Registration {
        name: args.name.clone(),
        surname: args.surname.clone(),
        email: args.email.clone(),
        password: args.password.clone(),
        confirm_password: args.confirm.clone().unwrap_or_else(|| args.password.clone()),
        require_admin_prefix: args.admin,
    };

    let users = ResourceStore::new(session.http.clone(), ResourceKind::Users.endpoint(&session.base)?);
    let mut created = registration.submit(&users).await?.into_result()?;
    if let Some(record) = created.as_object_mut() {
        record.remove("password");
    }
    output_success(&output_format, "Account registered", Some(created))
}
