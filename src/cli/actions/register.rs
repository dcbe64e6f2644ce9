use crate::client::{Outcome, RegistrationClient, RegistrationForm};
use anyhow::{bail, Result};
use secrecy::SecretString;

// SecretString keeps the password out of Debug output.
#[derive(Debug)]
pub struct Args {
    pub url: String,
    pub username: String,
    pub email: String,
    pub password: SecretString,
}

/// Submit the registration and print the server's message.
/// # Errors
/// Returns an error if the server rejects the registration or cannot be reached.
pub async fn execute(args: Args) -> Result<()> {
    let client = RegistrationClient::new(&args.url)?;

    let form = RegistrationForm {
        username: args.username,
        email: args.email,
        password: args.password,
    };

    match client.submit(&form).await {
        Outcome::Registered(message) => {
            println!("{message}");
            Ok(())
        }
        Outcome::Rejected { status, message } => bail!("{message} ({status})"),
        Outcome::Transport(reason) => bail!("{reason}"),
    }
}
