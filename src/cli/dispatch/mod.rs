//! Map validated CLI arguments to the action the binary runs.

use crate::cli::{
    actions::{register, server, Action},
    commands::{self, register as register_args},
};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    if let Some(sub) = matches.subcommand_matches(register_args::CMD_REGISTER) {
        let arg = |name: &str| -> Result<String> {
            sub.get_one::<String>(name)
                .cloned()
                .with_context(|| format!("missing required argument: --{name}"))
        };

        return Ok(Action::Register(register::Args {
            url: arg(register_args::ARG_URL)?,
            username: arg(register_args::ARG_USERNAME)?,
            email: arg(register_args::ARG_EMAIL)?,
            password: SecretString::from(arg(register_args::ARG_PASSWORD)?),
        }));
    }

    let port = matches
        .get_one::<u16>(commands::ARG_PORT)
        .copied()
        .unwrap_or(3000);
    let dsn = matches
        .get_one::<String>(commands::ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;

    Ok(Action::Server(server::Args { port, dsn }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn clean_env<F: FnOnce()>(f: F) {
        temp_env::with_vars(
            [
                ("PORT", None::<&str>),
                ("ENLIST_DSN", None),
                ("ENLIST_URL", None),
                ("ENLIST_PASSWORD", None),
            ],
            f,
        );
    }

    #[test]
    fn server_is_the_default_action() {
        clean_env(|| {
            let matches = commands::new().get_matches_from(vec!["enlist", "-p", "3100"]);
            match handler(&matches) {
                Ok(Action::Server(args)) => {
                    assert_eq!(args.port, 3100);
                    assert_eq!(args.dsn, "sqlite://database.db");
                }
                other => panic!("expected server action, got {other:?}"),
            }
        });
    }

    #[test]
    fn register_subcommand_maps_to_register_action() {
        clean_env(|| {
            let matches = commands::new().get_matches_from(vec![
                "enlist",
                "register",
                "--url",
                "http://127.0.0.1:3000",
                "--username",
                "alice",
                "--email",
                "alice@x.com",
                "--password",
                "secret",
            ]);
            match handler(&matches) {
                Ok(Action::Register(args)) => {
                    assert_eq!(args.url, "http://127.0.0.1:3000");
                    assert_eq!(args.username, "alice");
                    assert_eq!(args.email, "alice@x.com");
                    assert_eq!(args.password.expose_secret(), "secret");
                }
                other => panic!("expected register action, got {other:?}"),
            }
        });
    }
}
