use clap::{Arg, Command};

pub const CMD_REGISTER: &str = "register";
pub const ARG_URL: &str = "url";
pub const ARG_USERNAME: &str = "username";
pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";

#[must_use]
pub fn subcommand() -> Command {
    Command::new(CMD_REGISTER)
        .about("Submit a registration to a running server")
        .arg(
            Arg::new(ARG_URL)
                .short('u')
                .long("url")
                .help("Base URL of the registration server")
                .default_value("http://localhost:3000")
                .env("ENLIST_URL"),
        )
        .arg(
            Arg::new(ARG_USERNAME)
                .long("username")
                .help("Username to register")
                .required(true),
        )
        .arg(
            Arg::new(ARG_EMAIL)
                .long("email")
                .help("Email address to register")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .long("password")
                .help("Password for the new account")
                .env("ENLIST_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
}
