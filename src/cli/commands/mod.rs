use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("forumo")
        .about("Student forum session and authorization client")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("Base URL of the forum API")
                .default_value("http://localhost:8080/api")
                .env("FORUMO_API_URL")
                .global(true),
        )
        .arg(
            Arg::new("token-file")
                .long("token-file")
                .help("Path of the credential file (default: <config dir>/forumo/token)")
                .env("FORUMO_TOKEN_FILE")
                .global(true),
        )
        .arg(
            Arg::new("email-domain")
                .long("email-domain")
                .help("Institutional email namespace accepted for sign-in")
                .default_value("student.gla.ac.uk")
                .env("FORUMO_EMAIL_DOMAIN")
                .global(true),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("FORUMO_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in with an institutional email")
                .arg(
                    Arg::new("email")
                        .short('e')
                        .long("email")
                        .help("Email address")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("Password")
                        .env("FORUMO_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("register")
                .about("Register a new account")
                .arg(
                    Arg::new("email")
                        .short('e')
                        .long("email")
                        .help("Email address")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("Password")
                        .env("FORUMO_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                )
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .help("Display name")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("verify").about("Confirm an email address").arg(
                Arg::new("token")
                    .short('t')
                    .long("token")
                    .help("Verification token")
                    .required(true),
            ),
        )
        .subcommand(Command::new("logout").about("Sign out and clear the stored credential"))
        .subcommand(Command::new("whoami").about("Show the current session"))
        .subcommand(Command::new("roles").about("List roles (admin)"))
        .subcommand(Command::new("users").about("List the user roster (admin)"))
        .subcommand(
            Command::new("assign")
                .about("Assign a role to a user (admin)")
                .arg(
                    Arg::new("user")
                        .short('u')
                        .long("user")
                        .help("User id")
                        .required(true)
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("role")
                        .short('r')
                        .long("role")
                        .help("Role id")
                        .required(true)
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
}
