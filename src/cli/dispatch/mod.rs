use crate::auth::store::CredentialStore;
use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

pub fn handler(matches: &clap::ArgMatches) -> Result<(GlobalArgs, Action)> {
    // Closure to return subcommand matches
    let sub_m = |subcommand| -> Result<&clap::ArgMatches> {
        matches
            .subcommand_matches(subcommand)
            .context("arguments not found")
    };

    let api_url = matches
        .get_one("api-url")
        .map(|s: &String| s.to_string())
        .ok_or_else(|| anyhow!("missing required argument: --api-url"))?;

    let token_file = matches
        .get_one("token-file")
        .map(|s: &String| PathBuf::from(s))
        .or_else(CredentialStore::default_path)
        .ok_or_else(|| anyhow!("could not determine a token file path, pass --token-file"))?;

    let email_domain = matches
        .get_one("email-domain")
        .map(|s: &String| s.to_string())
        .ok_or_else(|| anyhow!("missing required argument: --email-domain"))?;

    let globals = GlobalArgs::new(api_url, token_file, email_domain);

    let secret = |matches: &clap::ArgMatches| -> Result<SecretString> {
        matches
            .get_one("password")
            .map(|s: &String| SecretString::from(s.to_string()))
            .ok_or_else(|| anyhow!("missing required argument: --password"))
    };
    let string = |matches: &clap::ArgMatches, name: &str| -> Result<String> {
        matches
            .get_one(name)
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow!("missing required argument: --{name}"))
    };

    let action = match matches.subcommand_name() {
        Some("login") => {
            let matches = sub_m("login")?;
            Action::Login {
                email: string(matches, "email")?,
                password: secret(matches)?,
            }
        }
        Some("register") => {
            let matches = sub_m("register")?;
            Action::Register {
                email: string(matches, "email")?,
                password: secret(matches)?,
                name: string(matches, "name")?,
            }
        }
        Some("verify") => {
            let matches = sub_m("verify")?;
            Action::Verify {
                token: string(matches, "token")?,
            }
        }
        Some("logout") => Action::Logout,
        Some("whoami") => Action::Whoami,
        Some("roles") => Action::Roles,
        Some("users") => Action::Users,
        Some("assign") => {
            let matches = sub_m("assign")?;
            Action::Assign {
                user: matches
                    .get_one::<u64>("user")
                    .copied()
                    .ok_or_else(|| anyhow!("missing required argument: --user"))?,
                role: matches
                    .get_one::<u64>("role")
                    .copied()
                    .ok_or_else(|| anyhow!("missing required argument: --role"))?,
            }
        }
        _ => return Err(anyhow!("unknown command")),
    };

    Ok((globals, action))
}
