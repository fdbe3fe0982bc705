use crate::api::ForumApi;
use crate::auth::session::{AuthSession, EmailDomain, Resumed};
use crate::auth::store::CredentialStore;
use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{anyhow, Result};

/// Handle the session actions
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let session = build_session(globals)?;

    match action {
        Action::Login { email, password } => {
            let identity = session.login(&email, &password).await?;
            println!(
                "signed in as {} <{}> ({})",
                identity.name, identity.email, identity.role.name
            );
        }
        Action::Register {
            email,
            password,
            name,
        } => {
            let outcome = session.register(&email, &password, &name).await?;
            println!("{}", outcome.message);
            if let Some(token) = outcome.verify_token {
                println!("verification token: {token}");
                println!("run `forumo verify --token {token}` to activate the account");
            } else {
                println!("check your inbox for the verification mail");
            }
        }
        Action::Verify { token } => {
            let message = session.verify_email(&token).await?;
            println!("{message}");
            println!("you can now sign in with `forumo login`");
        }
        Action::Logout => {
            session.logout()?;
            println!("signed out");
        }
        Action::Whoami => match session.resume().await? {
            Resumed::Authenticated(identity) => {
                println!(
                    "{} <{}> ({})",
                    identity.name, identity.email, identity.role.name
                );
            }
            Resumed::Anonymous => println!("not signed in"),
            Resumed::Expired => println!("your session has expired, please sign in again"),
            Resumed::Inconclusive => {
                println!("could not reach the forum, session left as is");
            }
        },
        _ => return Err(anyhow!("not a session action")),
    }

    Ok(())
}

/// Builds the session core shared by every action.
pub fn build_session(globals: &GlobalArgs) -> Result<AuthSession> {
    let api = ForumApi::new(&globals.api_url)?;
    let store = CredentialStore::new(globals.token_file.clone());
    let domain = EmailDomain::new(&globals.email_domain)?;

    Ok(AuthSession::new(api, store, domain))
}
