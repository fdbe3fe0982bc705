use crate::admin::RoleAdmin;
use crate::api::ForumApi;
use crate::auth::gate::{self, Decision};
use crate::auth::session::Resumed;
use crate::auth::store::CredentialStore;
use crate::cli::{actions::Action, actions::session::build_session, globals::GlobalArgs};
use anyhow::{anyhow, Result};

/// Roles that may enter the administration flow.
const ADMIN_ROLES: &[&str] = &["admin"];

/// Handle the admin actions. Authorization is decided here, at the
/// boundary, by the access gate; the flow behind it does not re-check.
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let session = build_session(globals)?;

    match session.resume().await? {
        Resumed::Expired => {
            println!("your session has expired, please sign in again");
            return Ok(());
        }
        Resumed::Inconclusive => {
            println!("could not reach the forum, try again later");
            return Ok(());
        }
        Resumed::Anonymous | Resumed::Authenticated(_) => {}
    }

    let identity = session.identity();
    match gate::guard(identity.as_ref(), Some(ADMIN_ROLES)) {
        Decision::PromptLogin => {
            println!("please sign in first (`forumo login`)");
            return Ok(());
        }
        Decision::Forbidden => {
            println!("you do not have permission to manage roles");
            return Ok(());
        }
        Decision::Allow => {}
    }

    let store = CredentialStore::new(globals.token_file.clone());
    let token = store
        .load()?
        .ok_or_else(|| anyhow!("credential missing after sign-in"))?;
    let api = ForumApi::new(&globals.api_url)?;
    let admin = RoleAdmin::new(&api, &token);

    match action {
        Action::Roles => {
            for role in admin.list_roles().await? {
                println!("{:>4}  {:<12} {}", role.id, role.name, role.color);
            }
        }
        Action::Users => {
            let roster = admin.list_users().await?;
            for user in roster.users() {
                let role = user
                    .role
                    .as_ref()
                    .map_or("(no role)", |role| role.name.as_str());
                println!("{:>4}  {:<20} {:<32} {role}", user.id, user.name, user.email);
            }
        }
        Action::Assign { user, role } => {
            let mut roster = admin.list_users().await?;
            let updated = admin.reassign(&mut roster, user, role).await?;
            let role_name = updated
                .role
                .as_ref()
                .map_or("(no role)", |role| role.name.as_str());
            println!("{} is now {role_name}", updated.name);
        }
        _ => return Err(anyhow!("not an admin action")),
    }

    Ok(())
}
