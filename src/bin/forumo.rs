use anyhow::Result;
use forumo::cli::{actions, start};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let (globals, action) = start()?;

    // Handle the action
    if action.is_admin() {
        actions::admin::handle(action, &globals).await?;
    } else {
        actions::session::handle(action, &globals).await?;
    }

    Ok(())
}
