//! Fetches the account information and prints it.
//!
//! Reads credentials from `MAILJET_API_KEY` and `MAILJET_API_SECRET`.
//!
//! Run with: `cargo run --example user_infos`

use mailjet::{Client, Error, Params};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("mailjet=debug,user_infos=info")
        .init();

    let client = Client::from_env()?;

    println!("=== Dynamic call (verb from HelpMethod) ===");
    let user_infos = client.category("user")?.call("infos", Params::new()).await?;
    if user_infos["status"] == "OK" {
        println!("{:#}", user_infos["infos"]);
    }
    println!();

    println!("=== Typed shortcut ===");
    let lists = client.lists_all().await?;
    println!("{} mailing list(s)", lists.len());
    for list in &lists {
        println!("  {}", list);
    }

    Ok(())
}
