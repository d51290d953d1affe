use crate::output::print_json;
use clap::Subcommand;
use techdev_core::role::generate_token;

#[derive(Subcommand)]
pub enum TokenSubcommand {
    /// Print a fresh token that satisfies the default token rules
    Generate,
}

pub fn run(subcmd: TokenSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TokenSubcommand::Generate => {
            let token = generate_token();
            if json {
                print_json(&serde_json::json!({ "token": token }))?;
            } else {
                println!("{token}");
            }
        }
    }
    Ok(())
}
