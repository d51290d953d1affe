use crate::cmd::{open_session, Credentials};
use crate::output::print_json;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum RoleSubcommand {
    /// Show the current role and verification state
    Show,
    /// Become a Developer Intern
    Intern,
    /// Become a Tech Lead by presenting a verification token
    TechLead {
        #[arg(long, env = "TECHDEV_LEAD_TOKEN", hide_env_values = true)]
        token: String,
    },
    /// Revoke another Tech Lead's verification (verified Tech Leads only)
    Revoke { identifier: String },
}

pub fn run(
    root: &Path,
    subcmd: RoleSubcommand,
    creds: &Credentials,
    json: bool,
) -> anyhow::Result<()> {
    let (platform, mut session) = open_session(root, creds)?;

    match subcmd {
        RoleSubcommand::Show => {}
        RoleSubcommand::Intern => platform.choose_developer_intern(&mut session)?,
        RoleSubcommand::TechLead { token } => platform.choose_tech_lead(&mut session, &token)?,
        RoleSubcommand::Revoke { identifier } => {
            let revoked = platform.revoke_tech_lead(&session, &identifier)?;
            if json {
                print_json(&serde_json::json!({ "identifier": identifier, "revoked": revoked }))?;
            } else if revoked {
                println!("Revoked tech lead verification for {identifier}");
            } else {
                println!("{identifier} has no active tech lead verification");
            }
            return Ok(());
        }
    }

    let state = platform.role_state(&session)?;
    if json {
        print_json(&serde_json::json!({
            "identifier": session.identifier(),
            "role": session.role(),
            "role_state": state,
        }))?;
    } else {
        println!("Role: {} ({state})", session.role().label());
    }
    Ok(())
}
