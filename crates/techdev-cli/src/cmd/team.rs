use crate::cmd::{open_session, Credentials};
use crate::output::{print_json, print_members, print_table};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum TeamSubcommand {
    /// Show your team and its open slots
    Show,
    /// Add a member by display name and collaboration handle
    Add { name: String, handle: String },
    /// Remove the member at a 1-based position
    Remove { position: usize },
}

pub fn run(
    root: &Path,
    subcmd: TeamSubcommand,
    creds: &Credentials,
    json: bool,
) -> anyhow::Result<()> {
    let (platform, session) = open_session(root, creds)?;

    match subcmd {
        TeamSubcommand::Show => {
            let team = platform.my_team(&session)?;
            let capacity = platform.config().roster.max_members;
            if json {
                print_json(&team.summary(capacity))?;
            } else {
                println!(
                    "Team of {} ({}/{} members)",
                    team.leader,
                    team.len(),
                    capacity
                );
                print_members(&team.members);
            }
        }
        TeamSubcommand::Add { name, handle } => {
            let team = platform.add_member(&session, &name, &handle)?;
            if json {
                print_json(&team.summary(platform.config().roster.max_members))?;
            } else {
                println!("Added {} to the team ({} members)", name.trim(), team.len());
            }
        }
        TeamSubcommand::Remove { position } => {
            let member = platform.remove_member(&session, position)?;
            if json {
                print_json(&member)?;
            } else {
                println!("Removed {} (@{})", member.name, member.external_handle);
            }
        }
    }
    Ok(())
}

pub fn overview(root: &Path, creds: &Credentials, json: bool) -> anyhow::Result<()> {
    let (platform, session) = open_session(root, creds)?;
    let teams = platform.all_teams(&session)?;

    if json {
        print_json(&teams)?;
        return Ok(());
    }
    if teams.is_empty() {
        println!("No teams yet.");
        return Ok(());
    }
    let rows = teams
        .iter()
        .map(|t| {
            let handles: Vec<String> = t
                .members
                .iter()
                .map(|m| format!("@{}", m.external_handle))
                .collect();
            vec![
                t.leader.clone(),
                t.member_count.to_string(),
                t.available_slots.to_string(),
                t.created_at.format("%Y-%m-%d").to_string(),
                handles.join(", "),
            ]
        })
        .collect();
    print_table(&["LEADER", "MEMBERS", "OPEN", "CREATED", "HANDLES"], rows);
    Ok(())
}
