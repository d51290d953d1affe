use crate::cmd::{open_platform, open_session, Credentials};
use crate::output::{print_fields, print_json};
use anyhow::Context;
use std::path::Path;
use techdev_core::types::RoleState;

pub fn register(
    root: &Path,
    identifier: &str,
    creds: &Credentials,
    json: bool,
) -> anyhow::Result<()> {
    let platform = open_platform(root)?;
    platform
        .register(identifier, creds.password()?)
        .with_context(|| format!("could not register '{identifier}'"))?;

    if json {
        print_json(&serde_json::json!({ "identifier": identifier.trim(), "registered": true }))?;
    } else {
        println!("Registered {}. Log in and choose a role next.", identifier.trim());
    }
    Ok(())
}

pub fn login(root: &Path, creds: &Credentials, json: bool) -> anyhow::Result<()> {
    let (platform, session) = open_session(root, creds)?;
    let state = platform.role_state(&session)?;

    if json {
        print_json(&serde_json::json!({
            "identifier": session.identifier(),
            "role": session.role(),
            "role_state": state,
        }))?;
    } else {
        println!(
            "Logged in as {} ({})",
            session.identifier().unwrap_or_default(),
            session.role().label()
        );
        if state == RoleState::Unassigned {
            println!("No role yet: run `techdev role intern` or `techdev role tech-lead --token <T>`.");
        }
    }
    Ok(())
}

pub fn whoami(root: &Path, creds: &Credentials, json: bool) -> anyhow::Result<()> {
    let (platform, session) = open_session(root, creds)?;
    let state = platform.role_state(&session)?;
    let team = match state {
        RoleState::DeveloperIntern => Some(platform.my_team_stats(&session)?),
        _ => None,
    };

    if json {
        print_json(&serde_json::json!({
            "identifier": session.identifier(),
            "role": session.role(),
            "role_state": state,
            "team": team,
        }))?;
        return Ok(());
    }

    let mut fields = vec![
        ("Identifier", session.identifier().unwrap_or_default().to_string()),
        ("Role", session.role().label().to_string()),
        ("State", state.to_string()),
    ];
    if let Some(t) = team {
        fields.push(("Team size", t.team_size.to_string()));
        fields.push(("Open slots", t.available_slots.to_string()));
        fields.push(("Team since", t.created_date()));
    }
    print_fields(&fields);
    Ok(())
}
