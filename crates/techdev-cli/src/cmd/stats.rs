use crate::cmd::{open_session, Credentials};
use crate::output::{print_fields, print_json};
use std::path::Path;

pub fn run(root: &Path, creds: &Credentials, json: bool) -> anyhow::Result<()> {
    let (platform, session) = open_session(root, creds)?;
    let stats = platform.stats(&session)?;

    if json {
        return print_json(&stats);
    }

    print_fields(&[
        ("Users", stats.total_users.to_string()),
        ("Tech Leads", stats.tech_lead_count.to_string()),
        ("Verified leads", stats.verified_tech_lead_count.to_string()),
        ("Interns", stats.developer_intern_count.to_string()),
        ("Unassigned", stats.unassigned_count.to_string()),
        ("Teams", stats.total_teams.to_string()),
        ("Staffed teams", stats.teams_with_members.to_string()),
        ("Members", stats.total_members.to_string()),
        ("Avg team size", format!("{:.1}", stats.average_team_size)),
        ("Health", format!("{:.1}/100", stats.platform_health_score)),
        ("Formation rate", format!("{:.0}%", stats.team_formation_rate)),
    ]);
    Ok(())
}
