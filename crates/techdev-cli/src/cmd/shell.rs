use crate::cmd::open_platform;
use crate::output::{print_fields, print_json, print_members, print_table};
use anyhow::Context;
use std::io::{BufRead, IsTerminal, Write};
use std::path::Path;
use techdev_core::types::{Page, Role};
use techdev_core::{Platform, Session};

const HELP: &str = "\
commands:
  register <id> <password>     create an account
  login <id> <password>        start the session
  logout                       end the session
  whoami                       show identity, role and page
  intern                       become a Developer Intern
  tech-lead <token>            become a Tech Lead
  revoke <id>                  revoke a Tech Lead's verification
  go <page>                    dashboard | team | teams | standups
  team                         show your team
  add <name> <handle>          add a member (name may contain spaces)
  remove <position>            remove a member by 1-based position
  teams                        list every team
  stats                        platform statistics
  standup <student> <done> [| <learned>]
  standups                     list standups
  metrics                      operation timings
  quit";

/// Read commands from stdin against one long-lived session.
///
/// Failed logins accumulate on the session, so the lockout applies here the
/// same way it would in a UI.
pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let platform = open_platform(root)?;
    let mut session = platform.new_session();
    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();

    loop {
        if interactive {
            print!("{}> ", session.identifier().unwrap_or("techdev"));
            std::io::stdout().flush()?;
        }
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("failed to read stdin")? == 0 {
            break;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = words.split_first() else {
            continue;
        };
        if matches!(command, "quit" | "exit") {
            break;
        }
        if let Err(e) = dispatch(&platform, &mut session, command, args, json) {
            eprintln!("error: {e:#}");
        }
    }

    platform.logout(&mut session);
    Ok(())
}

fn dispatch(
    platform: &Platform,
    session: &mut Session,
    command: &str,
    args: &[&str],
    json: bool,
) -> anyhow::Result<()> {
    match (command, args) {
        ("help", _) => println!("{HELP}"),
        ("register", [id, password]) => {
            platform.register(id, password)?;
            println!("Registered {id}");
        }
        ("login", [id, password]) => {
            let role = platform.login(session, id, password)?;
            println!("Logged in as {id} ({})", role.label());
        }
        ("logout", []) => {
            platform.logout(session);
            println!("Logged out");
        }
        ("whoami", []) => {
            let state = platform.role_state(session)?;
            if json {
                print_json(&serde_json::json!({
                    "identifier": session.identifier(),
                    "role_state": state,
                    "page": session.page(),
                }))?;
            } else {
                print_fields(&[
                    ("Identifier", session.identifier().unwrap_or_default().to_string()),
                    ("State", state.to_string()),
                    ("Page", session.page().to_string()),
                ]);
            }
        }
        ("intern", []) => {
            platform.choose_role(session, Role::DeveloperIntern, None)?;
            println!("Role: {}", session.role().label());
        }
        ("tech-lead", [token]) => {
            platform.choose_role(session, Role::TechLead, Some(*token))?;
            println!("Role: {}", session.role().label());
        }
        ("revoke", [id]) => {
            let revoked = platform.revoke_tech_lead(session, id)?;
            println!("{}", if revoked { "Revoked" } else { "Nothing to revoke" });
        }
        ("go", [page]) => {
            let page: Page = page.parse()?;
            platform.navigate(session, page)?;
            println!("Page: {page}");
        }
        ("team", []) => {
            let team = platform.my_team(session)?;
            if json {
                print_json(&team.summary(platform.config().roster.max_members))?;
            } else {
                print_members(&team.members);
            }
        }
        ("add", [name @ .., handle]) if !name.is_empty() => {
            let team = platform.add_member(session, &name.join(" "), handle)?;
            println!("Added ({} members)", team.len());
        }
        ("remove", [position]) => {
            let position: usize = position
                .parse()
                .with_context(|| format!("'{position}' is not a position"))?;
            let member = platform.remove_member(session, position)?;
            println!("Removed {} (@{})", member.name, member.external_handle);
        }
        ("teams", []) => {
            let teams = platform.all_teams(session)?;
            if json {
                print_json(&teams)?;
            } else {
                let rows = teams
                    .iter()
                    .map(|t| {
                        vec![
                            t.leader.clone(),
                            t.member_count.to_string(),
                            t.available_slots.to_string(),
                        ]
                    })
                    .collect();
                print_table(&["LEADER", "MEMBERS", "OPEN"], rows);
            }
        }
        ("stats", []) => {
            let stats = platform.stats(session)?;
            if json {
                print_json(&stats)?;
            } else {
                println!(
                    "{} users, {} teams, health {:.1}/100",
                    stats.total_users, stats.total_teams, stats.platform_health_score
                );
            }
        }
        ("standup", [student, rest @ ..]) if !rest.is_empty() => {
            let rest = rest.join(" ");
            let (done, learned) = rest.split_once('|').unwrap_or((rest.as_str(), ""));
            let entry = platform.submit_standup(session, student, done, learned)?;
            println!("Standup recorded ({})", entry.id);
        }
        ("standups", []) => {
            let entries = platform.standups(session)?;
            if json {
                print_json(&entries)?;
            } else {
                for e in entries {
                    println!(
                        "{}  {}  {}",
                        e.date.format("%Y-%m-%d"),
                        e.student_id,
                        e.tasks_done
                    );
                }
            }
        }
        ("metrics", []) => {
            let metrics = platform.metrics();
            let rows = metrics
                .names()
                .into_iter()
                .filter_map(|name| {
                    let s = metrics.summary(&name)?;
                    Some(vec![
                        name,
                        s.count.to_string(),
                        format!("{:.2}", s.mean),
                        format!("{:.2}", s.max),
                    ])
                })
                .collect();
            print_table(&["OPERATION", "COUNT", "MEAN_MS", "MAX_MS"], rows);
        }
        _ => {
            tracing::debug!(command, args = args.len(), "unrecognized shell input");
            anyhow::bail!("unknown command or wrong arguments: '{command}' (try `help`)");
        }
    }
    Ok(())
}
