use crate::cmd::{open_session, Credentials};
use crate::output::{print_json, print_table};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum StandupSubcommand {
    /// Submit today's standup
    Add {
        #[arg(long)]
        student_id: String,
        /// What got done
        #[arg(long)]
        tasks: String,
        /// What was learned
        #[arg(long, default_value = "")]
        learned: String,
    },
    /// List standups, newest first
    List {
        /// Only this student's entries
        #[arg(long)]
        student_id: Option<String>,
    },
}

pub fn run(
    root: &Path,
    subcmd: StandupSubcommand,
    creds: &Credentials,
    json: bool,
) -> anyhow::Result<()> {
    let (platform, session) = open_session(root, creds)?;

    match subcmd {
        StandupSubcommand::Add {
            student_id,
            tasks,
            learned,
        } => {
            let entry = platform.submit_standup(&session, &student_id, &tasks, &learned)?;
            if json {
                print_json(&entry)?;
            } else {
                println!("Standup recorded for {} ({})", entry.student_id, entry.id);
            }
        }
        StandupSubcommand::List { student_id } => {
            let mut entries = platform.standups(&session)?;
            if let Some(id) = student_id.as_deref() {
                entries.retain(|e| e.student_id == id);
            }
            if json {
                return print_json(&entries);
            }
            if entries.is_empty() {
                println!("No standups.");
                return Ok(());
            }
            let rows = entries
                .iter()
                .map(|e| {
                    vec![
                        e.date.format("%Y-%m-%d %H:%M").to_string(),
                        e.student_id.clone(),
                        e.tasks_done.clone(),
                        e.what_learned.clone(),
                    ]
                })
                .collect();
            print_table(&["DATE", "STUDENT", "DONE", "LEARNED"], rows);
        }
    }
    Ok(())
}
