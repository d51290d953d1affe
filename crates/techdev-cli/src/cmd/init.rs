use anyhow::Context;
use std::path::Path;
use techdev_core::{config::Config, io, paths};

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing techdev in: {}", root.display());

    let dir = paths::techdev_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let yaml = serde_yaml::to_string(&Config::default())?;
    let created = io::write_if_missing(&paths::config_path(root), yaml.as_bytes())
        .context("failed to write config.yaml")?;
    if created {
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    println!("\nNext: techdev register <identifier> --password <password>");
    Ok(())
}
