use crate::output::Output;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use toolmark_runtime::Config;
use toolmark_runtime::config::CONFIG_FILE;

#[derive(Serialize)]
struct ConfigView<'a> {
    path: String,
    exists: bool,
    config: &'a Config,
}

pub fn show(data_dir: &Path, out: &Output) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let config = Config::load_from(&path)?;
    let exists = path.exists();
    let body = config.to_toml()?;

    let view = ConfigView {
        path: path.display().to_string(),
        exists,
        config: &config,
    };
    out.render(&view, |style| {
        let note = if exists { "" } else { " (not written yet, showing defaults)" };
        format!("{}\n{}", style.dim(&format!("# {}{}", view.path, note)), body)
    })
}

pub fn init(data_dir: &Path, force: bool, out: &Output) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}; pass --force to overwrite",
            path.display()
        );
    }

    let config = Config::default();
    config.save_to(&path)?;

    let view = ConfigView {
        path: path.display().to_string(),
        exists: true,
        config: &config,
    };
    out.render(&view, |style| {
        format!("{} {}\n", style.good("Wrote default config to"), view.path)
    })
}
