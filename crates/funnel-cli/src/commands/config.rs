use anyhow::{Context, Result, bail};
use colored::Colorize;

use funnel_infrastructure::ConfigService;

use super::AppContext;

pub fn run(context: &AppContext, init: bool) -> Result<()> {
    if init {
        return write_defaults(context);
    }

    let source = if context.config_path.exists() {
        context.config_path.display().to_string()
    } else {
        format!("{} (not found, defaults)", context.config_path.display())
    };
    eprintln!("{}", format!("# {}", source).bright_black());
    print!("{}", toml::to_string_pretty(&context.config)?);
    Ok(())
}

fn write_defaults(context: &AppContext) -> Result<()> {
    let path = &context.config_path;
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    ConfigService::new(path)
        .save(&context.config)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("{}", format!("Wrote {}", path.display()).green());
    Ok(())
}
