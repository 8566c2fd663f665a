use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use funnel_core::step::StepDefinition;
use funnel_infrastructure::TomlRegistryLoader;

use super::AppContext;

pub fn run(context: &AppContext, as_toml: bool, export: Option<&Path>) -> Result<()> {
    if let Some(path) = export {
        TomlRegistryLoader::save(path, &context.registry)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("{}", format!("Wrote {} steps to {}", context.registry.len(), path.display()).green());
        return Ok(());
    }
    if as_toml {
        print!("{}", TomlRegistryLoader::to_toml(&context.registry)?);
        return Ok(());
    }

    println!("{}", format!("{} steps", context.registry.len()).bright_magenta().bold());
    for step in context.registry.iter() {
        println!("{:>3}  {:<16} {}", step.index, step.slug, describe(step).bright_black());
    }
    Ok(())
}

fn describe(step: &StepDefinition) -> String {
    let mut parts = Vec::new();
    if let Some(binding) = step.binding {
        let kind = if binding.is_multi_select() { "multi" } else { "single" };
        parts.push(format!("{} -> {}", kind, binding.field()));
    }
    if step.auto_advance {
        parts.push("auto-advance".to_string());
    }
    if step.requires_selection {
        parts.push("required".to_string());
    }
    if let Some(stage) = &step.analysis {
        let targets: Vec<String> = stage.targets().iter().map(u8::to_string).collect();
        let mode = if stage.is_gated() { "gated" } else { "parallel" };
        parts.push(format!("analysis {} [{}]", mode, targets.join(", ")));
    }
    if step.summary {
        parts.push("summary".to_string());
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_core::step::StepRegistry;

    #[test]
    fn test_describe_builtin_steps() {
        let registry = StepRegistry::builtin();
        assert_eq!(describe(registry.get(0).unwrap()), "single -> ethnicity, auto-advance");
        assert_eq!(describe(registry.get(6).unwrap()), "multi -> preferences, required");
        assert_eq!(describe(registry.get(12).unwrap()), "analysis parallel [100, 65, 15]");
        assert_eq!(describe(registry.get(18).unwrap()), "summary");
        assert_eq!(describe(registry.get(19).unwrap()), "");
    }
}
