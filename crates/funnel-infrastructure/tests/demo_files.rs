use std::path::PathBuf;

use funnel_core::selection::{FieldKey, ListField};
use funnel_infrastructure::{ConfigService, TomlRegistryLoader};

fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos")
}

#[test]
fn test_gated_demo_config_resolves_its_registry() {
    let service = ConfigService::new(demos_dir().join("gated_config.toml"));
    let config = service.get_config().unwrap();
    assert_eq!(config.animator.tick_interval_ms, 60);
    assert_eq!(config.exit.redirect_url.as_deref(), Some("https://quiz.local/checkout"));

    let registry = TomlRegistryLoader::resolve(&config, service.base_dir()).unwrap();
    assert_eq!(registry.len(), 6);
    assert_eq!(registry.summary_index(), Some(4));

    let analysis = registry.get(3).and_then(|step| step.analysis.as_ref()).unwrap();
    assert!(analysis.is_gated());
    assert_eq!(analysis.targets(), vec![100, 80, 40]);

    let source = registry.source_of(FieldKey::List(ListField::Preferences)).unwrap();
    assert_eq!(source.slug, "preferences");
}
