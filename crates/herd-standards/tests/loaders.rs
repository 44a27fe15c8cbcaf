use std::io::Write;

use herd_model::ColumnCategory;
use herd_standards::{
    StandardsError, load_default_aliases, load_default_registry, load_legend_bank, load_registry,
};

#[test]
fn loads_bundled_registry() {
    let registry = load_default_registry().expect("load bundled registry");
    assert!(!registry.is_empty());

    let farm = registry.get("farm_name").expect("farm_name column");
    assert!(farm.required);
    assert_eq!(farm.category, ColumnCategory::Identification);
    assert!(farm.synonyms.iter().any(|s| s == "fazenda"));

    let animal = registry.get("animal_id").expect("animal_id column");
    assert!(animal.synonyms.iter().any(|s| s == "brinco"));

    let milk = registry.get("milk_yield").expect("milk_yield column");
    assert!(milk.synonyms.iter().any(|s| s == "kg_leite"));
}

#[test]
fn bundled_aliases_point_at_registry_keys() {
    let registry = load_default_registry().expect("load bundled registry");
    let aliases = load_default_aliases().expect("load bundled aliases");
    assert!(!aliases.is_empty());
    for alias in &aliases {
        assert!(
            registry.contains(&alias.suggested_canonical_key),
            "alias '{}' points at unknown key '{}'",
            alias.alias_original,
            alias.suggested_canonical_key
        );
        if let Some(confidence) = alias.confidence {
            assert!((0.0..=1.0).contains(&confidence));
        }
    }
    assert!(
        aliases
            .iter()
            .any(|a| a.alias_original == "Fazenda" && a.suggested_canonical_key == "farm_name")
    );
}

#[test]
fn loads_legend_bank_from_disk() {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    writeln!(
        file,
        "alias_original,suggested_canonical_key,source_hint,confidence\n\
         Vaca,animal_name,rebanho2024,0.8\n\
         Sem chave,,,\n\
         Lote,farm_name,,"
    )
    .expect("write legend");

    let legend = load_legend_bank(file.path()).expect("load legend");
    assert_eq!(legend.len(), 2);
    assert_eq!(legend[0].alias_original, "Vaca");
    assert_eq!(legend[0].confidence, Some(0.8));
    assert_eq!(legend[1].source_hint, None);
}

#[test]
fn missing_legend_file_reports_path() {
    let err = load_legend_bank(std::path::Path::new("/nonexistent/legend.csv")).unwrap_err();
    assert!(matches!(err, StandardsError::Io { .. }));
    assert!(err.to_string().contains("legend.csv"));
}

#[test]
fn custom_registry_rejects_duplicate_keys() {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    writeln!(
        file,
        "canonical_key,label,category,required,synonyms\n\
         farm_name,Farm,identification,true,fazenda\n\
         farm_name,Farm again,identification,false,"
    )
    .expect("write registry");

    let err = load_registry(file.path()).unwrap_err();
    assert!(matches!(err, StandardsError::InvalidRegistry { .. }));
}
