//! Integration tests for bulk import into a loaded store.

use crate::common::fixtures::{SAMPLE_RULES, SAMPLE_STORE, SAMPLE_USER_AGENTS, Workspace};
use uam::config::ToolConfig;
use uam::error::ModelsError;
use uam::extract::RegexExtractor;
use uam::import::{BulkInput, ImportOptions, import_into, parse_bulk};
use uam::models::{DeviceStore, consolidate};
use uam::persist::{StoreFormat, load_store, parse_store};
use uam::session::run_add;

fn sample_store() -> DeviceStore {
    parse_store(SAMPLE_STORE, StoreFormat::Yaml).expect("valid store")
}

fn rules() -> RegexExtractor {
    RegexExtractor::from_yaml_str(SAMPLE_RULES).expect("valid rules")
}

#[test]
fn user_agent_list_adds_recognized_devices() {
    let mut store = sample_store();
    let input = parse_bulk(SAMPLE_USER_AGENTS).unwrap();
    assert!(matches!(input, BulkInput::UserAgents(ref uas) if uas.len() == 4));

    let summary = import_into(&mut store, &rules(), input, ImportOptions::default());

    assert_eq!(summary.entries, 4);
    assert_eq!(summary.added, 2);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.rejected, 1);
    assert!(store.contains("Samsung", "GT-I9300"));
    assert!(!store.contains("Samsung", "gt-i9300"));
    assert!(store.contains("LG", "Nexus 7"));
}

#[test]
fn percent_encoded_user_agents_are_decoded() {
    let mut store = DeviceStore::new();
    let input = parse_bulk(
        "Mozilla/5.0%20(Linux;%20Android%204.4;%20GT-N7000%20Build/KOT49H)%20Mobile%20Safari/537.36\n",
    )
    .unwrap();

    let summary = import_into(&mut store, &rules(), input, ImportOptions::default());

    assert_eq!(summary.added, 1);
    assert!(store.contains("Samsung", "GT-N7000"));
}

#[test]
fn tabular_rows_merge_attributes() {
    let mut store = sample_store();
    let input = parse_bulk(
        "brand\tmodel\tsize\tname\ttype\n\
         Acme\tTab 10\t10.1\"\tAcme Tab\ttablet\n\
         samsung\tgt-i9000\t4.0\t\t\n",
    )
    .unwrap();

    let summary = import_into(&mut store, &rules(), input, ImportOptions::default());

    assert_eq!(summary.added, 2);
    let acme = store.get_slot("Acme", "Tab 10").unwrap();
    assert_eq!(acme.size, Some(10.1));
    assert_eq!(acme.name.as_deref(), Some("Acme Tab"));
    assert_eq!(acme.device_type.as_deref(), Some("tablet"));

    // folded into the existing spelling, existing attributes kept
    let galaxy = store.get_slot("Samsung", "GT-I9000").unwrap();
    assert_eq!(galaxy.name.as_deref(), Some("Galaxy S"));
    assert_eq!(galaxy.date.as_deref(), Some("2010"));
    assert!(!store.contains("samsung", "gt-i9000"));
}

#[test]
fn headerless_rows_read_the_string_column() {
    let mut store = DeviceStore::new();
    let input = parse_bulk(
        "Mozilla/5.0 (Linux; Android 4.1; GT-N7000 Build/JRO03C) AppleWebKit/534.30 Mobile Safari/534.30\tseen twice\n",
    )
    .unwrap();

    let summary = import_into(&mut store, &rules(), input, ImportOptions::default());

    assert_eq!(summary.added, 1);
    let rec = store.get_slot("Samsung", "GT-N7000").unwrap();
    assert_eq!(rec.device_type.as_deref(), Some("smartphone"));
}

#[test]
fn command_rows_edit_the_store() {
    let mut store = sample_store();
    let before = store.model_count();
    let input = parse_bulk(
        "brand\tmodel\tname\t_command\n\
         Samsung\tSGH-T959\t\tdelete\n\
         Samsung\tGT-I9000\tGalaxy S I\treplace\n\
         Samsung\tNope\t\tdelete\n\
         Alcatel\tOT-4030\t\tfrobnicate X, set TCL\n",
    )
    .unwrap();

    let summary = import_into(&mut store, &rules(), input, ImportOptions::default());

    assert_eq!(summary.commands, 4);
    assert_eq!(summary.removed, 1);
    assert_eq!(summary.skipped_directives, 1);
    assert_eq!(summary.added, 0);
    assert_eq!(store.model_count(), before - 1);

    assert!(!store.contains("Samsung", "SGH-T959"));
    let replaced = store.get_slot("Samsung", "GT-I9000").unwrap();
    assert_eq!(replaced.name.as_deref(), Some("Galaxy S I"));
    assert_eq!(replaced.size, None);
    assert_eq!(
        store.get_slot("Alcatel", "OT-4030").unwrap().brand.as_deref(),
        Some("TCL")
    );
}

#[test]
fn mixed_case_command_rows_survive_consolidation() {
    let mut store = sample_store();
    let input = parse_bulk(
        "brand\tmodel\tname\t_command\n\
         sAMSUNG\tsgh-t959\t\tmove Vodafone\n\
         alcatel\tot-4030\tOne Touch S'Pop\treplace\n",
    )
    .unwrap();

    import_into(&mut store, &rules(), input, ImportOptions::default());
    let report = consolidate(&mut store).unwrap();

    assert_eq!(report.dangling, 0);
    assert_eq!(report.dedup.aliased, 2);
    assert!(store.models("sAMSUNG").is_none());
    assert!(!store.contains("Samsung", "SGH-T959"));

    let moved = store.get_slot("Vodafone", "SGH-T959").unwrap();
    assert_eq!(moved.brand.as_deref(), Some("Samsung"));
    assert_eq!(moved.model.as_deref(), Some("GT-I9000"));

    let replaced = store.get_slot("Alcatel", "OT-4030").unwrap();
    assert_eq!(replaced.name.as_deref(), Some("One Touch S'Pop"));
    assert_eq!(replaced.size, None);
}

#[test]
fn consolidating_sample_store_collapses_shared_names() {
    let mut store = sample_store();
    let report = consolidate(&mut store).unwrap();

    // SGH-T959 by name, Vodafone Smart 4 by its resolved rebrand
    assert_eq!(report.dedup.aliased, 2);
    let t959 = store.get_slot("Samsung", "SGH-T959").unwrap();
    assert_eq!(t959.model.as_deref(), Some("GT-I9000"));
    assert_eq!(t959.brand, None);
    assert_eq!(t959.name, None);
}

#[test]
fn run_add_writes_consolidated_output() {
    let ws = Workspace::with_sample_store();
    ws.write("uas.txt", SAMPLE_USER_AGENTS);
    let config = ToolConfig {
        models: ws.file("models.yaml"),
        output: ws.file("out.yaml"),
        csv: ws.file("models.csv"),
        regexes: Some(ws.file("regexes.yaml")),
        source: None,
    };

    let summary = run_add(&config, &ws.file("uas.txt"), ImportOptions::default()).unwrap();

    let import = summary.import.unwrap();
    assert_eq!(import.added, 2);
    assert_eq!(summary.output, ws.file("out.yaml"));

    let written = load_store(&ws.file("out.yaml")).unwrap();
    assert_eq!(written.model_count(), summary.models);
    assert!(written.contains("Samsung", "GT-I9300"));
    // input store untouched
    assert_eq!(ws.read("models.yaml"), SAMPLE_STORE);
}

#[test]
fn run_add_with_missing_input_writes_nothing() {
    let ws = Workspace::with_sample_store();
    let config = ToolConfig {
        models: ws.file("models.yaml"),
        output: ws.file("out.yaml"),
        ..ToolConfig::default()
    };

    let err = run_add(&config, &ws.file("missing.txt"), ImportOptions::default()).unwrap_err();

    assert!(matches!(err, ModelsError::InputNotFound { .. }));
    assert!(!ws.file("out.yaml").exists());
}
