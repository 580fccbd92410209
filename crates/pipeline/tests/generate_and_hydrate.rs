//! End-to-end: generate skeleton files, then hydrate the directory

use railsynth_agent::{Resources, ScenarioRegistry};
use railsynth_config::HydrationMode;
use railsynth_pipeline::{
    read_records, GenerationPlan, Generator, HydrationOptions, Hydrator, JsonlSink, PipelineError,
};
use std::fs;

const TEMPLATE: &str = "Biglietteria {{stazione}}, {{data}} {{ora}}\n\n{{DYN_CONTEXT}}";

#[test]
fn test_generate_then_hydrate_directory() {
    let dir = tempfile::tempdir().unwrap();
    let skeletons = dir.path().join("skeletons");
    let hydrated = dir.path().join("hydrated");

    let resources = Resources::builtin();
    let registry = ScenarioRegistry::builtin();
    let batches = Generator::new(&resources, &registry)
        .run(&GenerationPlan {
            seed: 42,
            count: 5,
            scenarios: vec!["ticket_purchase".into(), "refusal".into()],
            parallel: true,
        })
        .unwrap();
    JsonlSink::new(&skeletons).write_all(&batches).unwrap();

    let records = read_records(&skeletons.join("ticket_purchase.jsonl")).unwrap();
    let slices: usize = records.iter().map(|r| r.meta.contexts.len()).sum();

    let hydrator = Hydrator::new(
        HydrationOptions::new(TEMPLATE)
            .with_mode(HydrationMode::Sliced)
            .removing_meta(),
    )
    .unwrap();
    let report = hydrator.hydrate_path(&skeletons, &hydrated).unwrap();
    assert_eq!(report.files, 2);
    assert_eq!(report.records, 10);

    let output = fs::read_to_string(hydrated.join("ticket_purchase.jsonl")).unwrap();
    assert_eq!(output.lines().count(), slices);
    for line in output.lines() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(value.get("_meta").is_none());
        let system = value["messages"][0]["content"].as_str().unwrap();
        assert!(system.starts_with("Biglietteria "));
        assert!(system.contains("<ctx>\ndata: "));
        assert!(!system.contains("{{"));
    }
}

#[test]
fn test_hydrating_a_malformed_file_names_the_line() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.jsonl");
    fs::write(&input, "not json\n").unwrap();

    let hydrator = Hydrator::new(HydrationOptions::new(TEMPLATE)).unwrap();
    let err = hydrator
        .hydrate_path(&input, &dir.path().join("out.jsonl"))
        .unwrap_err();
    assert!(matches!(err, PipelineError::MalformedLine { line: 1, .. }));
}
