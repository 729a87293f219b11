use std::fs;

use lib_router::configs::{load_router_config, RouterConfigFile};
use lib_router::{IoRouterLifecycle, PassReport, RouterError, RuleBasedIoRouter, StaticDeviceDirectory};
use project_tests::{connect, RecordingTransport};
use tempfile::tempdir;

const PLANT: &str = r#"
{
    rules: [
        // Displays only follow sensors in the same room.
        { name: "room-local", valueType: "Temperature", condition: { kind: "all", conditions: [
            { kind: "differentDevice" },
            { kind: "any", conditions: [
                { kind: "sourceDeviceIn", devices: ["kitchen-sensor"] },
                { kind: "actorNameContains", text: "Bridge" },
            ] },
        ] } },
        { name: "no-condition", valueType: "Humidity" },
    ],
    externalDevices: [
        { id: "mqtt", name: "MQTT bridge", ioCapabilities: [
            { coreType: "IoActor", id: "mqtt-temperature", name: "Bridge temperature",
              valueType: "Temperature", externalTopic: "plant/temperature", useRawIoValues: true },
        ] },
    ],
    devices: [
        { id: "kitchen-sensor", ioCapabilities: [
            { coreType: "IoSource", id: "kitchen-t", valueType: "Temperature", updateRate: 1000, updateStrategy: "Throttle" },
        ] },
        { id: "cellar-sensor", ioCapabilities: [
            { coreType: "IoSource", id: "cellar-t", valueType: "Temperature", updateRate: 5000 },
        ] },
        { id: "kitchen-panel", ioCapabilities: [
            { coreType: "IoActor", id: "kitchen-display", valueType: "Temperature", updateRate: 500 },
        ] },
    ],
}
"#;

fn run(config: &RouterConfigFile) -> (PassReport, Vec<project_tests::Effect>) {
    let transport = RecordingTransport::default();
    let mut router = RuleBasedIoRouter::new(StaticDeviceDirectory::new(config.devices.clone()), transport.clone())
        .with_options(config.router_options());
    router.on_init();
    router.on_started();
    let report = router.evaluate_rules();
    (report, transport.take())
}

#[test]
fn test_json5_file_drives_router() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("router.json5");
    fs::write(&path, PLANT).expect("Failed to write router file");

    let config = load_router_config(&path).expect("router file should load");
    assert_eq!(config.rules.len(), 2);

    let (report, effects) = run(&config);

    // Kitchen sensor reaches the kitchen panel and the bridge; the cellar
    // sensor only reaches the bridge (actor name contains "Bridge").
    assert_eq!(
        effects,
        vec![
            connect("cellar-t", "mqtt-temperature", Some(5000)),
            connect("kitchen-t", "kitchen-display", Some(1000)),
            connect("kitchen-t", "mqtt-temperature", Some(1000)),
        ]
    );
    // The initial pass ran in on_started; this extra pass is a no-op.
    assert_eq!(report.effects(), 0);
    assert_eq!(report.matched, 3);
}

#[test]
fn test_invalid_external_point_is_rejected() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("router.json5");
    fs::write(
        &path,
        r#"{ externalDevices: [ { id: "bridge", ioCapabilities: [ { coreType: "IoActor", id: "x", valueType: "" } ] } ] }"#,
    )
    .expect("Failed to write router file");

    let err = load_router_config(&path).expect_err("empty value type must be rejected");
    assert!(matches!(err, RouterError::InvalidPoint { .. }), "unexpected error {}", err);
}

#[test]
fn test_unparsable_file_is_a_parse_error() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("router.json5");
    fs::write(&path, "{ rules: [ ").expect("Failed to write router file");

    assert!(matches!(load_router_config(&path), Err(RouterError::ParseError(_))));
}
