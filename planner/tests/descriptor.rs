use planner_suite::*;
use tdmbus::planner::*;


const CONFIG: &str = r#"{
    "timing": {
        "station_count": 4,
        "intra_station_cycles": 2,
        "inter_station_cycles": 3,
        "dma_dispatch_cycles": 4
    },
    "requests": [
        {
            "instruction_index": 7,
            "name": "drive.command",
            "source": {"station": 0, "address": 2},
            "destination": {"station": 3, "address": 7},
            "time_reference_instruction": 3,
            "time_reference_instruction_edge": "write",
            "execution_window_earliest": 5,
            "execution_window_latest": 5,
            "edge": "read"
        },
        {
            "instruction_index": 3,
            "name": "encoder.position",
            "source": {"station": 2, "address": 10},
            "destination": {"station": 0, "address": 1},
            "time_reference_cycle": 0,
            "time_reference_instruction": null,
            "execution_window_earliest": 0,
            "execution_window_latest": 10,
            "edge": "write"
        }
    ]
}"#;


#[test]
fn load_config() {
    init();
    let config = PlanConfig::from_json(CONFIG).unwrap();
    assert_eq!(config.timing, small_bus());
    assert_eq!(config.requests.len(), 2);

    let scheduler = config.scheduler().unwrap();
    let command = &scheduler.requests()[0];
    assert_eq!(command.name.as_deref(), Some("drive.command"));
    // forward reference resolved to the position of the referenced descriptor
    assert_eq!(command.anchor, Anchor::Transfer {request: RequestId(1), edge: Edge::Write});
    assert_eq!(command.window, Window::exact(5));
    assert_eq!(command.edge, Edge::Read);
    assert_eq!(scheduler.requests()[1].anchor, Anchor::Cycle(0));

    let schedule = scheduler.compile().unwrap();
    check_schedule(&schedule);
    assert_eq!(schedule.order(), &[RequestId(1), RequestId(0)]);
    assert_eq!(schedule.placement(RequestId(0)).unwrap().read_cycle, 9);
}

fn descriptor(index: u32) -> serde_json::Value {
    serde_json::json!({
        "instruction_index": index,
        "source": {"station": 0, "address": 0},
        "destination": {"station": 1, "address": 0},
        "time_reference_cycle": 10,
        "execution_window_earliest": 0,
        "execution_window_latest": 4,
        "edge": "write",
    })
}

fn load(descriptors: &[serde_json::Value]) -> Result<Vec<TransferRequest>, Error> {
    load_requests(&serde_json::Value::from(descriptors.to_vec()).to_string())
}

#[test]
fn time_reference_must_be_unique() {
    let mut both = descriptor(0);
    both["time_reference_instruction"] = 1.into();
    both["time_reference_instruction_edge"] = "read".into();
    let error = load(&[both, descriptor(1)]).unwrap_err();
    assert!(matches!(error, Error::Descriptor {index: 0, ..}), "{error}");
    assert!(error.is_configuration());

    let mut neither = descriptor(0);
    neither.as_object_mut().unwrap().remove("time_reference_cycle");
    assert!(matches!(load(&[neither]), Err(Error::Descriptor {index: 0, ..})));
}

#[test]
fn reference_must_exist() {
    let mut dangling = descriptor(0);
    dangling["time_reference_cycle"] = serde_json::Value::Null;
    dangling["time_reference_instruction"] = 9.into();
    dangling["time_reference_instruction_edge"] = "read".into();
    assert!(matches!(load(&[dangling]), Err(Error::Descriptor {index: 0, ..})));

    let mut edgeless = descriptor(1);
    edgeless["time_reference_cycle"] = serde_json::Value::Null;
    edgeless["time_reference_instruction"] = 0.into();
    assert!(matches!(load(&[descriptor(0), edgeless]), Err(Error::Descriptor {index: 1, ..})));
}

#[test]
fn duplicate_index() {
    assert!(matches!(load(&[descriptor(4), descriptor(4)]), Err(Error::Descriptor {index: 4, ..})));
}

#[test]
fn invalid_edge() {
    let mut sideways = descriptor(0);
    sideways["edge"] = "sideways".into();
    assert!(matches!(load(&[sideways]), Err(Error::Json(_))));
}

#[test]
fn batch_is_all_or_nothing() {
    let mut scheduler = Scheduler::new(small_bus()).unwrap();
    let first = scheduler.add(copy((0, 0), (1, 0), Anchor::Cycle(0), Window::new(0, 20), Edge::Write)).unwrap();

    let mut inverted = descriptor(1);
    inverted["execution_window_earliest"] = 8.into();
    let descriptors: Vec<RequestDescriptor> = serde_json::from_value(
        serde_json::Value::from(vec![descriptor(0), inverted])).unwrap();
    let error = scheduler.add_descriptors(&descriptors).unwrap_err();
    assert!(matches!(error, Error::InvertedWindow {request: RequestId(2), ..}), "{error}");
    assert_eq!(scheduler.len(), 1);

    let ids = scheduler.add_descriptors(&descriptors[.. 1]).unwrap();
    assert_eq!(ids, vec![RequestId(1)]);
    assert_ne!(ids[0], first);
}

#[test]
fn reject_invalid_timing() {
    let config = r#"{"timing": {"station_count": 0, "intra_station_cycles": 1, "inter_station_cycles": 1, "dma_dispatch_cycles": 1}}"#;
    assert!(matches!(PlanConfig::from_json(config), Err(Error::Timing(_))));
}
