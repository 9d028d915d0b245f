/*!
    shared fixtures for the planner test suite
*/

use tdmbus::planner::*;


/// install the test logger, can be called by every test
pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 4 stations, 5 cycles per station, 4 cycles of dispatch latency: a pass lasts 24 cycles
pub fn small_bus() -> BusTiming {
    BusTiming::new(4, 2, 3, 4) .expect("valid timing")
}

/// 3 stations, 8 cycles per station, 6 cycles of dispatch latency: a pass lasts 30 cycles
pub fn wrapping_bus() -> BusTiming {
    BusTiming::new(3, 4, 4, 6) .expect("valid timing")
}

pub fn copy(source: (u8, u16), destination: (u8, u16), anchor: Anchor, window: Window, edge: Edge) -> TransferRequest {
    TransferRequest::new(
        Location::new(source.0, source.1),
        Location::new(destination.0, destination.1),
        anchor,
        window,
        edge,
        )
}

/// check the properties every compiled schedule must hold
pub fn check_schedule(schedule: &Schedule) {
    let mut cycles = Vec::new();
    for (id, request, placement) in schedule.placements() {
        // window satisfaction
        let window = schedule.window(id).expect("resolvable window");
        let edge = placement.edge(request.edge);
        assert!(window.contains(&edge),
            "request {} has its {:?} edge at {} outside {:?}", id, request.edge, edge, window);
        cycles.push(placement.dispatch_cycle);
    }
    // no double booking, placeholders included
    for placeholder in schedule.placeholders() {
        cycles.push(placeholder.dispatch_cycle);
    }
    let count = cycles.len();
    cycles.sort();
    cycles.dedup();
    assert_eq!(cycles.len(), count, "a bus slot is booked twice");

    // framing
    let instructions = schedule.program().instructions();
    let n = instructions.len();
    assert!(n >= 2);
    assert_eq!(instructions[n-1], tdmbus::instruction::Instruction::End);
    assert!(matches!(instructions[n-2], tdmbus::instruction::Instruction::Wait(_)));
    assert_eq!(instructions.iter().filter(|i| **i == tdmbus::instruction::Instruction::End).count(), 1);
    assert_eq!(schedule.program().cycles() % schedule.timing().full_pass_length() as u64, 0);
}
