//! Fuzz target: `PhaseScheduler::on_tick`
//!
//! Each input byte pair is (seconds to advance, vehicle count).  Asserts
//! that exactly one side is ever non-RED, that phase changes follow the
//! fixed rotation, and that no tick emits more than one phase change.
//!
//! cargo fuzz run fuzz_phase_scheduler

#![no_main]

use intersection::app::events::OutboundEvent;
use intersection::config::SignalTiming;
use intersection::fsm::{Phase, PhaseScheduler, Side};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let timing = SignalTiming::default();
    let mut scheduler = PhaseScheduler::new(timing);
    let mut now = 0u64;
    let mut prev = scheduler.assignment();

    for pair in data.chunks_exact(2) {
        // Strictly increasing, at least one second apart.
        now += u64::from(pair[0] % 30) + 1;
        let events = scheduler.on_tick(now, u32::from(pair[1]));

        let changes: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                OutboundEvent::PhaseChange(a) => Some(*a),
                _ => None,
            })
            .collect();
        assert!(changes.len() <= 1, "more than one transition in a tick");

        let now_assignment = scheduler.assignment();
        let lit = Side::ALL
            .iter()
            .filter(|s| now_assignment.phase_of(**s) != Phase::Red)
            .count();
        assert_eq!(lit, 1, "exactly one side may hold the right of way");

        if let Some(next) = changes.first() {
            assert_eq!(*next, now_assignment);
            let (Some(from), Some(to)) = (prev.active_side(), next.active_side()) else {
                panic!("assignment without an active side");
            };
            match prev.phase_of(from) {
                Phase::Green => assert_eq!(to, from),
                Phase::Yellow => assert_eq!(to, from.next()),
                Phase::Red => unreachable!(),
            }
            prev = *next;
        }

        for e in &events {
            if let OutboundEvent::GreenTime { side, .. } = e {
                assert_eq!(*side, timing.sensored_side);
            }
        }
    }
});
