//! Fuzz target: `RailService::handle` + `poll_timers`
//!
//! Splits the input on newlines, feeds each chunk to the dispatcher as a
//! control-channel message and runs a ramp tick after each one.  Asserts
//! that speeds never leave 0..=100, that direction never changes while
//! moving, and that every status message is valid JSON.
//!
//! cargo fuzz run fuzz_command_dispatch

#![no_main]

use libfuzzer_sys::fuzz_target;
use microrail::app::events::{ChannelEvent, PeerId};
use microrail::app::ports::{AnalogPort, MotorChannel, MotorPort, PeerChannel};
use microrail::app::service::RailService;
use microrail::config::RailConfig;
use microrail::control::ramp::Direction;

struct Hw(u16);

impl MotorPort for Hw {
    fn set_duty(&mut self, _channel: MotorChannel, percent: f32) {
        assert!((0.0..=100.0).contains(&percent), "duty {percent} out of range");
    }

    fn set_direction(&mut self, _channel: MotorChannel, _direction: Direction) {}
}

impl AnalogPort for Hw {
    fn read_raw(&mut self) -> u16 {
        self.0
    }
}

struct JsonCheck;

impl PeerChannel for JsonCheck {
    fn send_to(&mut self, _peer: PeerId, text: &str) {
        self.broadcast(text);
    }

    fn broadcast(&mut self, text: &str) {
        let value: serde_json::Value = serde_json::from_str(text).expect("status is JSON");
        assert!(value["speed"].as_u64().is_some_and(|s| s <= 100));
    }
}

fuzz_target!(|data: &[u8]| {
    let raw = data
        .first()
        .map_or(512, |&b| u16::from(b) * 4);
    let mut hw = Hw(raw);
    let mut ch = JsonCheck;
    let mut svc = RailService::new(RailConfig::default());
    svc.start(0, &mut hw);
    svc.handle(ChannelEvent::Connected { peer: 0 }, &mut hw, &mut ch);

    let mut now = 0;
    for chunk in data.split(|&b| b == b'\n') {
        let before = svc.vehicle();
        if let Some(event) = ChannelEvent::message(0, chunk) {
            svc.handle(event, &mut hw, &mut ch);
        }
        let after = svc.vehicle();
        if before.actual_speed != 0 {
            assert_eq!(before.direction, after.direction);
        }

        now += 100;
        svc.poll_timers(now, &mut hw, &mut ch);
        let state = svc.vehicle();
        assert!(state.actual_speed <= 100 && state.target_speed <= 100);
    }

    // Let the telemetry timer fire at least once.
    svc.poll_timers(now + 30_000, &mut hw, &mut ch);
    assert!(svc.power().percent <= 100);
});
