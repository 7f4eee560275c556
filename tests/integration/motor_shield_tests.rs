//! LOLIN motor shield driver and adapter against a scripted I2C bus.

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
use microrail::adapters::hardware::{MotorShieldAdapter, READY_ATTEMPTS};
use microrail::app::ports::{MotorChannel, MotorPort};
use microrail::control::ramp::Direction;
use microrail::drivers::motor_shield::{
    DEFAULT_ADDRESS, LolinMotorShield, MotorStatus, PRODUCT_ID_MOTOR,
};
use microrail::error::MotorError;

use super::mock_hw::{MockI2c, NoDelay};

const NACK: ErrorKind = ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address);

#[test]
fn duty_is_sent_in_hundredths_little_endian() {
    let mut shield = LolinMotorShield::new(MockI2c::new());
    shield.set_duty(MotorChannel::Both, 42.5).unwrap();

    let bus = shield.release();
    // 4250 = 0x109A
    assert_eq!(bus.writes, vec![(DEFAULT_ADDRESS, vec![0x06, 2, 0x9A, 0x10])]);
}

#[test]
fn frequency_and_status_frames() {
    let mut shield = LolinMotorShield::new(MockI2c::new());
    shield.set_frequency(MotorChannel::Both, 100).unwrap();
    shield.set_status(MotorChannel::A, MotorStatus::Ccw).unwrap();
    shield.set_status(MotorChannel::B, MotorStatus::ShortBrake).unwrap();

    let bus = shield.release();
    assert_eq!(bus.writes[0].1, vec![0x05, 2, 100, 0, 0, 0]);
    assert_eq!(bus.writes[1].1, vec![0x04, 0, 1]);
    assert_eq!(bus.writes[2].1, vec![0x04, 1, 3]);
}

#[test]
fn waits_through_boot_until_product_id_answers() {
    let bus = MockI2c::new()
        .reply(Err(NACK))
        .reply(Ok([0, 0]))
        .reply(Ok([PRODUCT_ID_MOTOR, 1]));
    let mut shield = LolinMotorShield::new(bus);
    let mut delay = NoDelay::new();

    assert_eq!(shield.wait_until_ready(10, &mut delay), Ok(1));
    assert_eq!(delay.calls, 2);
}

#[test]
fn foreign_device_is_not_retried() {
    let bus = MockI2c::new().reply(Ok([0x07, 3]));
    let mut shield = LolinMotorShield::new(bus);
    let mut delay = NoDelay::new();

    assert_eq!(
        shield.wait_until_ready(10, &mut delay),
        Err(MotorError::WrongProduct(0x07))
    );
    assert_eq!(delay.calls, 0);
}

#[test]
fn silent_bus_gives_up_after_attempts() {
    let mut shield = LolinMotorShield::new(MockI2c::new());
    let mut delay = NoDelay::new();
    assert_eq!(
        shield.wait_until_ready(3, &mut delay),
        Err(MotorError::NotReady)
    );
    assert_eq!(delay.calls, 3);
}

#[test]
fn adapter_init_sets_frequency_after_ready() {
    let bus = MockI2c::new().reply(Ok([PRODUCT_ID_MOTOR, 2]));
    let mut adapter = MotorShieldAdapter::new(LolinMotorShield::new(bus));

    adapter.init(100, &mut NoDelay::new()).unwrap();

    let bus = adapter.into_inner().release();
    assert_eq!(bus.writes[0].1, vec![0x01]);
    assert_eq!(bus.writes[1].1, vec![0x05, 2, 100, 0, 0, 0]);
}

#[test]
fn adapter_init_fails_when_shield_never_answers() {
    let mut adapter = MotorShieldAdapter::new(LolinMotorShield::new(MockI2c::new()));
    let mut delay = NoDelay::new();
    assert_eq!(adapter.init(100, &mut delay), Err(MotorError::NotReady));
    assert_eq!(delay.calls, READY_ATTEMPTS);
}

#[test]
fn adapter_maps_directions_to_rotation() {
    let mut adapter = MotorShieldAdapter::new(LolinMotorShield::new(MockI2c::new()));
    adapter.set_direction(MotorChannel::Both, Direction::Forward);
    adapter.set_direction(MotorChannel::Both, Direction::Backward);

    let bus = adapter.into_inner().release();
    assert_eq!(bus.writes[0].1, vec![0x04, 2, MotorStatus::Cw as u8]);
    assert_eq!(bus.writes[1].1, vec![0x04, 2, MotorStatus::Ccw as u8]);
}

#[test]
fn adapter_counts_bus_errors_instead_of_failing() {
    let mut bus = MockI2c::new();
    bus.fail_writes = true;
    let mut adapter = MotorShieldAdapter::new(LolinMotorShield::new(bus));

    adapter.set_duty(MotorChannel::Both, 50.0);
    adapter.set_direction(MotorChannel::Both, Direction::Forward);

    assert_eq!(adapter.bus_errors(), 2);
}
