// src/driver/mod.rs

mod transaction;

use crate::common::{
    command::{Command, MEASUREMENT_OUTPUT_FORMAT_FLOAT},
    error::Sps30Error,
    hal_traits::Sps30Transport,
    response::parse::{
        parse_auto_clean_interval, parse_data_ready, parse_device_status, parse_measurement, parse_serial,
        parse_version,
    },
    types::{AutoCleanInterval, DeviceInfo, DeviceStatus, Measurement, SensorState, SerialNumber, Version},
};
use log::debug;

/// Oldest firmware that understands Sleep and WakeUp.
pub const SLEEP_MIN_FIRMWARE: Version = Version::new(2, 0);
/// Oldest firmware that understands ReadDeviceStatus.
pub const DEVICE_STATUS_MIN_FIRMWARE: Version = Version::new(2, 2);

/// A session with one SPS-30.
///
/// Tracks the sensor's mode and the device information read by `probe()`,
/// and refuses commands the sensor would not accept in its current mode
/// before anything reaches the bus. The driver never waits itself; see
/// `common::timing` for the delays callers must respect between calls.
///
/// Pass `&mut transport` to keep ownership of the transport.
#[derive(Debug)]
pub struct Sps30<T>
where
    T: Sps30Transport,
{
    interface: T,
    state: SensorState,
    info: Option<DeviceInfo>,
}

impl<T> Sps30<T>
where
    T: Sps30Transport,
{
    /// Creates an unprobed session. No bus traffic.
    pub fn new(interface: T) -> Self {
        Sps30 {
            interface,
            state: SensorState::Unprobed,
            info: None,
        }
    }

    // --- Introspection ---

    pub fn state(&self) -> SensorState {
        self.state
    }

    pub fn is_probed(&self) -> bool {
        self.info.is_some()
    }

    /// Everything `probe()` cached, if it ran.
    pub fn device_info(&self) -> Option<&DeviceInfo> {
        self.info.as_ref()
    }

    /// Cached firmware version.
    pub fn firmware_version(&self) -> Result<Version, Sps30Error<T::Error>> {
        self.cached().map(|info| info.version)
    }

    /// Cached serial number.
    pub fn serial(&self) -> Result<&SerialNumber, Sps30Error<T::Error>> {
        self.cached().map(|info| &info.serial)
    }

    /// Ends the session and returns the transport.
    pub fn release(self) -> T {
        self.interface
    }

    fn cached(&self) -> Result<&DeviceInfo, Sps30Error<T::Error>> {
        self.info.as_ref().ok_or(Sps30Error::InvalidState { state: self.state })
    }

    // --- Lifecycle ---

    /// Reads the serial number, firmware version and auto-clean interval and
    /// caches them. Nothing is cached unless all three reads succeed.
    pub fn probe(&mut self) -> Result<&DeviceInfo, Sps30Error<T::Error>> {
        self.require_state(&[SensorState::Unprobed, SensorState::Idle])?;

        let serial = self.execute_read(Command::GetSerial, parse_serial)?;
        let version = self.execute_read(Command::GetFirmwareVersion, parse_version)?;
        let auto_clean_interval = self.execute_read(Command::GetAutoCleanInterval, parse_auto_clean_interval)?;

        debug!("SPS-30 {} firmware {} auto-clean {} s", serial, version, auto_clean_interval.as_secs());
        self.transition(SensorState::Idle);
        Ok(self.info.insert(DeviceInfo { serial, version, auto_clean_interval }))
    }

    /// Enters measurement mode with float output.
    pub fn start(&mut self) -> Result<(), Sps30Error<T::Error>> {
        self.require_state(&[SensorState::Idle])?;
        self.execute_write(Command::StartMeasurement, Some(&MEASUREMENT_OUTPUT_FORMAT_FLOAT))?;
        self.transition(SensorState::Measuring);
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), Sps30Error<T::Error>> {
        self.require_state(&[SensorState::Measuring])?;
        self.execute_write(Command::StopMeasurement, None)?;
        self.transition(SensorState::Idle);
        Ok(())
    }

    /// Enters sleep mode. Requires firmware 2.0 or newer.
    pub fn sleep(&mut self) -> Result<(), Sps30Error<T::Error>> {
        self.require_state(&[SensorState::Idle])?;
        self.require_firmware(SLEEP_MIN_FIRMWARE)?;
        self.execute_write(Command::Sleep, None)?;
        self.transition(SensorState::Sleeping);
        Ok(())
    }

    /// Leaves sleep mode.
    ///
    /// WakeUp is written twice: the first write only activates the sensor's
    /// I2C interface and is normally not acknowledged, so its failure is
    /// ignored. The second must follow within `WAKE_UP_WINDOW`.
    pub fn wake(&mut self) -> Result<(), Sps30Error<T::Error>> {
        self.require_state(&[SensorState::Sleeping])?;
        if let Err(e) = self.execute_write(Command::WakeUp, None) {
            debug!("SPS-30 first wake-up not acknowledged (ignored): {}", e);
        }
        self.execute_write(Command::WakeUp, None)?;
        self.transition(SensorState::Idle);
        Ok(())
    }

    /// Soft reset, legal in every state. The cache is dropped and the
    /// sensor must be probed again after `RESET_DELAY`.
    pub fn reset(&mut self) -> Result<(), Sps30Error<T::Error>> {
        self.execute_write(Command::Reset, None)?;
        self.info = None;
        self.transition(SensorState::Unprobed);
        Ok(())
    }

    // --- Measurement Mode ---

    /// Reads the latest measurement. Check `data_ready()` first; otherwise
    /// the previous sample may be returned again.
    pub fn read_measurement(&mut self) -> Result<Measurement, Sps30Error<T::Error>> {
        self.require_state(&[SensorState::Measuring])?;
        self.execute_read(Command::ReadMeasurement, parse_measurement)
    }

    pub fn data_ready(&mut self) -> Result<bool, Sps30Error<T::Error>> {
        self.require_state(&[SensorState::Measuring])?;
        self.execute_read(Command::GetDataReady, parse_data_ready)
    }

    /// Starts a fan cleaning cycle. Runs for `FAN_CLEAN_DURATION`.
    pub fn clean_fan(&mut self) -> Result<(), Sps30Error<T::Error>> {
        self.require_state(&[SensorState::Measuring])?;
        self.execute_write(Command::StartManualFanClean, None)
    }

    // --- Configuration & Status ---

    /// Cached auto-clean interval.
    ///
    /// The device is not queried: firmware before 2.2 reports a stale value
    /// after a set until the next reset, so the value read at probe time and
    /// updated by successful sets is authoritative.
    pub fn auto_clean_interval(&self) -> Result<AutoCleanInterval, Sps30Error<T::Error>> {
        self.require_state(&[SensorState::Idle, SensorState::Measuring])?;
        self.cached().map(|info| info.auto_clean_interval)
    }

    /// Writes the auto-clean interval (seconds, 0 disables) and returns the
    /// cached value.
    pub fn set_auto_clean_interval(&mut self, seconds: u32) -> Result<AutoCleanInterval, Sps30Error<T::Error>> {
        self.require_state(&[SensorState::Idle])?;
        let interval = AutoCleanInterval::from_secs(seconds);
        self.execute_write(Command::SetAutoCleanInterval, Some(&interval.to_be_bytes()))?;
        if let Some(info) = self.info.as_mut() {
            info.auto_clean_interval = interval;
        }
        Ok(interval)
    }

    /// Writes the auto-clean interval in whole days.
    pub fn set_auto_clean_interval_days(&mut self, days: u8) -> Result<AutoCleanInterval, Sps30Error<T::Error>> {
        self.set_auto_clean_interval(AutoCleanInterval::from_days(days).as_secs())
    }

    /// Reads the device status register. Requires firmware 2.2 or newer.
    pub fn read_device_status(&mut self) -> Result<DeviceStatus, Sps30Error<T::Error>> {
        self.require_state(&[SensorState::Idle, SensorState::Measuring])?;
        self.require_firmware(DEVICE_STATUS_MIN_FIRMWARE)?;
        self.execute_read(Command::ReadDeviceStatus, parse_device_status)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::transport::{MockError, MockTransport, RecordedDevice, RecordedTransport};

    fn probe_script() -> MockTransport {
        MockTransport::new()
            .expect_read(0xD033, &fixtures::SERIAL_NUMBER_RESPONSE)
            .expect_read(0xD100, &fixtures::FIRMWARE_VERSION_RESPONSE)
            .expect_read(0x8004, &fixtures::AUTO_CLEAN_INTERVAL_RESPONSE_DEFAULT)
    }

    fn probed(script: MockTransport) -> Sps30<MockTransport> {
        let mut sensor = Sps30::new(script);
        sensor.probe().unwrap();
        sensor
    }

    #[test]
    fn test_new_session_is_unprobed() {
        let sensor = Sps30::new(MockTransport::new());
        assert_eq!(sensor.state(), SensorState::Unprobed);
        assert!(!sensor.is_probed());
        assert!(sensor.device_info().is_none());
        assert!(matches!(sensor.firmware_version(), Err(Sps30Error::InvalidState { .. })));
        assert!(matches!(sensor.serial(), Err(Sps30Error::InvalidState { .. })));
    }

    #[test]
    fn test_probe_caches_device_info() {
        let mut sensor = Sps30::new(probe_script());
        let info = sensor.probe().unwrap();
        assert_eq!(info.serial, fixtures::SERIAL_NUMBER);
        assert_eq!(info.version, Version::new(2, 2));
        assert_eq!(info.auto_clean_interval, AutoCleanInterval::DEFAULT);

        assert_eq!(sensor.state(), SensorState::Idle);
        assert!(sensor.is_probed());
        assert_eq!(sensor.firmware_version().unwrap(), Version { major: 2, minor: 2 });
        assert_eq!(sensor.serial().unwrap().as_str(), "7ED625EC2CE81EE8");
        assert_eq!(sensor.auto_clean_interval().unwrap().as_secs(), 604_800);
        assert!(sensor.release().is_done());
    }

    #[test]
    fn test_probe_is_atomic() {
        let script = MockTransport::new()
            .expect_read(0xD033, &fixtures::SERIAL_NUMBER_RESPONSE)
            .fail_read(0xD100);
        let mut sensor = Sps30::new(script);
        assert!(matches!(sensor.probe(), Err(Sps30Error::Bus(MockError::Injected))));
        assert_eq!(sensor.state(), SensorState::Unprobed);
        assert!(!sensor.is_probed());

        let mut corrupted = fixtures::AUTO_CLEAN_INTERVAL_RESPONSE_DEFAULT;
        corrupted[4] ^= 0x01;
        let script = MockTransport::new()
            .expect_read(0xD033, &fixtures::SERIAL_NUMBER_RESPONSE)
            .expect_read(0xD100, &fixtures::FIRMWARE_VERSION_RESPONSE)
            .expect_read(0x8004, &corrupted);
        let mut sensor = Sps30::new(script);
        assert!(matches!(sensor.probe(), Err(Sps30Error::ChecksumMismatch { position: 5, .. })));
        assert!(!sensor.is_probed());
    }

    #[test]
    fn test_reprobe_from_idle_keeps_cache_on_failure() {
        let script = probe_script().fail_read(0xD033);
        let mut sensor = probed(script);
        assert!(sensor.probe().is_err());
        assert_eq!(sensor.state(), SensorState::Idle);
        assert_eq!(sensor.firmware_version().unwrap(), Version::new(2, 2));
    }

    #[test]
    fn test_commands_before_probe_are_rejected_without_traffic() {
        let mut sensor = Sps30::new(MockTransport::new());
        assert!(matches!(sensor.start(), Err(Sps30Error::InvalidState { state: SensorState::Unprobed })));
        assert!(matches!(sensor.stop(), Err(Sps30Error::InvalidState { .. })));
        assert!(matches!(sensor.sleep(), Err(Sps30Error::InvalidState { .. })));
        assert!(matches!(sensor.wake(), Err(Sps30Error::InvalidState { .. })));
        assert!(matches!(sensor.read_measurement(), Err(Sps30Error::InvalidState { .. })));
        assert!(matches!(sensor.data_ready(), Err(Sps30Error::InvalidState { .. })));
        assert!(matches!(sensor.clean_fan(), Err(Sps30Error::InvalidState { .. })));
        assert!(matches!(sensor.set_auto_clean_interval(10), Err(Sps30Error::InvalidState { .. })));
        assert!(matches!(sensor.read_device_status(), Err(Sps30Error::InvalidState { .. })));
        assert!(matches!(sensor.auto_clean_interval(), Err(Sps30Error::InvalidState { .. })));

        let mock = sensor.release();
        assert_eq!((mock.writes(), mock.reads()), (0, 0));
    }

    #[test]
    fn test_idle_only_commands_are_rejected_while_measuring_or_asleep() {
        let script = probe_script()
            .expect_write(0x0010, &fixtures::START_MEASUREMENT_REQUEST[2..])
            .expect_write(0x0104, &[])
            .expect_write(0x1001, &[]);
        let mut sensor = probed(script);

        sensor.start().unwrap();
        assert!(matches!(sensor.probe(), Err(Sps30Error::InvalidState { state: SensorState::Measuring })));
        assert!(matches!(sensor.sleep(), Err(Sps30Error::InvalidState { state: SensorState::Measuring })));
        assert_eq!(sensor.state(), SensorState::Measuring);

        sensor.stop().unwrap();
        sensor.sleep().unwrap();
        assert!(matches!(sensor.probe(), Err(Sps30Error::InvalidState { state: SensorState::Sleeping })));
        assert!(matches!(sensor.sleep(), Err(Sps30Error::InvalidState { state: SensorState::Sleeping })));
        assert_eq!(sensor.state(), SensorState::Sleeping);

        // Only the scripted start, stop and sleep reached the bus
        let mock = sensor.release();
        assert!(mock.is_done());
        assert_eq!((mock.writes(), mock.reads()), (3, 3));
    }

    #[test]
    fn test_start_sends_float_format() {
        let mut sensor = probed(probe_script().expect_write(0x0010, &[0x03, 0x00, 0xAC]));
        sensor.start().unwrap();
        assert_eq!(sensor.state(), SensorState::Measuring);
        assert!(sensor.release().is_done());
    }

    #[test]
    fn test_measurement_commands_require_measuring() {
        let mut sensor = probed(probe_script());
        assert!(matches!(sensor.read_measurement(), Err(Sps30Error::InvalidState { state: SensorState::Idle })));
        assert!(matches!(sensor.data_ready(), Err(Sps30Error::InvalidState { state: SensorState::Idle })));
        assert!(matches!(sensor.clean_fan(), Err(Sps30Error::InvalidState { state: SensorState::Idle })));
        assert!(matches!(sensor.stop(), Err(Sps30Error::InvalidState { state: SensorState::Idle })));
        assert!(sensor.release().is_done());
    }

    #[test]
    fn test_transport_failure_leaves_state_unchanged() {
        let mut sensor = probed(probe_script().fail_write(0x0010).fail_write(0xD304));
        assert!(matches!(sensor.start(), Err(Sps30Error::Bus(MockError::Injected))));
        assert_eq!(sensor.state(), SensorState::Idle);
        assert!(matches!(sensor.reset(), Err(Sps30Error::Bus(MockError::Injected))));
        assert_eq!(sensor.state(), SensorState::Idle);
        assert!(sensor.is_probed());
    }

    #[test]
    fn test_measurement_session_against_recorded_device() {
        let mut sensor = Sps30::new(RecordedTransport::recorded());
        sensor.probe().unwrap();
        sensor.start().unwrap();

        assert!(sensor.data_ready().unwrap());
        let m = sensor.read_measurement().unwrap();
        assert_eq!(m.mc_1p0.to_bits(), 0.1628956049680710f32.to_bits());
        assert_eq!(m.typical_particle_size.to_bits(), 0.7204053997993469f32.to_bits());
        for (value, bits) in m.values().iter().zip(fixtures::MEASUREMENT_LOW_PARTICLE_BITS) {
            assert_eq!(value.to_bits(), bits);
        }

        assert!(sensor.data_ready().unwrap());
        let m = sensor.read_measurement().unwrap();
        assert_eq!(m.mc_2p5, 0.0);
        assert_eq!(m.typical_particle_size, 1.63);
        assert!(!sensor.data_ready().unwrap());

        sensor.clean_fan().unwrap();
        assert_eq!(sensor.read_device_status().unwrap(), DeviceStatus::default());
        sensor.stop().unwrap();
        assert_eq!(sensor.state(), SensorState::Idle);
        assert!(!sensor.release().is_measuring());
    }

    #[test]
    fn test_sleep_and_wake_against_recorded_device() {
        let mut transport = RecordedTransport::default();
        {
            let mut sensor = Sps30::new(&mut transport);
            sensor.probe().unwrap();
            sensor.sleep().unwrap();
            assert_eq!(sensor.state(), SensorState::Sleeping);
            assert!(matches!(sensor.start(), Err(Sps30Error::InvalidState { state: SensorState::Sleeping })));
            assert!(matches!(sensor.read_device_status(), Err(Sps30Error::InvalidState { .. })));

            // The simulated device NACKs the first WakeUp
            sensor.wake().unwrap();
            assert_eq!(sensor.state(), SensorState::Idle);
            assert!(sensor.is_probed());
        }
        assert!(!transport.is_sleeping());
        let wakes = transport.history().filter(|c| **c == Command::WakeUp).count();
        assert_eq!(wakes, 2);
    }

    #[test]
    fn test_wake_propagates_second_failure() {
        let script = probe_script()
            .expect_write(0x1001, &[])
            .fail_write(0x1103)
            .fail_write(0x1103);
        let mut sensor = probed(script);
        sensor.sleep().unwrap();
        assert!(matches!(sensor.wake(), Err(Sps30Error::Bus(MockError::Injected))));
        assert_eq!(sensor.state(), SensorState::Sleeping);
    }

    #[test]
    fn test_wake_tolerates_acknowledged_first_write() {
        let script = probe_script()
            .expect_write(0x1001, &[])
            .expect_write(0x1103, &[])
            .expect_write(0x1103, &[]);
        let mut sensor = probed(script);
        sensor.sleep().unwrap();
        sensor.wake().unwrap();
        assert!(sensor.release().is_done());
    }

    #[test]
    fn test_firmware_gating() {
        let transport = RecordedDevice::new().version(Version::new(1, 0)).build();
        let mut sensor = Sps30::new(transport);
        sensor.probe().unwrap();
        assert!(matches!(
            sensor.sleep(),
            Err(Sps30Error::FirmwareUnsupported { required: SLEEP_MIN_FIRMWARE, actual: Version { major: 1, minor: 0 } })
        ));
        assert!(matches!(
            sensor.read_device_status(),
            Err(Sps30Error::FirmwareUnsupported { required: DEVICE_STATUS_MIN_FIRMWARE, .. })
        ));
        assert_eq!(sensor.state(), SensorState::Idle);

        let transport = RecordedDevice::new().version(Version::new(2, 1)).build();
        let mut sensor = Sps30::new(transport);
        sensor.probe().unwrap();
        sensor.sleep().unwrap();
    }

    #[test]
    fn test_device_status_flags() {
        let transport = RecordedDevice::new()
            .status(DeviceStatus::from_bits(DeviceStatus::FAN_SPEED_WARNING))
            .build();
        let mut sensor = Sps30::new(transport);
        sensor.probe().unwrap();
        let status = sensor.read_device_status().unwrap();
        assert!(status.fan_speed_warning());
        assert!(!status.fan_error());
        assert!(!status.laser_error());
    }

    #[test]
    fn test_auto_clean_interval_set_and_get() {
        let mut sensor = Sps30::new(RecordedTransport::default());
        sensor.probe().unwrap();

        let interval = sensor.set_auto_clean_interval(39_288).unwrap();
        assert_eq!(interval.as_secs(), 39_288);
        assert_eq!(sensor.auto_clean_interval().unwrap().as_secs(), 39_288);
        assert_eq!(sensor.auto_clean_interval().unwrap().whole_days(), 0);

        sensor.set_auto_clean_interval_days(2).unwrap();
        assert_eq!(sensor.auto_clean_interval().unwrap().as_secs(), 172_800);
        assert_eq!(sensor.auto_clean_interval().unwrap().whole_days(), 2);

        // Readable but not writable while measuring
        sensor.start().unwrap();
        assert_eq!(sensor.auto_clean_interval().unwrap().whole_days(), 2);
        assert!(matches!(
            sensor.set_auto_clean_interval(0),
            Err(Sps30Error::InvalidState { state: SensorState::Measuring })
        ));
        assert_eq!(sensor.release().auto_clean_interval().as_secs(), 172_800);
    }

    #[test]
    fn test_set_auto_clean_interval_frame() {
        let script = probe_script().expect_write(0x8004, &fixtures::SET_AUTO_CLEAN_INTERVAL_REQUEST_1[2..]);
        let mut sensor = probed(script);
        sensor.set_auto_clean_interval(39_288).unwrap();
        assert!(sensor.release().is_done());

        let script = probe_script().expect_write(0x8004, &fixtures::SET_AUTO_CLEAN_INTERVAL_REQUEST_2[2..]);
        let mut sensor = probed(script);
        assert_eq!(sensor.set_auto_clean_interval_days(2).unwrap().as_secs(), 172_800);
        assert!(sensor.release().is_done());
    }

    #[test]
    fn test_reset_is_legal_in_every_state() {
        // Unprobed
        let mut sensor = Sps30::new(MockTransport::new().expect_write(0xD304, &[]));
        sensor.reset().unwrap();
        assert_eq!(sensor.state(), SensorState::Unprobed);

        // Idle, Measuring, Sleeping
        let scripts = [
            probe_script().expect_write(0xD304, &[]),
            probe_script().expect_write(0x0010, &[0x03, 0x00, 0xAC]).expect_write(0xD304, &[]),
            probe_script().expect_write(0x1001, &[]).expect_write(0xD304, &[]),
        ];
        for (i, script) in scripts.into_iter().enumerate() {
            let mut sensor = probed(script);
            match i {
                1 => sensor.start().unwrap(),
                2 => sensor.sleep().unwrap(),
                _ => {}
            }
            sensor.reset().unwrap();
            assert_eq!(sensor.state(), SensorState::Unprobed);
            assert!(!sensor.is_probed());
            assert!(sensor.release().is_done());
        }
    }

    #[test]
    fn test_reset_then_reprobe_against_recorded_device() {
        let mut sensor = Sps30::new(RecordedTransport::recorded());
        sensor.probe().unwrap();
        sensor.set_auto_clean_interval(39_288).unwrap();
        sensor.start().unwrap();
        sensor.reset().unwrap();
        assert!(matches!(sensor.read_measurement(), Err(Sps30Error::InvalidState { state: SensorState::Unprobed })));

        // The interval is non-volatile
        let info = sensor.probe().unwrap();
        assert_eq!(info.auto_clean_interval.as_secs(), 39_288);
    }

    #[test]
    fn test_checksum_failure_is_recoverable() {
        let mut corrupted = fixtures::MEASUREMENT_LOW_PARTICLE_RESPONSE;
        corrupted[0] ^= 0x80;
        let script = probe_script()
            .expect_write(0x0010, &[0x03, 0x00, 0xAC])
            .expect_read(0x0300, &corrupted)
            .expect_read(0x0300, &fixtures::MEASUREMENT_LOW_PARTICLE_RESPONSE);
        let mut sensor = probed(script);
        sensor.start().unwrap();

        let err = sensor.read_measurement().unwrap_err();
        assert!(err.is_frame_error());
        assert!(matches!(err, Sps30Error::ChecksumMismatch { position: 2, expected: 0x7E, .. }));
        assert_eq!(sensor.state(), SensorState::Measuring);

        let m = sensor.read_measurement().unwrap();
        assert_eq!(m.nc_10p0.to_bits(), 0x3FA8_E74E);
    }
}
