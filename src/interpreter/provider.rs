//! Host data sources
//!
//! Pin reads and clocks are answered by a [`DataProvider`] instead of
//! hardware. The default [`DeterministicProvider`] derives every answer from
//! the pin number or a fixed counter, so two runs of the same program produce
//! the same stream.

use rustc_hash::FxHashMap;

pub trait DataProvider {
    fn analog_read(&mut self, pin: i32) -> i32;
    fn digital_read(&mut self, pin: i32) -> i32;
    fn millis(&mut self) -> u32;
    fn micros(&mut self) -> u32;
    fn pulse_in(&mut self, pin: i32, state: i32, timeout: u32) -> u32;

    /// Reading from a library object, e.g. `CapacitiveSensor.capacitiveSensor`.
    /// Unknown libraries and methods read 0.
    fn library_sensor_value(&mut self, _library: &str, _method: &str, _arg: i32) -> i32 {
        0
    }
}

const INITIAL_MILLIS: u32 = 17_807;
const MILLIS_STEP: u32 = 100;
const MICROS_STEP: u32 = MILLIS_STEP * 1000;

/// Formula-based provider
///
/// - `analogRead(pin)`: `(pin * 37 + 42) % 1024`
/// - `digitalRead(pin)`: odd pins read HIGH
/// - `millis()` / `micros()`: start at 17807 ms and advance 100 ms per read
/// - `pulseIn(pin, ..)`: `pin * 150 + 1000`
/// - `CapacitiveSensor` readings: `(arg * 13 + 477) % 2000 + 100`
#[derive(Debug, Clone)]
pub struct DeterministicProvider {
    millis: u32,
    micros: u32,
}

impl Default for DeterministicProvider {
    fn default() -> Self {
        DeterministicProvider {
            millis: INITIAL_MILLIS,
            micros: INITIAL_MILLIS * 1000,
        }
    }
}

impl DeterministicProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl DataProvider for DeterministicProvider {
    fn analog_read(&mut self, pin: i32) -> i32 {
        (pin.wrapping_mul(37).wrapping_add(42)).rem_euclid(1024)
    }

    fn digital_read(&mut self, pin: i32) -> i32 {
        (pin.rem_euclid(2) == 1) as i32
    }

    fn millis(&mut self) -> u32 {
        let now = self.millis;
        self.millis = self.millis.wrapping_add(MILLIS_STEP);
        now
    }

    fn micros(&mut self) -> u32 {
        let now = self.micros;
        self.micros = self.micros.wrapping_add(MICROS_STEP);
        now
    }

    fn pulse_in(&mut self, pin: i32, _state: i32, _timeout: u32) -> u32 {
        (pin as u32).wrapping_mul(150).wrapping_add(1000)
    }

    fn library_sensor_value(&mut self, library: &str, method: &str, arg: i32) -> i32 {
        match (library, method) {
            ("CapacitiveSensor", "capacitiveSensor" | "capacitiveSensorRaw") => {
                arg.wrapping_mul(13).wrapping_add(477) % 2000 + 100
            }
            _ => 0,
        }
    }
}

/// Canned answers, for tests that need specific readings
#[derive(Debug, Clone, Default)]
pub struct FixedProvider {
    pub analog: FxHashMap<i32, i32>,
    pub digital: FxHashMap<i32, i32>,
    pub millis: u32,
    pub micros: u32,
    pub pulse: u32,
    pub library: FxHashMap<(String, String), i32>,
}

impl FixedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_analog(mut self, pin: i32, value: i32) -> Self {
        self.analog.insert(pin, value);
        self
    }

    pub fn with_digital(mut self, pin: i32, value: i32) -> Self {
        self.digital.insert(pin, value);
        self
    }

    pub fn with_library(mut self, library: &str, method: &str, value: i32) -> Self {
        self.library
            .insert((library.to_string(), method.to_string()), value);
        self
    }

    pub fn with_millis(mut self, millis: u32) -> Self {
        self.millis = millis;
        self.micros = millis.wrapping_mul(1000);
        self
    }
}

impl DataProvider for FixedProvider {
    fn analog_read(&mut self, pin: i32) -> i32 {
        self.analog.get(&pin).copied().unwrap_or(0)
    }

    fn digital_read(&mut self, pin: i32) -> i32 {
        self.digital.get(&pin).copied().unwrap_or(0)
    }

    fn millis(&mut self) -> u32 {
        self.millis
    }

    fn micros(&mut self) -> u32 {
        self.micros
    }

    fn pulse_in(&mut self, _pin: i32, _state: i32, _timeout: u32) -> u32 {
        self.pulse
    }

    fn library_sensor_value(&mut self, library: &str, method: &str, _arg: i32) -> i32 {
        self.library
            .get(&(library.to_string(), method.to_string()))
            .copied()
            .unwrap_or(0)
    }
}
