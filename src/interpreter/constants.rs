// Constants for the sketch interpreter

/// Reported in the `VERSION_INFO` record
pub const VERSION: &str = "1.0.0";
pub const COMPONENT: &str = "interpreter";

pub const DEFAULT_LOOP_CYCLES: u32 = 3;
pub const DEFAULT_MAX_ITERATIONS: u32 = 10_000;
pub const DEFAULT_MAX_CALL_DEPTH: usize = 64;
pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;

// Pin levels and modes
pub const HIGH: i32 = 1;
pub const LOW: i32 = 0;
pub const INPUT: i32 = 0;
pub const OUTPUT: i32 = 1;
pub const INPUT_PULLUP: i32 = 2;
pub const LED_BUILTIN: i32 = 13;

/// `A0`; `A1`..`A7` follow consecutively (Uno numbering)
pub const ANALOG_PIN_BASE: i32 = 14;

// `Serial.print` number bases
pub const DEC: i32 = 10;
pub const HEX: i32 = 16;
pub const OCT: i32 = 8;
pub const BIN: i32 = 2;
