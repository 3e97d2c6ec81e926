//! GPIO / peripheral pin assignments for the air-exchange controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Contact inputs (dry contacts to ground, internal pull-up)
// ---------------------------------------------------------------------------

/// Bedroom window / vent switch.  LOW = open.
pub const BEDROOM_CONTACT_GPIO: i32 = 4;
/// Office window / vent switch.  LOW = open.
pub const OFFICE_CONTACT_GPIO: i32 = 5;
/// Sliding door reed switch.  LOW = open.
pub const DOOR_CONTACT_GPIO: i32 = 6;
/// Furnace call-for-heat, opto-isolated.  LOW = calling.
pub const FURNACE_CALL_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// Fan relay
// ---------------------------------------------------------------------------

/// Relay coil driver (NPN low-side).  HIGH = fan on.
pub const FAN_RELAY_GPIO: i32 = 10;
/// Relay board polarity.
pub const FAN_RELAY_ACTIVE_LOW: bool = false;

// ---------------------------------------------------------------------------
// Temperature probes, analog (ADC1)
// ---------------------------------------------------------------------------

/// Indoor NTC thermistor.  ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const INDOOR_TEMP_ADC_CHANNEL: u32 = 0;
/// Outdoor NTC thermistor.  ADC1 channel 1 (GPIO 2 on ESP32-S3).
pub const OUTDOOR_TEMP_ADC_CHANNEL: u32 = 1;

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Mount point of the SD card FAT volume.
pub const SD_MOUNT_POINT: &str = "/sdcard";
