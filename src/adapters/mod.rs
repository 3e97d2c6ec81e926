//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                  |
//! |----------------|--------------------|------------------------------|
//! | `hardware`     | SensorPort         | GPIO contacts, NTC probes    |
//! |                | ActuatorPort       | GPIO relay                   |
//! | `sim`          | SensorPort         | In-memory (host / fuzz)      |
//! |                | ActuatorPort       |                              |
//! | `time`         | TimePort           | System clock + uptime timer  |
//! | `log_sink`     | EventSink          | Serial log output            |
//! | `csv_sink`     | RecordSink         | CSV file (SD card)           |
//! | `display`      | DisplayPort        | Log output (LCD stand-in)    |
//! | `config_store` | ConfigPort         | postcard / JSON file         |

pub mod config_store;
pub mod csv_sink;
pub mod display;
pub mod hardware;
pub mod log_sink;
pub mod sim;
pub mod time;
