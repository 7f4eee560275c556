//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements    | Connects to                   |
//! |----------------|---------------|-------------------------------|
//! | `config_file`  | ConfigPort    | JSON file on disk             |
//! | `hardware`     | MotorPort     | LOLIN I2C motor shield (board)|
//! | `sim`          | MotorPort     | in-memory motors (host)       |
//! |                | AnalogPort    | settable battery reading      |
//! | `tcp_channel`  | PeerChannel   | newline-framed TCP peers      |
//! | `time`         | —             | monotonic host clock          |

pub mod config_file;
pub mod hardware;
pub mod sim;
pub mod tcp_channel;
pub mod time;
