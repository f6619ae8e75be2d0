mod error;
mod power;
mod scope;
mod transducer;

pub use error::InstrumentError;
pub use power::{PowerOutput, PowerSupply, SettleOption};
pub use scope::{BlockConfig, Channel, ChannelOption, Coupling, Scope, ScopeData, TriggerDirection, TriggerOption};
pub use transducer::{PulseParams, TriggerMode, Transducer};
