pub use crate::{
    capture::{Capture, CaptureCoordinator, CaptureOption},
    error::VerificationError,
    optimize::GradientAscentOption,
    scan::{FieldMetric, FieldScanner, PeakToPeak, PeakToPeakPressure, ScanResult},
};

pub use sonoverify_core::{
    common::{kHz, mm, Freq, Hz, MHz},
    instrument::{
        BlockConfig, Channel, ChannelOption, Coupling, InstrumentError, PowerOutput, PowerSupply,
        PulseParams, Scope, ScopeData, SettleOption, Transducer, TriggerDirection, TriggerMode,
        TriggerOption,
    },
    sleep::{Sleep, SpinSleeper, SpinWaitSleeper, StdSleeper},
    FocusPoint, Waveform,
};

pub use sonoverify_hydrophone::{
    deconvolve, Bandpass, CalibrationError, CalibrationRecord, DeconvolutionOption, Deconvolver,
    Hydrophone, SensitivityModel,
};
