use super::{kHz, Freq, Hz, MHz};

macro_rules! impl_unit {
    ($unit:ty, $scale:expr) => {
        impl std::ops::Mul<$unit> for f64 {
            type Output = Freq<f64>;

            fn mul(self, _: $unit) -> Self::Output {
                Freq {
                    freq: self * $scale,
                }
            }
        }
    };
}

impl_unit!(Hz, 1.);
impl_unit!(kHz, 1e3);
impl_unit!(MHz, 1e6);
