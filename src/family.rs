//! PLL hardware family configuration.
//! VCO frequency limits vary between chip families.

use crate::{constants::*, errors::*};

/// VCO frequency limits of one chip family.
///
/// Only the VCO output floor differs between the supported families, the
/// remaining bounds are fixed properties of the circuit. Passed to the
/// solver by value so several families can coexist in one firmware image.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PllFamily {
    /// Lower VCO input bound, Hz
    pub(crate) vco_input_min: u64,
    /// Upper VCO input bound, Hz
    pub(crate) vco_input_max: u64,
    /// Lower VCO output bound, Hz
    pub(crate) vco_output_min: u64,
    /// Upper VCO output bound, Hz
    pub(crate) vco_output_max: u64,
}

impl PllFamily {
    /// STM32F2: VCO output from 64MHz
    pub const F2: PllFamily = PllFamily {
        vco_input_min: VCO_INPUT_FREQ_MIN,
        vco_input_max: VCO_INPUT_FREQ_MAX,
        vco_output_min: VCO_OUTPUT_FREQ_MIN_F2,
        vco_output_max: VCO_OUTPUT_FREQ_MAX,
    };

    /// STM32F4: VCO output from 192MHz
    pub const F4: PllFamily = PllFamily {
        vco_input_min: VCO_INPUT_FREQ_MIN,
        vco_input_max: VCO_INPUT_FREQ_MAX,
        vco_output_min: VCO_OUTPUT_FREQ_MIN_F4,
        vco_output_max: VCO_OUTPUT_FREQ_MAX,
    };

    /// Limits for another member of the circuit family, given its VCO
    /// output floor. Consult the chip's reference manual for the value.
    pub const fn new(vco_output_min_hz: u64) -> Result<Self, Error> {
        if vco_output_min_hz < VCO_INPUT_FREQ_MAX || vco_output_min_hz > VCO_OUTPUT_FREQ_MAX {
            Err(Error::InvalidVcoRange)
        } else {
            Ok(PllFamily {
                vco_input_min: VCO_INPUT_FREQ_MIN,
                vco_input_max: VCO_INPUT_FREQ_MAX,
                vco_output_min: vco_output_min_hz,
                vco_output_max: VCO_OUTPUT_FREQ_MAX,
            })
        }
    }

    /// VCO output floor, Hz
    pub const fn vco_output_min(&self) -> u64 {
        self.vco_output_min
    }
}
