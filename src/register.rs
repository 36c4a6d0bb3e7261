//! RCC PLL configuration register (PLLCFGR)

use crate::{config::PllSettings, errors::Error};

/// PLL configuration register word.
///
/// Holds the register in hardware format. Reserved bits keep their
/// reset values, only the main PLL fields are ever touched.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PllCfgr {
    /// Register word
    pub w: u32,
}

impl Default for PllCfgr {
    /// Register reset value
    #[inline]
    fn default() -> Self {
        PllCfgr { w: 0x2400_3010 }
    }
}

/// Bit operations on the 32bit word
impl PllCfgr {
    #[inline]
    pub fn get<F>(self: &Self) -> F
    where
        F: Sized + BitField + From<u32>,
    {
        F::from((self.w >> F::offset()) & F::mask())
    }

    #[inline]
    pub fn set<F>(mut self: Self, f: F) -> Self
    where
        F: Sized + BitField + Into<u32>,
    {
        let fbits = (f.into() & F::mask()) << F::offset();
        let rbits = self.w & (!(F::mask() << F::offset()));
        self.w = rbits | fbits;
        self
    }

    /// Encode solved settings into a register word, starting from the
    /// reset value.
    ///
    /// Refuses settings carrying any "no solution" marker, including a
    /// marker in the Q field alone. Writing a marker pattern into the
    /// register would program dividers the hardware does not support.
    pub fn from_settings(settings: &PllSettings, source: PllSource) -> Result<Self, Error> {
        settings.validate()?;
        let p = match PllP::from_divisor(settings.pll_p) {
            Some(p) => p,
            None => return Err(Error::SystemClockUnsatisfiable),
        };
        Ok(Self::default()
            .set(PllM(settings.pll_m))
            .set(PllN(settings.pll_n))
            .set(p)
            .set(source)
            .set(PllQ(settings.pll_q)))
    }
}

/// Bit operations on 32bit words
pub trait BitField {
    /// Number of bits in the bit field
    fn num_bits() -> u8;

    /// Offset from 0
    fn offset() -> u8;

    #[inline]
    fn mask() -> u32 {
        !(0xFFFFFFFFu32 << Self::num_bits())
    }
}

/// Generate BitField implementation
macro_rules! gen_bitfield_impl {
    ($n:ident, $nb:tt, $off:tt) => {
        impl BitField for $n {
            #[inline]
            fn num_bits() -> u8 {
                $nb
            }
            #[inline]
            fn offset() -> u8 {
                $off
            }
        }
    };
}

/// Small bitfield-encoded numbers boilerplate
macro_rules! gen_bitfield_struct {
    ($(#[$meta:meta])*, $n:ident, $v:ty, $nb:tt, $off:tt) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub struct $n(pub $v);

        gen_bitfield_impl!($n, $nb, $off);

        impl From<u32> for $n {
            #[inline]
            fn from(x: u32) -> Self {
                $n(x as $v)
            }
        }
        impl Into<u32> for $n {
            #[inline]
            fn into(self) -> u32 {
                self.0 as u32
            }
        }
    };
}

gen_bitfield_struct!(
    /// Division factor for the main PLL input clock
    /// Bits[5:0] set the division factor of the PLL input pre-divider.
    /// The software has to set these bits to ensure that the VCO input
    /// frequency ranges from 1 to 2 MHz.
    , PllM, u8, 6, 0
);

gen_bitfield_struct!(
    /// Main PLL multiplication factor for VCO
    /// Bits[14:6] set the multiplication factor of the VCO. The software
    /// has to set these bits to ensure that the VCO output frequency
    /// stays within the range allowed for the chip family.
    , PllN, u16, 9, 6
);

/// Main PLL division factor for the system clock
/// Bits[17:16] select the division of the VCO output frequency feeding
/// the system clock. Only even ratios of 2, 4, 6 and 8 exist in the
/// hardware, encoded as a 2 bit code.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PllP {
    DivideBy2,
    DivideBy4,
    DivideBy6,
    DivideBy8,
}
gen_bitfield_impl!(PllP, 2, 16);

impl From<u32> for PllP {
    #[inline]
    fn from(x: u32) -> Self {
        match x & Self::mask() {
            0b00 => PllP::DivideBy2,
            0b01 => PllP::DivideBy4,
            0b10 => PllP::DivideBy6,
            _ => PllP::DivideBy8,
        }
    }
}
impl Into<u32> for PllP {
    #[inline]
    fn into(self) -> u32 {
        self as u32
    }
}

impl PllP {
    /// Division ratio applied by the hardware.
    pub const fn divisor(self) -> u8 {
        match self {
            PllP::DivideBy2 => 2,
            PllP::DivideBy4 => 4,
            PllP::DivideBy6 => 6,
            PllP::DivideBy8 => 8,
        }
    }

    /// Register code of a division ratio, [None] when the hardware has
    /// no code for it.
    pub const fn from_divisor(d: u8) -> Option<PllP> {
        match d {
            2 => Some(PllP::DivideBy2),
            4 => Some(PllP::DivideBy4),
            6 => Some(PllP::DivideBy6),
            8 => Some(PllP::DivideBy8),
            _ => None,
        }
    }
}

/// Main PLL entry clock source
/// Bit 22 selects the clock source feeding the PLL input pre-divider.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PllSource {
    /// 16 MHz internal RC oscillator
    Hsi,
    /// External crystal or clock
    Hse,
}
gen_bitfield_impl!(PllSource, 1, 22);

impl From<u32> for PllSource {
    #[inline]
    fn from(x: u32) -> Self {
        match x & Self::mask() {
            0 => PllSource::Hsi,
            _ => PllSource::Hse,
        }
    }
}
impl Into<u32> for PllSource {
    #[inline]
    fn into(self) -> u32 {
        self as u32
    }
}

gen_bitfield_struct!(
    /// Main PLL division factor for USB OTG FS, SDIO and RNG clocks
    /// Bits[27:24] divide the VCO output down to the 48 MHz domain.
    /// The USB OTG FS requires exactly 48 MHz to work correctly; SDIO
    /// and RNG need a frequency lower than or equal to 48 MHz.
    , PllQ, u8, 4, 24
);
