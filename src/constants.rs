//! Constants

/// Minimum allowed VCO input frequency (reference input after the M divider)
pub const VCO_INPUT_FREQ_MIN: u64 = 1_000_000;

/// Maximum allowed VCO input frequency.
/// The reference manual recommends staying close to 2MHz to limit PLL jitter.
pub const VCO_INPUT_FREQ_MAX: u64 = 2_000_000;

/// Maximum allowed VCO output frequency (VCO input multiplied by N)
pub const VCO_OUTPUT_FREQ_MAX: u64 = 432_000_000;

/// Minimum VCO output frequency on the STM32F2 family
pub const VCO_OUTPUT_FREQ_MIN_F2: u64 = 64_000_000;

/// Minimum VCO output frequency on the STM32F4 family
pub const VCO_OUTPUT_FREQ_MIN_F4: u64 = 192_000_000;

/// Smallest legal input pre-divider
pub const PLL_M_MIN: u64 = 2;

/// Largest legal input pre-divider
pub const PLL_M_MAX: u64 = 63;

/// Smallest legal VCO multiplier
pub const PLL_N_MIN: u64 = 64;

/// Largest legal VCO multiplier
pub const PLL_N_MAX: u64 = 432;

/// Smallest legal USB/SDIO/RNG output divider
pub const PLL_Q_MIN: u64 = 2;

/// Largest legal USB/SDIO/RNG output divider
pub const PLL_Q_MAX: u64 = 15;

/// The only system output divider ratios the circuit supports,
/// register-encoded as a 2 bit code
pub const PLL_P_DIVIDERS: [u64; 4] = [2, 4, 6, 8];

/// "No solution" marker for the M field
pub const PLL_M_NONE: u8 = 0xff;

/// "No solution" marker for the N field
pub const PLL_N_NONE: u16 = 0xffff;

/// "No solution" marker for the P field
pub const PLL_P_NONE: u8 = 0xff;

/// "No solution" marker for the Q field
pub const PLL_Q_NONE: u8 = 0xff;
