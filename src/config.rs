//! PLL settings solver.

use crate::{constants::*, errors::*, family::PllFamily};

/// Solved main PLL configuration constants and the clocks they produce.
///
/// The register width fields hold either an in-range value or the field's
/// all-ones "no solution" marker. The derived frequencies are [None]
/// exactly when the stage they depend on has no solution. A marker in
/// `pll_q` alone means the system clock is exact but the USB clock is
/// unreachable for the committed (M, N) pair.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PllSettings {
    /// Input pre-divider, `2..=63` or [PLL_M_NONE]
    pub pll_m: u8,
    /// VCO multiplier, `64..=432` or [PLL_N_NONE]
    pub pll_n: u16,
    /// System clock output divider, one of 2/4/6/8 or [PLL_P_NONE]
    pub pll_p: u8,
    /// USB/SDIO/RNG output divider, `2..=15` or [PLL_Q_NONE]
    pub pll_q: u8,
    /// Reference input divided by M, Hz
    pub vco_input: Option<u64>,
    /// VCO input multiplied by N, Hz
    pub vco_output: Option<u64>,
    /// Actual system clock, Hz
    pub system_clock: Option<u64>,
    /// Actual USB clock, Hz
    pub usb_clock: Option<u64>,
}

impl PllSettings {
    /// The "no configuration found" result.
    pub const UNSOLVED: PllSettings = PllSettings {
        pll_m: PLL_M_NONE,
        pll_n: PLL_N_NONE,
        pll_p: PLL_P_NONE,
        pll_q: PLL_Q_NONE,
        vco_input: None,
        vco_output: None,
        system_clock: None,
        usb_clock: None,
    };

    /// Solve for the PLL constants reproducing `system_hz` and `usb_hz`
    /// exactly from the `input_hz` reference.
    ///
    /// M is the smallest pre-divider that keeps the VCO input in range
    /// and admits some workable N; N is the largest multiplier that keeps
    /// the VCO output in range and admits a workable P. Both choices are
    /// committed once made. P and Q are then derived independently from
    /// the (M, N) pair, so a failed USB branch never disturbs an exact
    /// system clock.
    ///
    /// Total over all inputs. Usable in const context:
    ///
    /// ```rust
    /// use stm32f2f4_pll::{config::PllSettings, family::PllFamily};
    ///
    /// const SETTINGS: PllSettings =
    ///     PllSettings::solve(PllFamily::F4, 8_000_000, 168_000_000, 48_000_000);
    /// const _: () = match SETTINGS.validate() {
    ///     Ok(()) => (),
    ///     Err(_) => panic!("unsatisfiable clock plan"),
    /// };
    /// ```
    pub const fn solve(family: PllFamily, input_hz: u64, system_hz: u64, usb_hz: u64) -> Self {
        if input_hz == 0 || system_hz == 0 || usb_hz == 0 {
            return Self::UNSOLVED;
        }

        let m = Self::compute_pllm(family, input_hz, system_hz);
        let n = match m {
            Some(m) => Self::compute_plln(family, input_hz, system_hz, m),
            None => None,
        };
        let (p, q) = match (m, n) {
            (Some(m), Some(n)) => (
                Self::compute_pllp(input_hz, system_hz, m, n),
                Self::compute_pllq(input_hz, usb_hz, m, n),
            ),
            _ => (None, None),
        };

        Self::assemble(input_hz, m, n, p, q)
    }

    /// Require every stage to have a solution.
    pub const fn validate(&self) -> Result<(), Error> {
        match self.validate_system() {
            Ok(()) => {
                if self.pll_q == PLL_Q_NONE {
                    Err(Error::UsbClockUnsatisfiable)
                } else {
                    Ok(())
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Require the system clock branch only. Applications that leave the
    /// 48MHz domain unused may treat a missing Q as partial success.
    pub const fn validate_system(&self) -> Result<(), Error> {
        if self.pll_m == PLL_M_NONE || self.pll_n == PLL_N_NONE || self.pll_p == PLL_P_NONE {
            Err(Error::SystemClockUnsatisfiable)
        } else {
            Ok(())
        }
    }

    /// Smallest M keeping the VCO input in range for which some valid N
    /// exists. Greedy: later stages never revisit this choice.
    const fn compute_pllm(family: PllFamily, input_hz: u64, system_hz: u64) -> Option<u64> {
        let mut m = PLL_M_MIN;
        while m <= PLL_M_MAX {
            if Self::check_pllm(family, input_hz, system_hz, m) {
                return Some(m);
            }
            m += 1;
        }
        None
    }

    const fn check_pllm(family: PllFamily, input_hz: u64, system_hz: u64, m: u64) -> bool {
        let vco_input = input_hz / m;
        vco_input >= family.vco_input_min
            && vco_input <= family.vco_input_max
            && Self::compute_plln(family, input_hz, system_hz, m).is_some()
    }

    /// Largest N keeping the VCO output in range for which the system
    /// divider works out. Searched downwards: a high VCO frequency gives
    /// the output dividers finer granularity.
    const fn compute_plln(family: PllFamily, input_hz: u64, system_hz: u64, m: u64) -> Option<u64> {
        let mut n = PLL_N_MAX;
        while n >= PLL_N_MIN {
            if Self::check_plln(family, input_hz, system_hz, m, n) {
                return Some(n);
            }
            n -= 1;
        }
        None
    }

    const fn check_plln(
        family: PllFamily,
        input_hz: u64,
        system_hz: u64,
        m: u64,
        n: u64,
    ) -> bool {
        let vco_output = input_hz / m * n;
        vco_output >= family.vco_output_min
            && vco_output <= family.vco_output_max
            && Self::compute_pllp(input_hz, system_hz, m, n).is_some()
    }

    /// SystemClock = InputFrequency / PllM * PllN / PllP
    /// => PllP = InputFrequency * PllN / PllM / SystemClock
    ///
    /// The truncated candidate is only accepted if it reproduces the
    /// requested clock exactly when run back through the pipeline.
    const fn compute_pllp(input_hz: u64, system_hz: u64, m: u64, n: u64) -> Option<u64> {
        let p = input_hz * n / m / system_hz;
        if is_system_divider(p) && input_hz / m * n / p == system_hz {
            Some(p)
        } else {
            None
        }
    }

    /// USBClock = InputFrequency / PllM * PllN / PllQ
    /// => PllQ = InputFrequency * PllN / PllM / USBClock
    const fn compute_pllq(input_hz: u64, usb_hz: u64, m: u64, n: u64) -> Option<u64> {
        let q = input_hz * n / m / usb_hz;
        if q >= PLL_Q_MIN && q <= PLL_Q_MAX && input_hz / m * n / q == usb_hz {
            Some(q)
        } else {
            None
        }
    }

    /// Defensive range check and cast down to the hardware register
    /// widths. A value that fails its check collapses to the field's
    /// marker together with everything depending on it.
    const fn assemble(
        input_hz: u64,
        m: Option<u64>,
        n: Option<u64>,
        p: Option<u64>,
        q: Option<u64>,
    ) -> Self {
        let m = match m {
            Some(v) if v >= PLL_M_MIN && v <= PLL_M_MAX => Some(v),
            _ => None,
        };
        let n = match (m, n) {
            (Some(_), Some(v)) if v >= PLL_N_MIN && v <= PLL_N_MAX => Some(v),
            _ => None,
        };
        let p = match (n, p) {
            (Some(_), Some(v)) if is_system_divider(v) => Some(v),
            _ => None,
        };
        let q = match (n, q) {
            (Some(_), Some(v)) if v >= PLL_Q_MIN && v <= PLL_Q_MAX => Some(v),
            _ => None,
        };

        let vco_input = match m {
            Some(m) => Some(input_hz / m),
            None => None,
        };
        let vco_output = match (vco_input, n) {
            (Some(vi), Some(n)) => Some(vi * n),
            _ => None,
        };
        let system_clock = match (vco_output, p) {
            (Some(vo), Some(p)) => Some(vo / p),
            _ => None,
        };
        let usb_clock = match (vco_output, q) {
            (Some(vo), Some(q)) => Some(vo / q),
            _ => None,
        };

        PllSettings {
            pll_m: match m {
                Some(v) => v as u8,
                None => PLL_M_NONE,
            },
            pll_n: match n {
                Some(v) => v as u16,
                None => PLL_N_NONE,
            },
            pll_p: match p {
                Some(v) => v as u8,
                None => PLL_P_NONE,
            },
            pll_q: match q {
                Some(v) => v as u8,
                None => PLL_Q_NONE,
            },
            vco_input,
            vco_output,
            system_clock,
            usb_clock,
        }
    }
}

/// True if `p` is one of the supported system output divider ratios.
const fn is_system_divider(p: u64) -> bool {
    let mut i = 0;
    while i < PLL_P_DIVIDERS.len() {
        if PLL_P_DIVIDERS[i] == p {
            return true;
        }
        i += 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const MHZ: u64 = 1_000_000;

    #[test]
    fn solves_200mhz_system_with_50mhz_usb() {
        let s = PllSettings::solve(PllFamily::F4, 2 * MHZ, 200 * MHZ, 50 * MHZ);
        assert_eq!(2, s.pll_m);
        assert_eq!(400, s.pll_n);
        assert_eq!(2, s.pll_p);
        assert_eq!(8, s.pll_q);
        assert_eq!(Some(MHZ), s.vco_input);
        assert_eq!(Some(400 * MHZ), s.vco_output);
        assert_eq!(Some(200 * MHZ), s.system_clock);
        assert_eq!(Some(50 * MHZ), s.usb_clock);
        assert_eq!(Ok(()), s.validate());
    }

    #[test]
    fn usb_failure_leaves_the_system_branch_alone() {
        let s = PllSettings::solve(PllFamily::F4, 2 * MHZ, 200 * MHZ, 53 * MHZ);
        // no integer Q in range divides 400MHz down to exactly 53MHz
        assert_eq!(2, s.pll_m);
        assert_eq!(400, s.pll_n);
        assert_eq!(2, s.pll_p);
        assert_eq!(PLL_Q_NONE, s.pll_q);
        assert_eq!(Some(200 * MHZ), s.system_clock);
        assert_eq!(None, s.usb_clock);
        assert_eq!(Err(Error::UsbClockUnsatisfiable), s.validate());
        assert_eq!(Ok(()), s.validate_system());
    }

    #[test]
    fn out_of_reach_input_has_no_solution() {
        // 1MHz in: every legal M pushes the VCO input below its floor
        let s = PllSettings::solve(PllFamily::F4, MHZ, 7 * MHZ, 48 * MHZ);
        assert_eq!(PllSettings::UNSOLVED, s);
        assert_eq!(Err(Error::SystemClockUnsatisfiable), s.validate());
        assert_eq!(Err(Error::SystemClockUnsatisfiable), s.validate_system());
    }

    #[test]
    fn stm32f407_hse8_reaches_168mhz_with_48mhz_usb() {
        let s = PllSettings::solve(PllFamily::F4, 8 * MHZ, 168 * MHZ, 48 * MHZ);
        assert_eq!(4, s.pll_m);
        assert_eq!(168, s.pll_n);
        assert_eq!(2, s.pll_p);
        assert_eq!(7, s.pll_q);
        assert_eq!(Some(2 * MHZ), s.vco_input);
        assert_eq!(Some(336 * MHZ), s.vco_output);
        assert_eq!(Some(168 * MHZ), s.system_clock);
        assert_eq!(Some(48 * MHZ), s.usb_clock);
    }

    #[test]
    fn skips_m_candidates_without_a_workable_multiplier() {
        // M = 2 and M = 3 keep the VCO input in range but admit no exact
        // N for 99.5MHz; the search must move on to M = 4 and, from
        // there, prefer N = 398 over the equally exact N = 199.
        let s = PllSettings::solve(PllFamily::F4, 4 * MHZ, 99_500_000, 49_750_000);
        assert_eq!(4, s.pll_m);
        assert_eq!(398, s.pll_n);
        assert_eq!(4, s.pll_p);
        assert_eq!(8, s.pll_q);
        assert_eq!(Some(398 * MHZ), s.vco_output);
        assert_eq!(Some(99_500_000), s.system_clock);
        assert_eq!(Some(49_750_000), s.usb_clock);
    }

    #[test]
    fn m_range_upper_edge_is_inclusive() {
        // only M = 63 brings a 126MHz input down into the VCO input range
        let s = PllSettings::solve(PllFamily::F4, 126 * MHZ, 200 * MHZ, 50 * MHZ);
        assert_eq!(63, s.pll_m);
        assert_eq!(200, s.pll_n);
        assert_eq!(2, s.pll_p);
        assert_eq!(8, s.pll_q);
        assert_eq!(Some(200 * MHZ), s.system_clock);
    }

    #[test]
    fn n_range_upper_edge_is_inclusive() {
        // 216MHz needs the VCO right at its 432MHz ceiling with N = Nmax
        let s = PllSettings::solve(PllFamily::F4, 2 * MHZ, 216 * MHZ, 48 * MHZ);
        assert_eq!(2, s.pll_m);
        assert_eq!(432, s.pll_n);
        assert_eq!(2, s.pll_p);
        assert_eq!(9, s.pll_q);
        assert_eq!(Some(432 * MHZ), s.vco_output);
        assert_eq!(Some(216 * MHZ), s.system_clock);
    }

    #[test]
    fn f2_vco_floor_admits_slow_system_clocks() {
        // 8MHz system clock sits at N = Nmin with the VCO right at the
        // F2 64MHz floor; the same plan is out of range for the F4 floor
        let f2 = PllSettings::solve(PllFamily::F2, 2 * MHZ, 8 * MHZ, 8 * MHZ);
        assert_eq!(2, f2.pll_m);
        assert_eq!(64, f2.pll_n);
        assert_eq!(8, f2.pll_p);
        assert_eq!(8, f2.pll_q);
        assert_eq!(Some(64 * MHZ), f2.vco_output);

        let f4 = PllSettings::solve(PllFamily::F4, 2 * MHZ, 8 * MHZ, 8 * MHZ);
        assert_eq!(PllSettings::UNSOLVED, f4);
    }

    #[test]
    fn zero_frequency_inputs_have_no_solution() {
        assert_eq!(
            PllSettings::UNSOLVED,
            PllSettings::solve(PllFamily::F4, 0, 168 * MHZ, 48 * MHZ)
        );
        assert_eq!(
            PllSettings::UNSOLVED,
            PllSettings::solve(PllFamily::F4, 8 * MHZ, 0, 48 * MHZ)
        );
        assert_eq!(
            PllSettings::UNSOLVED,
            PllSettings::solve(PllFamily::F4, 8 * MHZ, 168 * MHZ, 0)
        );
    }

    #[test]
    fn identical_inputs_identical_outputs() {
        let a = PllSettings::solve(PllFamily::F4, 8 * MHZ, 168 * MHZ, 48 * MHZ);
        let b = PllSettings::solve(PllFamily::F4, 8 * MHZ, 168 * MHZ, 48 * MHZ);
        assert_eq!(a, b);
    }

    #[test]
    fn solves_in_const_context() {
        const S: PllSettings =
            PllSettings::solve(PllFamily::F4, 2 * MHZ, 200 * MHZ, 50 * MHZ);
        const _: () = match S.validate() {
            Ok(()) => (),
            Err(_) => panic!("const plan must be satisfiable"),
        };
        assert_eq!(2, S.pll_m);
        assert_eq!(400, S.pll_n);
    }
}
