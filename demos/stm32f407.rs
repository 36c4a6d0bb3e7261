#![no_main]
#![no_std]

extern crate panic_halt; // panic handler

use cortex_m::asm;
use cortex_m_rt::entry;
use cortex_m_semihosting::hprintln;
use stm32f4::stm32f407;

use stm32f2f4_pll::{
    config::PllSettings,
    family::PllFamily,
    register::{PllCfgr, PllSource},
};

/// Clock plan for an STM32F407 on an 8MHz crystal, solved at build
/// time. An unsatisfiable plan fails the build instead of the board.
const SETTINGS: PllSettings =
    PllSettings::solve(PllFamily::F4, 8_000_000, 168_000_000, 48_000_000);
const _: () = match SETTINGS.validate() {
    Ok(()) => (),
    Err(_) => panic!("clock plan is unsatisfiable"),
};

#[entry]
fn main() -> ! {
    let dp = stm32f407::Peripherals::take().unwrap();
    let rcc = &dp.RCC;
    let flash = &dp.FLASH;

    let cfgr = PllCfgr::from_settings(&SETTINGS, PllSource::Hse).unwrap();

    rcc.cr.modify(|_, w| w.hseon().set_bit());
    while rcc.cr.read().hserdy().bit_is_clear() {}

    rcc.pllcfgr.write(|w| unsafe { w.bits(cfgr.w) });

    rcc.cr.modify(|_, w| w.pllon().set_bit());
    while rcc.cr.read().pllrdy().bit_is_clear() {}

    // 5 wait states for 168MHz at 3.3V
    flash.acr.modify(|_, w| unsafe { w.latency().bits(5) });

    // AHB /1, APB1 /4 (42MHz), APB2 /2 (84MHz)
    rcc.cfgr.modify(|_, w| unsafe {
        w.hpre().bits(0b0000).ppre1().bits(0b101).ppre2().bits(0b100)
    });

    // switch the system clock over to the PLL
    rcc.cfgr.modify(|_, w| unsafe { w.sw().bits(0b10) });
    while rcc.cfgr.read().sws().bits() != 0b10 {}

    hprintln!("PLLCFGR {:#010x}", cfgr.w).unwrap();
    hprintln!(
        "M {} N {} P {} Q {}",
        SETTINGS.pll_m,
        SETTINGS.pll_n,
        SETTINGS.pll_p,
        SETTINGS.pll_q
    )
    .unwrap();
    hprintln!(
        "sysclk {:?} usb {:?}",
        SETTINGS.system_clock,
        SETTINGS.usb_clock
    )
    .unwrap();

    loop {
        asm::wfi();
    }
}
