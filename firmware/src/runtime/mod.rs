use annunciator_core::io::OutputLine;
use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::gpio::{Input, Output, Pull, Speed};
use embassy_stm32::usart::{Config as UartConfig, DataBits, Parity, StopBits, UartTx};

use crate::diagnostics::{DIAGNOSTIC_BAUD, UartDiagnostics};
use crate::hw::{BoardInputs, GpioOutputs, rest_level};

mod control_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        PA0,
        PA1,
        PA4,
        PA8,
        PA9,
        PB3,
        PB4,
        PB5,
        USART1,
        ..
    } = hal::init(config);

    // SILENCE on PA0, TARGET* on PA1, READY* on PA4; all idle high.
    let inputs = BoardInputs::new(
        Input::new(PA0, Pull::Up),
        Input::new(PA4, Pull::Up),
        Input::new(PA1, Pull::Up),
    );

    // BELL* on PA8, LED_POWER on PB3, LED_SILENT on PB4, LED_ALARM on PB5.
    let outputs = GpioOutputs::new(
        Output::new(PA8, rest_level(OutputLine::Bell), Speed::Low),
        Output::new(PB3, rest_level(OutputLine::PowerLed), Speed::Low),
        Output::new(PB4, rest_level(OutputLine::SilentLed), Speed::Low),
        Output::new(PB5, rest_level(OutputLine::AlarmLed), Speed::Low),
    );

    let mut uart_config = UartConfig::default();
    uart_config.baudrate = DIAGNOSTIC_BAUD;
    uart_config.data_bits = DataBits::DataBits8;
    uart_config.stop_bits = StopBits::STOP1;
    uart_config.parity = Parity::ParityNone;
    let uart = UartTx::new_blocking(USART1, PA9, uart_config)
        .expect("failed to initialize diagnostic UART");

    spawner
        .spawn(control_task::run(
            inputs,
            outputs,
            UartDiagnostics::new(uart),
        ))
        .expect("failed to spawn control task");

    core::future::pending::<()>().await;
}
