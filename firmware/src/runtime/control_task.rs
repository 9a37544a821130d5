use annunciator_core::device::Annunciator;
use embassy_futures::yield_now;
use embassy_stm32::mode::Blocking;
use embassy_stm32::usart::UartTx;

use crate::clock;
use crate::diagnostics::UartDiagnostics;
use crate::hw::{BoardInputs, GpioOutputs};
use crate::status::{self, StatusWatch};

type Diagnostics = UartDiagnostics<UartTx<'static, Blocking>>;

/// Runs the controller forever, one non-blocking pass per executor poll.
#[embassy_executor::task]
pub async fn run(inputs: BoardInputs, mut outputs: GpioOutputs, mut diagnostics: Diagnostics) -> ! {
    let mut device = Annunciator::new();
    let mut watch = StatusWatch::new();

    device.start(clock::now(), &mut outputs, &mut diagnostics);
    diagnostics.blank_line();

    loop {
        let now = clock::now();
        let sample = inputs.sample();
        let state = device.tick(now, sample, &mut outputs, &mut diagnostics);

        if watch.poll(state, now) {
            status::report(&device.snapshot(now));
        }

        yield_now().await;
    }
}
