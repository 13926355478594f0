//! Basic ramp example.
//!
//! Loads a stepper from TOML, runs a trapezoidal move through the reference
//! pulse emitter and prints how the ramp phases unfold.
//!
//! Pins and delay are simulated: the delay only accumulates elapsed time.

use stepper_ramp::{parse_config, NoInterrupts, RampState, StepPulser, Stepper};

const CONFIG: &str = r#"
[steppers.x_axis]
ticks_per_second = 16_000_000
acceleration_steps_per_sec2 = 10000
min_step_interval_us = 100
"#;

/// Simulated delay that records elapsed time instead of waiting.
#[derive(Default)]
struct SimDelay {
    elapsed_ns: u64,
}

impl embedded_hal::delay::DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }
}

/// Simulated output pin that counts rising edges.
#[derive(Default)]
struct SimPin {
    high: bool,
    rising_edges: u32,
}

impl embedded_hal::digital::ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if !self.high {
            self.rising_edges += 1;
        }
        self.high = true;
        Ok(())
    }
}

fn phase_name(state: RampState) -> &'static str {
    match state {
        RampState::Idle => "idle",
        RampState::Accelerating => "accelerating",
        RampState::Coasting => "coasting",
        RampState::Decelerating => "decelerating",
    }
}

fn main() -> stepper_ramp::Result<()> {
    println!("=== Basic Ramp Example ===\n");

    let config = parse_config(CONFIG)?;
    let mut stepper = Stepper::from_system_config(&config, "x_axis", NoInterrupts)?;
    println!(
        "Stepper '{}' at {} ticks/s",
        stepper.name(),
        stepper.ticks_per_second()
    );

    let mut pulser = StepPulser::new(
        SimPin::default(),
        SimPin::default(),
        SimDelay::default(),
        stepper.ticks_per_second(),
        stepper.invert_direction(),
    );

    stepper.move_to(20_000)?;
    println!("Moving to {}", stepper.target_position());

    // Feed and drain the queue by hand to watch the phases change.
    let mut phase = stepper.ramp_state();
    let mut commands = 0u32;
    println!("  phase: {}", phase_name(phase));
    loop {
        stepper.fill_queue();
        let Some(entry) = stepper.pop_command() else {
            break;
        };
        stepper_ramp::PulseEmitter::emit(&mut pulser, &entry)?;
        commands += 1;

        if stepper.ramp_state() != phase {
            phase = stepper.ramp_state();
            println!(
                "  phase: {} at position {} ({} ticks/step)",
                phase_name(phase),
                stepper.current_position(),
                entry.ticks
            );
        }
    }

    let (step_pin, _dir_pin, delay) = pulser.release();
    println!("\nReached position {}", stepper.current_position());
    println!("Commands executed: {}", commands);
    println!("Step pulses: {}", step_pin.rising_edges);
    println!("Simulated time: {:.3} s", delay.elapsed_ns as f64 / 1e9);

    // Return home with a continuous run stopped gracefully halfway.
    stepper.run_backward()?;
    for _ in 0..200 {
        stepper.fill_queue();
        stepper.pop_command();
    }
    println!(
        "\nRunning backward, now at {} ({:?})",
        stepper.current_position(),
        stepper.ramp_state()
    );
    stepper.stop_ramp();
    let mut sink = SinkEmitter;
    stepper.run_to_completion(&mut sink)?;
    println!("Stopped at {}", stepper.current_position());

    Ok(())
}

/// Emitter that discards commands.
struct SinkEmitter;

impl stepper_ramp::PulseEmitter for SinkEmitter {
    fn emit(&mut self, _entry: &stepper_ramp::QueueEntry) -> stepper_ramp::Result<()> {
        Ok(())
    }
}
