//! End-to-end bring-up against the simulated peripheral and controller

use std::cell::RefCell;

use lumen_core::{run_bringup, BringupConfig, ErrorKind, State};
use lumen_display::command::cmd;
use lumen_display::sim::{Frame, Ssd1306Sim};
use lumen_display::INIT_SEQUENCE;
use lumen_hal::delay::NoDelay;
use lumen_hal::{DelayCycles, OutputPin, PollBudget};
use lumen_hal_stm32f4::i2c::{BusTiming, EngineConfig, I2cMaster};
use lumen_hal_stm32f4::sim::{Fault, SimRegisters};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Delay(u32),
    BusInit,
    Indicator(bool),
}

type Log = RefCell<Vec<Step>>;

struct LoggedDelay<'a>(&'a Log);

impl DelayCycles for LoggedDelay<'_> {
    fn delay_cycles(&mut self, cycles: u32) {
        self.0.borrow_mut().push(Step::Delay(cycles));
    }
}

struct LoggedPin<'a> {
    log: &'a Log,
    high: bool,
}

impl<'a> LoggedPin<'a> {
    fn new(log: &'a Log) -> Self {
        Self { log, high: false }
    }
}

impl OutputPin for LoggedPin<'_> {
    fn set_high(&mut self) {
        self.high = true;
        self.log.borrow_mut().push(Step::Indicator(true));
    }

    fn set_low(&mut self) {
        self.high = false;
        self.log.borrow_mut().push(Step::Indicator(false));
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

type Master = I2cMaster<SimRegisters<Ssd1306Sim>, NoDelay>;

fn engine(regs: SimRegisters<Ssd1306Sim>, config: EngineConfig) -> Master {
    I2cMaster::new(regs, NoDelay, config)
}

fn panel() -> SimRegisters<Ssd1306Sim> {
    SimRegisters::with_device(0x3D, Ssd1306Sim::new(0x3D))
}

fn indicator_steps(log: &Log) -> Vec<Step> {
    log.borrow()
        .iter()
        .copied()
        .filter(|s| matches!(s, Step::Indicator(_)))
        .collect()
}

#[test]
fn test_bringup_reaches_ready() {
    let log = Log::default();
    let mut master = engine(panel(), EngineConfig::default());
    let mut pin = LoggedPin::new(&log);

    let bus = &mut master;
    let steps = &log;
    let result = run_bringup(
        &BringupConfig::default(),
        LoggedDelay(&log),
        move || {
            steps.borrow_mut().push(Step::BusInit);
            bus.init(BusTiming::REFERENCE);
            bus
        },
        &mut pin,
    );

    assert!(result.is_ready());
    assert_eq!(
        result.history(),
        &[
            State::Boot,
            State::BusReady,
            State::DisplayConfigured,
            State::Cleared,
            State::Ready,
        ]
    );

    // Startup delay strictly before the bus is touched
    let steps = log.borrow();
    assert_eq!(steps[0], Step::Delay(1_000_000));
    assert_eq!(steps[1], Step::BusInit);
    assert_eq!(steps.last(), Some(&Step::Indicator(true)));
    drop(steps);
    assert_eq!(indicator_steps(&log), vec![Step::Indicator(true)]);
    assert!(pin.is_set_high());

    let display = master.registers().device();
    assert!(display.is_on());
    assert_eq!(display.ram()[0][0], 0xFF);
    assert_eq!(
        display.ram().iter().flatten().filter(|&&b| b != 0).count(),
        1
    );
}

#[test]
fn test_bringup_wire_order() {
    let log = Log::default();
    let mut master = engine(panel(), EngineConfig::default());
    let mut pin = LoggedPin::new(&log);

    let bus = &mut master;
    let result = run_bringup(
        &BringupConfig::default(),
        NoDelay,
        move || {
            bus.init(BusTiming::REFERENCE);
            bus
        },
        &mut pin,
    );
    assert!(result.is_ready());

    let mut expected: Vec<Frame> = INIT_SEQUENCE.iter().map(|&b| Frame::Command(b)).collect();
    expected.push(Frame::Command(cmd::DISPLAY_OFF));
    for page in 0..8u8 {
        expected.push(Frame::Command(0xB0 + page));
        expected.push(Frame::Command(0x00));
        expected.push(Frame::Command(0x10));
        expected.extend(std::iter::repeat(Frame::Data(0x00)).take(128));
    }
    expected.push(Frame::Command(cmd::DISPLAY_ON));
    expected.push(Frame::Data(0xFF));

    assert_eq!(master.registers().device().frames(), expected.as_slice());
}

#[test]
fn test_missing_display_is_display_fault() {
    let log = Log::default();
    let regs = panel().with_target(0x3C);
    let mut master = engine(regs, EngineConfig::default());
    let mut pin = LoggedPin::new(&log);

    let bus = &mut master;
    let result = run_bringup(
        &BringupConfig::default(),
        NoDelay,
        move || {
            bus.init(BusTiming::REFERENCE);
            bus
        },
        &mut pin,
    );

    assert_eq!(result.error(), Some(ErrorKind::DisplayFault));
    assert_eq!(
        result.history(),
        &[
            State::Boot,
            State::BusReady,
            State::Error(ErrorKind::DisplayFault)
        ]
    );
    assert!(indicator_steps(&log).is_empty());
    assert!(master.registers().device().frames().is_empty());
}

#[test]
fn test_stuck_bus_is_bus_fault() {
    let log = Log::default();
    let regs = panel().with_fault(Fault::StuckBusy);
    let config = EngineConfig {
        budget: PollBudget::Attempts(100),
        ..EngineConfig::default()
    };
    let mut master = engine(regs, config);
    let mut pin = LoggedPin::new(&log);

    let bus = &mut master;
    let result = run_bringup(
        &BringupConfig::default(),
        NoDelay,
        move || {
            bus.init(BusTiming::REFERENCE);
            bus
        },
        &mut pin,
    );

    assert_eq!(result.state(), State::Error(ErrorKind::BusFault));
    assert!(indicator_steps(&log).is_empty());
}

#[test]
fn test_data_nack_is_display_fault() {
    let log = Log::default();
    // NACKs the second byte of the very first command transfer
    let regs = panel().with_fault(Fault::NackAfterBytes(1));
    let mut master = engine(regs, EngineConfig::default());
    let mut pin = LoggedPin::new(&log);

    let bus = &mut master;
    let result = run_bringup(
        &BringupConfig::default(),
        NoDelay,
        move || {
            bus.init(BusTiming::REFERENCE);
            bus
        },
        &mut pin,
    );

    assert_eq!(
        result.history(),
        &[
            State::Boot,
            State::BusReady,
            State::Error(ErrorKind::DisplayFault)
        ]
    );
    assert!(!pin.is_set_high());
}

#[test]
fn test_invalid_config_never_touches_bus() {
    let log = Log::default();
    let mut pin = LoggedPin::new(&log);
    let config = BringupConfig {
        address: 0x80,
        ..BringupConfig::default()
    };

    let result = run_bringup(
        &config,
        LoggedDelay(&log),
        || -> Master { panic!("bus must not be initialized") },
        &mut pin,
    );

    assert_eq!(
        result.history(),
        &[State::Boot, State::Error(ErrorKind::ConfigError)]
    );
    assert!(log.borrow().is_empty());
}

#[test]
fn test_reference_engine_with_slow_flags() {
    let log = Log::default();
    let regs = panel().with_latency(5);
    let mut master = engine(regs, EngineConfig::REFERENCE);
    let mut pin = LoggedPin::new(&log);

    let bus = &mut master;
    let result = run_bringup(
        &BringupConfig::default(),
        NoDelay,
        move || {
            bus.init(BusTiming::REFERENCE);
            bus
        },
        &mut pin,
    );

    assert!(result.is_ready());
    assert_eq!(indicator_steps(&log), vec![Step::Indicator(true)]);
}
