extern crate clap;
use log::{error, info, trace, LevelFilter};

// Internal project modules
use rmega_core::cpu::Cpu;
use rmega_core::error::Fault;
use rmega_core::memory::AddressSpace;

// Value returned by controller port reads when none is given
const DEFAULT_CONTROLLER: &str = "FFFFFFFF";

/// Configures command-line interface using clap
fn get_cli_config<'a>() -> clap::ArgMatches<'a> {
    let description = "Sega Genesis 68000 interpreter in Rust";
    clap::App::new("Rust Mega Drive (RMEGA)")
        .version("0.1")
        .about(description)
        .arg(
            clap::Arg::with_name("ROM")
                .help("Cartridge image to boot")
                .required(true)
                .index(1),
        )
        .arg(
            clap::Arg::with_name("trace")
                .short("t")
                .long("trace")
                .help("Log every executed instruction"),
        )
        .arg(
            clap::Arg::with_name("max-steps")
                .long("max-steps")
                .value_name("N")
                .help("Stop after N instructions")
                .takes_value(true)
                .validator(|v| {
                    v.parse::<u64>()
                        .map(|_| ())
                        .map_err(|e| format!("invalid step count: {}", e))
                }),
        )
        .arg(
            clap::Arg::with_name("controller")
                .long("controller")
                .value_name("HEX")
                .help("Value returned by controller port reads")
                .takes_value(true)
                .default_value(DEFAULT_CONTROLLER)
                .validator(|v| parse_hex(&v).map(|_| ())),
        )
        .get_matches()
}

fn parse_hex(value: &str) -> Result<u32, String> {
    let digits = value.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid hex value {}: {}", value, e))
}

/// Why the run loop stopped
enum Outcome {
    Halted,
    StepLimit,
    Fault(Fault),
}

/// Steps a CPU until it halts, faults or runs out of steps
struct Driver<'a> {
    cpu: Cpu<'a>,
    trace: bool,
    max_steps: Option<u64>,
    steps: u64,
}

impl<'a> Driver<'a> {
    fn new(cpu: Cpu<'a>, trace: bool, max_steps: Option<u64>) -> Self {
        Driver {
            cpu,
            trace,
            max_steps,
            steps: 0,
        }
    }

    fn run(&mut self) -> Outcome {
        while self.cpu.is_running() {
            if let Some(limit) = self.max_steps {
                if self.steps >= limit {
                    return Outcome::StepLimit;
                }
            }

            let pc = self.cpu.pc;
            match self.cpu.step() {
                Ok(instruction) => {
                    if self.trace {
                        trace!("{:06X}  {}", pc, instruction);
                    }
                    self.steps += 1;
                }
                Err(fault) => return Outcome::Fault(fault),
            }
        }
        Outcome::Halted
    }

    fn log_registers(&self) {
        let cpu = &self.cpu;
        info!("pc={:08X} sr={:04X} steps={}", cpu.pc, cpu.sr, self.steps);
        for (n, (d, a)) in cpu.d.iter().zip(cpu.a.iter()).enumerate() {
            info!("d{}={:08X} a{}={:08X}", n, d, n, a);
        }
    }

    fn log_fault(&self, fault: &Fault) {
        error!(
            "{} at pc {:06X} (opcode {:04X})",
            fault, self.cpu.pc, self.cpu.ir
        );
        for pc in self.cpu.recent_pcs() {
            error!("  after {:06X}", pc);
        }
    }
}

/// Main entry point for the interpreter
fn main() {
    // Parse command-line arguments
    let cli_matches = get_cli_config();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    let trace_enabled = cli_matches.is_present("trace");
    if trace_enabled {
        logger.filter_level(LevelFilter::Trace);
    }
    logger.init();

    let rom_path = match cli_matches.value_of("ROM") {
        Some(path) => path,
        None => {
            error!("No ROM specified");
            std::process::exit(1);
        }
    };

    let controller = cli_matches
        .value_of("controller")
        .map(parse_hex)
        .unwrap_or_else(|| parse_hex(DEFAULT_CONTROLLER));
    let controller = match controller {
        Ok(value) => value,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let max_steps = cli_matches
        .value_of("max-steps")
        .and_then(|v| v.parse::<u64>().ok());

    // Load the cartridge image
    let rom_data = match std::fs::read(rom_path) {
        Ok(data) => data,
        Err(e) => {
            error!("Unable to read {}: {}", rom_path, e);
            std::process::exit(1);
        }
    };
    info!("Loaded {} ({} bytes)", rom_path, rom_data.len());

    // Map the image and bring the CPU out of reset
    let cpu = match AddressSpace::new(&rom_data, controller).and_then(Cpu::new) {
        Ok(cpu) => cpu,
        Err(fault) => {
            error!("Unable to start: {}", fault);
            std::process::exit(1);
        }
    };
    info!("Reset: pc={:08X} sp={:08X}", cpu.pc, cpu.sp());

    let mut driver = Driver::new(cpu, trace_enabled, max_steps);
    match driver.run() {
        Outcome::Halted => {
            info!("CPU stopped");
            driver.log_registers();
        }
        Outcome::StepLimit => {
            info!("Step limit reached");
            driver.log_registers();
        }
        Outcome::Fault(fault) => {
            driver.log_fault(&fault);
            driver.log_registers();
            std::process::exit(1);
        }
    }
}
