//! Command-line configuration: parses `clap`'s matches into a typed
//! `Config`, independent of how the binary wires it into `gmus_core::Engine`.

use std::path::PathBuf;

use clap::{App, Arg};
use gmus_core::{AlgorithmKind, OracleKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Cnf,
    Gcnf,
    Vgcnf,
}

impl InputFormat {
    fn from_flag(s: &str) -> Option<Self> {
        match s {
            "cnf" => Some(InputFormat::Cnf),
            "gcnf" => Some(InputFormat::Gcnf),
            "vgcnf" => Some(InputFormat::Vgcnf),
            _ => None,
        }
    }

    fn from_extension(path: &PathBuf) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("gcnf") => InputFormat::Gcnf,
            Some("vgcnf") => InputFormat::Vgcnf,
            _ => InputFormat::Cnf,
        }
    }
}

pub struct Config {
    pub input: PathBuf,
    pub format: InputFormat,
    pub algorithm: AlgorithmKind,
    pub oracle: OracleKind,
    pub order: u32,
    pub cpu_time_limit: f64,
    pub iter_limit: u64,
    pub verbosity: u32,
    pub use_rr: bool,
    pub rotation: bool,
    pub refine: bool,
    pub finalize_necessary_groups: bool,
    pub delete_unnecessary_groups: bool,
    pub print_model_on_sat: bool,
}

fn parse_algorithm(s: &str) -> AlgorithmKind {
    match s {
        "insertion" => AlgorithmKind::Insertion,
        "dichotomic" => AlgorithmKind::Dichotomic,
        _ => AlgorithmKind::Deletion,
    }
}

fn parse_oracle(s: &str) -> OracleKind {
    match s {
        "reinit" => OracleKind::Reinitialised,
        _ => OracleKind::Incremental,
    }
}

pub fn parse_args() -> Config {
    let matches = App::new("gmus")
        .version("0.1.0")
        .about("Group-MUS extraction over CNF/GCNF/VGCNF input")
        .arg(
            Arg::with_name("INPUT")
                .help("Path to a CNF, GCNF, or VGCNF file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("format")
                .long("format")
                .takes_value(true)
                .possible_values(&["cnf", "gcnf", "vgcnf"])
                .help("Input format; defaults to sniffing the file extension"),
        )
        .arg(
            Arg::with_name("algorithm")
                .long("algorithm")
                .takes_value(true)
                .default_value("deletion")
                .possible_values(&["deletion", "insertion", "dichotomic"]),
        )
        .arg(
            Arg::with_name("oracle")
                .long("oracle")
                .takes_value(true)
                .default_value("incremental")
                .possible_values(&["incremental", "reinit"]),
        )
        .arg(Arg::with_name("order").long("order").takes_value(true).default_value("0").help(
            "Scheduler mode, matching set_order: 0 linear-max, 1 length-longest, 2 length-shortest, 3 linear-min, 4 random",
        ))
        .arg(
            Arg::with_name("cpu-limit")
                .long("cpu-limit")
                .takes_value(true)
                .default_value("0")
                .help("CPU time budget in seconds; 0 means unlimited"),
        )
        .arg(
            Arg::with_name("iter-limit")
                .long("iter-limit")
                .takes_value(true)
                .default_value("0")
                .help("Iteration budget; 0 means unlimited"),
        )
        .arg(Arg::with_name("verbosity").short("v").long("verbosity").takes_value(true).default_value("2"))
        .arg(Arg::with_name("rr").long("rr").help("Enable the redundancy-removal trick"))
        .arg(Arg::with_name("no-rotation").long("no-rotation").help("Disable model rotation"))
        .arg(Arg::with_name("no-refine").long("no-refine").help("Disable core-based refinement"))
        .arg(
            Arg::with_name("finalize-necessary")
                .long("finalize-necessary")
                .help("Freeze groups proven necessary so the oracle never re-tests them"),
        )
        .arg(
            Arg::with_name("keep-unnecessary")
                .long("keep-unnecessary")
                .help("Do not delete unnecessary groups from the oracle once classified"),
        )
        .arg(
            Arg::with_name("print-model")
                .long("print-model")
                .help("Print a satisfying model to stdout when the formula is SAT"),
        )
        .get_matches();

    let input = PathBuf::from(matches.value_of("INPUT").expect("INPUT is required"));
    let format = matches
        .value_of("format")
        .and_then(InputFormat::from_flag)
        .unwrap_or_else(|| InputFormat::from_extension(&input));

    Config {
        format,
        algorithm: parse_algorithm(matches.value_of("algorithm").unwrap()),
        oracle: parse_oracle(matches.value_of("oracle").unwrap()),
        order: matches.value_of("order").unwrap().parse().unwrap_or(0),
        cpu_time_limit: matches.value_of("cpu-limit").unwrap().parse().unwrap_or(0.0),
        iter_limit: matches.value_of("iter-limit").unwrap().parse().unwrap_or(0),
        verbosity: matches.value_of("verbosity").unwrap().parse().unwrap_or(2),
        use_rr: matches.is_present("rr"),
        rotation: !matches.is_present("no-rotation"),
        refine: !matches.is_present("no-refine"),
        finalize_necessary_groups: matches.is_present("finalize-necessary"),
        delete_unnecessary_groups: !matches.is_present("keep-unnecessary"),
        print_model_on_sat: matches.is_present("print-model"),
        input,
    }
}
