mod config;

use std::fs;
use std::process;

use gmus_core::formats::{parse_cnf, parse_gcnf, parse_vgcnf, ParsedInstance};
use gmus_core::Engine;

use config::{Config, InputFormat};

fn read_instance(config: &Config) -> ParsedInstance {
    let text = fs::read_to_string(&config.input).unwrap_or_else(|err| {
        eprintln!("gmus: cannot read {}: {}", config.input.display(), err);
        process::exit(-1);
    });
    let parsed = match config.format {
        InputFormat::Cnf => parse_cnf(&text),
        InputFormat::Gcnf => parse_gcnf(&text),
        InputFormat::Vgcnf => parse_vgcnf(&text),
    };
    parsed.unwrap_or_else(|err| {
        eprintln!("gmus: {}: {}", config.input.display(), err);
        process::exit(-1);
    })
}

fn build_engine(config: &Config) -> Engine {
    let mut engine = Engine::create();
    engine.init_all().unwrap_or_else(|err| {
        eprintln!("gmus: {err}");
        process::exit(-1);
    });
    engine.set_verbosity(config.verbosity, "gmus");
    if config.cpu_time_limit > 0.0 {
        engine.set_cpu_time_limit(config.cpu_time_limit);
    }
    if config.iter_limit > 0 {
        engine.set_iter_limit(config.iter_limit);
    }
    engine.set_order(config.order);
    engine.set_finalize_necessary_groups(config.finalize_necessary_groups);
    engine.set_delete_unnecessary_groups(config.delete_unnecessary_groups);
    {
        let cfg = engine.config_mut();
        *cfg = std::mem::take(cfg)
            .with_oracle_kind(config.oracle)
            .with_algorithm(config.algorithm)
            .with_redundancy_removal(config.use_rr, true)
            .with_refinement(config.refine)
            .with_rotation(config.rotation, None);
    }
    engine
}

fn main() {
    env_logger::init();
    let config = config::parse_args();
    let instance = read_instance(&config);

    let mut engine = build_engine(&config);
    engine.init_run().unwrap_or_else(|err| {
        eprintln!("gmus: {err}");
        process::exit(-1);
    });

    if matches!(config.format, InputFormat::Vgcnf) {
        engine
            .set_variable_groups(instance.variable_groups.clone())
            .unwrap_or_else(|err| {
                eprintln!("gmus: {err}");
                process::exit(-1);
            });
    }

    for clause in &instance.clauses {
        if let Err(err) = engine.add_clause(clause.literals.clone(), clause.group) {
            eprintln!("gmus: {err}");
            process::exit(-1);
        }
    }

    let sat_code = engine.test_sat();
    if sat_code == 10 {
        if config.print_model_on_sat {
            if let Some(model) = engine.last_model() {
                let assignment: Vec<String> = model
                    .iter()
                    .enumerate()
                    .map(|(idx, &value)| {
                        let var = idx as i64 + 1;
                        if value { var.to_string() } else { (-var).to_string() }
                    })
                    .collect();
                println!("{}", assignment.join(" "));
            }
        }
        process::exit(10);
    }
    if sat_code != 20 {
        eprintln!("gmus: test_sat() returned an unexpected code {sat_code}");
        process::exit(-1);
    }

    let code = engine.compute_gmus();
    if code == -1 {
        eprintln!("gmus: compute_gmus() failed");
        process::exit(-1);
    }

    for &group in engine.gmus_group_ids() {
        println!("{group}");
    }

    process::exit(code);
}
