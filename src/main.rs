// Flowscope: static analysis and control-flow visualization for a teaching C++ subset

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use serde_json::json;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("flowscope");

    let mut json_output = false;
    let mut input: Option<&str> = None;
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--json" => json_output = true,
            other => input = Some(other),
        }
    }

    let input = match input {
        Some(path) => path,
        None => {
            eprintln!("Error: No input file provided");
            eprintln!();
            eprintln!("Usage: {} [--json] <file.cpp>", program_name);
            eprintln!();
            eprintln!("Prints diagnostics for the given program; with --json,");
            eprintln!("emits the diagnostics, control-flow graph, and layout");
            eprintln!("as JSON for external visualizers.");
            return ExitCode::FAILURE;
        }
    };

    if !Path::new(input).exists() {
        eprintln!("Error: File '{}' not found", input);
        eprintln!("Usage: {} [--json] <file.cpp>", program_name);
        return ExitCode::FAILURE;
    }

    let source = match fs::read_to_string(input) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error: Could not read '{}': {}", input, err);
            return ExitCode::FAILURE;
        }
    };

    let program = match flowscope::parse(&source) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let diagnostics = flowscope::analyze(&program, &source);
    let graph = flowscope::build_graph(&program);
    let positions = flowscope::layout(&graph);

    if json_output {
        let payload = json!({
            "diagnostics": diagnostics,
            "graph": graph,
            "layout": positions,
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(text) => println!("{}", text),
            Err(err) => {
                eprintln!("Error: Could not serialize output: {}", err);
                return ExitCode::FAILURE;
            }
        }
    } else {
        if diagnostics.is_empty() {
            println!("No issues found.");
        } else {
            for diagnostic in &diagnostics {
                println!("{}", diagnostic);
            }
        }
        println!(
            "Graph: {} nodes, {} edges across {} positions",
            graph.nodes.len(),
            graph.edges.len(),
            positions.len()
        );
    }

    let had_errors = diagnostics.iter().any(|d| d.is_error());
    if had_errors {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
