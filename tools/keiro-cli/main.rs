use clap::Parser;
use keiro::prelude::*;
use serde::Deserialize;
use std::fs;

// --- JSON Deserialization Structs (Input Format Specific) ---
// These structs match the flow service's record envelope and are only used
// here for conversion.

#[derive(Deserialize)]
struct RawFlowRecord {
    #[serde(alias = "flowName")]
    name: String,
    #[serde(default)]
    description: String,
    definition: FlowDefinition,
}

// --- Converter Implementation ---
// This implements the conversion from the raw service record to the
// canonical LoadedFlow.

impl IntoFlow for RawFlowRecord {
    fn into_flow(self) -> Result<LoadedFlow, FlowConversionError> {
        self.definition
            .validate_references()
            .map_err(|e| FlowConversionError::Validation(e.to_string()))?;
        Ok(LoadedFlow::new(self.definition, self.name, self.description))
    }
}

/// A flow graph inspection CLI: validates a persisted flow record, derives
/// its visual graph (running auto-layout when no positions are stored) and
/// prints a summary.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the flow record JSON file
    record_path: String,

    /// Write the (possibly laid-out) definition JSON to this path
    #[arg(short, long)]
    output: Option<String>,

    /// Write a binary session snapshot to this path
    #[arg(long)]
    snapshot: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let record_json = fs::read_to_string(&cli.record_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read flow record '{}': {}",
            &cli.record_path, e
        ))
    });

    let record: RawFlowRecord = serde_json::from_str(&record_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse flow record JSON: {}", e)));

    let loaded = record
        .into_flow()
        .unwrap_or_else(|e| exit_with_error(&format!("Flow record is not loadable: {}", e)));

    println!("Flow '{}' ({})", loaded.name, loaded.definition.id);
    println!(
        "  version {} / {}",
        loaded.definition.version,
        if loaded.definition.is_published {
            "published"
        } else {
            "draft"
        }
    );

    let had_positions = loaded.definition.any_position();
    let conversion = flow_to_graph(&loaded.definition);

    println!("  {} steps, {} edges", conversion.nodes.len(), conversion.edges.len());
    if !had_positions {
        println!("  no stored positions; auto-layout assigned them");
    }

    for kind in [
        EdgeKind::Default,
        EdgeKind::Conditional,
        EdgeKind::Fallback,
        EdgeKind::Branch,
    ] {
        let count = conversion.edges.iter().filter(|e| e.kind == kind).count();
        if count > 0 {
            println!("  -> {} {} edge(s)", count, kind.as_str());
        }
    }

    for node in &conversion.nodes {
        let mut markers: Vec<String> = Vec::new();
        if node.data.is_start {
            markers.push("start".to_string());
        }
        if let Some(branch) = &node.data.branch {
            markers.push(format!("branch {}/{}", branch.fork_id, branch.branch_id));
        }
        if node.data.is_branch_end {
            markers.push("branch end".to_string());
        }
        if node.data.is_terminal {
            markers.push("terminal".to_string());
        }
        let suffix = if markers.is_empty() {
            String::new()
        } else {
            format!("  [{}]", markers.join(", "))
        };
        println!(
            "  {:>10} {:<28} @ ({:.0}, {:.0}){}",
            node.data.step_type, node.id, node.position.x, node.position.y, suffix
        );
    }

    if let Some(output_path) = &cli.output {
        let json = conversion
            .flow
            .to_json()
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize definition: {}", e)));
        fs::write(output_path, json).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to write '{}': {}", output_path, e))
        });
        println!("  -> Wrote definition to '{}'", output_path);
    }

    if let Some(snapshot_path) = &cli.snapshot {
        let snapshot = FlowSnapshot::new(loaded.name, loaded.description, conversion.flow);
        snapshot
            .save(snapshot_path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to write snapshot: {}", e)));
        println!("  -> Wrote snapshot to '{}'", snapshot_path);
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
