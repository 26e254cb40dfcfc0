//! List rules command implementation.

use anyhow::Result;
use ardlint_core::Rule;
use ardlint_rules::descriptors;

use crate::OutputFormat;

/// Runs the list-rules command.
pub fn run(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!(
                "{:<8} {:<15} {:<15} Brief",
                "ID", "Project type", "Reference"
            );
            println!("{}", "-".repeat(80));

            for rule in descriptors() {
                println!(
                    "{:<8} {:<15} {:<15} {}",
                    rule.id,
                    rule.project_type.as_str(),
                    rule.reference_level().to_string(),
                    rule.brief
                );
            }

            println!("\nUse --compliance to choose which rules fail the run, e.g.:");
            println!("  ardlint --compliance strict path/to/Library");
        }
        OutputFormat::Json => {
            let rules: Vec<_> = descriptors()
                .map(|rule| {
                    serde_json::json!({
                        "ID": rule.id,
                        "projectType": rule.project_type,
                        "category": rule.category,
                        "subcategory": rule.subcategory,
                        "referenceLevel": rule.reference_level(),
                        "brief": rule.brief,
                        "description": rule.description,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
    }
    Ok(())
}
