use crate::cli::ConfigArgs;
use crate::support::{load_config_or_exit, print_json_or_exit, registry_or_exit};
use pecha_audit_kernel::{LayerType, SchemaRegistry};

pub fn run(config: ConfigArgs, json_output: bool) {
    let config = load_config_or_exit(&config, None);
    let registry = registry_or_exit(&config);

    if json_output {
        print_json_or_exit(&registry.to_json());
        return;
    }

    println!("pecha-audit layers ({} known)", LayerType::ALL.len());
    for layer in LayerType::ALL {
        let fields = registry
            .schema_for(layer)
            .map(|schema| {
                schema
                    .fields
                    .iter()
                    .map(|field| {
                        let marker = if field.required { "" } else { "?" };
                        format!("{}{marker}", field.name)
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_else(|| "(no schema)".to_string());
        println!("  {:<22} {:<24} {fields}", layer.value(), layer.name());
    }
}
