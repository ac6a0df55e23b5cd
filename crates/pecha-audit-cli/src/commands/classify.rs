use crate::support::{fail, print_json_or_exit};
use pecha_audit_store::classify_repository;
use serde_json::{Map, Value};
use std::path::PathBuf;

pub fn run(paths: Vec<PathBuf>, json_output: bool) {
    let mut labels = Map::new();
    for path in &paths {
        let format = classify_repository(path).unwrap_or_else(|e| fail(e));
        labels.insert(path.display().to_string(), Value::from(format.as_str()));
    }

    if json_output {
        print_json_or_exit(&labels);
    } else {
        for (path, format) in &labels {
            println!("{path}\t{}", format.as_str().unwrap_or_default());
        }
    }
}
