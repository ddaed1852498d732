use shared_types::*;
use std::fs;
use std::path::PathBuf;
use ts_rs::TS;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Participant types
    let mut types = vec![
        clean_type(Participant::export_to_string()?),
        clean_type(RegisterParticipantRequest::export_to_string()?),
        clean_type(AdminKeyRequest::export_to_string()?),
        clean_type(ParticipantsResponse::export_to_string()?),
    ];

    // Event configuration types
    types.push(clean_type(EventConfig::export_to_string()?));
    types.push(clean_type(EventConfigPatch::export_to_string()?));
    types.push(clean_type(EventConfigResponse::export_to_string()?));
    types.push(clean_type(SaveEventConfigRequest::export_to_string()?));

    types.push(clean_type(ErrorResponse::export_to_string()?));

    let output_dir = output_dir(std::env::args().nth(1))?;
    fs::create_dir_all(&output_dir)?;

    let output_path = output_dir.join("types.ts");
    fs::write(&output_path, types.join("\n\n"))?;
    println!("Generated TypeScript types in {}", output_path.display());

    Ok(())
}

/// The front end lives outside this workspace, so its bindings directory
/// must be named on the command line.
fn output_dir(arg: Option<String>) -> Result<PathBuf, String> {
    match arg {
        Some(dir) if !dir.trim().is_empty() => Ok(PathBuf::from(dir)),
        _ => Err("usage: generate_api_types <output-dir>".to_string()),
    }
}

/// Strips the per-type banner and cross-type imports, since every type ends up
/// in the same file.
fn clean_type(mut type_def: String) -> String {
    type_def.retain(|c| c != '\r');

    let kept: Vec<&str> = type_def
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("import type")
                && !trimmed.starts_with("// This file was generated")
                && !trimmed.starts_with("/* This file was generated")
        })
        .collect();

    let result = kept.join("\n").trim().to_string();
    if result.is_empty() {
        result
    } else {
        format!("{}\n", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dir_is_required() {
        assert!(output_dir(None).is_err());
        assert!(output_dir(Some("  ".to_string())).is_err());
        assert_eq!(
            output_dir(Some("site/js/api-types".to_string())).unwrap(),
            PathBuf::from("site/js/api-types")
        );
    }

    #[test]
    fn test_clean_type_strips_banner_and_imports() {
        let raw = "// This file was generated by ts-rs\r\nimport type { Participant } from \"./Participant\";\n\nexport type X = { a: string };\n";
        assert_eq!(clean_type(raw.to_string()), "export type X = { a: string };\n");
    }
}
